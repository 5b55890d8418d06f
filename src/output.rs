//! Output writing: composited tilesheet PNGs and the tileset config JSON.

use image::RgbaImage;
use serde::Serialize;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// External pretty-printer invoked on written JSON when installed.
const JSON_FORMATTER: &str = "tools/format/json_formatter.cgi";

/// Error type for output operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Save an RGBA image to a PNG file, creating parent directories as
/// needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save(path)?;
    Ok(())
}

/// Write a value as pretty-printed JSON.
///
/// Afterwards, if the external JSON formatter exists relative to the
/// working directory it is invoked on the file, best-effort: the written
/// file is already valid JSON, so formatter failures are ignored.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), OutputError> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;

    let formatter = Path::new(JSON_FORMATTER);
    if formatter.is_file() {
        let _ = Command::new(formatter).arg(path).status();
    }
    Ok(())
}
