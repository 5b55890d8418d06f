//! Image decoding, normalization, and fixed-grid compositing.
//!
//! Sprites are normalized to 8-bit RGBA on load: decoding converts
//! indexed and greyscale PNGs, guarantees an alpha channel, and lands
//! every image in the standard sRGB space the `image` crate decodes
//! into. Only the images inside one already-determined row are decoded
//! concurrently; their slot order is fixed before decoding begins.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fully transparent pixel used for null-image padding and grid background.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error type for sprite decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode a sprite image and normalize it to 8-bit RGBA.
pub fn load_sprite(path: &Path) -> Result<RgbaImage, CodecError> {
    let image = image::open(path)
        .map_err(|source| CodecError::Decode { path: path.to_path_buf(), source })?;
    Ok(image.to_rgba8())
}

/// Decode a whole row of sprites concurrently, keeping slot order.
pub fn load_row(paths: &[PathBuf]) -> Result<Vec<RgbaImage>, CodecError> {
    paths.par_iter().map(|path| load_sprite(path)).collect()
}

/// The reserved null sprite: a fully transparent cell.
pub fn null_sprite(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, TRANSPARENT)
}

/// Arrange sprites into a grid a fixed number of columns wide.
///
/// Every cell takes the dimensions of the largest sprite; callers that
/// pad each row to a full multiple of `columns` get a fully regular
/// sheet. Oversized or undersized sprites are placed at their cell's
/// top-left corner unchanged.
pub fn arrange_grid(sprites: &[RgbaImage], columns: u32) -> RgbaImage {
    if sprites.is_empty() {
        return RgbaImage::from_pixel(1, 1, TRANSPARENT);
    }

    let cell_width = sprites.iter().map(|s| s.width()).max().unwrap_or(1);
    let cell_height = sprites.iter().map(|s| s.height()).max().unwrap_or(1);
    let rows = (sprites.len() as u32).div_ceil(columns);

    let mut sheet =
        RgbaImage::from_pixel(columns * cell_width, rows * cell_height, TRANSPARENT);

    for (i, sprite) in sprites.iter().enumerate() {
        let dest_x = (i as u32 % columns) * cell_width;
        let dest_y = (i as u32 / columns) * cell_height;
        for y in 0..sprite.height().min(cell_height) {
            for x in 0..sprite.width().min(cell_width) {
                sheet.put_pixel(dest_x + x, dest_y + y, *sprite.get_pixel(x, y));
            }
        }
    }

    sheet
}
