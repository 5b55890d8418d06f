//! JSON loading for `tile_info.json` and per-sprite tile descriptors.
//!
//! Parse failures here are fatal: a tileset with a malformed descriptor
//! aborts the run instead of silently dropping content.

use crate::models::{SheetSpec, TileEntry, TilesetDims};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for configuration and descriptor parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: expected a non-empty JSON array")]
    NotAnArray { path: String },
    #[error("{path}: tilesheet entry {index} must be an object with a \"<name>.png\" key")]
    InvalidSheetEntry { path: String, index: usize },
}

fn io_err(path: &Path, source: std::io::Error) -> ParseError {
    ParseError::Io { path: path.display().to_string(), source }
}

fn json_err(path: &Path, source: serde_json::Error) -> ParseError {
    ParseError::Json { path: path.display().to_string(), source }
}

/// Parsed `tile_info.json`: global sprite dimensions plus per-sheet specs
/// in configuration order.
#[derive(Debug, Clone)]
pub struct TilesetInfo {
    pub dims: TilesetDims,
    pub sheets: Vec<(String, SheetSpec)>,
}

/// Load and interpret `tile_info.json`.
///
/// The file is a JSON array: the first element carries the global sprite
/// dimensions, every later element is an object whose first key names a
/// tilesheet (`"tiles.png"`) and maps to that sheet's spec.
pub fn load_tileset_info(path: &Path) -> Result<TilesetInfo, ParseError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| json_err(path, e))?;

    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray { path: path.display().to_string() });
    };
    if items.is_empty() {
        return Err(ParseError::NotAnArray { path: path.display().to_string() });
    }

    let dims: TilesetDims =
        serde_json::from_value(items[0].clone()).map_err(|e| json_err(path, e))?;

    let mut sheets = Vec::new();
    for (index, item) in items.iter().enumerate().skip(1) {
        let entry = item
            .as_object()
            .and_then(|map| map.iter().next())
            .ok_or_else(|| ParseError::InvalidSheetEntry {
                path: path.display().to_string(),
                index,
            })?;
        let (name, spec_value) = entry;
        let spec: SheetSpec =
            serde_json::from_value(spec_value.clone()).map_err(|e| json_err(path, e))?;
        sheets.push((name.clone(), spec));
    }

    Ok(TilesetInfo { dims, sheets })
}

/// Load one descriptor file.
///
/// A file holding a single object is wrapped into a singleton list so
/// every descriptor file yields a list of tile entries.
pub fn load_tile_entries(path: &Path) -> Result<Vec<TileEntry>, ParseError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| json_err(path, e))?;

    let entries = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<TileEntry>, _>>()
            .map_err(|e| json_err(path, e))?,
        other => vec![serde_json::from_value(other).map_err(|e| json_err(path, e))?],
    };
    Ok(entries)
}
