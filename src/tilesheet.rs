//! Tilesheet building.
//!
//! Converts one sheet's source directory into composited atlas rows and
//! the sheet's raw tile descriptors, registering every new sprite name
//! with the global registry along the way. Sprites are placed strictly in
//! scan order, 16 to a row; there is no sorting or repacking.

use crate::codec;
use crate::compose::ComposeError;
use crate::models::{SheetSpec, TileEntry, TilesetDims};
use crate::output;
use crate::parser;
use crate::registry::{SpriteRegistry, NO_ENTRY};
use crate::report::Diagnostics;
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Number of sprite slots in every composited row.
pub const ROW_WIDTH: u32 = 16;

/// Reserved sheet name excluded from processing entirely.
pub const FALLBACK_SHEET: &str = "fallback.png";

/// One sheet's effective configuration for a build pass.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Atlas file name, e.g. `"tiles.png"`.
    pub name: String,
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Filler sheets only supply sprites for names nothing registered yet.
    pub is_filler: bool,
}

impl SheetConfig {
    /// Build the effective configuration from a `tile_info.json` entry,
    /// falling back to the tileset's global sprite dimensions.
    pub fn from_spec(name: &str, spec: &SheetSpec, dims: &TilesetDims) -> Self {
        Self {
            name: name.to_string(),
            sprite_width: spec.sprite_width.unwrap_or(dims.width),
            sprite_height: spec.sprite_height.unwrap_or(dims.height),
            offset_x: spec.sprite_offset_x,
            offset_y: spec.sprite_offset_y,
            is_filler: spec.filler,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.name == FALLBACK_SHEET
    }

    /// True when the sheet uses the default dimensions with no offsets.
    /// Standard sheets omit their dimension fields in the output document.
    pub fn is_standard(&self, dims: &TilesetDims) -> bool {
        self.offset_x == 0
            && self.offset_y == 0
            && self.sprite_width == dims.width
            && self.sprite_height == dims.height
    }

    /// Source directory scanned for this sheet's images and descriptors,
    /// e.g. `pngs_tiles_32x32` for `tiles.png` at 32x32.
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        let stem = self.name.strip_suffix(".png").unwrap_or(&self.name);
        root.join(format!("pngs_{}_{}x{}", stem, self.sprite_width, self.sprite_height))
    }

    /// Path the composited atlas is written to.
    pub fn atlas_path(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }
}

/// Everything produced by one sheet's build pass. The index range is
/// fixed once the pass completes.
#[derive(Debug)]
pub struct SheetBuild {
    pub config: SheetConfig,
    /// First index this sheet could claim (registry state before the scan).
    pub first_index: u32,
    /// Exclusive upper bound of indices this sheet touched.
    pub max_index: u32,
    /// Raw descriptors found under the sheet's source directory.
    pub tile_entries: Vec<TileEntry>,
}

/// Scan one sheet's source directory, register its sprites, and write its
/// composited atlas.
///
/// Image files register their stem as a sprite name and join the current
/// row; descriptor files are parsed and collected. Names already
/// registered are skipped: silently for filler sheets, as a non-fatal
/// duplicate error for ordinary sheets.
pub fn build_sheet(
    config: &SheetConfig,
    root: &Path,
    registry: &mut SpriteRegistry,
    diag: &mut Diagnostics,
) -> Result<SheetBuild, ComposeError> {
    let source_dir = config.source_dir(root);
    if !source_dir.is_dir() {
        return Err(ComposeError::MissingDirectory(source_dir));
    }

    let first_index = registry.next_index();
    let mut tile_entries = Vec::new();
    let mut row: Vec<PathBuf> = Vec::new();
    let mut cells: Vec<RgbaImage> = Vec::new();

    for path in scan_sources(&source_dir, diag)? {
        match path.extension().and_then(|e| e.to_str()) {
            Some("png") => {
                let Some(sprite_name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if sprite_name == NO_ENTRY {
                    continue;
                }
                if registry.lookup(sprite_name).is_some() {
                    if !config.is_filler {
                        diag.error(format!(
                            "duplicate sprite name '{}' at {}; skipping",
                            sprite_name,
                            path.display()
                        ));
                    }
                    continue;
                }
                registry.register(sprite_name);
                row.push(path);
                if row.len() == ROW_WIDTH as usize {
                    flush_row(&row, config, &mut cells, diag)?;
                    row.clear();
                }
            }
            Some("json") => {
                tile_entries.extend(parser::load_tile_entries(&path)?);
            }
            _ => {}
        }
    }
    if !row.is_empty() {
        flush_row(&row, config, &mut cells, diag)?;
    }

    if !cells.is_empty() {
        let atlas = codec::arrange_grid(&cells, ROW_WIDTH);
        output::save_png(&atlas, &config.atlas_path(root))?;
    }

    Ok(SheetBuild {
        config: config.clone(),
        first_index,
        max_index: registry.next_index(),
        tile_entries,
    })
}

/// All files under the sheet directory, recursively, in sorted path
/// order. Sorting makes index assignment deterministic across platforms.
fn scan_sources(dir: &Path, diag: &mut Diagnostics) -> Result<Vec<PathBuf>, ComposeError> {
    let pattern = format!("{}/**/*", dir.display());
    let entries = glob::glob(&pattern)
        .map_err(|source| ComposeError::ScanPattern { pattern: pattern.clone(), source })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => diag.warning(format!("error reading path: {}", e)),
        }
    }
    files.sort();
    Ok(files)
}

/// Decode one row of sprites, check their dimensions, and pad the row to
/// its full width with null images.
fn flush_row(
    row: &[PathBuf],
    config: &SheetConfig,
    cells: &mut Vec<RgbaImage>,
    diag: &mut Diagnostics,
) -> Result<(), ComposeError> {
    let sprites = codec::load_row(row)?;
    for (path, sprite) in row.iter().zip(&sprites) {
        let (width, height) = sprite.dimensions();
        if width != config.sprite_width || height != config.sprite_height {
            diag.error(format!(
                "{} is {}x{}, sheet sprites are {}x{}; sprites in the {} tilesheet may be misaligned",
                path.display(),
                width,
                height,
                config.sprite_width,
                config.sprite_height,
                config.name
            ));
        }
    }
    cells.extend(sprites);

    let null = codec::null_sprite(config.sprite_width, config.sprite_height);
    for _ in row.len()..ROW_WIDTH as usize {
        cells.push(null.clone());
    }
    Ok(())
}
