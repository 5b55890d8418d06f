//! The full composition pipeline.
//!
//! Processes every ordinary tilesheet, then every filler tilesheet, so a
//! filler sheet's skip checks always see the complete set of ordinary
//! registrations. Resolution runs after all sheets, against the final
//! registry, and the run ends with the config document and an audit of
//! unreferenced sprites.

use crate::codec::CodecError;
use crate::models::{ModTileset, ResolvedEntry, SheetRecord};
use crate::output::{self, OutputError};
use crate::parser::{self, ParseError, TilesetInfo};
use crate::registry::SpriteRegistry;
use crate::report::Diagnostics;
use crate::resolve::EntryResolver;
use crate::tilesheet::{self, SheetBuild, SheetConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File describing the tileset: global dimensions plus sheet configs.
pub const TILE_INFO: &str = "tile_info.json";

/// Name of the configuration document written to the tileset root.
pub const OUTPUT_CONFIG: &str = "mod_tileset.json";

/// Tileset ids the produced document declares compatibility with.
const COMPATIBILITY: [&str; 5] = [
    "UNDEAD_PEOPLE_BASE",
    "UNDEAD_PEOPLE",
    "MshockXottoplus",
    "UNDEAD_PEOPLE_LIGHT",
    "MSX++DEAD_PEOPLE",
];

/// Fatal error that aborts a composition run.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("cannot find directory {0}")]
    MissingDirectory(PathBuf),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("invalid scan pattern '{pattern}': {source}")]
    ScanPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Compose a tileset directory into packed tilesheets plus
/// `mod_tileset.json`.
///
/// Non-fatal problems are reported through `diag` and never stop the
/// run; the caller decides the exit code from `diag.failed()`.
pub fn compose_tileset(root: &Path, diag: &mut Diagnostics) -> Result<(), ComposeError> {
    if !root.is_dir() {
        return Err(ComposeError::MissingDirectory(root.to_path_buf()));
    }
    let info = parser::load_tileset_info(&root.join(TILE_INFO))?;
    let mut registry = SpriteRegistry::new();

    let configs: Vec<SheetConfig> = info
        .sheets
        .iter()
        .map(|(name, spec)| SheetConfig::from_spec(name, spec, &info.dims))
        .filter(|config| !config.is_fallback())
        .collect();

    // Ordinary sheets claim their indices first; filler sheets may only
    // supply names nothing else registered.
    let mut builds: Vec<SheetBuild> = Vec::new();
    for config in configs.iter().filter(|c| !c.is_filler) {
        diag.info(format!("parsing tilesheet {}", config.name));
        builds.push(tilesheet::build_sheet(config, root, &mut registry, diag)?);
    }
    for config in configs.iter().filter(|c| c.is_filler) {
        diag.info(format!("parsing filler tilesheet {}", config.name));
        builds.push(tilesheet::build_sheet(config, root, &mut registry, diag)?);
    }

    let mut resolver = EntryResolver::new(&mut registry, diag);
    let mut records: Vec<SheetRecord> = Vec::new();
    for build in &builds {
        let tiles: Vec<ResolvedEntry> = build
            .tile_entries
            .iter()
            .filter_map(|entry| resolver.resolve_entry(entry, "", build.config.is_filler))
            .collect();
        records.push(sheet_record(build, tiles, &info));
    }

    let document = vec![ModTileset {
        kind: "mod_tileset".to_string(),
        compatibility: COMPATIBILITY.iter().map(|s| s.to_string()).collect(),
        tiles_new: records,
    }];
    output::write_json(&document, &root.join(OUTPUT_CONFIG))?;

    // Final audit: every real sprite should be consumed by some entry.
    for (name, index) in registry.unreferenced() {
        diag.warning(format!(
            "image '{}' (index {}) was not referenced by any tile entry",
            name, index
        ));
    }
    Ok(())
}

/// Build one output record for a finished sheet. Standard sheets omit
/// their dimension and offset fields.
fn sheet_record(build: &SheetBuild, tiles: Vec<ResolvedEntry>, info: &TilesetInfo) -> SheetRecord {
    let config = &build.config;
    let standard = config.is_standard(&info.dims);
    SheetRecord {
        file: config.name.clone(),
        tiles,
        comment: format!("range {} to {}", build.first_index, build.max_index),
        sprite_width: (!standard).then_some(config.sprite_width),
        sprite_height: (!standard).then_some(config.sprite_height),
        sprite_offset_x: (!standard).then_some(config.offset_x),
        sprite_offset_y: (!standard).then_some(config.offset_y),
    }
}
