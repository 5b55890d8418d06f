//! Data models for tileset configuration, tile descriptors, and the
//! output document.
//!
//! Descriptor fields that can be either a scalar or a list (`id`, `fg`,
//! `bg`) are modelled as untagged enums. Fields this tool does not
//! interpret (`rotates`, `multitile`, variant weights, ...) are carried
//! through untouched via flattened maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Global sprite dimensions from the first `tile_info.json` element.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TilesetDims {
    #[serde(default = "default_dim")]
    pub width: u32,
    #[serde(default = "default_dim")]
    pub height: u32,
}

fn default_dim() -> u32 {
    16
}

/// Per-sheet configuration from a `tile_info.json` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetSpec {
    pub sprite_width: Option<u32>,
    pub sprite_height: Option<u32>,
    #[serde(default)]
    pub sprite_offset_x: i32,
    #[serde(default)]
    pub sprite_offset_y: i32,
    /// Filler sheets only supply sprites for names no ordinary sheet
    /// registered.
    #[serde(default)]
    pub filler: bool,
}

/// A sprite name or a list of alias names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameOrList {
    Single(String),
    Many(Vec<String>),
}

impl NameOrList {
    /// View the value as a slice of names.
    pub fn names(&self) -> &[String] {
        match self {
            NameOrList::Single(name) => std::slice::from_ref(name),
            NameOrList::Many(names) => names,
        }
    }
}

/// A foreground/background reference: one sprite name, or a list of
/// plain-name and weighted-variant alternatives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpriteRef {
    Name(String),
    Variants(Vec<SpriteVariant>),
}

/// One element of a reference list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpriteVariant {
    Name(String),
    Weighted(WeightedSprite),
}

/// A weighted random variant, e.g. `{"weight": 8, "sprite": "grass1"}`.
/// Every field other than `sprite` passes through to the output untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedSprite {
    pub sprite: NameOrList,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A raw tile descriptor as found in per-sprite JSON files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileEntry {
    pub id: NameOrList,
    #[serde(default)]
    pub fg: Option<SpriteRef>,
    #[serde(default)]
    pub bg: Option<SpriteRef>,
    /// Nested alternate-tile descriptors sharing this shape.
    #[serde(default)]
    pub additional_tiles: Vec<TileEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resolved reference with sprite names replaced by atlas indices.
///
/// A reference list with exactly one surviving element collapses to that
/// bare element rather than a singleton list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedRef {
    Index(u32),
    Weighted(ResolvedWeighted),
    Variants(Vec<ResolvedVariant>),
}

/// One surviving element of a resolved reference list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedVariant {
    Index(u32),
    Weighted(ResolvedWeighted),
}

/// A weighted variant whose sprite value has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWeighted {
    pub sprite: IndexOrList,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A bare index, or the surviving members of a multi-sprite value.
/// List shape is preserved here; only whole reference lists collapse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndexOrList {
    Index(u32),
    Many(Vec<u32>),
}

/// A tile descriptor with every reference rewritten to numeric form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    pub id: NameOrList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<ResolvedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<ResolvedRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_tiles: Vec<ResolvedEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One tilesheet record in the output document.
#[derive(Debug, Clone, Serialize)]
pub struct SheetRecord {
    pub file: String,
    pub tiles: Vec<ResolvedEntry>,
    /// Human-readable index range, e.g. `"range 1 to 464"`.
    #[serde(rename = "//")]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_offset_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_offset_y: Option<i32>,
}

/// The `mod_tileset.json` top-level object.
#[derive(Debug, Clone, Serialize)]
pub struct ModTileset {
    #[serde(rename = "type")]
    pub kind: String,
    pub compatibility: Vec<String>,
    #[serde(rename = "tiles-new")]
    pub tiles_new: Vec<SheetRecord>,
}
