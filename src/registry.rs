//! Global sprite name to atlas index registry.
//!
//! One registry instance is the single source of truth for index
//! allocation across every tilesheet in a run. Index 0 is reserved for the
//! null image used to pad partial rows; it is bound at construction and
//! never reassigned.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Reserved sprite name bound to index 0.
pub const NULL_IMAGE: &str = "null_image";

/// Sentinel sprite name that is never registered and never resolved.
pub const NO_ENTRY: &str = "no_entry";

/// Bijective mapping between sprite names and numeric atlas indices.
#[derive(Debug)]
pub struct SpriteRegistry {
    name_to_index: HashMap<String, u32>,
    /// Inverse mapping, ordered by index for diagnostics.
    index_to_name: BTreeMap<u32, String>,
    next_index: u32,
    /// Names actually consumed by a resolved tile entry.
    referenced: HashSet<String>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        let mut name_to_index = HashMap::new();
        let mut index_to_name = BTreeMap::new();
        name_to_index.insert(NULL_IMAGE.to_string(), 0);
        index_to_name.insert(0, NULL_IMAGE.to_string());
        Self { name_to_index, index_to_name, next_index: 1, referenced: HashSet::new() }
    }

    /// Register a sprite name, returning its index.
    ///
    /// Registering a known name returns its existing index unchanged; a
    /// new name is bound to the next free index. The reserved null name is
    /// bound at construction and must not be passed here.
    pub fn register(&mut self, name: &str) -> u32 {
        debug_assert_ne!(name, NULL_IMAGE);
        if let Some(&index) = self.name_to_index.get(name) {
            return index;
        }
        let index = self.next_index;
        self.name_to_index.insert(name.to_string(), index);
        self.index_to_name.insert(index, name.to_string());
        self.next_index += 1;
        index
    }

    /// Look up a registered name. Pure read; does not mark the name
    /// referenced.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.name_to_index.get(name).copied()
    }

    /// Record that a name was consumed by a resolved tile entry.
    pub fn mark_referenced(&mut self, name: &str) {
        self.referenced.insert(name.to_string());
    }

    /// The index the next registration will receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Every registered, non-reserved name never marked referenced, in
    /// index order.
    pub fn unreferenced(&self) -> Vec<(&str, u32)> {
        self.index_to_name
            .iter()
            .filter(|(&index, name)| index != 0 && !self.referenced.contains(name.as_str()))
            .map(|(&index, name)| (name.as_str(), index))
            .collect()
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
