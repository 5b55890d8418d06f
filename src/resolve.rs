//! Tile descriptor resolution.
//!
//! Rewrites the symbolic sprite references of raw tile descriptors into
//! numeric atlas indices, depth-first through nested alternate tiles, and
//! decides which descriptors are kept.

use crate::models::{
    IndexOrList, NameOrList, ResolvedEntry, ResolvedRef, ResolvedVariant, ResolvedWeighted,
    SpriteRef, SpriteVariant, TileEntry, WeightedSprite,
};
use crate::registry::{SpriteRegistry, NO_ENTRY};
use crate::report::Diagnostics;
use std::collections::HashSet;

/// Rewrites raw tile descriptors against a finalized registry.
///
/// One resolver spans every sheet of a run: the produced-id set it
/// carries across sheets is what lets filler descriptors yield to the
/// ordinary descriptors processed before them.
pub struct EntryResolver<'a> {
    registry: &'a mut SpriteRegistry,
    diag: &'a mut Diagnostics,
    produced_ids: HashSet<String>,
}

impl<'a> EntryResolver<'a> {
    pub fn new(registry: &'a mut SpriteRegistry, diag: &'a mut Diagnostics) -> Self {
        Self { registry, diag, produced_ids: HashSet::new() }
    }

    /// Resolve one descriptor.
    ///
    /// Returns `None` when the descriptor is dropped: a filler descriptor
    /// whose effective id was already produced, or any descriptor with no
    /// resolvable foreground or background.
    pub fn resolve_entry(
        &mut self,
        entry: &TileEntry,
        prefix: &str,
        is_filler: bool,
    ) -> Option<ResolvedEntry> {
        let ids = entry.id.names();
        // Nested alternates are namespaced under the first id.
        let id_prefix = format!("{}_", ids.first().map(String::as_str).unwrap_or_default());

        if is_filler {
            for id in ids {
                let full_id = format!("{}{}", prefix, id);
                if self.produced_ids.contains(&full_id) {
                    self.diag.info(format!("skipping filler for {}", full_id));
                    return None;
                }
            }
        }

        let fg = entry.fg.as_ref().and_then(|r| self.resolve_ref(r));
        let bg = entry.bg.as_ref().and_then(|r| self.resolve_ref(r));

        let additional_tiles = entry
            .additional_tiles
            .iter()
            .filter_map(|tile| self.resolve_entry(tile, &id_prefix, is_filler))
            .collect();

        if fg.is_none() && bg.is_none() {
            return None;
        }

        for id in ids {
            self.produced_ids.insert(format!("{}{}", prefix, id));
        }

        Some(ResolvedEntry {
            id: entry.id.clone(),
            fg,
            bg,
            additional_tiles,
            extra: entry.extra.clone(),
        })
    }

    /// Resolve a single reference or reference list, collapsing the
    /// result: nothing resolved is absent, one survivor is the bare
    /// survivor, otherwise the surviving list.
    fn resolve_ref(&mut self, reference: &SpriteRef) -> Option<ResolvedRef> {
        match reference {
            SpriteRef::Name(name) => self.resolve_name(name).map(ResolvedRef::Index),
            SpriteRef::Variants(variants) => {
                let mut resolved: Vec<ResolvedVariant> = Vec::new();
                for variant in variants {
                    match variant {
                        SpriteVariant::Name(name) => {
                            if let Some(index) = self.resolve_name(name) {
                                resolved.push(ResolvedVariant::Index(index));
                            }
                        }
                        SpriteVariant::Weighted(weighted) => {
                            if let Some(weighted) = self.resolve_weighted(weighted) {
                                resolved.push(ResolvedVariant::Weighted(weighted));
                            }
                        }
                    }
                }
                match resolved.len() {
                    0 => None,
                    1 => Some(match resolved.remove(0) {
                        ResolvedVariant::Index(index) => ResolvedRef::Index(index),
                        ResolvedVariant::Weighted(weighted) => ResolvedRef::Weighted(weighted),
                    }),
                    _ => Some(ResolvedRef::Variants(resolved)),
                }
            }
        }
    }

    /// Resolve a weighted variant's sprite value. A scalar becomes a bare
    /// index; a list keeps its list shape with unresolved members
    /// dropped. The variant is dropped when nothing inside it resolves.
    fn resolve_weighted(&mut self, weighted: &WeightedSprite) -> Option<ResolvedWeighted> {
        let sprite = match &weighted.sprite {
            NameOrList::Single(name) => IndexOrList::Index(self.resolve_name(name)?),
            NameOrList::Many(names) => {
                let indices: Vec<u32> =
                    names.iter().filter_map(|name| self.resolve_name(name)).collect();
                if indices.is_empty() {
                    return None;
                }
                IndexOrList::Many(indices)
            }
        };
        Some(ResolvedWeighted { sprite, extra: weighted.extra.clone() })
    }

    /// Resolve one sprite name to its atlas index.
    ///
    /// Empty and sentinel names are dropped silently. A name that is not
    /// registered, or that names the reserved null image, is a non-fatal
    /// error and resolves to absent.
    fn resolve_name(&mut self, name: &str) -> Option<u32> {
        if name.is_empty() || name == NO_ENTRY {
            return None;
        }
        match self.registry.lookup(name) {
            Some(index) if index != 0 => {
                self.registry.mark_referenced(name);
                Some(index)
            }
            _ => {
                self.diag.error(format!(
                    "sprite id '{}' has no matching image file; it will not be added to mod_tileset.json",
                    name
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> SpriteRegistry {
        let mut registry = SpriteRegistry::new();
        for name in names {
            registry.register(name);
        }
        registry
    }

    fn entry(json: &str) -> TileEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_scalar_references_resolve_to_indices() {
        let mut registry = registry_with(&["grass", "dirt"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(&entry(r#"{"id": "t_grass", "fg": "grass", "bg": "dirt"}"#), "", false)
            .unwrap();

        assert_eq!(resolved.fg, Some(ResolvedRef::Index(1)));
        assert_eq!(resolved.bg, Some(ResolvedRef::Index(2)));
        assert!(!diag.failed());
    }

    #[test]
    fn test_unresolved_reference_is_nonfatal_error() {
        let mut registry = registry_with(&["grass"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(&entry(r#"{"id": "t_x", "fg": "grass", "bg": "missing"}"#), "", false)
            .unwrap();

        assert_eq!(resolved.fg, Some(ResolvedRef::Index(1)));
        assert_eq!(resolved.bg, None);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_entry_with_nothing_resolvable_is_dropped() {
        let mut registry = registry_with(&[]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved =
            resolver.resolve_entry(&entry(r#"{"id": "t_x", "fg": "gone", "bg": "gone2"}"#), "", false);
        assert!(resolved.is_none());
        assert_eq!(diag.error_count(), 2);
    }

    #[test]
    fn test_entry_without_references_is_dropped_silently() {
        let mut registry = registry_with(&[]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        assert!(resolver.resolve_entry(&entry(r#"{"id": "t_x"}"#), "", false).is_none());
        assert_eq!(diag.error_count(), 0);
    }

    #[test]
    fn test_list_with_one_survivor_collapses_to_bare_index() {
        let mut registry = registry_with(&["b"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(&entry(r#"{"id": "t_x", "fg": ["a", "b", "c"]}"#), "", false)
            .unwrap();

        assert_eq!(resolved.fg, Some(ResolvedRef::Index(1)));
        assert_eq!(diag.error_count(), 2);
    }

    #[test]
    fn test_list_with_multiple_survivors_stays_a_list() {
        let mut registry = registry_with(&["a", "b"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(&entry(r#"{"id": "t_x", "fg": ["a", "b"]}"#), "", false)
            .unwrap();

        assert_eq!(
            resolved.fg,
            Some(ResolvedRef::Variants(vec![
                ResolvedVariant::Index(1),
                ResolvedVariant::Index(2),
            ]))
        );
    }

    #[test]
    fn test_weighted_variant_resolves_and_keeps_weight() {
        let mut registry = registry_with(&["grass1"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(
                &entry(
                    r#"{"id": "t_x", "fg": [
                        {"weight": 8, "sprite": "grass1"},
                        {"weight": 2, "sprite": "gone"}
                    ]}"#,
                ),
                "",
                false,
            )
            .unwrap();

        let Some(ResolvedRef::Weighted(weighted)) = resolved.fg else {
            panic!("expected collapse to the surviving weighted variant");
        };
        assert_eq!(weighted.sprite, IndexOrList::Index(1));
        assert_eq!(weighted.extra["weight"], 8);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_weighted_sprite_list_keeps_list_shape() {
        let mut registry = registry_with(&["a"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(
                &entry(r#"{"id": "t_x", "fg": [{"sprite": ["a", "gone"]}, "a"]}"#),
                "",
                false,
            )
            .unwrap();

        let Some(ResolvedRef::Variants(variants)) = resolved.fg else {
            panic!("expected both variants to survive");
        };
        assert_eq!(
            variants[0],
            ResolvedVariant::Weighted(ResolvedWeighted {
                sprite: IndexOrList::Many(vec![1]),
                extra: serde_json::Map::new(),
            })
        );
        assert_eq!(variants[1], ResolvedVariant::Index(1));
    }

    #[test]
    fn test_sentinel_and_empty_names_resolve_silently_to_absent() {
        let mut registry = registry_with(&["a"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(&entry(r#"{"id": "t_x", "fg": ["no_entry", "", "a"]}"#), "", false)
            .unwrap();

        assert_eq!(resolved.fg, Some(ResolvedRef::Index(1)));
        assert_eq!(diag.error_count(), 0);
    }

    #[test]
    fn test_null_image_reference_is_an_error() {
        let mut registry = registry_with(&["a"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved =
            resolver.resolve_entry(&entry(r#"{"id": "t_x", "fg": "null_image"}"#), "", false);
        assert!(resolved.is_none());
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_resolution_marks_names_referenced() {
        let mut registry = registry_with(&["grass", "dirt"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);
        resolver.resolve_entry(&entry(r#"{"id": "t_grass", "fg": "grass"}"#), "", false);

        assert_eq!(registry.unreferenced(), vec![("dirt", 2)]);
    }

    #[test]
    fn test_nested_alternates_resolve_under_id_prefix() {
        let mut registry = registry_with(&["closed", "open"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(
                &entry(
                    r#"{
                        "id": "t_door",
                        "fg": "closed",
                        "additional_tiles": [{"id": "open", "fg": "open"}]
                    }"#,
                ),
                "",
                false,
            )
            .unwrap();
        assert_eq!(resolved.additional_tiles.len(), 1);

        // A filler alternate with the same effective id now yields.
        let filler = resolver.resolve_entry(
            &entry(
                r#"{
                    "id": "t_door",
                    "fg": "closed",
                    "additional_tiles": [{"id": "open", "fg": "open"}]
                }"#,
            ),
            "",
            true,
        );
        assert!(filler.is_none());
    }

    #[test]
    fn test_unresolvable_nested_alternates_are_pruned() {
        let mut registry = registry_with(&["closed"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(
                &entry(
                    r#"{
                        "id": "t_door",
                        "fg": "closed",
                        "additional_tiles": [{"id": "open", "fg": "gone"}]
                    }"#,
                ),
                "",
                false,
            )
            .unwrap();

        assert!(resolved.additional_tiles.is_empty());
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_filler_entry_skipped_when_any_alias_was_produced() {
        let mut registry = registry_with(&["grass", "moss"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        resolver.resolve_entry(&entry(r#"{"id": "t_grass", "fg": "grass"}"#), "", false);

        let filler = resolver.resolve_entry(
            &entry(r#"{"id": ["t_moss", "t_grass"], "fg": "moss"}"#),
            "",
            true,
        );
        assert!(filler.is_none());

        // A filler id nothing produced still goes through.
        let fresh =
            resolver.resolve_entry(&entry(r#"{"id": "t_moss", "fg": "moss"}"#), "", true);
        assert!(fresh.is_some());
    }

    #[test]
    fn test_extra_fields_survive_resolution() {
        let mut registry = registry_with(&["wall"]);
        let mut diag = Diagnostics::new();
        let mut resolver = EntryResolver::new(&mut registry, &mut diag);

        let resolved = resolver
            .resolve_entry(
                &entry(r#"{"id": "t_wall", "fg": "wall", "rotates": true, "multitile": true}"#),
                "",
                false,
            )
            .unwrap();

        assert_eq!(resolved.extra["rotates"], true);
        assert_eq!(resolved.extra["multitile"], true);
    }
}
