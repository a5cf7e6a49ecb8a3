//! Entity reference resolution
//!
//! Computes every entity identifier a configuration depends on. The result
//! feeds change detection, so anything that can affect what the card shows
//! belongs in it.

use indexmap::IndexSet;

use crate::card::RoomCardConfig;
use crate::discovery::card_entities;

/// Resolve the set of entity IDs referenced anywhere in the configuration
///
/// The union of:
/// - the primary `entity`
/// - every entity in `entities`, `info_entities` and row `entities`
/// - every entity bound by nested cards, recursively
/// - every explicit `entity` of icon and `hide_if` conditions on entity
///   descriptors, row `hide_if` rules and the header icon
///
/// Insertion order follows the configuration, but callers must treat the
/// result as a set. Absent sections contribute nothing.
pub fn resolve_tracked_entity_ids(config: &RoomCardConfig) -> IndexSet<String> {
    let mut ids = IndexSet::new();

    ids.extend(config.entity.iter().cloned());

    for entity in config.entity_refs() {
        ids.extend(entity.entity_id().map(String::from));
    }

    for card in config.cards.iter().flatten() {
        ids.extend(card_entities(card));
    }

    for entity in config.entity_refs().filter_map(|e| e.as_config()) {
        ids.extend(entity.condition_entities().map(String::from));
    }

    for row in config.rows.iter().flatten() {
        if let Some(hide_if) = &row.hide_if {
            ids.extend(hide_if.condition_entities().map(String::from));
        }
    }

    if let Some(icon) = &config.icon {
        ids.extend(icon.conditions().iter().filter_map(|c| c.entity.clone()));
    }

    ids
}
