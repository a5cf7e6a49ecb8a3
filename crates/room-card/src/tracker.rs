//! Change detection for tracked entities
//!
//! The host pushes a complete state snapshot on every change anywhere in
//! the home. The card only cares about the entities its configuration
//! references, so each push is reduced to "did any of mine move" before
//! anything is re-evaluated.

use std::collections::HashMap;
use std::sync::Arc;

use room_card_core::{EntityState, States};
use tracing::{debug, trace};

/// The tracked entity records last observed to have changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    states: HashMap<String, Arc<EntityState>>,
}

impl Snapshot {
    pub fn get(&self, entity_id: &str) -> Option<&Arc<EntityState>> {
        self.states.get(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.states.contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<Arc<EntityState>> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Arc<EntityState>>>(iter: I) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|s| (s.entity_id.clone(), s))
                .collect(),
        }
    }
}

/// Compute the replacement snapshot, if anything tracked changed
///
/// Without a previous snapshot every tracked entity present in `states` is
/// taken. Otherwise an entity is taken when it is new to the snapshot or
/// either of its timestamps moved forward. Entities missing from `states`
/// are ignored.
///
/// When something changed the returned snapshot holds exactly the entities
/// taken on this pass; it replaces the previous one rather than merging
/// into it. `None` means nothing changed and the previous snapshot stands.
pub fn advance(
    previous: Option<&Snapshot>,
    states: &States,
    tracked: &[String],
) -> Option<Snapshot> {
    let mut next = Snapshot::default();
    let mut changed = false;

    for entity_id in tracked {
        let Some(current) = states.get(entity_id) else {
            continue;
        };

        let before = previous.and_then(|p| p.get(entity_id));
        let include = match (previous, before) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(_), Some(before)) => current.advanced_since(before),
        };
        if !include {
            continue;
        }

        let differs = before.map_or(true, |before| **before != **current);
        trace!(entity_id = %entity_id, differs, "Tracked entity taken");
        changed |= differs;
        next.states.insert(entity_id.clone(), current.clone());
    }

    if !changed {
        return None;
    }
    debug!(count = next.len(), "Tracked entities changed");
    Some(next)
}

/// Owner of the current snapshot
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    snapshot: Option<Snapshot>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new state snapshot, returning whether anything tracked changed
    pub fn update(&mut self, states: &States, tracked: &[String]) -> bool {
        match advance(self.snapshot.as_ref(), states, tracked) {
            Some(next) => {
                self.snapshot = Some(next);
                true
            }
            None => false,
        }
    }

    /// Forget everything; called when the configuration is (re)loaded
    pub fn reset(&mut self) {
        self.snapshot = None;
    }

    /// The current snapshot, once anything tracked has been observed
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }
}
