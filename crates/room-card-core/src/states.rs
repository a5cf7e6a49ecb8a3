//! Immutable per-evaluation snapshot of entity states

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::EntityState;

/// A snapshot of every entity state known to the host
///
/// Records are shared behind `Arc` so a snapshot can be cloned cheaply and
/// a tracker can keep a record alive after the host has moved on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct States {
    states: HashMap<String, Arc<EntityState>>,
}

impl States {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state record for an entity
    pub fn get(&self, entity_id: &str) -> Option<&Arc<EntityState>> {
        self.states.get(entity_id)
    }

    /// Get the state value as a string slice
    pub fn get_state(&self, entity_id: &str) -> Option<&str> {
        self.states.get(entity_id).map(|s| s.state.as_str())
    }

    /// Check if an entity is present
    pub fn contains(&self, entity_id: &str) -> bool {
        self.states.contains_key(entity_id)
    }

    /// Insert a record keyed by its own entity_id, returning the previous one
    pub fn insert(&mut self, state: EntityState) -> Option<Arc<EntityState>> {
        self.insert_shared(Arc::new(state))
    }

    /// Insert an already shared record
    pub fn insert_shared(&mut self, state: Arc<EntityState>) -> Option<Arc<EntityState>> {
        self.states.insert(state.entity_id.clone(), state)
    }

    /// Remove an entity's record
    pub fn remove(&mut self, entity_id: &str) -> Option<Arc<EntityState>> {
        self.states.remove(entity_id)
    }

    /// Iterate over all records
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<EntityState>)> {
        self.states.iter()
    }

    /// Get all entity IDs in a domain
    pub fn domain_entity_ids(&self, domain: &str) -> Vec<String> {
        let prefix = format!("{}.", domain);
        let mut ids: Vec<String> = self
            .states
            .keys()
            .filter(|id| id.starts_with(&prefix))
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Get the total number of entities
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the snapshot holds no entities
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<EntityState> for States {
    fn from_iter<I: IntoIterator<Item = EntityState>>(iter: I) -> Self {
        let mut states = States::new();
        for state in iter {
            states.insert(state);
        }
        states
    }
}

impl FromIterator<Arc<EntityState>> for States {
    fn from_iter<I: IntoIterator<Item = Arc<EntityState>>>(iter: I) -> Self {
        let mut states = States::new();
        for state in iter {
            states.insert_shared(state);
        }
        states
    }
}
