//! State record representing one entity's current value

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{STATE_ON, UNAVAILABLE_STATES};

/// Represents the state of an entity at a point in time
///
/// The host platform replaces the whole record whenever the entity is
/// written, so a record is never mutated once it is part of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity this state belongs to
    pub entity_id: String,

    /// The state value (e.g., "on", "off", "23.5", "unavailable")
    pub state: String,

    /// Additional attributes associated with the state
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// When the state value last changed
    pub last_changed: DateTime<Utc>,

    /// When the state was last written (even if the value didn't change)
    pub last_updated: DateTime<Utc>,
}

impl EntityState {
    /// Create a new state stamped with the current time
    pub fn new(
        entity_id: impl Into<String>,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes,
            last_changed: now,
            last_updated: now,
        }
    }

    /// Replace both timestamps
    pub fn with_timestamps(mut self, last_changed: DateTime<Utc>, last_updated: DateTime<Utc>) -> Self {
        self.last_changed = last_changed;
        self.last_updated = last_updated;
        self
    }

    /// Create the record written at `at`, preserving `last_changed` if the value is the same
    pub fn with_update(
        &self,
        new_state: impl Into<String>,
        new_attributes: HashMap<String, serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Self {
        let new_state = new_state.into();
        let state_changed = self.state != new_state;

        Self {
            entity_id: self.entity_id.clone(),
            state: new_state,
            attributes: new_attributes,
            last_changed: if state_changed { at } else { self.last_changed },
            last_updated: at,
        }
    }

    /// Check if the state value is one of the unavailable sentinels
    pub fn is_unavailable(&self) -> bool {
        UNAVAILABLE_STATES.contains(&self.state.as_str())
    }

    /// Check if the entity is switched on
    pub fn is_on(&self) -> bool {
        self.state == STATE_ON
    }

    /// Get a raw attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Check whether this record was written after `other`
    ///
    /// Either timestamp moving forward counts as an advance.
    pub fn advanced_since(&self, other: &EntityState) -> bool {
        self.last_updated > other.last_updated || self.last_changed > other.last_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_unavailable_sentinels() {
        let unavailable = EntityState::new("light.porch", "unavailable", HashMap::new());
        let unknown = EntityState::new("light.porch", "unknown", HashMap::new());
        let on = EntityState::new("light.porch", "on", HashMap::new());
        let numeric = EntityState::new("sensor.temperature", "21.5", HashMap::new());

        assert!(unavailable.is_unavailable());
        assert!(unknown.is_unavailable());
        assert!(!on.is_unavailable());
        assert!(!numeric.is_unavailable());
        assert!(on.is_on());
    }

    #[test]
    fn test_with_update_preserves_last_changed() {
        let state = EntityState::new("sensor.temperature", "21.5", HashMap::new())
            .with_timestamps(at(0), at(0));

        let same = state.with_update("21.5", HashMap::new(), at(10));
        assert_eq!(same.last_changed, at(0));
        assert_eq!(same.last_updated, at(10));
        assert!(same.advanced_since(&state));

        let changed = state.with_update("22.0", HashMap::new(), at(20));
        assert_eq!(changed.last_changed, at(20));
        assert!(!state.advanced_since(&changed));
    }

    #[test]
    fn test_deserialize_host_format() {
        let state: EntityState = serde_json::from_value(json!({
            "entity_id": "sensor.humidity",
            "state": "65",
            "attributes": {"unit_of_measurement": "%"},
            "last_changed": "2024-01-01T10:00:00+00:00",
            "last_updated": "2024-01-01T10:05:00+00:00",
            "context": {"id": "01HQ", "parent_id": null, "user_id": null}
        }))
        .unwrap();

        assert_eq!(state.state, "65");
        assert_eq!(state.attribute("unit_of_measurement"), Some(&json!("%")));
        assert!(state.last_updated > state.last_changed);
    }
}
