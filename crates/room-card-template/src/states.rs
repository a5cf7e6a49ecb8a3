//! Entity states exposed to templates
//!
//! Templates see the snapshot handed to the card for the current evaluation:
//! - `states('light.hall')` - the state value as a string
//! - `states['light.hall']` - the full state object
//! - `states.light.hall` - the same, through a domain proxy
//! - `states.light` (called) - every state in a domain

use std::sync::Arc;

use minijinja::value::{Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind, State};
use room_card_core::{EntityState, States};

/// The `states` object of the template context
#[derive(Debug, Clone)]
pub struct StatesObject {
    states: Arc<States>,
}

impl StatesObject {
    pub fn new(states: Arc<States>) -> Self {
        Self { states }
    }

    /// Get the state value as a string
    pub fn get_state(&self, entity_id: &str) -> Option<&str> {
        self.states.get_state(entity_id)
    }

    /// Check if an entity is in a state, or in any of a list of states
    pub fn is_state(&self, entity_id: &str, expected: &Value) -> bool {
        let Some(current) = self.get_state(entity_id) else {
            return false;
        };

        // Strings are iterable, so test them first
        if let Some(s) = expected.as_str() {
            return s == current;
        }
        match expected.try_iter() {
            Ok(mut iter) => iter.any(|v| v.as_str() == Some(current)),
            Err(_) => false,
        }
    }

    /// Get an attribute value, undefined when missing
    pub fn state_attr(&self, entity_id: &str, attribute: &str) -> Value {
        self.states
            .get(entity_id)
            .and_then(|s| s.attribute(attribute))
            .map(Value::from_serialize)
            .unwrap_or(Value::UNDEFINED)
    }

    /// Check if an entity exists and is neither unavailable nor unknown
    pub fn has_value(&self, entity_id: &str) -> bool {
        self.states
            .get(entity_id)
            .map(|s| !s.is_unavailable())
            .unwrap_or(false)
    }

    /// Find the `states` object of a running template
    pub fn from_state(state: &State) -> Result<Arc<StatesObject>, Error> {
        state
            .lookup("states")
            .and_then(|v| v.downcast_object::<StatesObject>())
            .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "states are not available"))
    }
}

impl Object for StatesObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let key = key.as_str()?;

        if key.contains('.') {
            return self.states.get(key).cloned().map(state_to_value);
        }

        Some(Value::from_object(DomainProxy {
            domain: key.to_string(),
            states: self.states.clone(),
        }))
    }

    fn call(self: &Arc<Self>, _state: &State, args: &[Value]) -> Result<Value, Error> {
        let entity_id = args.first().and_then(|v| v.as_str()).ok_or_else(|| {
            Error::new(ErrorKind::InvalidOperation, "states() requires entity_id")
        })?;

        Ok(self
            .get_state(entity_id)
            .map(Value::from)
            .unwrap_or(Value::UNDEFINED))
    }
}

/// `states.<domain>` lookups
#[derive(Debug, Clone)]
struct DomainProxy {
    domain: String,
    states: Arc<States>,
}

impl Object for DomainProxy {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let entity_id = format!("{}.{}", self.domain, key.as_str()?);
        self.states.get(&entity_id).cloned().map(state_to_value)
    }

    fn call(self: &Arc<Self>, _state: &State, _args: &[Value]) -> Result<Value, Error> {
        let entities: Vec<Value> = self
            .states
            .domain_entity_ids(&self.domain)
            .iter()
            .filter_map(|id| self.states.get(id).cloned())
            .map(state_to_value)
            .collect();

        Ok(Value::from(entities))
    }
}

/// Expose a shared state record to templates
pub fn state_to_value(state: Arc<EntityState>) -> Value {
    Value::from_object(StateWrapper(state))
}

/// Template view of one entity state
#[derive(Debug, Clone)]
pub struct StateWrapper(pub Arc<EntityState>);

impl std::fmt::Display for StateWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.state)
    }
}

impl Object for StateWrapper {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let state = &self.0;
        let (domain, object_id) = state
            .entity_id
            .split_once('.')
            .unwrap_or(("", state.entity_id.as_str()));

        match key.as_str()? {
            "state" => Some(Value::from(state.state.as_str())),
            "entity_id" => Some(Value::from(state.entity_id.as_str())),
            "domain" => Some(Value::from(domain)),
            "object_id" => Some(Value::from(object_id)),
            "name" => Some(
                state
                    .attribute("friendly_name")
                    .and_then(|v| v.as_str())
                    .map(Value::from)
                    .unwrap_or_else(|| Value::from(object_id)),
            ),
            "last_changed" => Some(Value::from(state.last_changed.to_rfc3339())),
            "last_updated" => Some(Value::from(state.last_updated.to_rfc3339())),
            "attributes" => Some(Value::from_serialize(&state.attributes)),
            other => state.attribute(other).map(Value::from_serialize),
        }
    }
}
