//! Visibility rules
//!
//! Entities, rows and nested cards can each be hidden by a `hide_if` rule:
//! an OR-combined list of conditions. The subjects differ only in what a
//! condition observes when it does not name its own `entity`:
//!
//! | subject | implicit value                          |
//! |---------|-----------------------------------------|
//! | entity  | the entity's own state (or attribute)   |
//! | row     | none; such conditions never match       |
//! | card    | the card's bound `entity`, if any       |
//!
//! Missing state is never an error here: a condition that cannot read its
//! value simply does not match.

use room_card_config::{CardConfig, Condition, EntityConfig, HideIfConfig, RowConfig};
use room_card_core::{EntityState, States};
use serde_json::Value;
use tracing::{debug, trace};

use crate::condition::matches;
use crate::error::{RoomCardError, RoomCardResult};

/// Something a `hide_if` rule can hide
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Entity(&'a EntityConfig),
    Row(&'a RowConfig),
    Card(&'a CardConfig),
}

/// Decide whether a subject is hidden
///
/// Only a card can fail, when its `show_states` guard cannot be checked.
pub fn is_hidden(subject: Subject<'_>, states: &States) -> RoomCardResult<bool> {
    match subject {
        Subject::Entity(entity) => Ok(hide_if_entity(entity, states)),
        Subject::Row(row) => Ok(hide_if_row(row, states)),
        Subject::Card(card) => hide_if_card(card, states),
    }
}

/// Entity subject: `hide_unavailable` or any matching condition
pub fn hide_if_entity(entity: &EntityConfig, states: &States) -> bool {
    let own = entity.entity.as_deref().and_then(|id| states.get(id));

    if entity.hide_unavailable && own.map_or(true, |s| s.is_unavailable()) {
        debug!(entity_id = ?entity.entity, "Hiding unavailable entity");
        return true;
    }

    entity
        .hide_if
        .as_ref()
        .map_or(false, |rule| rule_matches(rule, own.map(|s| &**s), states))
}

/// Row subject: conditions must name their entity
pub fn hide_if_row(row: &RowConfig, states: &States) -> bool {
    let Some(rule) = &row.hide_if else {
        return false;
    };

    rule.conditions
        .iter()
        .filter(|c| c.entity.is_some())
        .any(|c| condition_matches(c, None, states))
}

/// Card subject: `hide_if` against the bound entity, then `show_states`
///
/// A `show_states` guard needs the bound entity; if it is not configured or
/// not present in the store the card reports a configuration error instead
/// of silently hiding.
pub fn hide_if_card(card: &CardConfig, states: &States) -> RoomCardResult<bool> {
    let bound = card.entity.as_deref().and_then(|id| states.get(id));

    if let Some(rule) = &card.hide_if {
        if rule_matches(rule, bound.map(|s| &**s), states) {
            debug!(card_type = %card.card_type, "Hiding card by condition");
            return Ok(true);
        }
    }

    let Some(allowed) = &card.show_states else {
        return Ok(false);
    };

    let entity = card
        .entity
        .as_deref()
        .ok_or_else(|| room_card_config::ConfigError::ShowStatesWithoutEntity {
            card_type: card.card_type.clone(),
        })?;

    let state = bound.ok_or_else(|| RoomCardError::MissingCardEntity {
        card_type: card.card_type.clone(),
        entity: entity.to_string(),
    })?;

    let hidden = !allowed.iter().any(|s| *s == state.state);
    trace!(card_type = %card.card_type, state = %state.state, hidden, "Checked show_states");
    Ok(hidden)
}

/// OR over a rule's conditions with an implicit subject
pub fn rule_matches(rule: &HideIfConfig, implicit: Option<&EntityState>, states: &States) -> bool {
    rule.conditions
        .iter()
        .any(|c| condition_matches(c, implicit, states))
}

/// Evaluate one condition, reading its observed value
///
/// - explicit `entity`: that entity's state, or its `attribute`
/// - `attribute` only: the implicit subject's attribute
/// - neither: the implicit subject's state
///
/// The condition does not match when the entity it reads is not loaded.
pub fn condition_matches(condition: &Condition, implicit: Option<&EntityState>, states: &States) -> bool {
    let subject = match condition.entity.as_deref() {
        Some(id) => states.get(id).map(|s| &**s),
        None => implicit,
    };

    let Some(subject) = subject else {
        trace!(entity_id = ?condition.entity, "Condition subject not loaded");
        return false;
    };

    let observed = observed_value(subject, condition.attribute.as_deref());
    matches(condition, observed.as_ref())
}

fn observed_value(state: &EntityState, attribute: Option<&str>) -> Option<Value> {
    match attribute {
        Some(attr) => state.attribute(attr).cloned(),
        None => Some(Value::String(state.state.clone())),
    }
}
