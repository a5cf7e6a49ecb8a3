//! Entity view-model mapping
//!
//! Turns an entity reference from the configuration into a
//! [`ResolvedEntity`]: the descriptor after named-template merging, paired
//! with the entity's current state. Presentation fields (name, icon,
//! styles) are resolved from it on demand.

use std::sync::Arc;

use indexmap::IndexMap;
use room_card_config::{EntityConfig, EntityRef, RoomCardConfig, TextOrTemplate};
use room_card_core::{EntityState, Hass};
use room_card_template::{resolve_entity_config, EvalContext, TemplateEngine};
use serde_json::Value;
use tracing::trace;

use crate::error::{RoomCardError, RoomCardResult};
use crate::icon::{resolve_icon, ResolvedIcon};

/// A descriptor merged with its live state
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    pub config: EntityConfig,
    /// `None` until the host reports the entity
    pub state: Option<Arc<EntityState>>,
}

impl ResolvedEntity {
    pub fn entity_id(&self) -> Option<&str> {
        self.config.entity.as_deref()
    }

    /// Whether the host has reported this entity
    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }
}

/// Resolve an entity reference against the current states
///
/// Bare identifiers become `{entity: <id>}`; named templates are merged.
/// An entity the host has not reported yet resolves with no state.
pub fn map_state_object(
    entity: &EntityRef,
    hass: &Hass,
    config: &RoomCardConfig,
) -> RoomCardResult<ResolvedEntity> {
    let config = resolve_entity_config(entity, config)?;
    let state = config
        .entity
        .as_deref()
        .and_then(|id| hass.states.get(id))
        .cloned();

    trace!(entity_id = ?config.entity, loaded = state.is_some(), "Mapped entity");
    Ok(ResolvedEntity { config, state })
}

/// The value an entity displays: its attribute if configured, else its state
///
/// Naming an attribute the entity does not carry is a configuration error.
pub fn get_value(entity: &ResolvedEntity) -> RoomCardResult<Value> {
    let entity_id = entity.entity_id().unwrap_or_default();
    let state = entity
        .state
        .as_ref()
        .ok_or_else(|| RoomCardError::EntityNotLoaded {
            entity: entity_id.to_string(),
        })?;

    match entity.config.attribute.as_deref() {
        Some(attribute) => {
            state
                .attribute(attribute)
                .cloned()
                .ok_or_else(|| RoomCardError::MissingAttribute {
                    entity: entity_id.to_string(),
                    attribute: attribute.to_string(),
                })
        }
        None => Ok(Value::String(state.state.clone())),
    }
}

/// Render-ready name, icon and styles of an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub name: String,
    pub icon: ResolvedIcon,
    pub styles: IndexMap<String, String>,
}

/// Resolve the presentation fields of a loaded entity
///
/// The name falls back to the `friendly_name` attribute, then the entity id.
pub fn resolve_presentation(
    entity: &ResolvedEntity,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<Presentation> {
    let ctx = EvalContext::new(hass, entity.state.as_ref());

    let name = match &entity.config.name {
        Some(TextOrTemplate::Text(name)) => name.clone(),
        Some(name) => engine.render_text(name, ctx)?,
        None => entity
            .state
            .as_ref()
            .and_then(|s| s.attribute("friendly_name"))
            .and_then(Value::as_str)
            .or(entity.entity_id())
            .unwrap_or_default()
            .to_string(),
    };

    let icon = resolve_icon(entity.config.icon.as_ref(), entity.state.as_ref(), hass, engine)?;

    let styles = match &entity.config.styles {
        Some(styles) => engine.render_styles(styles, ctx)?,
        None => IndexMap::new(),
    };

    Ok(Presentation { name, icon, styles })
}
