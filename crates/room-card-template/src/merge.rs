//! Named template resolution
//!
//! `templates: [{name, template: {...}}]` declares reusable entity fields.
//! An entity with `template: <name>` inherits every field of the named
//! template that it does not set itself.

use room_card_config::{EntityConfig, EntityRef, RoomCardConfig};
use serde_json::Value;
use tracing::trace;

use crate::error::{TemplateError, TemplateResult};

/// Merge an entity descriptor with the named template it references
///
/// Descriptors without a `template` are returned unchanged.
pub fn map_template(entity: &EntityConfig, config: &RoomCardConfig) -> TemplateResult<EntityConfig> {
    let Some(name) = entity.template.as_deref() else {
        return Ok(entity.clone());
    };

    let container = config
        .template(name)
        .ok_or_else(|| TemplateError::UnknownTemplate {
            name: name.to_string(),
        })?;

    let invalid = |err: serde_json::Error| TemplateError::InvalidTemplate {
        name: name.to_string(),
        reason: err.to_string(),
    };

    let mut merged = container.template.clone();
    match serde_json::to_value(entity).map_err(invalid)? {
        Value::Object(own) => merged.extend(own),
        other => {
            return Err(TemplateError::InvalidTemplate {
                name: name.to_string(),
                reason: format!("expected an entity mapping, got {}", other),
            })
        }
    }

    trace!(template = name, entity = ?entity.entity, "Applied named template");
    serde_json::from_value(Value::Object(merged)).map_err(invalid)
}

/// Normalize a reference and apply its named template
pub fn resolve_entity_config(
    entity: &EntityRef,
    config: &RoomCardConfig,
) -> TemplateResult<EntityConfig> {
    map_template(&entity.to_config(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_card_config::{IconSpec, TextOrTemplate};
    use serde_json::json;

    fn make_test_config() -> RoomCardConfig {
        serde_json::from_value(json!({
            "entities": [],
            "templates": [{
                "name": "lamp",
                "template": {
                    "icon": "mdi:lamp",
                    "show_state": false,
                    "name": "Lamp",
                    "tap_action": {"action": "toggle"}
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_entity_without_template_is_unchanged() {
        let config = make_test_config();
        let entity = EntityConfig::for_entity("light.desk");
        assert_eq!(map_template(&entity, &config).unwrap(), entity);
    }

    #[test]
    fn test_template_fields_are_inherited() {
        let config = make_test_config();
        let entity: EntityConfig =
            serde_json::from_value(json!({"entity": "light.desk", "template": "lamp"})).unwrap();

        let merged = map_template(&entity, &config).unwrap();
        assert_eq!(merged.entity.as_deref(), Some("light.desk"));
        assert_eq!(merged.icon, Some(IconSpec::Name("mdi:lamp".to_string())));
        assert_eq!(merged.show_state, Some(false));
        assert_eq!(merged.tap_action.map(|a| a.action), Some("toggle".to_string()));
    }

    #[test]
    fn test_entity_fields_win() {
        let config = make_test_config();
        let entity: EntityConfig = serde_json::from_value(json!({
            "entity": "light.desk",
            "template": "lamp",
            "name": "Desk"
        }))
        .unwrap();

        let merged = map_template(&entity, &config).unwrap();
        assert_eq!(merged.name, Some(TextOrTemplate::Text("Desk".to_string())));
        assert_eq!(merged.icon, Some(IconSpec::Name("mdi:lamp".to_string())));
    }

    #[test]
    fn test_unknown_template() {
        let config = make_test_config();
        let entity: EntityConfig =
            serde_json::from_value(json!({"entity": "light.desk", "template": "missing"})).unwrap();

        assert_eq!(
            map_template(&entity, &config),
            Err(TemplateError::UnknownTemplate {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_template_body() {
        let config: RoomCardConfig = serde_json::from_value(json!({
            "entities": [],
            "templates": [{"name": "broken", "template": {"show_state": "sometimes"}}]
        }))
        .unwrap();
        let entity: EntityConfig =
            serde_json::from_value(json!({"entity": "light.desk", "template": "broken"})).unwrap();

        assert!(matches!(
            map_template(&entity, &config),
            Err(TemplateError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_bare_reference_is_normalized() {
        let config = make_test_config();
        let resolved = resolve_entity_config(&EntityRef::from("sensor.power"), &config).unwrap();
        assert_eq!(resolved, EntityConfig::for_entity("sensor.power"));
    }
}
