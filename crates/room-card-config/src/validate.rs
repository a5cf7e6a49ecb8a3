//! Setup-time validation of a card configuration

use std::collections::HashSet;

use crate::card::RoomCardConfig;
use crate::discovery::walk_cards;
use crate::error::{ConfigError, ConfigResult};

/// Validate a configuration before it is accepted
///
/// Runtime conditions (missing entities, unavailable states) are not
/// checked here; only mistakes that no state update can fix.
pub fn check_config(config: &RoomCardConfig) -> ConfigResult<()> {
    if config.entities.is_none() && config.cards.is_none() && config.rows.is_none() {
        return Err(ConfigError::NothingToShow);
    }

    let mut names = HashSet::new();
    for template in &config.templates {
        if !names.insert(template.name.as_str()) {
            return Err(ConfigError::DuplicateTemplate {
                name: template.name.clone(),
            });
        }
    }

    for entity in config.entity_refs().filter_map(|e| e.as_config()) {
        if let Some(name) = &entity.template {
            if !names.contains(name.as_str()) {
                return Err(ConfigError::UnknownTemplate { name: name.clone() });
            }
        }
    }

    let mut result = Ok(());
    let mut index = 0;
    walk_cards(config.cards.as_deref().unwrap_or_default(), |card| {
        if result.is_err() {
            return;
        }
        if card.card_type.is_empty() {
            result = Err(ConfigError::MissingCardType { index });
        } else if card.show_states.is_some() && card.entity.is_none() {
            result = Err(ConfigError::ShowStatesWithoutEntity {
                card_type: card.card_type.clone(),
            });
        }
        index += 1;
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RoomCardConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(json!({
            "entity": "sensor.main",
            "templates": [{"name": "temp", "template": {"unit": "°C"}}],
            "entities": [{"entity": "sensor.a", "template": "temp"}],
            "cards": [{"type": "custom:x", "entity": "light.a", "show_states": ["on"]}]
        }));
        assert!(check_config(&config).is_ok());
    }

    #[test]
    fn test_nothing_to_show() {
        let config = parse(json!({"entity": "sensor.main"}));
        assert!(matches!(check_config(&config), Err(ConfigError::NothingToShow)));

        let rows_only = parse(json!({"rows": []}));
        assert!(check_config(&rows_only).is_ok());
    }

    #[test]
    fn test_unknown_template() {
        let config = parse(json!({
            "entities": [{"entity": "sensor.a", "template": "missing"}]
        }));
        assert!(matches!(
            check_config(&config),
            Err(ConfigError::UnknownTemplate { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_duplicate_template() {
        let config = parse(json!({
            "entities": [],
            "templates": [
                {"name": "t", "template": {}},
                {"name": "t", "template": {}}
            ]
        }));
        assert!(matches!(
            check_config(&config),
            Err(ConfigError::DuplicateTemplate { .. })
        ));
    }

    #[test]
    fn test_nested_card_errors() {
        let untyped = parse(json!({"cards": [{"type": "vertical-stack", "cards": [{"entity": "light.a"}]}]}));
        assert!(matches!(
            check_config(&untyped),
            Err(ConfigError::MissingCardType { index: 1 })
        ));

        let unbound = parse(json!({"cards": [{"type": "custom:x", "show_states": ["on"]}]}));
        assert!(matches!(
            check_config(&unbound),
            Err(ConfigError::ShowStatesWithoutEntity { .. })
        ));
    }
}
