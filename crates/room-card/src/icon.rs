//! Icon resolution
//!
//! Precedence for a structured icon:
//! 1. the first matching entry of `conditions` (icon and styles)
//! 2. `state_on` / `state_off`, by whether the entity is on
//! 3. the icon template
//!
//! Styles from `template.styles` override condition styles when set.

use std::sync::Arc;

use indexmap::IndexMap;
use room_card_config::{IconConfig, IconSpec};
use room_card_core::{EntityState, Hass};
use room_card_template::{parse_css, EvalContext, TemplateEngine};
use serde::Serialize;

use crate::error::RoomCardResult;
use crate::visibility::condition_matches;

/// The icon to show and its inline styles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedIcon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, String>,
}

impl ResolvedIcon {
    pub fn named(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            styles: IndexMap::new(),
        }
    }
}

/// Resolve an icon field for a subject entity
///
/// `subject` is the implicit value for conditions without their own
/// `entity`. A missing spec resolves to no override.
pub fn resolve_icon(
    spec: Option<&IconSpec>,
    subject: Option<&Arc<EntityState>>,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<ResolvedIcon> {
    match spec {
        None => Ok(ResolvedIcon::default()),
        Some(IconSpec::Name(name)) => Ok(ResolvedIcon::named(name.clone())),
        Some(IconSpec::Config(config)) => resolve_icon_config(config, subject, hass, engine),
    }
}

fn resolve_icon_config(
    config: &IconConfig,
    subject: Option<&Arc<EntityState>>,
    hass: &Hass,
    engine: &TemplateEngine,
) -> RoomCardResult<ResolvedIcon> {
    let ctx = EvalContext::new(hass, subject);
    let template = config.template.as_ref();

    let template_styles = match template.and_then(|t| t.styles.as_deref()) {
        Some(snippet) => Some(parse_css(&engine.evaluate_string(snippet, ctx)?)),
        None => None,
    };

    let implicit = subject.map(|s| &**s);
    let matched = config
        .conditions
        .iter()
        .find(|c| condition_matches(c, implicit, &hass.states));

    let mut resolved = if let Some(condition) = matched {
        ResolvedIcon {
            icon: condition.icon.clone(),
            styles: condition.styles.clone().unwrap_or_default(),
        }
    } else if config.state_on.is_some() || config.state_off.is_some() {
        let on = implicit.map_or(false, EntityState::is_on);
        let icon = if on { &config.state_on } else { &config.state_off };
        ResolvedIcon {
            icon: icon.clone(),
            styles: IndexMap::new(),
        }
    } else {
        let icon = match template.and_then(|t| t.icon.as_deref()) {
            Some(snippet) => Some(engine.evaluate_string(snippet, ctx)?).filter(|s| !s.is_empty()),
            None => None,
        };
        ResolvedIcon {
            icon,
            styles: IndexMap::new(),
        }
    };

    if let Some(styles) = template_styles {
        resolved.styles = styles;
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_card_core::States;
    use serde_json::json;
    use std::collections::HashMap;

    fn make_test_hass() -> Hass {
        let states: States = [
            EntityState::new("light.hall", "on", HashMap::from([("brightness".to_string(), json!(200))])),
            EntityState::new("light.porch", "off", HashMap::new()),
            EntityState::new("sun.sun", "below_horizon", HashMap::new()),
        ]
        .into_iter()
        .collect();
        Hass::new(states)
    }

    fn spec(value: serde_json::Value) -> IconSpec {
        serde_json::from_value(value).unwrap()
    }

    fn resolve(spec: &IconSpec, entity_id: &str, hass: &Hass) -> ResolvedIcon {
        let engine = TemplateEngine::new();
        let subject = hass.states.get(entity_id).cloned();
        resolve_icon(Some(spec), subject.as_ref(), hass, &engine).unwrap()
    }

    #[test]
    fn test_plain_and_missing_icon() {
        let hass = make_test_hass();
        let engine = TemplateEngine::new();
        assert_eq!(resolve(&spec(json!("mdi:lamp")), "light.hall", &hass), ResolvedIcon::named("mdi:lamp"));
        assert_eq!(
            resolve_icon(None, None, &hass, &engine).unwrap(),
            ResolvedIcon::default()
        );
    }

    #[test]
    fn test_state_on_off() {
        let hass = make_test_hass();
        let icon = spec(json!({"state_on": "mdi:lightbulb-on", "state_off": "mdi:lightbulb"}));
        assert_eq!(resolve(&icon, "light.hall", &hass).icon.as_deref(), Some("mdi:lightbulb-on"));
        assert_eq!(resolve(&icon, "light.porch", &hass).icon.as_deref(), Some("mdi:lightbulb"));
    }

    #[test]
    fn test_first_matching_condition_wins() {
        let hass = make_test_hass();
        let icon = spec(json!({
            "state_on": "mdi:lightbulb-on",
            "conditions": [
                {"condition": "equals", "value": "above_horizon", "entity": "sun.sun", "icon": "mdi:sun"},
                {"condition": "above", "value": 100, "attribute": "brightness", "icon": "mdi:brightness-7", "styles": {"color": "yellow"}},
                {"condition": "equals", "value": "on", "icon": "mdi:never"}
            ]
        }));

        let resolved = resolve(&icon, "light.hall", &hass);
        assert_eq!(resolved.icon.as_deref(), Some("mdi:brightness-7"));
        assert_eq!(resolved.styles.get("color").map(String::as_str), Some("yellow"));

        // Nothing matches for the porch light: fall back to state_on/off
        let resolved = resolve(&icon, "light.porch", &hass);
        assert_eq!(resolved.icon, None);
    }

    #[test]
    fn test_icon_template() {
        let hass = make_test_hass();
        let icon = spec(json!({
            "template": {
                "icon": "iif(entity.state == 'on', 'mdi:lamp', 'mdi:lamp-outline')",
                "styles": "{{ 'color: ' ~ iif(is_state('sun.sun', 'below_horizon'), 'orange', 'grey') }}"
            }
        }));

        let resolved = resolve(&icon, "light.hall", &hass);
        assert_eq!(resolved.icon.as_deref(), Some("mdi:lamp"));
        assert_eq!(resolved.styles.get("color").map(String::as_str), Some("orange"));

        let resolved = resolve(&icon, "light.porch", &hass);
        assert_eq!(resolved.icon.as_deref(), Some("mdi:lamp-outline"));
    }

    #[test]
    fn test_template_styles_override_condition_styles() {
        let hass = make_test_hass();
        let icon = spec(json!({
            "conditions": [{"condition": "equals", "value": "on", "icon": "mdi:fire", "styles": {"color": "red"}}],
            "template": {"styles": "'color: blue'"}
        }));

        let resolved = resolve(&icon, "light.hall", &hass);
        assert_eq!(resolved.icon.as_deref(), Some("mdi:fire"));
        assert_eq!(resolved.styles.get("color").map(String::as_str), Some("blue"));
    }

    #[test]
    fn test_template_error_propagates() {
        let hass = make_test_hass();
        let engine = TemplateEngine::new();
        let icon = spec(json!({"template": {"icon": "iif(("}}));
        let subject = hass.states.get("light.hall").cloned();
        assert!(resolve_icon(Some(&icon), subject.as_ref(), &hass, &engine).is_err());
    }
}
