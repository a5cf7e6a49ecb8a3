//! Entity reference types

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::{Condition, HideIfConfig};

/// An inline template: `{template: "<expression>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSpec {
    pub template: String,
}

/// A text field that is either literal or templated (`name`, `title`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrTemplate {
    Template(TemplateSpec),
    Text(String),
}

/// A CSS property value as written in YAML: `font-size: 12` is a number
#[derive(Deserialize)]
#[serde(untagged)]
enum CssValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<CssValue> for String {
    fn from(value: CssValue) -> String {
        match value {
            CssValue::Text(s) => s,
            CssValue::Number(n) => n.to_string(),
            CssValue::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize a property map whose values may be any scalar
fn deserialize_style_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, CssValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

pub(crate) fn deserialize_optional_style_map<'de, D>(
    deserializer: D,
) -> Result<Option<IndexMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, CssValue>>::deserialize(deserializer)?;
    Ok(raw.map(|map| map.into_iter().map(|(k, v)| (k, v.into())).collect()))
}

/// Inline CSS styles, either a property map or a template producing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StylesSpec {
    Template(TemplateSpec),
    Map(#[serde(deserialize_with = "deserialize_style_map")] IndexMap<String, String>),
}

/// Icon template fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

/// Structured icon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconConfig {
    /// First matching condition supplies icon and styles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Icon when the entity is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_on: Option<String>,

    /// Icon when the entity is not on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_off: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<IconTemplate>,
}

/// Icon field: a plain icon name or a structured configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IconSpec {
    Name(String),
    Config(IconConfig),
}

impl IconSpec {
    /// Conditions carried by a structured icon
    pub fn conditions(&self) -> &[Condition] {
        match self {
            IconSpec::Name(_) => &[],
            IconSpec::Config(config) => &config.conditions,
        }
    }
}

/// Host-defined tap/hold/double-tap action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub action: String,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Check whether an action is configured and does something
pub fn has_action(action: Option<&ActionConfig>) -> bool {
    action.map(|a| a.action != "none").unwrap_or(false)
}

/// Structured entity descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TextOrTemplate>,

    /// Show this attribute instead of the state value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StylesSpec>,

    /// Name of a template declared under `templates`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide_unavailable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_if: Option<HideIfConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_name: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_icon: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_state: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_color: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_action: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_tap_action: Option<ActionConfig>,
}

impl EntityConfig {
    /// Minimal descriptor for a bare identifier
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            ..Default::default()
        }
    }

    /// Entity IDs referenced explicitly by icon and hide conditions
    pub fn condition_entities(&self) -> impl Iterator<Item = &str> {
        let icon = self.icon.iter().flat_map(|i| i.conditions());
        let hide = self.hide_if.iter().flat_map(|h| h.conditions.iter());
        icon.chain(hide).filter_map(|c| c.entity.as_deref())
    }
}

/// An entity reference: bare identifier or structured descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Config(Box<EntityConfig>),
}

impl EntityRef {
    /// The referenced entity ID, if any
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            EntityRef::Id(id) => Some(id),
            EntityRef::Config(config) => config.entity.as_deref(),
        }
    }

    /// Normalize to a structured descriptor
    pub fn to_config(&self) -> EntityConfig {
        match self {
            EntityRef::Id(id) => EntityConfig::for_entity(id.clone()),
            EntityRef::Config(config) => (**config).clone(),
        }
    }

    /// The structured descriptor, when this is not a bare identifier
    pub fn as_config(&self) -> Option<&EntityConfig> {
        match self {
            EntityRef::Id(_) => None,
            EntityRef::Config(config) => Some(config),
        }
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        EntityRef::Id(id.to_string())
    }
}

impl From<EntityConfig> for EntityRef {
    fn from(config: EntityConfig) -> Self {
        EntityRef::Config(Box::new(config))
    }
}
