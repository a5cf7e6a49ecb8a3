//! Card, row and nested-card configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::HideIfConfig;
use crate::entity::{ActionConfig, EntityRef, IconSpec, StylesSpec, TextOrTemplate};

/// Type-tag prefix of externally registered cards
pub const CUSTOM_CARD_PREFIX: &str = "custom:";

/// Horizontal alignment of a row's content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra CSS classes: a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Classes {
    One(String),
    Many(Vec<String>),
}

impl Classes {
    /// Space-separated class list
    pub fn joined(&self) -> String {
        match self {
            Classes::One(s) => s.clone(),
            Classes::Many(list) => list.join(" "),
        }
    }
}

/// A named, reusable set of entity fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateContainer {
    pub name: String,
    pub template: serde_json::Map<String, serde_json::Value>,
}

/// A row of entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowConfig {
    #[serde(default)]
    pub entities: Vec<EntityRef>,

    /// Every condition must name its `entity`; rows have no implicit subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_if: Option<HideIfConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_alignment: Option<Alignment>,
}

/// A nested card rendered by the host's card factory
///
/// Keys this crate does not interpret are kept in `extra` so the factory
/// receives the configuration unchanged. That includes the card's own
/// `entities` rows, whose shape belongs to the card type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(rename = "type", default)]
    pub card_type: String,

    /// Entity the card is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<CardConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_if: Option<HideIfConfig>,

    /// Only show the card while the bound entity is in one of these states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_states: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CardConfig {
    /// Create a card of the given type
    pub fn new(card_type: impl Into<String>) -> Self {
        Self {
            card_type: card_type.into(),
            ..Default::default()
        }
    }

    /// The registered component name of a `custom:` card
    pub fn custom_type(&self) -> Option<&str> {
        self.card_type.strip_prefix(CUSTOM_CARD_PREFIX)
    }

    /// Entity IDs listed in the card's `entities` option
    ///
    /// Rows are either a bare identifier or an object with an `entity` key;
    /// anything else (dividers, sections, buttons) lists nothing.
    pub fn listed_entities(&self) -> impl Iterator<Item = &str> {
        self.extra
            .get("entities")
            .and_then(serde_json::Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|row| match row {
                serde_json::Value::String(id) => Some(id.as_str()),
                serde_json::Value::Object(fields) => {
                    fields.get("entity").and_then(serde_json::Value::as_str)
                }
                _ => None,
            })
    }
}

/// Top-level room card configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomCardConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,

    /// Primary entity shown in the header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntityRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_entities: Option<Vec<EntityRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RowConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<CardConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TextOrTemplate>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide_title: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_icon: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_color: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Classes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StylesSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_styles: Option<StylesSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateContainer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_alignment: Option<Alignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_action: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_tap_action: Option<ActionConfig>,

    /// Every entity the card depends on, derived at load time
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub entity_ids: Vec<String>,
}

impl RoomCardConfig {
    /// Look up a named template
    pub fn template(&self, name: &str) -> Option<&TemplateContainer> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Every entity reference in `entities`, `info_entities` and rows
    pub fn entity_refs(&self) -> impl Iterator<Item = &EntityRef> {
        let entities = self.entities.iter().flatten();
        let rows = self.rows.iter().flatten().flat_map(|r| r.entities.iter());
        entities
            .chain(self.info_entities.iter().flatten())
            .chain(rows)
    }
}
