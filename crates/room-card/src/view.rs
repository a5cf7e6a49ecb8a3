//! Render-ready view model
//!
//! What the rendering collaborator receives after one evaluation. Hidden
//! and not-yet-loaded items are already filtered out; configuration and
//! template failures appear in place as `error` nodes.

use indexmap::IndexMap;
use room_card_config::CardConfig;
use serde::Serialize;

use crate::display::ValueDisplay;
use crate::icon::ResolvedIcon;

/// Which gestures have an action configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionFlags {
    pub clickable: bool,
    pub has_hold: bool,
    pub has_double_tap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub card_styles: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderView>,
    pub info_entities: Vec<EntityView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<RowView>,
    pub rows: Vec<RowView>,
    pub cards: Vec<ChildCardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderView {
    Header(HeaderContent),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderContent {
    pub title: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<MainView>,
    pub actions: ActionFlags,
}

/// The header's main slot: an icon badge or the primary entity's value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MainView {
    Icon {
        icon: ResolvedIcon,
        classes: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        state_color: Option<bool>,
    },
    Value { value: ValueDisplay },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub classes: String,
    pub entities: Vec<EntityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityView {
    Entity(EntityItem),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityItem {
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ResolvedIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueDisplay>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, String>,
    pub actions: ActionFlags,
}

/// A nested card to hand to the card factory, unchanged
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChildCardView {
    Card { config: CardConfig },
    Error { message: String },
}

impl EntityView {
    pub fn as_entity(&self) -> Option<&EntityItem> {
        match self {
            EntityView::Entity(item) => Some(item),
            EntityView::Error { .. } => None,
        }
    }
}
