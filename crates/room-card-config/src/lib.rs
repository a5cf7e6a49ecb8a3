//! Room card configuration
//!
//! This crate owns the declarative configuration tree of a room card and
//! everything that can be derived from the tree alone:
//!
//! - the serde model ([`RoomCardConfig`], [`EntityRef`], [`Condition`], ...)
//! - loading from YAML/JSON ([`load_config_file`], [`load_config_str`])
//! - setup validation ([`check_config`])
//! - the entity reference resolver ([`resolve_tracked_entity_ids`])
//! - card-tree discovery ([`collect_child_card_types`], [`card_entities`])
//!
//! # Example
//!
//! ```ignore
//! use room_card_config::load_config_file;
//!
//! let config = load_config_file("living_room.yaml")?;
//! println!("tracking {:?}", config.entity_ids);
//! ```

mod card;
mod condition;
mod discovery;
mod entity;
mod error;
mod loader;
mod resolver;
mod validate;

pub use card::{
    Alignment, CardConfig, Classes, RoomCardConfig, RowConfig, TemplateContainer,
    CUSTOM_CARD_PREFIX,
};
pub use condition::{Condition, ConditionValue, HideIfConfig, Operator};
pub use discovery::{card_entities, collect_child_card_types, walk_cards, MAX_CARD_DEPTH};
pub use entity::{
    has_action, ActionConfig, EntityConfig, EntityRef, IconConfig, IconSpec, IconTemplate,
    StylesSpec, TemplateSpec, TextOrTemplate,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config_file, load_config_str, prepare_config};
pub use resolver::resolve_tracked_entity_ids;
pub use validate::check_config;
