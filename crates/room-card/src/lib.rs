//! Room card engine
//!
//! Resolves a room card configuration against live entity states:
//!
//! - [`condition`] - loose comparison of one observed value
//! - [`visibility`] - `hide_if`, `hide_unavailable` and `show_states` rules
//!   for entities, rows and nested cards
//! - [`mapper`] - entity references merged with their state, plus
//!   name/icon/styles resolution
//! - [`tracker`] - change detection over the tracked entities
//! - [`card`] - the [`RoomCard`] that ties it together and produces a
//!   [`CardView`]
//!
//! Configuration types, loading and entity discovery live in
//! `room_card_config`; template evaluation in `room_card_template`.

pub mod card;
pub mod condition;
pub mod display;
pub mod error;
pub mod icon;
pub mod mapper;
pub mod render;
pub mod tracker;
pub mod view;
pub mod visibility;

pub use card::{ComponentRegistry, RoomCard};
pub use condition::matches;
pub use display::{render_value, state_display, ValueDisplay, TIMESTAMP_FORMATS};
pub use error::{RoomCardError, RoomCardResult};
pub use icon::{resolve_icon, ResolvedIcon};
pub use mapper::{get_value, map_state_object, resolve_presentation, Presentation, ResolvedEntity};
pub use render::{card_size, render_card, row_classes};
pub use tracker::{advance, Snapshot, Tracker};
pub use view::{
    ActionFlags, CardView, ChildCardView, EntityItem, EntityView, HeaderContent, HeaderView,
    MainView, RowView,
};
pub use visibility::{hide_if_card, hide_if_entity, hide_if_row, is_hidden, Subject};

pub use room_card_config::{
    collect_child_card_types, load_config_file, load_config_str, resolve_tracked_entity_ids,
    RoomCardConfig,
};
pub use room_card_core::{EntityState, Hass, HassUser, States};
