//! Core types for the room card
//!
//! This crate provides the read-only view of the host platform that every
//! other room card crate works against: the per-entity [`EntityState`], the
//! [`States`] snapshot handed in on each update, and the [`Hass`] provider
//! that bundles the snapshot with the current user.

mod hass;
mod state;
mod states;

pub use hass::{Hass, HassUser};
pub use state::EntityState;
pub use states::States;

/// State value reported by an entity that cannot be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value reported by an entity whose value is not yet known
pub const STATE_UNKNOWN: &str = "unknown";

/// State value of an entity that is switched on
pub const STATE_ON: &str = "on";

/// State values treated as "unavailable" by `hide_unavailable`
pub const UNAVAILABLE_STATES: [&str; 2] = [STATE_UNAVAILABLE, STATE_UNKNOWN];

/// Pseudo-attribute naming the state's `last_changed` timestamp
pub const LAST_CHANGED: &str = "last_changed";

/// Pseudo-attribute naming the state's `last_updated` timestamp
pub const LAST_UPDATED: &str = "last_updated";
