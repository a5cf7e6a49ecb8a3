//! Error types for the room card engine

use room_card_config::ConfigError;
use room_card_template::TemplateError;
use thiserror::Error;

/// Result type for room card operations
pub type RoomCardResult<T> = Result<T, RoomCardError>;

/// Errors surfaced to the card's error UI
///
/// Missing or unavailable entity state is never an error; these all point
/// at a misconfiguration or a failing user template.
#[derive(Debug, Error)]
pub enum RoomCardError {
    /// `attribute` names something the entity does not carry
    #[error("Entity: '{entity}' has no attribute named '{attribute}'")]
    MissingAttribute { entity: String, attribute: String },

    /// A value was requested from an entity that is not loaded
    #[error("Entity: '{entity}' is not available")]
    EntityNotLoaded { entity: String },

    /// A `show_states` guard refers to an entity absent from the store
    #[error("Entity: '{entity}' used by show_states of card '{card_type}' is not available")]
    MissingCardEntity { card_type: String, entity: String },

    /// The card was asked to render before it has a configuration and state
    #[error("card is not ready to render")]
    NotReady,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
