//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating a card configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML (or JSON, which is parsed as YAML)
    #[error("failed to parse configuration in {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The card has nothing to render
    #[error("Please define entities, rows or cards.")]
    NothingToShow,

    /// A nested card has no type (index counts cards depth-first)
    #[error("nested card #{index} has no type")]
    MissingCardType { index: usize },

    /// A nested card filters on `show_states` without a bound entity
    #[error("card '{card_type}' uses show_states but declares no entity")]
    ShowStatesWithoutEntity { card_type: String },

    /// An entity refers to a template that is not declared
    #[error("template '{name}' is not defined")]
    UnknownTemplate { name: String },

    /// Two templates share a name
    #[error("template '{name}' is defined more than once")]
    DuplicateTemplate { name: String },
}
