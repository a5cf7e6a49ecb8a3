//! Configuration loading
//!
//! Cards are configured in YAML (JSON documents are valid YAML and load the
//! same way). Loading parses the document, validates it, and attaches the
//! derived `entity_ids` field.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::card::RoomCardConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::resolve_tracked_entity_ids;
use crate::validate::check_config;

/// Validate a parsed configuration and compute its derived fields
///
/// Any `entity_ids` already present are replaced.
pub fn prepare_config(mut config: RoomCardConfig) -> ConfigResult<RoomCardConfig> {
    check_config(&config)?;
    config.entity_ids = resolve_tracked_entity_ids(&config).into_iter().collect();
    debug!(count = config.entity_ids.len(), "Resolved tracked entities");
    Ok(config)
}

/// Load a configuration from a YAML or JSON string
pub fn load_config_str(content: &str, source_name: &str) -> ConfigResult<RoomCardConfig> {
    let config: RoomCardConfig =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            source_name: source_name.to_string(),
            source: e,
        })?;

    prepare_config(config)
}

/// Load a configuration file
pub fn load_config_file(path: impl AsRef<Path>) -> ConfigResult<RoomCardConfig> {
    let path = path.as_ref();
    debug!("Loading card configuration: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_str(&content, &path.display().to_string())
}
