//! Value display for header and info entities

use chrono::{DateTime, TimeZone, Utc};
use room_card_core::{LAST_CHANGED, LAST_UPDATED};
use serde::Serialize;
use serde_json::Value;

use crate::error::{RoomCardError, RoomCardResult};
use crate::icon::ResolvedIcon;
use crate::mapper::{get_value, ResolvedEntity};

/// `format` values that show a value as a timestamp
pub const TIMESTAMP_FORMATS: [&str; 5] = ["relative", "total", "date", "time", "datetime"];

/// How an entity's value is shown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDisplay {
    /// An on/off switch bound to the entity
    Toggle { entity_id: String, on: bool },
    Icon { icon: ResolvedIcon },
    /// Time since `last_changed` / `last_updated`
    RelativeTime { datetime: DateTime<Utc> },
    Timestamp { datetime: DateTime<Utc>, format: String },
    Text {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
}

/// Choose how to display a loaded entity's value
///
/// In order: toggle, icon, relative time for the timestamp
/// pseudo-attributes, a timestamp format when the value parses as a date,
/// otherwise the value as text.
pub fn render_value(entity: &ResolvedEntity, icon: &ResolvedIcon) -> RoomCardResult<ValueDisplay> {
    let state = entity.state.as_ref().ok_or_else(|| RoomCardError::EntityNotLoaded {
        entity: entity.entity_id().unwrap_or_default().to_string(),
    })?;
    let config = &entity.config;

    if config.toggle == Some(true) {
        return Ok(ValueDisplay::Toggle {
            entity_id: state.entity_id.clone(),
            on: state.is_on(),
        });
    }

    if config.show_icon == Some(true) {
        return Ok(ValueDisplay::Icon { icon: icon.clone() });
    }

    match config.attribute.as_deref() {
        Some(LAST_CHANGED) => {
            return Ok(ValueDisplay::RelativeTime {
                datetime: state.last_changed,
            })
        }
        Some(LAST_UPDATED) => {
            return Ok(ValueDisplay::RelativeTime {
                datetime: state.last_updated,
            })
        }
        _ => {}
    }

    if let Some(format) = config.format.as_deref().filter(|f| TIMESTAMP_FORMATS.contains(f)) {
        let value = get_value(entity)?;
        return Ok(match parse_timestamp(&value) {
            Some(datetime) => ValueDisplay::Timestamp {
                datetime,
                format: format.to_string(),
            },
            None => ValueDisplay::Text {
                value: value_text(&value),
                unit: None,
            },
        });
    }

    state_display(entity)
}

/// The value as text with its unit
///
/// The unit is the configured `unit`, or the entity's
/// `unit_of_measurement` when showing the state itself.
pub fn state_display(entity: &ResolvedEntity) -> RoomCardResult<ValueDisplay> {
    let value = get_value(entity)?;
    let config = &entity.config;

    let unit = config.unit.clone().or_else(|| {
        if config.attribute.is_some() {
            return None;
        }
        entity
            .state
            .as_ref()
            .and_then(|s| s.attribute("unit_of_measurement"))
            .and_then(Value::as_str)
            .map(String::from)
    });

    Ok(ValueDisplay::Text {
        value: value_text(&value),
        unit,
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an RFC 3339 string or a millisecond epoch number
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
