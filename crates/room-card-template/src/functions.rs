//! Global functions and filters available to card templates

use minijinja::value::Value;
use minijinja::{Error, State};

use crate::states::StatesObject;

/// `is_state(entity_id, state_or_states)`
pub fn is_state(state: &State, entity_id: &str, expected: Value) -> Result<bool, Error> {
    Ok(StatesObject::from_state(state)?.is_state(entity_id, &expected))
}

/// `state_attr(entity_id, attribute)`
pub fn state_attr(state: &State, entity_id: &str, attribute: &str) -> Result<Value, Error> {
    Ok(StatesObject::from_state(state)?.state_attr(entity_id, attribute))
}

/// `has_value(entity_id)`
pub fn has_value(state: &State, entity_id: &str) -> Result<bool, Error> {
    Ok(StatesObject::from_state(state)?.has_value(entity_id))
}

/// Immediate if: `iif(condition, if_true, if_false, if_none)`
pub fn iif(
    condition: Value,
    if_true: Option<Value>,
    if_false: Option<Value>,
    if_none: Option<Value>,
) -> Value {
    if condition.is_none() || condition.is_undefined() {
        if_none.unwrap_or_else(|| if_false.unwrap_or(Value::UNDEFINED))
    } else if condition.is_true() {
        if_true.unwrap_or(Value::from(true))
    } else {
        if_false.unwrap_or(Value::from(false))
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    if let Some(s) = value.as_str() {
        return s.trim().parse::<f64>().ok();
    }
    f64::try_from(value.clone())
        .ok()
        .or_else(|| value.as_i64().map(|i| i as f64))
}

/// Lenient `float` filter: unparsable input yields the default (or 0.0)
///
/// State values are strings, so `states('sensor.x') | float` is the common
/// case and must not fail on `unavailable`.
pub fn to_float(value: Value, default: Option<Value>) -> Value {
    match value_to_f64(&value) {
        Some(f) => Value::from(f),
        None => default
            .and_then(|d| value_to_f64(&d))
            .map(Value::from)
            .unwrap_or(Value::from(0.0)),
    }
}

/// Lenient `int` filter, truncating toward zero
pub fn to_int(value: Value, default: Option<Value>) -> Value {
    match value_to_f64(&value) {
        Some(f) => Value::from(f.trunc() as i64),
        None => default
            .and_then(|d| value_to_f64(&d))
            .map(|f| Value::from(f.trunc() as i64))
            .unwrap_or(Value::from(0)),
    }
}
