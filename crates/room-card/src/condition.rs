//! Condition evaluation
//!
//! A condition compares one observed value against a configured literal.
//! Values come from a dynamically typed host, so comparisons are loose:
//! numeric strings compare equal to numbers, `null` and a missing value
//! compare equal to each other and nothing else, and ordering falls back
//! to string comparison only when both sides are strings.

use std::borrow::Cow;

use room_card_config::{Condition, ConditionValue, Operator};
use serde_json::Value;
use tracing::trace;

/// Check whether a condition matches an observed value
///
/// `observed` is `None` when the value does not exist (for example an
/// attribute the entity does not carry). Unknown operators never match.
pub fn matches(condition: &Condition, observed: Option<&Value>) -> bool {
    let expected = condition.value.as_ref().map(ConditionValue::coerced);
    let lhs = Primitive::from_json(observed);
    let rhs = Primitive::from_json(expected.as_ref());

    let result = match &condition.condition {
        Operator::Equals => loose_equals(&lhs, &rhs),
        Operator::NotEquals => !loose_equals(&lhs, &rhs),
        Operator::Above => loose_greater(&lhs, &rhs),
        Operator::Below => loose_greater(&rhs, &lhs),
        Operator::Unknown(op) => {
            trace!(operator = %op, "Unknown condition operator");
            false
        }
    };

    trace!(condition = %condition.condition, ?observed, ?expected, result, "Condition evaluated");
    result
}

/// Scalar view of a JSON value used for loose comparison
#[derive(Debug, Clone, PartialEq)]
enum Primitive<'a> {
    Missing,
    Null,
    Bool(bool),
    Number(f64),
    Text(Cow<'a, str>),
}

impl<'a> Primitive<'a> {
    fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            None => Primitive::Missing,
            Some(Value::Null) => Primitive::Null,
            Some(Value::Bool(b)) => Primitive::Bool(*b),
            Some(Value::Number(n)) => Primitive::Number(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Primitive::Text(Cow::Borrowed(s)),
            // Lists and mappings compare through their string form
            Some(other) => Primitive::Text(Cow::Owned(to_display_string(other))),
        }
    }

    fn is_nullish(&self) -> bool {
        matches!(self, Primitive::Missing | Primitive::Null)
    }

    fn to_number(&self) -> f64 {
        match self {
            Primitive::Missing => f64::NAN,
            Primitive::Null => 0.0,
            Primitive::Bool(b) => f64::from(u8::from(*b)),
            Primitive::Number(n) => *n,
            Primitive::Text(s) => parse_number(s),
        }
    }
}

fn loose_equals(a: &Primitive<'_>, b: &Primitive<'_>) -> bool {
    match (a, b) {
        (x, y) if x.is_nullish() || y.is_nullish() => x.is_nullish() && y.is_nullish(),
        (Primitive::Text(x), Primitive::Text(y)) => x == y,
        (Primitive::Bool(x), Primitive::Bool(y)) => x == y,
        _ => a.to_number() == b.to_number(),
    }
}

fn loose_greater(a: &Primitive<'_>, b: &Primitive<'_>) -> bool {
    match (a, b) {
        (Primitive::Text(x), Primitive::Text(y)) => x > y,
        // NaN on either side compares false
        _ => a.to_number() > b.to_number(),
    }
}

/// Parse a string the way a loosely typed host converts it to a number
///
/// Surrounding whitespace is ignored and an empty string is zero. Anything
/// that is not a plain decimal literal (or `Infinity`) is NaN.
fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let plain = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !plain {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}
