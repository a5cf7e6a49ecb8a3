//! Condition types
//!
//! Conditions compare one observed value against a literal. They appear in
//! `hide_if` rules (OR-combined) and in icon condition lists.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::entity::deserialize_optional_style_map;

/// Comparison operator of a condition
///
/// Parsing never fails: an unrecognised operator, a non-string one, or an
/// empty `condition:` is kept as [`Operator::Unknown`] and never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    Above,
    Below,
    Unknown(String),
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Unknown(String::new())
    }
}

impl Operator {
    /// No operator was given
    pub fn is_missing(&self) -> bool {
        matches!(self, Operator::Unknown(s) if s.is_empty())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Operator::from(s),
            serde_json::Value::Null => Operator::default(),
            other => Operator::Unknown(other.to_string()),
        })
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "above" => Operator::Above,
            "below" => Operator::Below,
            _ => Operator::Unknown(s),
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::from(s.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> String {
        op.to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equals => f.write_str("equals"),
            Operator::NotEquals => f.write_str("not_equals"),
            Operator::Above => f.write_str("above"),
            Operator::Below => f.write_str("below"),
            Operator::Unknown(s) => f.write_str(s),
        }
    }
}

/// Literal a condition compares against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ConditionValue {
    /// The value used for comparison
    ///
    /// Boolean literals compare as their string form, so `true` matches a
    /// state of `"true"`.
    pub fn coerced(&self) -> serde_json::Value {
        match self {
            ConditionValue::Bool(b) => serde_json::Value::String(b.to_string()),
            ConditionValue::Number(n) => serde_json::Value::Number(n.clone()),
            ConditionValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::Text(s.to_string())
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Bool(b)
    }
}

impl From<i64> for ConditionValue {
    fn from(n: i64) -> Self {
        ConditionValue::Number(n.into())
    }
}

/// A single condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Operator (`equals`, `not_equals`, `above`, `below`)
    #[serde(default, skip_serializing_if = "Operator::is_missing")]
    pub condition: Operator,

    /// Literal to compare against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,

    /// Read this attribute instead of the state value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Observe this entity instead of the implicit subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Icon to use when this condition matches (icon conditions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Styles to use when this condition matches (icon conditions only)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_style_map"
    )]
    pub styles: Option<IndexMap<String, String>>,
}

impl Condition {
    /// Create a condition against the implicit subject
    pub fn new(operator: impl Into<Operator>, value: impl Into<ConditionValue>) -> Self {
        Self {
            condition: operator.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

/// `hide_if` rule: the subject is hidden when any condition matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HideIfConfig {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl HideIfConfig {
    /// Entity IDs referenced explicitly by the rule's conditions
    pub fn condition_entities(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().filter_map(|c| c.entity.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_deserialize() {
        let condition: Condition = serde_json::from_value(json!({
            "condition": "above",
            "value": 10,
            "entity": "sensor.temperature",
            "attribute": "current"
        }))
        .unwrap();

        assert_eq!(condition.condition, Operator::Above);
        assert_eq!(condition.value, Some(ConditionValue::from(10)));
        assert_eq!(condition.entity.as_deref(), Some("sensor.temperature"));
        assert_eq!(condition.attribute.as_deref(), Some("current"));
    }

    #[test]
    fn test_unknown_operator_is_kept() {
        let condition: Condition =
            serde_json::from_value(json!({"condition": "contains", "value": "x"})).unwrap();
        assert_eq!(condition.condition, Operator::Unknown("contains".to_string()));

        let missing: Condition = serde_json::from_value(json!({"value": "x"})).unwrap();
        assert!(missing.condition.is_missing());
    }

    #[test]
    fn test_null_or_non_string_operator() {
        let empty: Condition =
            serde_yaml::from_str("condition:\nvalue: 'off'\nentity: light.a\n").unwrap();
        assert!(empty.condition.is_missing());
        assert_eq!(empty.entity.as_deref(), Some("light.a"));

        let number: Condition = serde_json::from_value(json!({"condition": 5, "value": 1})).unwrap();
        assert_eq!(number.condition, Operator::Unknown("5".to_string()));

        let list: Condition = serde_json::from_value(json!({"condition": ["equals"]})).unwrap();
        assert!(matches!(list.condition, Operator::Unknown(_)));
        assert!(!list.condition.is_missing());
    }

    #[test]
    fn test_icon_condition_numeric_styles() {
        let condition: Condition = serde_json::from_value(json!({
            "condition": "equals",
            "value": "on",
            "styles": {"font-size": 12, "opacity": 0.5, "color": "red"}
        }))
        .unwrap();

        let styles = condition.styles.unwrap();
        assert_eq!(styles.get("font-size").map(String::as_str), Some("12"));
        assert_eq!(styles.get("opacity").map(String::as_str), Some("0.5"));
        assert_eq!(styles.get("color").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_boolean_value_is_coerced() {
        let value = ConditionValue::from(true);
        assert_eq!(value.coerced(), json!("true"));
        assert_eq!(ConditionValue::from(5).coerced(), json!(5));
        assert_eq!(ConditionValue::from("on").coerced(), json!("on"));
    }

    #[test]
    fn test_hide_if_condition_entities() {
        let hide_if: HideIfConfig = serde_json::from_value(json!({
            "conditions": [
                {"condition": "equals", "value": "off", "entity": "light.hall"},
                {"condition": "equals", "value": "on"}
            ]
        }))
        .unwrap();

        let entities: Vec<&str> = hide_if.condition_entities().collect();
        assert_eq!(entities, vec!["light.hall"]);
    }
}
