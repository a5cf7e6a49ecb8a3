//! Template engine for card snippets
//!
//! Snippets are user-authored and run against live state, so they are
//! evaluated by an embedded, sandboxed minijinja environment: no I/O, no
//! host access, and a bounded amount of work per evaluation.

use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::value::Value;
use minijinja::{context, Environment};
use room_card_config::{StylesSpec, TextOrTemplate};
use room_card_core::{EntityState, Hass};
use tracing::{debug, trace};

use crate::error::{TemplateError, TemplateResult};
use crate::functions;
use crate::states::{state_to_value, StatesObject};

/// Instruction budget for one evaluation
const MAX_FUEL: u64 = 50_000;

/// Everything a snippet can see: `{states, entity, user, hass}`
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub hass: &'a Hass,
    /// State of the entity the snippet belongs to, if loaded
    pub entity: Option<&'a Arc<EntityState>>,
}

impl<'a> EvalContext<'a> {
    pub fn new(hass: &'a Hass, entity: Option<&'a Arc<EntityState>>) -> Self {
        Self { hass, entity }
    }

    fn to_value(self) -> Value {
        let states = Value::from_object(StatesObject::new(self.hass.states.clone()));
        let user = self
            .hass
            .user
            .as_ref()
            .map(Value::from_serialize)
            .unwrap_or(Value::from(()));
        let entity = self
            .entity
            .cloned()
            .map(state_to_value)
            .unwrap_or(Value::UNDEFINED);
        let hass = context! {
            states => states.clone(),
            user => user.clone(),
        };

        context! { states, entity, user, hass }
    }
}

/// Sandboxed evaluator for inline templates
///
/// A snippet containing `{{` or `{%` is rendered as a template and yields a
/// string; anything else is evaluated as a single expression and yields
/// whatever value the expression produces.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_fuel(Some(MAX_FUEL));

        env.add_filter("float", functions::to_float);
        env.add_filter("int", functions::to_int);

        env.add_function("is_state", functions::is_state);
        env.add_function("state_attr", functions::state_attr);
        env.add_function("has_value", functions::has_value);
        env.add_function("iif", functions::iif);

        Self { env }
    }

    /// Check if a snippet uses template block syntax
    pub fn is_template(snippet: &str) -> bool {
        snippet.contains("{{") || snippet.contains("{%")
    }

    /// Evaluate a snippet and return its value
    pub fn evaluate(&self, snippet: &str, ctx: EvalContext<'_>) -> TemplateResult<Value> {
        trace!(snippet, "Evaluating template");
        let context = ctx.to_value();

        let result = if Self::is_template(snippet) {
            self.env.render_str(snippet, context).map(Value::from)
        } else {
            self.env
                .compile_expression(snippet)
                .and_then(|expr| expr.eval(context))
        };

        result.map_err(|err| {
            let err = TemplateError::evaluation(&err, snippet);
            debug!(error = %err, "Template evaluation failed");
            err
        })
    }

    /// Evaluate a snippet and format the result for display
    ///
    /// `none` and undefined results display as an empty string.
    pub fn evaluate_string(&self, snippet: &str, ctx: EvalContext<'_>) -> TemplateResult<String> {
        let value = self.evaluate(snippet, ctx)?;
        Ok(value_to_string(&value))
    }

    /// Resolve a literal-or-templated text field
    pub fn render_text(&self, text: &TextOrTemplate, ctx: EvalContext<'_>) -> TemplateResult<String> {
        match text {
            TextOrTemplate::Text(s) => Ok(s.clone()),
            TextOrTemplate::Template(spec) => self.evaluate_string(&spec.template, ctx),
        }
    }

    /// Resolve a style map or style template into CSS properties
    ///
    /// A template may produce a mapping or a CSS declaration string such as
    /// `color: red; font-size: 12px`.
    pub fn render_styles(
        &self,
        styles: &StylesSpec,
        ctx: EvalContext<'_>,
    ) -> TemplateResult<IndexMap<String, String>> {
        match styles {
            StylesSpec::Map(map) => Ok(map.clone()),
            StylesSpec::Template(spec) => {
                let value = self.evaluate(&spec.template, ctx)?;
                Ok(value_to_styles(&value))
            }
        }
    }
}

/// Display form of a template result
pub fn value_to_string(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        return String::new();
    }
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn value_to_styles(value: &Value) -> IndexMap<String, String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect(),
        Ok(serde_json::Value::String(css)) => parse_css(&css),
        _ => IndexMap::new(),
    }
}

/// Split `prop: value; prop: value` into a property map
pub fn parse_css(css: &str) -> IndexMap<String, String> {
    css.split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(prop, value)| (prop.trim().to_string(), value.trim().to_string()))
        .filter(|(prop, _)| !prop.is_empty())
        .collect()
}
