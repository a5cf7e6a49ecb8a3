//! Template resolution for the room card
//!
//! Two kinds of templating feed the entity view model:
//! - named templates declared under `templates` and merged into entity
//!   descriptors ([`map_template`])
//! - inline snippets (`{template: "..."}`) evaluated against live state by
//!   the sandboxed [`TemplateEngine`] with context `{states, entity, user, hass}`

pub mod engine;
pub mod error;
mod functions;
pub mod merge;
pub mod states;

pub use engine::{parse_css, value_to_string, EvalContext, TemplateEngine};
pub use error::{truncate_snippet, TemplateError, TemplateResult, TEMPLATE_ERROR_NAME};
pub use merge::{map_template, resolve_entity_config};
pub use states::{StateWrapper, StatesObject};

pub use minijinja::Value;
