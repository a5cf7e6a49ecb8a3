//! Error types for template evaluation

use thiserror::Error;

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Name every evaluation failure is reported under
pub const TEMPLATE_ERROR_NAME: &str = "RoomCardTemplateError";

/// Longest snippet quoted verbatim in an error message
const MAX_SNIPPET_LEN: usize = 100;

/// Errors that can occur while resolving templates
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// A snippet failed to compile or evaluate
    ///
    /// `kind` names the underlying failure (`SyntaxError`,
    /// `UndefinedError`, ...); `snippet` is already truncated.
    #[error("RoomCardTemplateError: {kind}: {message} in '{snippet}'")]
    Evaluation {
        kind: String,
        message: String,
        snippet: String,
    },

    /// An entity refers to a named template that is not declared
    #[error("unknown template '{name}'")]
    UnknownTemplate { name: String },

    /// A named template could not be merged into an entity descriptor
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },
}

impl TemplateError {
    /// Wrap an engine failure with the snippet that caused it
    pub fn evaluation(err: &minijinja::Error, snippet: &str) -> Self {
        TemplateError::Evaluation {
            kind: format!("{:?}", err.kind()),
            message: err
                .detail()
                .map(String::from)
                .unwrap_or_else(|| err.kind().to_string()),
            snippet: truncate_snippet(snippet),
        }
    }
}

/// Shorten a snippet for display in an error message
///
/// The snippet is trimmed; snippets longer than 100 characters keep their
/// first 98 characters followed by `...`.
pub fn truncate_snippet(snippet: &str) -> String {
    let trimmed = snippet.trim();
    if snippet.chars().count() <= MAX_SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut short: String = trimmed.chars().take(MAX_SNIPPET_LEN - 2).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_snippet_is_trimmed() {
        assert_eq!(truncate_snippet("  states('a')  "), "states('a')");
    }

    #[test]
    fn test_long_snippet_is_truncated() {
        let snippet = "x".repeat(150);
        let short = truncate_snippet(&snippet);
        assert_eq!(short.len(), 101);
        assert!(short.ends_with("..."));
        assert_eq!(&short[..98], &snippet[..98]);
    }

    #[test]
    fn test_exactly_one_hundred_chars_is_kept() {
        let snippet = "y".repeat(100);
        assert_eq!(truncate_snippet(&snippet), snippet);
    }

    #[test]
    fn test_evaluation_display() {
        let err = TemplateError::Evaluation {
            kind: "SyntaxError".to_string(),
            message: "unexpected end of input".to_string(),
            snippet: "states(".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "RoomCardTemplateError: SyntaxError: unexpected end of input in 'states('"
        );
        assert!(err.to_string().starts_with(TEMPLATE_ERROR_NAME));
    }
}
