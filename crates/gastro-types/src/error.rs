use crate::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of syntax errors kept before the rest are only counted.
pub const MAX_ERRORS: usize = 20;

/// A structured frontmatter syntax error.
///
/// Carries the offending source line so an editor or error page can render
/// context without re-reading the file.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{span}: {message}")]
pub struct SyntaxError {
    /// Human-readable error message.
    pub message: String,
    /// Source location inside the frontmatter block.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, source_line: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Syntax errors collected by the lexer and parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<SyntaxError>,
    pub total_errors: usize,
}

impl Diagnostics {
    /// Create an empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// `true` once [`MAX_ERRORS`] have been recorded.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push(&mut self, error: SyntaxError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append every error from `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        let overflow = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push(error);
        }
        self.total_errors += overflow;
    }

    pub fn first(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("; "))?;
        if self.total_errors > self.errors.len() {
            write!(f, " (and {} more)", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}
