//! Runtime error types for the frontmatter interpreter.

use gastro_types::Diagnostics;
use thiserror::Error;

/// Frontmatter failure: a syntax error found before execution, or an
/// evaluation error at the failing statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Lexer/parser diagnostics; nothing was executed.
    #[error("syntax error: {0}")]
    Syntax(Diagnostics),
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    /// Operand or argument of the wrong type
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("division by zero")]
    DivisionByZero,
    /// A construct the grammar recognises but the interpreter does not run.
    #[error("unsupported {0}")]
    Unsupported(String),
    /// Call of something that is not `len`, a redirect, a registered
    /// package function or a host method.
    #[error("unsupported function call: {0}")]
    UnsupportedCall(String),
    #[error("invalid redirect: {0}")]
    InvalidRedirect(String),
    /// A host function or method returned an error.
    #[error("{0}")]
    Host(String),
    #[error("assignment mismatch: {names} variable(s) but {values} value(s)")]
    AssignmentMismatch { names: usize, values: usize },
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
