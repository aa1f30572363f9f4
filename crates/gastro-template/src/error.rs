use thiserror::Error;

/// A directive or slot the engine could not apply.
///
/// Never surfaced by [`render`](crate::render): the offending element is left
/// in the output unchanged and the error is logged at `debug` level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("<{tag}> has no matching closing tag")]
    Unclosed { tag: String },
    #[error("empty {directive} condition on <{tag}>")]
    EmptyDirective { directive: &'static str, tag: String },
    #[error("malformed loop '{expr}', expected 'item in list'")]
    MalformedLoop { expr: String },
    #[error("loop source '{name}' is not a list")]
    NotAList { name: String },
}
