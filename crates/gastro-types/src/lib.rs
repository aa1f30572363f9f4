//! Shared types for the gastro rendering pipeline.
//!
//! This crate defines the dynamic [`Value`] model, the frontmatter AST,
//! the parsed [`Component`] shape, source spans and syntax diagnostics
//! used across all pipeline stages.

mod component;
mod error;
mod span;
mod value;
pub mod ast;

pub use component::{hash_content, Component, Import, Script, Style};
pub use error::{Diagnostics, SyntaxError, MAX_ERRORS};
pub use span::{SourceFile, Span};
pub use value::{HostObject, RequestInfo, Value};
