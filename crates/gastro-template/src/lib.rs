//! gastro template engine.
//!
//! Renders component markup against an [`Environment`](gastro_eval::Environment)
//! in three fixed passes: `if`/`for` directives, `<slot>` placeholders, then
//! `{expr}` interpolation. Every malformed shape is left in place.

pub mod attrs;
pub mod engine;
pub mod error;
pub mod scanner;

pub use attrs::{parse_attributes, AttrValue, Attribute};
pub use engine::{interpolate, lookup, render};
pub use error::RenderError;
pub use scanner::{find_matching_close, Event, Scanner, Tag};
