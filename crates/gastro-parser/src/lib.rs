//! gastro parser.
//!
//! Two layers: [`parse`] splits a `.gastro` document into frontmatter,
//! template, styles, scripts and imports; [`Parser`] turns frontmatter
//! tokens into an AST.

mod document;
mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use document::{parse, parse_bytes, ParseError};
pub use parser::{parse_frontmatter, ParseResult, Parser};
