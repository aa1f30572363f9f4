//! gastro frontmatter interpreter.
//!
//! Executes a component's frontmatter against an [`Environment`], binding
//! variables for the template and possibly signalling a redirect.

mod env;
mod error;
mod interpreter;
mod registry;
mod request;

pub use env::{Environment, Redirect};
pub use error::{EvalError, EvalResult};
pub use interpreter::Interpreter;
pub use registry::{PackageFn, Registry};
pub use request::Request;

use gastro_parser::parse_frontmatter;

/// Parse and execute frontmatter code against `env`.
///
/// A syntax error aborts before any statement runs. An evaluation error
/// aborts at the failing statement, leaving earlier bindings in place.
pub fn execute(code: &str, env: &mut Environment) -> EvalResult<()> {
    if code.trim().is_empty() {
        return Ok(());
    }
    let program = parse_frontmatter(code)
        .into_result()
        .map_err(EvalError::Syntax)?;
    Interpreter::new(env).run(&program)
}
