//! gastro component compiler.
//!
//! ```text
//! .gastro file → Document Parser → Frontmatter Interpreter → nested components → Template Engine → HTML
//! ```
//!
//! [`Compiler`] owns the parse cache and the component index; every render
//! returns its markup together with the styles, scripts and redirect state
//! gathered from the whole component tree.

mod compiler;
mod config;
mod error;
mod resolver;

pub use compiler::{Compiler, RenderOutput};
pub use config::CompilerConfig;
pub use error::{CompileError, CompileResult, ResolveError};
pub use resolver::{ComponentIndex, Resolver};
