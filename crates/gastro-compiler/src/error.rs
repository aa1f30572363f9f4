//! Resolver and compiler errors.

use gastro_eval::EvalError;
use gastro_parser::ParseError;
use gastro_template::RenderError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to map a component tag or import to a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("component {name} not found in {}", base_dir.display())]
    NotFound { name: String, base_dir: PathBuf },

    #[error("relative import {path} requires current file context")]
    NoCurrentFile { path: String },

    #[error("import path not found: {}", path.display())]
    ImportNotFound { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{}: {source}", path.display())]
    Eval {
        path: PathBuf,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("component nesting deeper than {max} levels at {}", path.display())]
    DepthExceeded { max: usize, path: PathBuf },
}

pub type CompileResult<T> = Result<T, CompileError>;
