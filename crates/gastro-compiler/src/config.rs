//! Compiler configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings shared by the resolver and the compiler.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```json
/// { "base_dir": "site", "max_depth": 16 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Root directory searched for components.
    pub base_dir: PathBuf,
    /// Component file extension, without the dot.
    pub extension: String,
    /// Directory names skipped by the component index. Hidden directories
    /// are always skipped.
    pub excluded_dirs: Vec<String>,
    /// Deepest allowed component nesting.
    pub max_depth: usize,
    /// Import prefix that resolves against `base_dir`.
    pub root_alias: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            extension: "gastro".into(),
            excluded_dirs: ["pages", "node_modules", "vendor", "target"]
                .map(String::from)
                .to_vec(),
            max_depth: 32,
            root_alias: "@/".into(),
        }
    }
}

impl CompilerConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `name` plus the component extension.
    pub fn file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.extension)
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded_dirs.iter().any(|d| d == name)
    }
}
