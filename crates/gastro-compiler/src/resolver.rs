//! Component Resolver: maps a component tag name to its source file.
//!
//! [`ComponentIndex`] is built once per compiler by scanning the base
//! directory; a [`Resolver`] is created per rendered component and carries
//! that component's file path and explicit imports.

use crate::config::CompilerConfig;
use crate::error::{CompileError, ResolveError};
use gastro_types::Component;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

// ══════════════════════════════════════════════════════════════════════════════
// Index
// ══════════════════════════════════════════════════════════════════════════════

/// Component name → file path, for every component file under the base
/// directory outside excluded and hidden directories.
#[derive(Debug, Clone, Default)]
pub struct ComponentIndex {
    paths: HashMap<String, PathBuf>,
}

impl ComponentIndex {
    /// Scan `config.base_dir`. Directory entries are visited in file-name
    /// order, so the first of several same-named components is stable.
    pub fn build(config: &CompilerConfig) -> Result<Self, CompileError> {
        let mut files = Vec::new();
        let entries = sorted_entries(config.base_dir()).map_err(|source| CompileError::Io {
            path: config.base_dir.clone(),
            source,
        })?;
        collect_components(config, entries, &mut files);

        let mut paths = HashMap::new();
        for path in files {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if paths.contains_key(name) {
                trace!(name, path = %path.display(), "duplicate component ignored");
                continue;
            }
            paths.insert(name.to_string(), path);
        }
        debug!(base_dir = %config.base_dir.display(), components = paths.len(), "component index built");
        Ok(Self { paths })
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Indexed component names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.paths.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}

/// Depth-first, skipping excluded and hidden directories. Unreadable
/// subdirectories are skipped.
fn collect_components(config: &CompilerConfig, entries: Vec<PathBuf>, files: &mut Vec<PathBuf>) {
    for path in entries {
        if path.is_dir() {
            let excluded = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |name| config.is_excluded_dir(name));
            if excluded {
                continue;
            }
            if let Ok(children) = sorted_entries(&path) {
                collect_components(config, children, files);
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(config.extension.as_str()) {
            files.push(path);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Resolver
// ══════════════════════════════════════════════════════════════════════════════

/// Resolves tag names for one component instance.
///
/// Order: memoized result, explicit import, index, then a sibling file next
/// to the current file.
#[derive(Debug)]
pub struct Resolver {
    config: Arc<CompilerConfig>,
    index: Arc<ComponentIndex>,
    current_file: Option<PathBuf>,
    explicit: HashMap<String, String>,
    resolved: HashMap<String, PathBuf>,
}

impl Resolver {
    pub fn new(config: Arc<CompilerConfig>, index: Arc<ComponentIndex>) -> Self {
        Self {
            config,
            index,
            current_file: None,
            explicit: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// A resolver for tags found in `component`, loaded from `path`.
    pub fn for_component(
        config: Arc<CompilerConfig>,
        index: Arc<ComponentIndex>,
        component: &Component,
        path: Option<&Path>,
    ) -> Self {
        let mut resolver = Self::new(config, index);
        resolver.current_file = path.map(Path::to_path_buf);
        for import in component.component_imports() {
            if let Some(alias) = &import.alias {
                resolver.add_import(alias, &import.path);
            }
        }
        resolver
    }

    pub fn with_current_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.current_file = Some(path.into());
        self
    }

    /// Map `alias` to an import path, overriding the index.
    pub fn add_import(&mut self, alias: &str, path: &str) {
        self.explicit.insert(alias.to_string(), path.to_string());
    }

    pub fn resolve(&mut self, name: &str) -> Result<PathBuf, ResolveError> {
        if let Some(path) = self.resolved.get(name) {
            return Ok(path.clone());
        }
        let path = self.locate(name)?;
        self.resolved.insert(name.to_string(), path.clone());
        Ok(path)
    }

    fn locate(&self, name: &str) -> Result<PathBuf, ResolveError> {
        if let Some(import) = self.explicit.get(name) {
            let path = self.resolve_import_path(import)?;
            debug!(name, path = %path.display(), "resolved through import");
            return Ok(path);
        }
        if let Some(path) = self.index.get(name) {
            trace!(name, path = %path.display(), "resolved through index");
            return Ok(path.to_path_buf());
        }
        if let Some(dir) = self.current_dir() {
            let sibling = dir.join(self.config.file_name(name));
            if sibling.is_file() {
                trace!(name, path = %sibling.display(), "resolved as sibling");
                return Ok(sibling);
            }
        }
        Err(ResolveError::NotFound {
            name: name.to_string(),
            base_dir: self.config.base_dir.clone(),
        })
    }

    /// `./x` and `../x` are relative to the current file, the root alias and
    /// bare paths to the base directory. The target must exist.
    pub fn resolve_import_path(&self, import: &str) -> Result<PathBuf, ResolveError> {
        let path = if import.starts_with("./") || import.starts_with("../") {
            let dir = self.current_dir().ok_or_else(|| ResolveError::NoCurrentFile {
                path: import.to_string(),
            })?;
            dir.join(import)
        } else if let Some(rest) = import.strip_prefix(self.config.root_alias.as_str()) {
            self.config.base_dir.join(rest)
        } else {
            self.config.base_dir.join(import)
        };
        if path.exists() {
            Ok(path)
        } else {
            Err(ResolveError::ImportNotFound { path })
        }
    }

    fn current_dir(&self) -> Option<&Path> {
        self.current_file.as_deref().and_then(Path::parent)
    }
}
