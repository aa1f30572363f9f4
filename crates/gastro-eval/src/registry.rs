//! Host package functions callable from frontmatter as `pkg.Func(args)`.

use gastro_types::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A host function. `Err` carries a message surfaced as a frontmatter error
/// (or bound to the second name of `v, err := pkg.F()`).
pub type PackageFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Package functions built by the embedding application and handed to each
/// [`Environment`](crate::Environment) at construction.
#[derive(Clone, Default)]
pub struct Registry {
    packages: BTreeMap<String, BTreeMap<String, PackageFn>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `package.name`.
    ///
    /// `package` is matched against the import path, its last segment, or
    /// the local alias used in the frontmatter.
    pub fn register<F>(&mut self, package: &str, name: &str, func: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.packages
            .entry(package.to_string())
            .or_default()
            .insert(name.to_string(), Arc::new(func));
        self
    }

    /// Builder form of [`Registry::register`].
    pub fn with<F>(mut self, package: &str, name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(package, name, func);
        self
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn get(&self, package: &str, name: &str) -> Option<&PackageFn> {
        self.packages.get(package)?.get(name)
    }

    /// Registered function names of `package`, sorted.
    pub fn functions(&self, package: &str) -> Vec<&str> {
        self.packages
            .get(package)
            .map(|fns| fns.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (package, fns) in &self.packages {
            map.entry(package, &fns.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}
