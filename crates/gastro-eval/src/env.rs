//! Per-render binding context for frontmatter and templates.

use crate::Registry;
use gastro_types::{HostObject, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Redirect requested by frontmatter. Terminal for the render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub url: String,
    pub status: u16,
}

/// Variables, props, slots and redirect state of one component instance.
///
/// A fresh environment is built for every component render. The host
/// [`Registry`] and the request-scoped values (`Request`, `Locals`) are the
/// only parts carried from a page into its descendants.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: BTreeMap<String, Value>,
    props: BTreeMap<String, Value>,
    slots: BTreeMap<String, String>,
    redirect: Option<Redirect>,
    /// Local package name -> import path, recorded by `import` statements.
    imports: BTreeMap<String, String>,
    registry: Arc<Registry>,
    request: Option<Value>,
    locals: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Fresh environment for a nested component: same registry, request and
    /// locals, nothing else.
    pub fn descendant(&self) -> Self {
        let mut env = Self::with_registry(Arc::clone(&self.registry));
        if let Some(request) = &self.request {
            env.request = Some(request.clone());
            env.variables.insert("Request".into(), request.clone());
        }
        if !self.locals.is_empty() {
            env.set_locals(self.locals.clone());
        }
        env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Variables ──

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    /// Remove a binding, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    // ── Props ──

    pub fn get_prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn set_prop(&mut self, name: &str, value: Value) {
        self.props.insert(name.to_string(), value);
    }

    pub fn props(&self) -> &BTreeMap<String, Value> {
        &self.props
    }

    /// Bind every prop both as a prop and as a variable.
    pub fn merge_props(&mut self, props: BTreeMap<String, Value>) {
        for (name, value) in props {
            self.variables.insert(name.clone(), value.clone());
            self.props.insert(name, value);
        }
    }

    // ── Slots ──

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    pub fn set_slots(&mut self, slots: BTreeMap<String, String>) {
        self.slots = slots;
    }

    pub fn slots(&self) -> &BTreeMap<String, String> {
        &self.slots
    }

    // ── Redirect ──

    pub fn redirect(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    pub fn is_redirected(&self) -> bool {
        self.redirect.is_some()
    }

    pub fn set_redirect(&mut self, url: impl Into<String>, status: u16) {
        self.redirect = Some(Redirect {
            url: url.into(),
            status,
        });
    }

    pub fn take_redirect(&mut self) -> Option<Redirect> {
        self.redirect.take()
    }

    // ── Imports ──

    pub fn import_package(&mut self, local_name: &str, path: &str) {
        self.imports.insert(local_name.to_string(), path.to_string());
    }

    /// Import path recorded for a local package name.
    pub fn package_path(&self, local_name: &str) -> Option<&str> {
        self.imports.get(local_name).map(String::as_str)
    }

    // ── Request scope ──

    /// Bind the incoming request as `Request`.
    pub fn set_request(&mut self, request: impl HostObject + 'static) {
        let value = Value::opaque(request);
        self.variables.insert("Request".into(), value.clone());
        self.request = Some(value);
    }

    pub fn request(&self) -> Option<&Value> {
        self.request.as_ref()
    }

    /// Bind request-scoped data as `Locals` (also reachable as `Gastro.Locals`).
    pub fn set_locals(&mut self, locals: BTreeMap<String, Value>) {
        self.variables
            .insert("Locals".into(), Value::Map(locals.clone()));
        self.locals = locals;
    }

    pub fn locals(&self) -> &BTreeMap<String, Value> {
        &self.locals
    }

    /// Bind route parameters individually and as the `Params` map.
    pub fn set_params(&mut self, params: BTreeMap<String, String>) {
        let mut map = BTreeMap::new();
        for (name, value) in params {
            self.variables.insert(name.clone(), Value::from(value.as_str()));
            map.insert(name, Value::String(value));
        }
        self.variables.insert("Params".into(), Value::Map(map));
    }
}
