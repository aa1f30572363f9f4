//! Component Compiler: load, execute, expand nested components, render.
//!
//! ```text
//! load (cached) → collect styles/scripts → frontmatter → <Child/> expansion → template
//! ```
//!
//! Each component instance gets its own [`Environment`] and [`Resolver`].
//! Styles and scripts gathered across the tree, plus the page's own redirect,
//! travel in a per-call accumulator and come back in the [`RenderOutput`], so
//! one `Compiler` can serve concurrent renders. A child that redirects renders
//! as empty markup.

use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};
use crate::resolver::{ComponentIndex, Resolver};
use gastro_eval::{Environment, Redirect, Registry};
use gastro_parser::parse_bytes;
use gastro_template::{find_matching_close, interpolate, lookup, parse_attributes};
use gastro_template::{AttrValue, Event, Scanner, Tag};
use gastro_types::{Component, Script, Style, Value};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

// ══════════════════════════════════════════════════════════════════════════════
// Output
// ══════════════════════════════════════════════════════════════════════════════

/// Result of rendering a component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOutput {
    /// Rendered markup; empty when `redirect` is set.
    pub html: String,
    /// Styles of every rendered component, de-duplicated by content, in
    /// first-seen order.
    pub styles: Vec<Style>,
    pub scripts: Vec<Script>,
    pub redirect: Option<Redirect>,
}

impl RenderOutput {
    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}

#[derive(Debug, Default)]
struct Collected {
    styles: Vec<Style>,
    scripts: Vec<Script>,
    seen_styles: HashSet<String>,
    seen_scripts: HashSet<String>,
    redirect: Option<Redirect>,
}

impl Collected {
    fn add(&mut self, component: &Component) {
        for style in &component.styles {
            if self.seen_styles.insert(style.hash()) {
                self.styles.push(style.clone());
            }
        }
        for script in &component.scripts {
            if self.seen_scripts.insert(script.hash()) {
                self.scripts.push(script.clone());
            }
        }
    }

    fn finish(self, html: String) -> RenderOutput {
        let html = if self.redirect.is_some() { String::new() } else { html };
        RenderOutput {
            html,
            styles: self.styles,
            scripts: self.scripts,
            redirect: self.redirect,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Compiler {
    config: Arc<CompilerConfig>,
    index: Arc<ComponentIndex>,
    registry: Arc<Registry>,
    cache: RwLock<HashMap<PathBuf, Arc<Component>>>,
}

impl Compiler {
    /// Build a compiler, indexing the components under `config.base_dir`.
    pub fn new(config: CompilerConfig) -> CompileResult<Self> {
        let index = ComponentIndex::build(&config)?;
        Ok(Self {
            config: Arc::new(config),
            index: Arc::new(index),
            registry: Arc::new(Registry::new()),
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Host packages available to every component rendered by [`compile`](Self::compile).
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn index(&self) -> &ComponentIndex {
        &self.index
    }

    /// A fresh environment carrying this compiler's registry.
    pub fn environment(&self) -> Environment {
        Environment::with_registry(Arc::clone(&self.registry))
    }

    /// Parse `path`, or return the cached parse.
    pub fn load(&self, path: &Path) -> CompileResult<Arc<Component>> {
        if let Some(component) = self.cache.read().get(path) {
            trace!(path = %path.display(), "component cache hit");
            return Ok(Arc::clone(component));
        }
        let bytes = fs::read(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let component = parse_bytes(&bytes).map_err(|source| CompileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            styles = component.styles.len(),
            scripts = component.scripts.len(),
            "component loaded"
        );
        let mut cache = self.cache.write();
        let entry = cache
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(component));
        Ok(Arc::clone(entry))
    }

    /// Load and render the component at `path`.
    pub fn compile(
        &self,
        path: &Path,
        props: BTreeMap<String, Value>,
        slots: BTreeMap<String, String>,
    ) -> CompileResult<RenderOutput> {
        let component = self.load(path)?;
        self.render(&component, Some(path), self.environment(), props, slots)
    }

    /// Render a top-level page with a caller-seeded environment (request,
    /// locals, route params). Request and locals reach every descendant.
    pub fn compile_page(&self, path: &Path, env: Environment) -> CompileResult<RenderOutput> {
        let component = self.load(path)?;
        self.render(&component, Some(path), env, BTreeMap::new(), BTreeMap::new())
    }

    /// Render an already-parsed component. `origin` is the file it came
    /// from, used for relative imports and sibling lookup.
    pub fn render(
        &self,
        component: &Component,
        origin: Option<&Path>,
        mut env: Environment,
        props: BTreeMap<String, Value>,
        slots: BTreeMap<String, String>,
    ) -> CompileResult<RenderOutput> {
        let mut collected = Collected::default();
        let html = self.render_instance(component, origin, &mut env, props, slots, 0, &mut collected)?;
        Ok(collected.finish(html))
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Drop the cached parse of `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.cache.write().remove(path).is_some()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    // ── Rendering ──

    #[allow(clippy::too_many_arguments)]
    fn render_instance(
        &self,
        component: &Component,
        origin: Option<&Path>,
        env: &mut Environment,
        props: BTreeMap<String, Value>,
        slots: BTreeMap<String, String>,
        depth: usize,
        collected: &mut Collected,
    ) -> CompileResult<String> {
        if depth > self.config.max_depth {
            return Err(CompileError::DepthExceeded {
                max: self.config.max_depth,
                path: display_path(origin),
            });
        }
        collected.add(component);
        env.merge_props(props);

        gastro_eval::execute(&component.frontmatter, env).map_err(|source| CompileError::Eval {
            path: display_path(origin),
            source,
        })?;
        if let Some(redirect) = env.take_redirect() {
            if depth == 0 {
                debug!(url = %redirect.url, status = redirect.status, "render stopped by redirect");
                collected.redirect = Some(redirect);
            } else {
                debug!(url = %redirect.url, depth, "child redirect ignored, child renders empty");
            }
            return Ok(String::new());
        }

        let mut resolver = Resolver::for_component(
            Arc::clone(&self.config),
            Arc::clone(&self.index),
            component,
            origin,
        );
        let html = self.expand_components(&component.template, env, &mut resolver, depth, collected);
        Ok(gastro_template::render(&html, env, None, Some(slots))?)
    }

    /// Replace every capitalized tag (`<Card .../>`, `<Card>...</Card>`) with
    /// the rendered child component.
    fn expand_components(
        &self,
        src: &str,
        env: &Environment,
        resolver: &mut Resolver,
        depth: usize,
        collected: &mut Collected,
    ) -> String {
        let mut out = String::with_capacity(src.len());
        let mut copied = 0;
        let mut scanner = Scanner::new(src);
        while let Some(event) = scanner.next() {
            let Event::Open(tag) = event else {
                continue;
            };
            if !is_component_tag(tag.name) {
                continue;
            }
            let (inner, end) = if tag.self_closing {
                ("", tag.end)
            } else if let Some(close) = find_matching_close(src, &tag) {
                (&src[tag.end..close.start], close.end)
            } else {
                trace!(tag = tag.name, "unclosed component tag left as markup");
                continue;
            };
            out.push_str(&src[copied..tag.start]);
            out.push_str(&self.render_child(&tag, inner, env, resolver, depth, collected));
            copied = end;
            scanner.seek(end);
        }
        out.push_str(&src[copied..]);
        out
    }

    /// A failing child becomes an HTML comment instead of failing the page.
    fn render_child(
        &self,
        tag: &Tag<'_>,
        inner: &str,
        env: &Environment,
        resolver: &mut Resolver,
        depth: usize,
        collected: &mut Collected,
    ) -> String {
        match self.try_render_child(tag, inner, env, resolver, depth, collected) {
            Ok(html) => html,
            Err(err) => {
                warn!(component = tag.name, %err, "component render failed");
                error_comment(tag.name, &err)
            }
        }
    }

    fn try_render_child(
        &self,
        tag: &Tag<'_>,
        inner: &str,
        env: &Environment,
        resolver: &mut Resolver,
        depth: usize,
        collected: &mut Collected,
    ) -> CompileResult<String> {
        let path = resolver.resolve(tag.name)?;
        let props = props_from_attrs(tag.attrs, env);

        let mut slots = BTreeMap::new();
        let content = inner.trim();
        if !content.is_empty() {
            let content = self.expand_components(content, env, resolver, depth, collected);
            slots.insert("default".to_string(), interpolate(&content, env));
        }

        let component = self.load(&path)?;
        let mut child_env = env.descendant();
        self.render_instance(
            &component,
            Some(&path),
            &mut child_env,
            props,
            slots,
            depth + 1,
            collected,
        )
    }
}

/// Tags starting with an uppercase ASCII letter name components.
fn is_component_tag(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// `{expr}` is looked up in the parent scope and falls back to its own text;
/// quoted values are strings; a bare attribute is `true`.
fn props_from_attrs(attrs: &str, env: &Environment) -> BTreeMap<String, Value> {
    parse_attributes(attrs)
        .into_iter()
        .map(|attr| {
            let value = match attr.value {
                AttrValue::Expr(expr) => lookup(env, &expr).unwrap_or(Value::String(expr)),
                AttrValue::Literal(text) => Value::String(text),
                AttrValue::Flag => Value::Bool(true),
            };
            (attr.name, value)
        })
        .collect()
}

/// `--` is not allowed inside an HTML comment, so it is broken up in the
/// message.
fn error_comment(name: &str, err: &dyn std::fmt::Display) -> String {
    let message = err.to_string().replace("--", "- -");
    format!("<!-- Error rendering {name}: {message} -->")
}

fn display_path(origin: Option<&Path>) -> PathBuf {
    origin.map_or_else(|| PathBuf::from("<inline>"), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_component_tag_names() {
        assert!(is_component_tag("Card"));
        assert!(is_component_tag("UserCard"));
        assert!(!is_component_tag("card"));
        assert!(!is_component_tag("div"));
    }

    #[test]
    fn test_props_from_attrs() {
        let mut env = Environment::new();
        env.set("post", Value::Map(BTreeMap::from([("title".to_string(), Value::from("Hello"))])));
        let props = props_from_attrs(r#" title={post.title} missing={nope} kind="card" wide"#, &env);
        assert_eq!(
            props,
            BTreeMap::from([
                ("kind".to_string(), Value::from("card")),
                ("missing".to_string(), Value::from("nope")),
                ("title".to_string(), Value::from("Hello")),
                ("wide".to_string(), Value::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_collected_dedupes_by_content() {
        let style = Style {
            content: "p{}".into(),
            scoped: false,
        };
        let component = Component {
            styles: vec![style.clone(), style.clone()],
            ..Component::default()
        };
        let mut collected = Collected::default();
        collected.add(&component);
        collected.add(&component);
        assert_eq!(collected.styles, vec![style]);
    }

    #[test]
    fn test_error_comment_cannot_close_early() {
        let comment = error_comment("Card", &"bad --> <script>x</script> ---");
        assert_eq!(comment, "<!-- Error rendering Card: bad - -> <script>x</script> - -- -->");
        assert_eq!(comment.matches("-->").count(), 1);
        assert!(comment.ends_with(" -->"));
    }

    #[test]
    fn test_redirect_clears_html() {
        let collected = Collected {
            redirect: Some(Redirect {
                url: "/login".into(),
                status: 302,
            }),
            ..Collected::default()
        };
        let output = collected.finish("<p>partial</p>".into());
        assert!(output.is_redirect());
        assert_eq!(output.html, "");
    }
}
