//! Document parser: splits a `.gastro` source into its parts.
//!
//! ```text
//! ---
//! var title = "Hi"          <- frontmatter
//! ---
//! <h1>{title}</h1>          <- template
//! <style scoped>h1{}</style> <- extracted style
//! ```
//!
//! Every malformed shape falls back to leaving text where it was:
//! an unclosed frontmatter delimiter means "no frontmatter", an unclosed
//! `<style>`/`<script>` stays in the template.

use gastro_types::{hash_content, Component, Import, Script, SourceFile, Style};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("component source is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Parse raw bytes read from a component file.
pub fn parse_bytes(bytes: &[u8]) -> Result<Component, ParseError> {
    let source = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    parse(source)
}

/// Parse a component source into a [`Component`].
///
/// Never fails on `&str` input; the `Result` keeps the signature shared with
/// [`parse_bytes`].
pub fn parse(source: &str) -> Result<Component, ParseError> {
    let file = SourceFile::new("component", source);
    let mut component = Component {
        source_hash: hash_content(source),
        ..Component::default()
    };

    let mut body_start = 0;
    if let Some(fm) = split_frontmatter(source) {
        component.frontmatter = source[fm.code_start..fm.code_end].trim().to_string();
        component.frontmatter_span = Some(file.span_of(fm.code_start, fm.code_end));
        component.imports = parse_imports(&component.frontmatter);
        body_start = fm.body_start;
    }
    component.template_span = file.span_of(body_start, source.len());

    let body = &source[body_start..];
    let (body, scripts) = extract_blocks(body, "script");
    component.scripts = scripts
        .into_iter()
        .map(|b| Script {
            is_module: b.attrs.contains("type=\"module\"") || b.attrs.contains("type='module'"),
            content: b.content,
        })
        .collect();

    let (body, styles) = extract_blocks(&body, "style");
    component.styles = styles
        .into_iter()
        .map(|b| Style {
            scoped: b.attrs.contains("scoped"),
            content: b.content,
        })
        .collect();

    component.template = body.trim().to_string();
    Ok(component)
}

// ══════════════════════════════════════════════════════════════════════════════
// Frontmatter
// ══════════════════════════════════════════════════════════════════════════════

struct FrontmatterBounds {
    code_start: usize,
    code_end: usize,
    /// Offset where the markup after the closing delimiter starts.
    body_start: usize,
}

/// Find `---\n ... \n---` at the very start of the source.
fn split_frontmatter(source: &str) -> Option<FrontmatterBounds> {
    let code_start = if source.starts_with("---\n") {
        4
    } else if source.starts_with("---\r\n") {
        5
    } else {
        return None;
    };

    let mut line_start = code_start;
    while line_start <= source.len() {
        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |i| line_start + i);
        if source[line_start..line_end].trim_end_matches('\r') == "---" {
            let body_start = (line_end + 1).min(source.len());
            return Some(FrontmatterBounds {
                code_start,
                code_end: line_start,
                body_start,
            });
        }
        if line_end == source.len() {
            break;
        }
        line_start = line_end + 1;
    }
    trace!("frontmatter opened without a closing delimiter, treating as markup");
    None
}

/// Collect import declarations from frontmatter lines.
///
/// Recognises `import "p"`, `import alias "p"`, `import alias from "p"` and
/// the lines of a grouped `import ( ... )`.
fn parse_imports(frontmatter: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut in_group = false;
    for line in frontmatter.lines() {
        let line = line.trim();
        if in_group {
            if line.starts_with(')') {
                in_group = false;
            } else if let Some(import) = parse_import_spec(line) {
                imports.push(import);
            }
            continue;
        }
        let Some(rest) = line.strip_prefix("import") else {
            continue;
        };
        let rest = rest.trim_start();
        if rest.starts_with('(') {
            let inner = rest[1..].trim();
            if let Some(import) = parse_import_spec(inner.trim_end_matches(')')) {
                imports.push(import);
            }
            in_group = !inner.contains(')');
        } else if let Some(import) = parse_import_spec(rest) {
            imports.push(import);
        }
    }
    imports
}

fn parse_import_spec(spec: &str) -> Option<Import> {
    let spec = spec.trim().trim_end_matches(';').trim();
    let quote_at = spec.find(['"', '\''])?;
    let quote = spec[quote_at..].chars().next()?;
    let path_start = quote_at + 1;
    let path_len = spec[path_start..].find(quote)?;
    let path = spec[path_start..path_start + path_len].to_string();

    let mut words = spec[..quote_at].split_whitespace();
    let alias = match (words.next(), words.next(), words.next()) {
        (None, _, _) => None,
        (Some(alias), None, None) | (Some(alias), Some("from"), None) => Some(alias.to_string()),
        _ => return None,
    };
    let is_component = alias
        .as_deref()
        .and_then(|a| a.chars().next())
        .is_some_and(char::is_uppercase);
    Some(Import {
        path,
        alias,
        is_component,
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Style / script blocks
// ══════════════════════════════════════════════════════════════════════════════

struct Block {
    attrs: String,
    content: String,
}

/// Remove every `<tag ...>content</tag>` with non-empty content and return
/// the remaining markup plus the extracted blocks in source order.
///
/// Blocks with an empty body (`<script src="app.js"></script>`) are markup,
/// not inline code, and stay in place.
fn extract_blocks(markup: &str, tag: &str) -> (String, Vec<Block>) {
    let open_prefix = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(markup.len());
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = markup[cursor..].find(&open_prefix) {
        let open_at = cursor + rel;
        let after_name = open_at + open_prefix.len();
        let next = markup[after_name..].chars().next();
        if !matches!(next, Some(c) if c == '>' || c.is_whitespace()) {
            // `<styles>` or `<scripting>`: not ours
            out.push_str(&markup[cursor..after_name]);
            cursor = after_name;
            continue;
        }
        let Some(gt) = markup[after_name..].find('>') else {
            break;
        };
        let content_start = after_name + gt + 1;
        let Some(close_rel) = markup[content_start..].find(&close) else {
            trace!(tag, "unclosed block left in template");
            break;
        };
        let content_end = content_start + close_rel;
        let raw = &markup[content_start..content_end];
        let block_end = content_end + close.len();

        if raw.trim().is_empty() {
            out.push_str(&markup[cursor..block_end]);
        } else {
            out.push_str(&markup[cursor..open_at]);
            blocks.push(Block {
                attrs: markup[after_name..after_name + gt].trim().to_string(),
                content: raw.trim().to_string(),
            });
        }
        cursor = block_end;
    }
    out.push_str(&markup[cursor..]);
    (out, blocks)
}
