//! Template rendering: directives, then slots, then interpolation.

use crate::attrs::{parse_attributes, strip_range, AttrValue, Attribute};
use crate::error::RenderError;
use crate::scanner::{find_matching_close, Event, Scanner, Tag};
use gastro_eval::Environment;
use gastro_types::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Render `template` against `env`.
///
/// `props` are merged into both the variables and the props of `env`;
/// `slots`, when given, replace the environment's slots. Malformed
/// directives, slots and expressions are left in the output as written, so
/// this currently always returns `Ok`.
pub fn render(
    template: &str,
    env: &mut Environment,
    props: Option<BTreeMap<String, Value>>,
    slots: Option<BTreeMap<String, String>>,
) -> Result<String, RenderError> {
    if let Some(props) = props {
        env.merge_props(props);
    }
    if let Some(slots) = slots {
        env.set_slots(slots);
    }
    let html = render_directives(template, env);
    let html = render_slots(&html, env);
    Ok(interpolate(&html, env))
}

// ══════════════════════════════════════════════════════════════════════════════
// Directives
// ══════════════════════════════════════════════════════════════════════════════

fn render_directives(src: &str, env: &mut Environment) -> String {
    let mut out = String::with_capacity(src.len());
    let mut copied = 0;
    let mut scanner = Scanner::new(src);
    while let Some(event) = scanner.next() {
        let Event::Open(tag) = event else {
            continue;
        };
        let attrs = parse_attributes(tag.attrs);
        let Some((attr, expr)) = find_directive(&attrs) else {
            continue;
        };
        match apply_directive(src, &tag, attr, expr, env) {
            Ok((replacement, end)) => {
                out.push_str(&src[copied..tag.start]);
                out.push_str(&replacement);
                copied = end;
                scanner.seek(end);
            }
            Err(err) => debug!(%err, tag = tag.name, "directive left unchanged"),
        }
    }
    out.push_str(&src[copied..]);
    out
}

/// The `if={...}` attribute of a tag, else its `for={...}`.
fn find_directive(attrs: &[Attribute]) -> Option<(&Attribute, &str)> {
    ["if", "for"].into_iter().find_map(|directive| {
        attrs.iter().find_map(|attr| match &attr.value {
            AttrValue::Expr(expr) if attr.name == directive => Some((attr, expr.as_str())),
            _ => None,
        })
    })
}

/// Returns the replacement markup and the offset just past the element.
fn apply_directive(
    src: &str,
    tag: &Tag<'_>,
    attr: &Attribute,
    expr: &str,
    env: &mut Environment,
) -> Result<(String, usize), RenderError> {
    let (body, end) = element_body(src, tag)?;
    let rest_attrs = strip_range(tag.attrs, attr.range.clone());

    if attr.name == "if" {
        if expr.is_empty() {
            return Err(RenderError::EmptyDirective {
                directive: "if",
                tag: tag.name.to_string(),
            });
        }
        if !condition_holds(env, expr) {
            return Ok((String::new(), end));
        }
        let element = rebuild(tag, &rest_attrs, body);
        return Ok((render_directives(&element, env), end));
    }

    let (item, source) = parse_loop(expr)?;
    let Some(Value::List(items)) = lookup(env, source) else {
        return Err(RenderError::NotAList {
            name: source.to_string(),
        });
    };
    // nested directives run once against the enclosing scope, not per item
    let body = render_directives(body, env);
    let previous = env.remove(item);
    let mut out = String::new();
    for value in items {
        env.set(item, value);
        let attrs = interpolate(&rest_attrs, env);
        let body = interpolate(&body, env);
        out.push_str(&rebuild(tag, &attrs, &body));
    }
    match previous {
        Some(value) => env.set(item, value),
        None => {
            env.remove(item);
        }
    }
    Ok((out, end))
}

/// Body text of the element opened by `tag` and the offset past its close.
fn element_body<'s>(src: &'s str, tag: &Tag<'_>) -> Result<(&'s str, usize), RenderError> {
    if tag.self_closing {
        return Ok(("", tag.end));
    }
    let close = find_matching_close(src, tag).ok_or_else(|| RenderError::Unclosed {
        tag: tag.name.to_string(),
    })?;
    Ok((&src[tag.end..close.start], close.end))
}

fn rebuild(tag: &Tag<'_>, attrs: &str, body: &str) -> String {
    if tag.self_closing {
        format!("<{}{} />", tag.name, attrs)
    } else {
        format!("<{name}{attrs}>{body}</{name}>", name = tag.name)
    }
}

/// `!name` negates; an unbound name is false.
fn condition_holds(env: &Environment, expr: &str) -> bool {
    let (negate, name) = match expr.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, expr),
    };
    let truthy = lookup(env, name).is_some_and(|value| value.is_truthy());
    truthy != negate
}

fn parse_loop(expr: &str) -> Result<(&str, &str), RenderError> {
    match expr.split_whitespace().collect::<Vec<_>>()[..] {
        [item, "in", source] => Ok((item, source)),
        _ => Err(RenderError::MalformedLoop {
            expr: expr.to_string(),
        }),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Slots
// ══════════════════════════════════════════════════════════════════════════════

/// Replace `<slot/>`, `<slot name="x"/>` and `<slot>fallback</slot>` with the
/// matching slot content, the inline fallback, or nothing.
fn render_slots(src: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(src.len());
    let mut copied = 0;
    let mut scanner = Scanner::new(src);
    while let Some(event) = scanner.next() {
        let Event::Open(tag) = event else {
            continue;
        };
        if tag.name != "slot" {
            continue;
        }
        let (fallback, end) = match element_body(src, &tag) {
            Ok(found) => found,
            Err(err) => {
                trace!(%err, "slot left unchanged");
                continue;
            }
        };
        let name = parse_attributes(tag.attrs)
            .into_iter()
            .find(|attr| attr.name == "name")
            .and_then(|attr| match attr.value {
                AttrValue::Literal(name) => Some(name),
                _ => None,
            })
            .unwrap_or_else(|| "default".to_string());

        out.push_str(&src[copied..tag.start]);
        out.push_str(env.slot(&name).unwrap_or(fallback));
        copied = end;
        scanner.seek(end);
    }
    out.push_str(&src[copied..]);
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Interpolation
// ══════════════════════════════════════════════════════════════════════════════

/// Replace every resolvable `{expr}` with its value; anything else stays as
/// written.
pub fn interpolate(src: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let expr = &after[..close];
        match lookup(env, expr) {
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Resolve a template expression: variable, then prop, then a dotted path
/// through map keys, host fields and zero-argument methods (`a.b.c`,
/// `Request.Path()`).
pub fn lookup(env: &Environment, expr: &str) -> Option<Value> {
    let expr = expr.trim();
    if expr.is_empty() {
        return None;
    }
    if let Some(value) = env.get(expr).or_else(|| env.get_prop(expr)) {
        return Some(value.clone());
    }
    let mut segments = expr.split('.');
    let head = segments.next()?;
    if head.len() == expr.len() {
        return None;
    }
    let mut value = env.get(head).or_else(|| env.get_prop(head))?.clone();
    for segment in segments {
        value = step(&value, segment.trim())?;
    }
    Some(value)
}

fn step(base: &Value, segment: &str) -> Option<Value> {
    let Some(method) = segment.strip_suffix("()") else {
        return base.member(segment);
    };
    let Value::Opaque(object) = base else {
        return None;
    };
    if let Some(request) = object.request_info() {
        match method {
            "Path" => return Some(Value::String(request.path())),
            "Method" => return Some(Value::String(request.method())),
            "URL" => return Some(Value::String(request.url())),
            _ => {}
        }
    }
    match object.call(method, &[]) {
        Some(Ok(mut values)) if !values.is_empty() => Some(values.swap_remove(0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_loop() {
        assert_eq!(parse_loop("x in items"), Ok(("x", "items")));
        assert_eq!(parse_loop("  post   in  posts "), Ok(("post", "posts")));
        assert!(parse_loop("x of items").is_err());
        assert!(parse_loop("items").is_err());
    }

    #[test]
    fn test_condition_negation() {
        let mut env = Environment::new();
        env.set("on", Value::Bool(true));
        assert!(condition_holds(&env, "on"));
        assert!(!condition_holds(&env, "!on"));
        assert!(condition_holds(&env, "! missing"));
        assert!(!condition_holds(&env, "missing"));
    }

    #[test]
    fn test_lookup_order() {
        let mut env = Environment::new();
        env.set("title", Value::from("var"));
        env.set_prop("title", Value::from("prop"));
        env.set_prop("only_prop", Value::from("p"));
        assert_eq!(lookup(&env, " title "), Some(Value::from("var")));
        assert_eq!(lookup(&env, "only_prop"), Some(Value::from("p")));
        assert_eq!(lookup(&env, "nope"), None);
        assert_eq!(lookup(&env, ""), None);
    }

    #[test]
    fn test_rebuild_self_closing() {
        let src = "<img if={x} src=\"a.png\" />";
        let Some(Event::Open(tag)) = Scanner::new(src).next() else {
            panic!("expected open tag");
        };
        assert_eq!(rebuild(&tag, " src=\"a.png\"", ""), "<img src=\"a.png\" />");
    }
}
