//! Tag attribute parsing: `name={expr}`, `name="v"`, `name='v'` and bare
//! `name`.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `name={expr}`; holds the trimmed expression text.
    Expr(String),
    /// `name="v"` or `name='v'`
    Literal(String),
    /// Bare `name`
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
    /// Byte range of the whole attribute within the parsed text.
    pub range: Range<usize>,
}

/// Parse the attribute text of a tag.
///
/// Unknown characters between attributes are skipped; an unterminated value
/// runs to the end of the text.
pub fn parse_attributes(src: &str) -> Vec<Attribute> {
    let mut attrs = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !is_attr_name_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_attr_name_byte(bytes[i]) {
            i += 1;
        }
        let name = src[start..i].to_string();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            attrs.push(Attribute {
                name,
                value: AttrValue::Flag,
                range: start..i,
            });
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let (value, end) = match bytes.get(j) {
            Some(b'{') => {
                let close = matching_brace(src, j).unwrap_or(src.len());
                let inner = &src[j + 1..close];
                (AttrValue::Expr(inner.trim().to_string()), (close + 1).min(src.len()))
            }
            Some(&(q @ (b'"' | b'\''))) => {
                let close = src[j + 1..]
                    .find(q as char)
                    .map_or(src.len(), |k| j + 1 + k);
                (
                    AttrValue::Literal(src[j + 1..close].to_string()),
                    (close + 1).min(src.len()),
                )
            }
            _ => {
                // unquoted value
                let end = src[j..]
                    .find(|c: char| c.is_whitespace())
                    .map_or(src.len(), |k| j + k);
                (AttrValue::Literal(src[j..end].to_string()), end)
            }
        };
        attrs.push(Attribute {
            name,
            value,
            range: start..end,
        });
        i = end;
    }
    attrs
}

/// Remove `range` from attribute text, keeping the rest normalised to a
/// leading space (or empty).
pub(crate) fn strip_range(src: &str, range: Range<usize>) -> String {
    let before = src[..range.start].trim();
    let after = src[range.end..].trim();
    match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!(" {before}"),
        (true, false) => format!(" {after}"),
        (false, false) => format!(" {before} {after}"),
    }
}

fn is_attr_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'@' | b'.')
}

/// Offset of the `}` closing the `{` at `open`, skipping quoted strings.
fn matching_brace(src: &str, open: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            q @ (b'"' | b'\'' | b'`') => {
                i += 1 + src[i + 1..].find(q as char)?;
            }
            _ => {}
        }
        i += 1;
    }
    None
}
