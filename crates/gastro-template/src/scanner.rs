//! Markup scanner: splits template text into open-tag, close-tag and text
//! events.
//!
//! Attribute values are skipped as units, so a `>` inside `"..."`, `'...'`
//! or `{...}` never ends a tag. Comments are returned as text.

use std::ops::Range;

/// An opening (or self-closing) tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    /// Raw attribute text between the name and `>` (or `/>`).
    pub attrs: &'a str,
    /// Byte offset of `<`.
    pub start: usize,
    /// Byte offset just past `>`.
    pub end: usize,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    Open(Tag<'a>),
    Close { name: &'a str, span: Range<usize> },
    Text(Range<usize>),
}

/// Iterator of [`Event`]s over a markup string.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Start scanning at byte offset `pos`.
    pub fn at(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            pos: pos.min(src.len()),
        }
    }

    /// Continue from `pos` (used after a replacement consumed a region).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn text_until_next_lt(&mut self, from: usize) -> Event<'a> {
        let end = self.src[from + 1..]
            .find('<')
            .map_or(self.src.len(), |i| from + 1 + i);
        self.pos = end;
        Event::Text(from..end)
    }

    fn scan_comment(&mut self, start: usize) -> Event<'a> {
        let end = self.src[start + 4..]
            .find("-->")
            .map_or(self.src.len(), |i| start + 4 + i + 3);
        self.pos = end;
        Event::Text(start..end)
    }

    fn scan_close(&mut self, start: usize) -> Option<Event<'a>> {
        let name_start = start + 2;
        let name_end = name_end(self.src, name_start);
        if name_end == name_start {
            return None;
        }
        let gt = self.src[name_end..].find('>')? + name_end;
        if !self.src[name_end..gt].trim().is_empty() {
            return None;
        }
        self.pos = gt + 1;
        Some(Event::Close {
            name: &self.src[name_start..name_end],
            span: start..gt + 1,
        })
    }

    fn scan_open(&mut self, start: usize) -> Option<Event<'a>> {
        let name_start = start + 1;
        let name_end = name_end(self.src, name_start);
        if name_end == name_start {
            return None;
        }
        let gt = find_tag_end(self.src, name_end)?;
        let mut attrs = &self.src[name_end..gt];
        let self_closing = attrs.trim_end().ends_with('/');
        if self_closing {
            attrs = attrs.trim_end();
            attrs = &attrs[..attrs.len() - 1];
        }
        self.pos = gt + 1;
        Some(Event::Open(Tag {
            name: &self.src[name_start..name_end],
            attrs,
            start,
            end: gt + 1,
            self_closing,
        }))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        let start = self.pos;
        if start >= self.src.len() {
            return None;
        }
        let rest = &self.src[start..];
        if !rest.starts_with('<') {
            let end = rest.find('<').map_or(self.src.len(), |i| start + i);
            self.pos = end;
            return Some(Event::Text(start..end));
        }
        if rest.starts_with("<!--") {
            return Some(self.scan_comment(start));
        }
        let tag = if rest.starts_with("</") {
            self.scan_close(start)
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.scan_open(start)
        } else {
            None
        };
        // a stray `<` or an unterminated tag is plain text
        Some(tag.unwrap_or_else(|| self.text_until_next_lt(start)))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn name_end(src: &str, from: usize) -> usize {
    src[from..]
        .find(|c: char| !is_name_char(c))
        .map_or(src.len(), |i| from + i)
}

/// Offset of the `>` closing a tag whose attributes start at `from`.
fn find_tag_end(src: &str, from: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = from;
    let mut braces = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') if braces == 0 => {
                i += 1 + src[i + 1..].find(q as char)?;
            }
            b'{' => braces += 1,
            b'}' => braces = braces.saturating_sub(1),
            b'>' if braces == 0 => return Some(i),
            b'<' if braces == 0 => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Find the close tag matching `tag`, counting nested same-name elements.
///
/// Returns the byte range of the matching `</name>`. Self-closing tags never
/// need one, and an unbalanced element yields `None`.
pub fn find_matching_close(src: &str, tag: &Tag<'_>) -> Option<Range<usize>> {
    if tag.self_closing {
        return None;
    }
    let mut depth = 1usize;
    for event in Scanner::at(src, tag.end) {
        match event {
            Event::Open(inner) if inner.name == tag.name && !inner.self_closing => depth += 1,
            Event::Close { name, span } if name == tag.name => {
                depth -= 1;
                if depth == 0 {
                    return Some(span);
                }
            }
            _ => {}
        }
    }
    None
}
