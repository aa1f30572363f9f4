use crate::Span;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash content with SHA-256 and return the first 8 bytes as lowercase hex.
pub fn hash_content(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

/// An immutable parse result for one `.gastro` source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Frontmatter code between the `---` delimiters, trimmed.
    pub frontmatter: String,
    /// Location of the frontmatter code in the source file.
    pub frontmatter_span: Option<Span>,
    /// Markup left after style/script extraction, trimmed.
    pub template: String,
    /// Location of the template region in the source file.
    pub template_span: Span,
    pub styles: Vec<Style>,
    pub scripts: Vec<Script>,
    pub imports: Vec<Import>,
    /// Content hash of the whole source, see [`hash_content`].
    pub source_hash: String,
}

impl Component {
    pub fn has_frontmatter(&self) -> bool {
        !self.frontmatter.trim().is_empty()
    }

    /// Imports whose alias names a component (`import Card from "./Card.gastro"`).
    pub fn component_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| i.is_component)
    }
}

/// A `<style>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub content: String,
    pub scoped: bool,
}

impl Style {
    pub fn hash(&self) -> String {
        hash_content(&self.content)
    }
}

/// A `<script>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub content: String,
    pub is_module: bool,
}

impl Script {
    pub fn hash(&self) -> String {
        hash_content(&self.content)
    }
}

/// An import declaration found in the frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
    /// `true` when the alias starts with an uppercase letter.
    pub is_component: bool,
}
