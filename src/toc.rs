//! GitHub-flavored markdown anchor/slug generation for the document index.

use std::collections::HashMap;

/// GitHub heading anchor slug.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, underscore, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Hands out heading anchors in document order. Repeated headings get
/// `-1`, `-2`, ... suffixes the way GitHub numbers them.
#[derive(Debug, Default)]
pub struct Anchors {
    seen: HashMap<String, usize>,
}

impl Anchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, heading: &str) -> String {
        let slug = github_slug(heading);
        let count = self.seen.entry(slug.clone()).or_insert(0);
        let anchor = if *count == 0 {
            slug
        } else {
            format!("{}-{}", slug, count)
        };
        *count += 1;
        anchor
    }
}

/// `* [text](#anchor)`, indented two spaces per level.
pub fn toc_item(level: usize, text: &str, anchor: &str) -> String {
    format!("{}* [{}](#{})", "  ".repeat(level), text, anchor)
}
