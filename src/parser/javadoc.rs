//! Javadoc comment parsing.
//!
//! `/** ... */` text → description lines plus block tags. Inline tags
//! (`{@code x}`, `{@link Foo#bar}`) collapse to their content and common
//! HTML formatting tags are stripped.

use crate::model::{DocComment, DocTag};
use regex::Regex;
use std::sync::LazyLock;

static RE_INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{@\w+\s*([^}]*)\}").unwrap());

static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(p|br|li|ul|ol|h[1-6]|div|span|code|pre|b|i|em|strong|tt|a|img|table|thead|tbody|tr|td|th|hr)(\s+[^>]*)?/?>",
    )
    .unwrap()
});

static RE_BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s*(.*)$").unwrap());

/// Parse the raw text of a doc comment, delimiters included.
pub fn parse(raw: &str) -> DocComment {
    let body = raw
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut description: Vec<String> = Vec::new();
    let mut tags: Vec<DocTag> = Vec::new();

    for line in body.lines() {
        let line = clean_line(line);

        if let Some(caps) = RE_BLOCK_TAG.captures(&line) {
            tags.push(DocTag {
                name: caps[1].to_string(),
                text: caps[2].trim().to_string(),
            });
            continue;
        }

        if let Some(last) = tags.last_mut() {
            // Continuation of the previous block tag
            if !line.is_empty() {
                if !last.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(&line);
            }
        } else {
            description.push(line);
        }
    }

    // Drop leading and trailing blank lines
    while description.first().is_some_and(|l| l.is_empty()) {
        description.remove(0);
    }
    while description.last().is_some_and(|l| l.is_empty()) {
        description.pop();
    }

    DocComment {
        description: description.join("\n"),
        tags,
    }
}

/// Strip the leading `*` gutter, inline tags and HTML from one line.
fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = line.strip_prefix('*').unwrap_or(line);
    let line = RE_INLINE_TAG.replace_all(line, "$1");
    let line = RE_HTML_TAG.replace_all(&line, "");
    line.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_and_tags() {
        let doc = parse(
            "/**\n     * Query users by page.\n     * <p>Sorted by id.</p>\n     *\n     * @param query the filter\n     *              and paging\n     * @return a page\n     */",
        );
        assert_eq!(doc.description, "Query users by page.\nSorted by id.");
        assert_eq!(doc.tags.len(), 2);
        assert_eq!(doc.param("query"), Some("the filter and paging"));
        assert_eq!(doc.tag("return"), Some("a page"));
    }

    #[test]
    fn single_line_comment() {
        let doc = parse("/** User name */");
        assert_eq!(doc.description, "User name");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn inline_tags_collapse() {
        let doc = parse("/** Returns {@code null} when {@link User} is missing. */");
        assert_eq!(doc.description, "Returns null when User is missing.");
    }

    #[test]
    fn tags_only() {
        let doc = parse("/**\n * @author peach\n */");
        assert_eq!(doc.description, "");
        assert_eq!(doc.tag("author"), Some("peach"));
        assert_eq!(doc.title(), None);
    }
}
