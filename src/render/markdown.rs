//! GitHub-flavored markdown renderer.
//!
//! Layout: optional YAML frontmatter and prefix, the document title, an
//! index, one block per HTTP endpoint, then the declaration reference
//! grouped by module.

use crate::config::OutputFormat;
use crate::endpoint::{rows, Endpoint, FieldNode};
use crate::error::Result;
use crate::model::*;
use crate::render::{visible_entries, RenderOptions, Renderer, TypeEntry};
use crate::toc::{self, Anchors};

pub struct MarkdownRenderer;

const TABLE_HEADER: &str = "|Name|Required|Type|Description|\n|:----    |:---|:----- |-----   |\n";

impl Renderer for MarkdownRenderer {
    fn render(&self, model: &ApiModel, options: &RenderOptions) -> Result<String> {
        let meta = &model.meta;
        let endpoints = options.endpoints(model);
        let mut anchors = Anchors::new();
        let mut output = String::new();

        if options.frontmatter {
            output.push_str(&frontmatter(meta));
        }
        if let Some(prefix) = options.prefix_for(&meta.title) {
            output.push_str(&prefix);
            output.push_str("\n\n");
        }

        output.push_str(&format!("# {}\n\n", meta.title));
        anchors.next(&meta.title);
        anchors.next("Index");

        // Anchors are handed out in heading order, so the index is built
        // alongside the body and spliced in afterwards.
        let mut index: Vec<String> = Vec::new();
        let mut body = String::new();

        if !endpoints.is_empty() {
            index.push(toc::toc_item(0, "Endpoints", &anchors.next("Endpoints")));
            body.push_str("## Endpoints\n\n");
            for (i, endpoint) in endpoints.iter().enumerate() {
                if i > 0 {
                    body.push_str("---\n\n");
                }
                index.push(toc::toc_item(1, &endpoint.title, &anchors.next(&endpoint.title)));
                body.push_str(&render_endpoint(endpoint, options));
            }
        }

        let mut reference = String::new();
        let mut reference_index = Vec::new();
        for module in model.modules() {
            let (types, free) = visible_entries(module, options);
            if types.is_empty() && free.is_empty() {
                continue;
            }
            let heading = module.display_name();
            reference_index.push((1, heading.to_string()));
            reference.push_str(&format!("### {}\n\n", heading));
            for entry in &types {
                let heading = type_heading(entry.decl);
                reference_index.push((2, heading.clone()));
                reference.push_str(&render_type(entry, &heading));
            }
            if !free.is_empty() {
                reference.push_str("#### Module members\n\n");
                reference_index.push((2, "Module members".to_string()));
                for member in free {
                    reference.push_str(&render_member(member));
                }
                reference.push('\n');
            }
        }

        if !reference.is_empty() {
            index.push(toc::toc_item(0, "API reference", &anchors.next("API reference")));
            for (level, heading) in &reference_index {
                index.push(toc::toc_item(*level, heading, &anchors.next(heading)));
            }
            body.push_str("## API reference\n\n");
            body.push_str(&reference);
        }

        if !index.is_empty() {
            output.push_str("## Index\n\n");
            output.push_str(&index.join("\n"));
            output.push_str("\n\n");
        }
        output.push_str(&body);

        while output.ends_with("\n\n") {
            output.pop();
        }
        Ok(output)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

fn frontmatter(meta: &ProjectMeta) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", yaml_scalar(&meta.title)));
    for (key, value) in [("author", &meta.author), ("version", &meta.version), ("date", &meta.date)] {
        if let Some(value) = value {
            out.push_str(&format!("{}: {}\n", key, yaml_scalar(value)));
        }
    }
    out.push_str("---\n\n");
    out
}

/// Quote a YAML value when it could be read as something other than a
/// plain string.
fn yaml_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && !value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c) || c.is_whitespace())
        && !value.contains(": ")
        && !value.contains(" #")
        && !value.ends_with(char::is_whitespace);
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn render_endpoint(endpoint: &Endpoint, options: &RenderOptions) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("### {}\n", endpoint.title));

    if let Some(ref description) = endpoint.description {
        lines.push(format!("{}\n", description));
    }

    if options.show_call_location {
        lines.push("**Call location:**\n".to_string());
        lines.push(format!("- {}\n", endpoint.call_location()));
    }

    lines.push("**Request URL:**\n".to_string());
    lines.push(format!("- `{}`\n", endpoint.path));

    lines.push("**Request method:**\n".to_string());
    lines.push(format!("- {}", endpoint.http_method));
    lines.push(format!("- {}\n", endpoint.content_type.label()));

    lines.push("#### Request parameters\n".to_string());
    lines.push(field_table(&endpoint.request));

    if options.show_request_json && !endpoint.request.is_empty() {
        lines.push("#### Request JSON\n".to_string());
        lines.push(format!("```json\n{}\n```\n", endpoint.request_json()));
    }

    lines.push("#### Response parameters\n".to_string());
    lines.push(field_table(&endpoint.response));

    if options.show_response_json && !endpoint.response.is_empty() {
        lines.push("#### Response JSON\n".to_string());
        lines.push(format!("```json\n{}\n```\n", endpoint.response_json()));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn field_table(fields: &[FieldNode]) -> String {
    if fields.is_empty() {
        return "_None._\n".to_string();
    }
    let mut out = String::from(TABLE_HEADER);
    for row in rows(fields) {
        out.push_str(&format!(
            "|{}{}|{}|{}|{}|\n",
            row.prefix(),
            row.field.name,
            if row.field.required { "Yes" } else { "No" },
            row.field.ty,
            table_cell(&row.field.description)
        ));
    }
    out
}

/// Escape a value for a single table cell.
fn table_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn type_heading(decl: &Declaration) -> String {
    let flavor = decl.as_type().map(|t| t.flavor.keyword()).unwrap_or("type");
    format!("{} {}", flavor, decl.path())
}

fn render_type(entry: &TypeEntry<'_>, heading: &str) -> String {
    let decl = entry.decl;
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("#### {}\n", heading));
    lines.push(format!("```java\n{}{}\n```\n", annotation_lines(decl), decl.signature()));

    if let Some(ref doc) = decl.doc {
        if !doc.description.is_empty() {
            lines.push(format!("{}\n", doc.description));
        }
        for tag in &doc.tags {
            lines.push(format!("- **@{}** {}", tag.name, tag.text));
        }
        if !doc.tags.is_empty() {
            lines.push(String::new());
        }
    }

    let constants: Vec<&&Declaration> = entry
        .members
        .iter()
        .filter(|m| m.as_field().is_some_and(|f| f.enum_constant))
        .collect();
    if !constants.is_empty() {
        lines.push("**Constants**\n".to_string());
        for constant in constants {
            lines.push(format!("- `{}`{}", constant.name, summary_suffix(constant)));
        }
        lines.push(String::new());
    }

    let fields: Vec<&&Declaration> = entry
        .members
        .iter()
        .filter(|m| m.as_field().is_some_and(|f| !f.enum_constant))
        .collect();
    if !fields.is_empty() {
        lines.push("**Fields**\n".to_string());
        lines.push("|Name|Type|Description|\n|:---|:---|:---|".to_string());
        for field in fields {
            let (ty, comment) = match field.as_field() {
                Some(f) => (f.ty.to_string(), f.trailing_comment.clone()),
                None => continue,
            };
            let description = field
                .doc
                .as_ref()
                .map(DocComment::summary)
                .filter(|s| !s.is_empty())
                .or(comment)
                .unwrap_or_default();
            lines.push(format!(
                "|{}|`{}`|{}|",
                field.name,
                table_cell(&ty),
                table_cell(&description)
            ));
        }
        lines.push(String::new());
    }

    let functions: Vec<&&Declaration> = entry
        .members
        .iter()
        .filter(|m| m.as_function().is_some())
        .collect();
    if !functions.is_empty() {
        lines.push("**Methods**\n".to_string());
        for function in functions {
            lines.push(render_member(function).trim_end().to_string());
        }
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn annotation_lines(decl: &Declaration) -> String {
    decl.annotations
        .iter()
        .map(|a| {
            if a.args.is_empty() {
                format!("@{}\n", a.name)
            } else {
                let args: Vec<String> = a
                    .args
                    .iter()
                    .map(|arg| format!("{} = {}", arg.key, arg.value))
                    .collect();
                format!("@{}({})\n", a.name, args.join(", "))
            }
        })
        .collect()
}

fn summary_suffix(decl: &Declaration) -> String {
    match decl.doc.as_ref().map(DocComment::summary) {
        Some(summary) if !summary.is_empty() => format!(": {}", summary),
        _ => String::new(),
    }
}

/// One list item for a method or a module-level declaration, with its
/// block tags nested underneath.
fn render_member(decl: &Declaration) -> String {
    let mut out = format!("- `{}`{}\n", decl.signature(), summary_suffix(decl));
    if let Some(ref doc) = decl.doc {
        for tag in &doc.tags {
            out.push_str(&format!("  - **@{}** {}\n", tag.name, tag.text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_model;

    fn render(options: &RenderOptions) -> String {
        MarkdownRenderer.render(&sample_model(), options).unwrap()
    }

    #[test]
    fn frontmatter_and_title() {
        let out = render(&RenderOptions::default());
        assert!(out.starts_with(
            "---\ntitle: Demo\nauthor: peach\nversion: V1.2.0\ndate: 2024-01-02\n---\n\n# Demo\n\n## Index\n\n"
        ));
    }

    #[test]
    fn frontmatter_can_be_disabled() {
        let options = RenderOptions {
            frontmatter: false,
            ..Default::default()
        };
        assert!(render(&options).starts_with("# Demo\n"));
    }

    #[test]
    fn prefix_goes_before_title() {
        let options = RenderOptions {
            frontmatter: false,
            prefix: Some("> Generated for ${name}".to_string()),
            ..Default::default()
        };
        assert!(render(&options).starts_with("> Generated for Demo\n\n# Demo\n"));
    }

    #[test]
    fn index_links_headings() {
        let out = render(&RenderOptions::default());
        assert!(out.contains("* [Endpoints](#endpoints)\n  * [Get user](#get-user)\n"));
        assert!(out.contains("* [API reference](#api-reference)\n"));
        assert!(out.contains("  * [com.demo.dto](#comdemodto)\n    * [class UserVo](#class-uservo)\n"));
    }

    #[test]
    fn endpoint_block() {
        let out = render(&RenderOptions::default());
        let expected = "### Get user\n\n\
Looks a user up by id.\n\n\
**Call location:**\n\n\
- User management -> Get user\n\n\
**Request URL:**\n\n\
- `/shop/user/get`\n\n\
**Request method:**\n\n\
- GET\n\
- FormData\n\n\
#### Request parameters\n\n\
|Name|Required|Type|Description|\n\
|:----    |:---|:----- |-----   |\n\
|id|Yes|Long|user id|\n";
        assert!(out.contains(expected), "{}", out);
        assert!(out.contains("|name|Yes|String|Display name|\n"));
        assert!(out.contains("|tags|No|List||\n"));
        assert!(out.contains("#### Response JSON\n\n```json\n{\n   \"id\" : \"Long\", //user id\n"));
    }

    #[test]
    fn switches_hide_sections() {
        let options = RenderOptions {
            show_call_location: false,
            show_request_json: false,
            show_response_json: false,
            ..Default::default()
        };
        let out = render(&options);
        assert!(!out.contains("**Call location:**"));
        assert!(!out.contains("Request JSON"));
        assert!(!out.contains("Response JSON"));
    }

    #[test]
    fn reference_section() {
        let out = render(&RenderOptions::default());
        assert!(out.contains("#### class UserVo\n\n```java\npublic class UserVo\n```\n\nA user | row\n"));
        assert!(out.contains("**Methods**\n\n- `public String getName()`\n"));
        assert!(!out.contains("Secret"));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn private_fields_with_flag() {
        let options = RenderOptions {
            include_private: true,
            ..Default::default()
        };
        let out = render(&options);
        assert!(out.contains("|id|`Long`|user id|\n"));
        assert!(out.contains("|tags|`List<String>`||\n"));
        assert!(out.contains("#### class UserVo.Secret\n"));
    }

    #[test]
    fn yaml_values_are_quoted_when_needed() {
        assert_eq!(yaml_scalar("V1.0.0"), "V1.0.0");
        assert_eq!(yaml_scalar("a: b"), "\"a: b\"");
        assert_eq!(yaml_scalar("[draft]"), "\"[draft]\"");
        assert_eq!(yaml_scalar(""), "\"\"");
    }

    #[test]
    fn table_cells_are_escaped() {
        assert_eq!(table_cell("a | b\n c"), "a \\| b c");
    }
}
