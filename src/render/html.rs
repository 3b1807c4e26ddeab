//! HTML renderer: standalone HTML page with semantic markup.

use crate::config::OutputFormat;
use crate::endpoint::{rows, Endpoint, FieldNode};
use crate::error::Result;
use crate::model::*;
use crate::render::{visible_entries, RenderOptions, Renderer, TypeEntry};
use crate::toc::Anchors;

pub struct HtmlRenderer;

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 60em; margin: 2em auto; padding: 0 1em; }
code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }
pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }
table { border-collapse: collapse; margin: 0.5em 0 1em; }
th, td { border: 1px solid #ddd; padding: 0.3em 0.6em; text-align: left; }
.meta { color: #666; }
.verb { display: inline-block; font-size: 0.8em; font-weight: bold; padding: 0.1em 0.4em; border-radius: 3px; background: #4eaa25; color: white; }
.endpoint { border-top: 1px solid #ddd; padding-top: 0.5em; }
";

impl Renderer for HtmlRenderer {
    fn render(&self, model: &ApiModel, options: &RenderOptions) -> Result<String> {
        let meta = &model.meta;
        let endpoints = options.endpoints(model);
        let mut anchors = Anchors::new();
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        if let Some(ref author) = meta.author {
            out.push_str(&format!("<meta name=\"author\" content=\"{}\">\n", html_escape(author)));
        }
        out.push_str(&format!("<title>{}</title>\n", html_escape(&meta.title)));
        out.push_str("<style>\n");
        out.push_str(STYLE);
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");

        if let Some(prefix) = options.prefix_for(&meta.title) {
            out.push_str(&format!("<div class=\"prefix\">{}</div>\n", html_escape(&prefix)));
        }
        out.push_str(&format!("<h1>{}</h1>\n", html_escape(&meta.title)));
        let details: Vec<String> = [("Author", &meta.author), ("Version", &meta.version), ("Date", &meta.date)]
            .into_iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, html_escape(v))))
            .collect();
        if !details.is_empty() {
            out.push_str(&format!("<p class=\"meta\">{}</p>\n", details.join(" &middot; ")));
        }

        let mut index = String::new();
        let mut body = String::new();

        if !endpoints.is_empty() {
            let anchor = anchors.next("Endpoints");
            index.push_str(&format!("  <li><a href=\"#{}\">Endpoints</a>\n  <ul>\n", anchor));
            body.push_str(&format!("<h2 id=\"{}\">Endpoints</h2>\n", anchor));
            for endpoint in &endpoints {
                let anchor = anchors.next(&endpoint.title);
                index.push_str(&format!(
                    "    <li><a href=\"#{}\">{}</a></li>\n",
                    html_escape(&anchor),
                    html_escape(&endpoint.title)
                ));
                body.push_str(&render_endpoint(endpoint, &anchor, options));
            }
            index.push_str("  </ul></li>\n");
        }

        let mut reference = String::new();
        let mut reference_index = String::new();
        for module in model.modules() {
            let (types, free) = visible_entries(module, options);
            if types.is_empty() && free.is_empty() {
                continue;
            }
            let name = module.display_name();
            let anchor = anchors.next(name);
            reference_index.push_str(&format!(
                "    <li><a href=\"#{}\">{}</a></li>\n",
                html_escape(&anchor),
                html_escape(name)
            ));
            reference.push_str(&format!("<h3 id=\"{}\">{}</h3>\n", html_escape(&anchor), html_escape(name)));
            for entry in &types {
                reference.push_str(&render_type(entry, &mut anchors));
            }
            if !free.is_empty() {
                reference.push_str("<h4>Module members</h4>\n<ul>\n");
                for member in free {
                    reference.push_str(&render_member(member));
                }
                reference.push_str("</ul>\n");
            }
        }

        if !reference.is_empty() {
            let anchor = anchors.next("API reference");
            index.push_str(&format!(
                "  <li><a href=\"#{}\">API reference</a>\n  <ul>\n{}  </ul></li>\n",
                anchor, reference_index
            ));
            body.push_str(&format!("<h2 id=\"{}\">API reference</h2>\n", anchor));
            body.push_str(&reference);
        }

        if !index.is_empty() {
            out.push_str("<h2>Index</h2>\n<ul>\n");
            out.push_str(&index);
            out.push_str("</ul>\n");
        }
        out.push_str(&body);
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

fn render_endpoint(endpoint: &Endpoint, anchor: &str, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"endpoint\">\n");
    out.push_str(&format!(
        "<h3 id=\"{}\">{}</h3>\n",
        html_escape(anchor),
        html_escape(&endpoint.title)
    ));
    if let Some(ref description) = endpoint.description {
        out.push_str(&format!("<p>{}</p>\n", html_escape(description)));
    }
    if options.show_call_location {
        out.push_str(&format!(
            "<p><strong>Call location:</strong> {}</p>\n",
            html_escape(&endpoint.call_location())
        ));
    }
    out.push_str(&format!(
        "<p><span class=\"verb\">{}</span> <code>{}</code> {}</p>\n",
        html_escape(&endpoint.http_method),
        html_escape(&endpoint.path),
        endpoint.content_type.label()
    ));

    out.push_str("<h4>Request parameters</h4>\n");
    out.push_str(&field_table(&endpoint.request));
    if options.show_request_json && !endpoint.request.is_empty() {
        out.push_str("<h4>Request JSON</h4>\n");
        out.push_str(&format!(
            "<pre><code class=\"language-json\">{}</code></pre>\n",
            html_escape(&endpoint.request_json())
        ));
    }

    out.push_str("<h4>Response parameters</h4>\n");
    out.push_str(&field_table(&endpoint.response));
    if options.show_response_json && !endpoint.response.is_empty() {
        out.push_str("<h4>Response JSON</h4>\n");
        out.push_str(&format!(
            "<pre><code class=\"language-json\">{}</code></pre>\n",
            html_escape(&endpoint.response_json())
        ));
    }
    out.push_str("</section>\n");
    out
}

fn field_table(fields: &[FieldNode]) -> String {
    if fields.is_empty() {
        return "<p><em>None.</em></p>\n".to_string();
    }
    let mut out = String::from("<table>\n<tr><th>Name</th><th>Required</th><th>Type</th><th>Description</th></tr>\n");
    for row in rows(fields) {
        out.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.prefix(),
            html_escape(&row.field.name),
            if row.field.required { "Yes" } else { "No" },
            html_escape(&row.field.ty),
            html_escape(&row.field.description)
        ));
    }
    out.push_str("</table>\n");
    out
}

fn render_type(entry: &TypeEntry<'_>, anchors: &mut Anchors) -> String {
    let decl = entry.decl;
    let flavor = decl.as_type().map(|t| t.flavor.keyword()).unwrap_or("type");
    let heading = format!("{} {}", flavor, decl.path());
    let anchor = anchors.next(&heading);

    let mut out = String::new();
    out.push_str(&format!("<h4 id=\"{}\">{}</h4>\n", html_escape(&anchor), html_escape(&heading)));
    out.push_str(&format!(
        "<pre><code class=\"language-java\">{}</code></pre>\n",
        html_escape(&decl.signature())
    ));
    if let Some(ref doc) = decl.doc {
        if !doc.description.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", html_escape(&doc.description)));
        }
    }

    let fields: Vec<&&Declaration> = entry.members.iter().filter(|m| m.as_field().is_some()).collect();
    if !fields.is_empty() {
        out.push_str("<table>\n<tr><th>Name</th><th>Type</th><th>Description</th></tr>\n");
        for field in fields {
            let Some(f) = field.as_field() else {
                continue;
            };
            let ty = if f.enum_constant { String::new() } else { f.ty.to_string() };
            let description = field
                .doc
                .as_ref()
                .map(DocComment::summary)
                .filter(|s| !s.is_empty())
                .or_else(|| f.trailing_comment.clone())
                .unwrap_or_default();
            out.push_str(&format!(
                "<tr><td><code>{}</code></td><td><code>{}</code></td><td>{}</td></tr>\n",
                html_escape(&field.name),
                html_escape(&ty),
                html_escape(&description)
            ));
        }
        out.push_str("</table>\n");
    }

    let functions: Vec<&&Declaration> = entry.members.iter().filter(|m| m.as_function().is_some()).collect();
    if !functions.is_empty() {
        out.push_str("<ul>\n");
        for function in functions {
            out.push_str(&render_member(function));
        }
        out.push_str("</ul>\n");
    }
    out
}

fn render_member(decl: &Declaration) -> String {
    let mut out = format!("  <li><code>{}</code>", html_escape(&decl.signature()));
    if let Some(ref doc) = decl.doc {
        let summary = doc.summary();
        if !summary.is_empty() {
            out.push_str(&format!(": {}", html_escape(&summary)));
        }
        if !doc.tags.is_empty() {
            out.push_str("\n  <dl>\n");
            for tag in &doc.tags {
                out.push_str(&format!(
                    "    <dt>@{}</dt><dd>{}</dd>\n",
                    html_escape(&tag.name),
                    html_escape(&tag.text)
                ));
            }
            out.push_str("  </dl>\n  ");
        }
    }
    out.push_str("</li>\n");
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_model;

    fn render(options: &RenderOptions) -> String {
        HtmlRenderer.render(&sample_model(), options).unwrap()
    }

    #[test]
    fn escape() {
        assert_eq!(html_escape("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(html_escape("\"hi\""), "&quot;hi&quot;");
    }

    #[test]
    fn page_skeleton() {
        let out = render(&RenderOptions::default());
        assert!(out.starts_with("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n"));
        assert!(out.contains("<meta name=\"author\" content=\"peach\">\n<title>Demo</title>\n"));
        assert!(out.contains("<p class=\"meta\">Author: peach &middot; Version: V1.2.0 &middot; Date: 2024-01-02</p>\n"));
        assert!(out.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn endpoint_section() {
        let out = render(&RenderOptions::default());
        assert!(out.contains("<h3 id=\"get-user\">Get user</h3>\n<p>Looks a user up by id.</p>\n"));
        assert!(out.contains("<p><strong>Call location:</strong> User management -&gt; Get user</p>\n"));
        assert!(out.contains("<span class=\"verb\">GET</span> <code>/shop/user/get</code> FormData"));
        assert!(out.contains("<tr><td>id</td><td>Yes</td><td>Long</td><td>user id</td></tr>\n"));
        assert!(out.contains("<h4>Response JSON</h4>\n<pre><code class=\"language-json\">{\n   &quot;id&quot; : &quot;Long&quot;, //user id\n"));
    }

    #[test]
    fn index_links_match_heading_ids() {
        let out = render(&RenderOptions::default());
        assert!(out.contains("<li><a href=\"#get-user\">Get user</a></li>"));
        assert!(out.contains("<li><a href=\"#comdemodto\">com.demo.dto</a></li>"));
        assert!(out.contains("<h3 id=\"comdemodto\">com.demo.dto</h3>"));
        assert!(out.contains("<h4 id=\"class-uservo\">class UserVo</h4>"));
    }

    #[test]
    fn prefix_is_escaped() {
        let options = RenderOptions {
            prefix: Some("<b>${name}</b>".to_string()),
            ..Default::default()
        };
        assert!(render(&options).contains("<div class=\"prefix\">&lt;b&gt;Demo&lt;/b&gt;</div>\n"));
    }
}
