//! Renderer module: trait-based format dispatch.

pub mod html;
pub mod json;
pub mod markdown;

use crate::config::{Config, OutputFormat};
use crate::endpoint::{self, Endpoint};
use crate::error::Result;
use crate::model::{ApiModel, Declaration, Module, Visibility};
use indexmap::IndexMap;

/// Renders an [`ApiModel`] into one output format.
///
/// Implementations must be deterministic: the same model and options give
/// byte-identical output.
pub trait Renderer: Send + Sync {
    fn render(&self, model: &ApiModel, options: &RenderOptions) -> Result<String>;
    fn format(&self) -> OutputFormat;
}

/// Create a renderer for the given format.
pub fn create_renderer(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Markdown => Box::new(markdown::MarkdownRenderer),
        OutputFormat::Html => Box::new(html::HtmlRenderer),
        OutputFormat::Json => Box::new(json::JsonRenderer),
    }
}

/// Presentation switches shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_private: bool,
    pub show_call_location: bool,
    pub show_request_json: bool,
    pub show_response_json: bool,
    pub frontmatter: bool,
    /// Template placed before the body; `${name}` becomes the title.
    pub prefix: Option<String>,
    pub exclude_fields: IndexMap<String, Vec<String>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::from(&Config::default())
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        RenderOptions {
            include_private: config.include_private,
            show_call_location: config.show_call_location,
            show_request_json: config.show_request_json,
            show_response_json: config.show_response_json,
            frontmatter: config.frontmatter,
            prefix: config.prefix.clone(),
            exclude_fields: config.exclude_fields.clone(),
        }
    }
}

impl RenderOptions {
    pub fn is_visible(&self, decl: &Declaration) -> bool {
        self.include_private || decl.modifiers.visibility != Visibility::Private
    }

    /// Prefix with `${name}` substituted.
    pub fn prefix_for(&self, title: &str) -> Option<String> {
        self.prefix.as_ref().map(|tpl| tpl.replace("${name}", title))
    }

    pub fn endpoints(&self, model: &ApiModel) -> Vec<Endpoint> {
        endpoint::collect(model, &self.exclude_fields)
    }
}

/// One rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub format: OutputFormat,
    /// `api.<ext>`
    pub file_name: String,
    pub content: String,
}

/// Render `model` in `format`.
pub fn render(model: &ApiModel, format: OutputFormat, options: &RenderOptions) -> Result<RenderOutput> {
    let renderer = create_renderer(format);
    Ok(RenderOutput {
        format,
        file_name: format!("api.{}", format.extension()),
        content: renderer.render(model, options)?,
    })
}

/// A type with the members a renderer should show.
pub(crate) struct TypeEntry<'a> {
    pub decl: &'a Declaration,
    pub members: Vec<&'a Declaration>,
}

/// Visible types and free members of a module, in declaration order.
/// Types nested in a hidden type are hidden too.
pub(crate) fn visible_entries<'a>(
    module: &'a Module,
    options: &RenderOptions,
) -> (Vec<TypeEntry<'a>>, Vec<&'a Declaration>) {
    let mut hidden: Vec<String> = Vec::new();
    let mut types = Vec::new();
    for decl in module.types() {
        let parent_hidden = decl
            .parent
            .as_ref()
            .is_some_and(|p| hidden.iter().any(|h| h == p));
        if parent_hidden || !options.is_visible(decl) {
            hidden.push(decl.path());
            continue;
        }
        let members = module
            .members_of(decl)
            .filter(|m| m.as_type().is_none() && options.is_visible(m))
            .collect();
        types.push(TypeEntry { decl, members });
    }
    let free = module
        .free_members()
        .filter(|d| options.is_visible(d))
        .collect();
    (types, free)
}
