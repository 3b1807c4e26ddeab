//! JSON renderer: structured output for tooling integration.
//!
//! Serializes borrowed views of the model with serde, so field order and
//! formatting follow the struct definitions.

use crate::config::OutputFormat;
use crate::endpoint::Endpoint;
use crate::error::{ApiDocError, Result};
use crate::model::*;
use crate::render::{visible_entries, RenderOptions, Renderer};
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
struct DocumentView<'a> {
    #[serde(flatten)]
    meta: &'a ProjectMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    endpoints: Vec<EndpointView<'a>>,
    modules: Vec<ModuleView<'a>>,
}

#[derive(Serialize)]
struct EndpointView<'a> {
    #[serde(flatten)]
    endpoint: &'a Endpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    call_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json: Option<String>,
}

#[derive(Serialize)]
struct ModuleView<'a> {
    name: &'a str,
    types: Vec<TypeView<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    members: Vec<&'a Declaration>,
}

#[derive(Serialize)]
struct TypeView<'a> {
    #[serde(flatten)]
    decl: &'a Declaration,
    signature: String,
    members: Vec<MemberView<'a>>,
}

#[derive(Serialize)]
struct MemberView<'a> {
    #[serde(flatten)]
    decl: &'a Declaration,
    signature: String,
}

impl Renderer for JsonRenderer {
    fn render(&self, model: &ApiModel, options: &RenderOptions) -> Result<String> {
        let endpoints = options.endpoints(model);
        let view = DocumentView {
            meta: &model.meta,
            prefix: options.prefix_for(&model.meta.title),
            endpoints: endpoints
                .iter()
                .map(|endpoint| EndpointView {
                    endpoint,
                    call_location: options.show_call_location.then(|| endpoint.call_location()),
                    request_json: (options.show_request_json && !endpoint.request.is_empty())
                        .then(|| endpoint.request_json()),
                    response_json: (options.show_response_json && !endpoint.response.is_empty())
                        .then(|| endpoint.response_json()),
                })
                .collect(),
            modules: model
                .modules()
                .filter_map(|module| {
                    let (types, free) = visible_entries(module, options);
                    if types.is_empty() && free.is_empty() {
                        return None;
                    }
                    Some(ModuleView {
                        name: &module.name,
                        types: types
                            .into_iter()
                            .map(|entry| TypeView {
                                decl: entry.decl,
                                signature: entry.decl.signature(),
                                members: entry
                                    .members
                                    .into_iter()
                                    .map(|decl| MemberView {
                                        decl,
                                        signature: decl.signature(),
                                    })
                                    .collect(),
                            })
                            .collect(),
                        members: free,
                    })
                })
                .collect(),
        };

        let mut out = serde_json::to_string_pretty(&view).map_err(|source| ApiDocError::Render {
            format: OutputFormat::Json.name(),
            source,
        })?;
        out.push('\n');
        Ok(out)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}
