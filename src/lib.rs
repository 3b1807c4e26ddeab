//! apidoc: API reference and HTTP endpoint documentation from Java sources.
//!
//! The pipeline scans a source tree, parses every file into declarations,
//! merges them into one [`ApiModel`](model::ApiModel) and renders it as
//! markdown, HTML or JSON. Spring MVC controllers additionally produce
//! endpoint blocks (URL, verb, request and response fields, JSON samples).

pub mod builder;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logger;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod scanner;
pub mod toc;

pub use config::{Config, ConfigDiscovery, OutputFormat};
pub use error::{ApiDocError, ConfigError, Result};
pub use pipeline::{generate, generate_with_cancel, CancelToken, Generated};
pub use render::RenderOutput;
