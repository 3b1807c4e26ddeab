//! Fatal error types for the generation pipeline.
//!
//! Everything that does not abort a run (unreadable single files, malformed
//! declarations, symbol collisions) is a [`Diagnostic`](crate::model::Diagnostic)
//! instead.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiDocError>;

/// Errors that stop the pipeline before any output is produced.
#[derive(Debug, Error)]
pub enum ApiDocError {
    /// Invalid configuration, raised before scanning starts.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The input root (or another path the run cannot do without) is unreadable.
    #[error("cannot access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {format} output: {source}")]
    Render {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The caller cancelled the run between file units.
    #[error("generation cancelled")]
    Cancelled,
}

impl ApiDocError {
    pub fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ApiDocError::Access {
            path: path.into(),
            source,
        }
    }
}

/// Configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown format: {0}. Use markdown, html, or json")]
    UnknownFormat(String),

    #[error("no output format selected")]
    NoFormats,

    #[error("invalid glob pattern `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("output path is not a directory: {}", .0.display())]
    OutputNotDirectory(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}
