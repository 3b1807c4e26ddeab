//! Project context: document metadata and per-file application names.

pub mod app_name;
pub mod git;

use crate::config::Config;
use crate::model::ProjectMeta;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Document metadata for a run over `root`.
///
/// Title falls back to the root directory name, version to the current git
/// branch (when enabled) and date to today.
pub fn resolve_meta(root: &Path, config: &Config) -> ProjectMeta {
    let title = config.title.clone().unwrap_or_else(|| {
        root.canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "API".to_string())
    });

    let version = config.version.clone().or_else(|| {
        config.use_git_branch_as_version.then(|| {
            git::branch_version(root).unwrap_or_else(|| git::DEFAULT_VERSION.to_string())
        })
    });

    let date = config
        .date
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    ProjectMeta {
        title,
        author: config.author.clone(),
        version,
        date: Some(date),
    }
}

/// Resolves application names for source files, caching by directory.
pub struct AppNameResolver {
    root: PathBuf,
    fixed: Option<String>,
    cache: HashMap<PathBuf, String>,
}

impl AppNameResolver {
    pub fn new(root: impl Into<PathBuf>, fixed: Option<String>) -> Self {
        AppNameResolver {
            root: root.into(),
            fixed,
            cache: HashMap::new(),
        }
    }

    /// Name for a file given relative to the root; the placeholder when
    /// nothing is configured or discovered.
    pub fn resolve(&mut self, relative: &Path) -> String {
        if let Some(ref name) = self.fixed {
            return name.clone();
        }
        let dir = self.root.join(relative.parent().unwrap_or(Path::new("")));
        self.cache
            .entry(dir)
            .or_insert_with_key(|dir| {
                app_name::find_application_name(dir).unwrap_or_else(|| app_name::PLACEHOLDER.to_string())
            })
            .clone()
    }
}
