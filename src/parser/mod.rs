//! Parser module: dispatch by source language.

pub mod java;
pub mod javadoc;
pub mod lexer;

use crate::model::{Declaration, Diagnostic, Language, SourceFile};
use std::path::{Path, PathBuf};

/// Per-file parse result handed to the builder.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path relative to the scanned root.
    pub path: PathBuf,
    /// Module the declarations belong to.
    pub module: String,
    pub imports: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a source file into its declarations. Never fails: malformed
/// constructs come back as diagnostics.
pub fn parse_file(file: &SourceFile) -> ParsedFile {
    match file.language {
        Language::Java => {
            let parsed = java::parse(file);
            let module = parsed
                .package
                .unwrap_or_else(|| directory_module(&file.path));
            ParsedFile {
                path: file.path.clone(),
                module,
                imports: parsed.imports,
                declarations: parsed.declarations,
                diagnostics: parsed.diagnostics,
            }
        }
    }
}

/// Module name for a file without a package: its directory relative to the
/// root, dot separated. Files at the root land in the default module `""`.
/// "web/dto/User.java" → "web.dto"
fn directory_module(path: &Path) -> String {
    path.parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default()
}
