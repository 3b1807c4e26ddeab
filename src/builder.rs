//! Doc model builder: merge per-file parse results into one [`ApiModel`].
//!
//! Files may arrive in any order (parsing is parallel); they are merged in
//! source path order so the model never depends on completion order.

use crate::model::*;
use crate::parser::ParsedFile;
use tracing::debug;

/// Accumulates parsed files until [`Builder::finish`].
#[derive(Debug, Default)]
pub struct Builder {
    files: Vec<ParsedFile>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: ParsedFile) {
        self.files.push(file);
    }

    /// Merge everything added so far.
    ///
    /// Returns the model plus the diagnostics of all files (parse problems
    /// first, in path order, then duplicate symbols as they were found).
    pub fn finish(mut self, meta: ProjectMeta) -> (ApiModel, Vec<Diagnostic>) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut model = ApiModel::default();
        model.meta = meta;
        let mut diagnostics = Vec::new();
        let mut duplicates = Vec::new();

        for file in self.files {
            debug!(
                "merging {} ({} declarations) into module `{}`",
                file.path.display(),
                file.declarations.len(),
                file.module
            );
            diagnostics.extend(file.diagnostics);
            model.set_imports(file.path.clone(), file.imports);

            let module = model.module_entry(&file.module);
            for decl in file.declarations {
                let line = decl.location.line;
                if let Some(previous) = module.insert(decl) {
                    if previous.as_type().is_some() {
                        let dropped = module.remove_members(&previous.path(), &file.path);
                        if dropped > 0 {
                            debug!("dropped {} members of replaced `{}`", dropped, previous.path());
                        }
                    }
                    duplicates.push(Diagnostic::new(
                        DiagnosticKind::DuplicateSymbol,
                        file.path.clone(),
                        Some(line),
                        format!(
                            "`{}` in module `{}` replaces the declaration at {}:{}",
                            previous.symbol(),
                            module.display_name(),
                            previous.location.path.display(),
                            previous.location.line
                        ),
                    ));
                }
            }
        }

        diagnostics.extend(duplicates);
        (model, diagnostics)
    }
}
