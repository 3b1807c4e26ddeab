//! Pipeline driver: scan → parse → build → render.
//!
//! Scanning and reading are sequential; parsing and rendering fan out over
//! rayon. Per-file problems are collected as diagnostics, while anything in
//! [`ApiDocError`] aborts the run with no output.

use crate::builder::Builder;
use crate::config::Config;
use crate::endpoint::is_controller;
use crate::error::{ApiDocError, Result};
use crate::model::{ApiModel, Diagnostic, SourceFile};
use crate::parser::{parse_file, ParsedFile};
use crate::project::{resolve_meta, AppNameResolver};
use crate::render::{render, RenderOptions, RenderOutput};
use crate::scanner::{ScanEntry, Scanner};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Scanning,
    Parsing,
    Building,
    Rendering,
    Done,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Idle => "idle",
            Stage::Scanning => "scanning",
            Stage::Parsing => "parsing",
            Stage::Building => "building",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
            Stage::Error => "error",
        })
    }
}

/// Shared flag a caller sets to stop a run between file units.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// One output per requested format, in the order requested.
    pub outputs: Vec<RenderOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate documentation for every source under `root`.
pub fn generate(root: &Path, config: &Config) -> Result<Generated> {
    generate_with_cancel(root, config, &CancelToken::new())
}

pub fn generate_with_cancel(root: &Path, config: &Config, cancel: &CancelToken) -> Result<Generated> {
    let mut driver = Driver {
        stage: Stage::Idle,
        cancel,
    };
    match driver.run(root, config) {
        Ok(generated) => {
            driver.enter(Stage::Done);
            Ok(generated)
        }
        Err(err) => {
            warn!("{} failed: {}", driver.stage, err);
            driver.enter(Stage::Error);
            Err(err)
        }
    }
}

struct Driver<'a> {
    stage: Stage,
    cancel: &'a CancelToken,
}

impl Driver<'_> {
    fn enter(&mut self, stage: Stage) {
        debug!("stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ApiDocError::Cancelled);
        }
        Ok(())
    }

    fn run(&mut self, root: &Path, config: &Config) -> Result<Generated> {
        let validated = config.validate()?;
        let mut diagnostics = Vec::new();

        self.enter(Stage::Scanning);
        let scanner = Scanner::new(root, validated.include, validated.exclude);
        let mut sources: Vec<SourceFile> = Vec::new();
        for entry in scanner.entries()? {
            self.check_cancelled()?;
            match entry {
                ScanEntry::File(file) => match file.read() {
                    Ok(source) => {
                        debug!("read {}", source.path.display());
                        sources.push(source);
                    }
                    Err(diagnostic) => diagnostics.push(diagnostic),
                },
                ScanEntry::Skipped(diagnostic) => diagnostics.push(diagnostic),
            }
        }
        info!("found {} source files under {}", sources.len(), scanner.root().display());

        self.enter(Stage::Parsing);
        let parsed: Vec<Option<ParsedFile>> = sources
            .par_iter()
            .map(|source| (!self.cancel.is_cancelled()).then(|| parse_file(source)))
            .collect();
        self.check_cancelled()?;

        self.enter(Stage::Building);
        let mut builder = Builder::new();
        for file in parsed.into_iter().flatten() {
            builder.add(file);
        }
        let (mut model, build_diagnostics) = builder.finish(resolve_meta(root, config));
        diagnostics.extend(build_diagnostics);
        assign_application_names(&mut model, root, config.application_name.clone());
        info!(
            "built model with {} declarations in {} modules",
            model.declaration_count(),
            model.modules().count()
        );
        self.check_cancelled()?;

        self.enter(Stage::Rendering);
        let options = RenderOptions::from(config);
        let outputs = validated
            .formats
            .par_iter()
            .map(|&format| render(&model, format, &options))
            .collect::<Result<Vec<_>>>()?;
        info!("rendered {} output(s)", outputs.len());

        Ok(Generated {
            outputs,
            diagnostics,
        })
    }
}

/// Record the application name of every file that declares a controller.
fn assign_application_names(model: &mut ApiModel, root: &Path, fixed: Option<String>) {
    let files: BTreeSet<PathBuf> = model
        .modules()
        .flat_map(|m| m.types())
        .filter(|d| is_controller(d))
        .map(|d| d.location.path.clone())
        .collect();
    let mut resolver = AppNameResolver::new(root, fixed);
    for file in files {
        let name = resolver.resolve(&file);
        debug!("application name for {}: {}", file.display(), name);
        model.set_application_name(file, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::model::DiagnosticKind;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(formats: &[&str]) -> Config {
        Config {
            formats: formats.iter().map(|f| f.to_string()).collect(),
            title: Some("Test".to_string()),
            date: Some("2024-01-01".to_string()),
            use_git_branch_as_version: false,
            ..Default::default()
        }
    }

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "src/main/java/com/demo/HelloController.java",
            r#"package com.demo;

@RestController
@RequestMapping("/hello")
public class HelloController {
    /** Say hello */
    @GetMapping("/say")
    public String say(@RequestParam String name) {
        return name;
    }
}
"#,
        );
        write(
            tmp.path(),
            "src/main/resources/application.properties",
            "spring.application.name=greeter\n",
        );
        tmp
    }

    #[test]
    fn renders_every_requested_format() {
        let tmp = project();
        let generated = generate(tmp.path(), &config(&["markdown", "json", "html"])).unwrap();
        let formats: Vec<OutputFormat> = generated.outputs.iter().map(|o| o.format).collect();
        assert_eq!(
            formats,
            vec![OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Html]
        );
        assert!(generated.diagnostics.is_empty());
        assert!(generated.outputs[0].content.contains("- `/greeter/hello/say`"));
    }

    #[test]
    fn output_is_deterministic() {
        let tmp = project();
        write(tmp.path(), "src/main/java/com/demo/A.java", "package com.demo;\npublic class A { public int a; }\n");
        write(tmp.path(), "src/main/java/com/demo/B.java", "package com.demo;\npublic class B { public int b; }\n");
        let cfg = config(&["markdown", "html", "json"]);
        let first = generate(tmp.path(), &cfg).unwrap();
        let second = generate(tmp.path(), &cfg).unwrap();
        for (a, b) in first.outputs.iter().zip(&second.outputs) {
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn configured_application_name_wins() {
        let tmp = project();
        let cfg = Config {
            application_name: Some("api".to_string()),
            ..config(&["markdown"])
        };
        let generated = generate(tmp.path(), &cfg).unwrap();
        assert!(generated.outputs[0].content.contains("- `/api/hello/say`"));
    }

    #[test]
    fn duplicate_symbols_are_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.java", "void foo() {}\n");
        write(tmp.path(), "b.java", "/** from b */\nvoid foo() {}\n");
        let cfg = Config {
            include_private: true,
            ..config(&["json"])
        };
        let generated = generate(tmp.path(), &cfg).unwrap();
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].kind, DiagnosticKind::DuplicateSymbol);
        let content = &generated.outputs[0].content;
        assert_eq!(content.matches("\"name\": \"foo\"").count(), 1);
        assert!(content.contains("from b"));
    }

    #[test]
    fn broken_declaration_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "x.java", "void broken(int a, {\n}\n/** fine */\nvoid ok() {}\n");
        let cfg = Config {
            include_private: true,
            ..config(&["markdown"])
        };
        let generated = generate(tmp.path(), &cfg).unwrap();
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].kind, DiagnosticKind::Parse);
        let content = &generated.outputs[0].content;
        assert!(content.contains("`void ok()`: fine"));
        assert!(!content.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_recorded_not_fatal() {
        let tmp = project();
        std::os::unix::fs::symlink(
            tmp.path().join("nowhere/Gone.java"),
            tmp.path().join("src/main/java/com/demo/Gone.java"),
        )
        .unwrap();

        let generated = generate(tmp.path(), &config(&["markdown"])).unwrap();
        assert_eq!(generated.diagnostics.len(), 1);
        assert_eq!(generated.diagnostics[0].kind, DiagnosticKind::Access);
        assert_eq!(
            generated.diagnostics[0].path,
            PathBuf::from("src/main/java/com/demo/Gone.java")
        );
        assert_eq!(generated.outputs.len(), 1);
        assert!(generated.outputs[0].content.contains("- `/greeter/hello/say`"));
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = generate(&tmp.path().join("missing"), &config(&["markdown"])).unwrap_err();
        assert!(matches!(err, ApiDocError::Access { .. }));
    }

    #[test]
    fn config_errors_come_before_scanning() {
        let tmp = TempDir::new().unwrap();
        let err = generate(&tmp.path().join("missing"), &config(&["pdf"])).unwrap_err();
        assert!(matches!(err, ApiDocError::Config(_)));
    }

    #[test]
    fn cancelled_run_produces_nothing() {
        let tmp = project();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = generate_with_cancel(tmp.path(), &config(&["markdown"]), &cancel).unwrap_err();
        assert!(matches!(err, ApiDocError::Cancelled));
    }

    #[test]
    fn empty_root_still_renders() {
        let tmp = TempDir::new().unwrap();
        let generated = generate(tmp.path(), &config(&["markdown"])).unwrap();
        assert_eq!(generated.outputs.len(), 1);
        assert!(generated.outputs[0].content.contains("# Test"));
    }
}
