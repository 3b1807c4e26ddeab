//! Source scanner: walks the input root and yields candidate source files.
//!
//! Entries come out in sorted path order. Hidden directories and build
//! output directories outside `src` trees are pruned. Symbolic links are
//! followed; unreadable entries, dangling links and link loops are reported
//! as [`ScanEntry::Skipped`] instead of aborting the walk.

use crate::error::{ApiDocError, ConfigError, Result};
use crate::model::{Diagnostic, DiagnosticKind, Language, SourceFile};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Build output directories, skipped unless they sit inside a `src` tree.
const PRUNED_DIRS: &[&str] = &["target", "build", "out", "node_modules"];

/// Compile include/exclude globs, reporting the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> std::result::Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ConfigError::InvalidGlob {
                pattern: p.clone(),
                message: e.msg.to_string(),
            })
        })
        .collect()
}

/// A source file found by the scanner, not read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Path on disk.
    pub path: PathBuf,
    /// Path relative to the scanned root.
    pub relative: PathBuf,
    pub language: Language,
}

impl FileRef {
    /// Read the file. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(&self) -> std::result::Result<SourceFile, Diagnostic> {
        let bytes = fs::read(&self.path).map_err(|e| {
            Diagnostic::new(
                DiagnosticKind::Access,
                self.relative.clone(),
                None,
                format!("cannot read file: {}", e),
            )
        })?;
        Ok(SourceFile {
            path: self.relative.clone(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            language: self.language,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    File(FileRef),
    /// A file or directory that could not be read.
    Skipped(Diagnostic),
}

#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, include: Vec<Pattern>, exclude: Vec<Pattern>) -> Self {
        Scanner {
            root: root.into(),
            include,
            exclude,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a walk over the root. Each call starts a fresh walk, so the
    /// sequence can be restarted any number of times.
    ///
    /// Fails only when the root itself cannot be read.
    pub fn entries(&self) -> Result<impl Iterator<Item = ScanEntry> + '_> {
        let meta = fs::metadata(&self.root).map_err(|e| ApiDocError::access(&self.root, e))?;
        if !meta.is_dir() {
            return Err(ApiDocError::access(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        fs::read_dir(&self.root).map_err(|e| ApiDocError::access(&self.root, e))?;

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !self.is_pruned(e));

        Ok(walker.filter_map(move |entry| match entry {
            Ok(entry) => self.classify(entry),
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| self.relative(p))
                    .unwrap_or_else(|| PathBuf::from("."));
                if self.exclude.iter().any(|p| p.matches_path(&path)) {
                    return None;
                }
                Some(ScanEntry::Skipped(Diagnostic::new(
                    DiagnosticKind::Access,
                    path,
                    None,
                    format!("cannot read: {}", err),
                )))
            }
        }))
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        let relative = self.relative(entry.path());
        let in_sources = relative
            .parent()
            .is_some_and(|p| p.components().any(|c| c.as_os_str() == "src"));
        if name.starts_with('.') || (!in_sources && PRUNED_DIRS.contains(&name.as_ref())) {
            debug!("pruned {}", relative.display());
            return true;
        }
        self.exclude.iter().any(|p| p.matches_path(&relative))
    }

    fn classify(&self, entry: DirEntry) -> Option<ScanEntry> {
        if !entry.file_type().is_file() {
            return None;
        }
        let language = Language::from_path(entry.path())?;
        let relative = self.relative(entry.path());
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches_path(&relative)) {
            return None;
        }
        if self.exclude.iter().any(|p| p.matches_path(&relative)) {
            return None;
        }
        Some(ScanEntry::File(FileRef {
            path: entry.into_path(),
            relative,
            language,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class X {}").unwrap();
    }

    fn files(scanner: &Scanner) -> Vec<String> {
        scanner
            .entries()
            .unwrap()
            .filter_map(|e| match e {
                ScanEntry::File(f) => Some(f.relative.to_string_lossy().replace('\\', "/")),
                ScanEntry::Skipped(_) => None,
            })
            .collect()
    }

    fn patterns(globs: &[&str]) -> Vec<Pattern> {
        compile_patterns(&globs.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn yields_sorted_java_files() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b/Z.java");
        touch(tmp.path(), "a/Y.java");
        touch(tmp.path(), "A.java");
        touch(tmp.path(), "notes.txt");

        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        assert_eq!(files(&scanner), vec!["A.java", "a/Y.java", "b/Z.java"]);
    }

    #[test]
    fn restartable() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "A.java");
        touch(tmp.path(), "B.java");
        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        assert_eq!(files(&scanner), files(&scanner));
    }

    #[test]
    fn prunes_hidden_and_build_dirs() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/A.java");
        touch(tmp.path(), ".git/B.java");
        touch(tmp.path(), "target/C.java");
        touch(tmp.path(), "build/D.java");
        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        assert_eq!(files(&scanner), vec!["src/A.java"]);
    }

    #[test]
    fn build_named_packages_inside_src_are_kept() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/main/java/com/acme/build/Tool.java");
        touch(tmp.path(), "src/main/java/com/acme/out/Sink.java");
        touch(tmp.path(), "app/target/classes/Gen.java");
        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        assert_eq!(
            files(&scanner),
            vec!["src/main/java/com/acme/build/Tool.java", "src/main/java/com/acme/out/Sink.java"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn follows_links_and_reports_dangling_ones() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "shared/Real.java");
        symlink(tmp.path().join("shared/Real.java"), tmp.path().join("Linked.java")).unwrap();
        symlink(tmp.path().join("missing/Gone.java"), tmp.path().join("Dangling.java")).unwrap();

        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        assert_eq!(files(&scanner), vec!["Linked.java", "shared/Real.java"]);

        let skipped: Vec<Diagnostic> = scanner
            .entries()
            .unwrap()
            .filter_map(|e| match e {
                ScanEntry::Skipped(d) => Some(d),
                ScanEntry::File(_) => None,
            })
            .collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].kind, DiagnosticKind::Access);
        assert_eq!(skipped[0].path, PathBuf::from("Dangling.java"));
    }

    #[test]
    fn include_and_exclude_globs() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/main/java/Api.java");
        touch(tmp.path(), "src/test/java/ApiTest.java");
        touch(tmp.path(), "src/main/java/gen/Gen.java");

        let scanner = Scanner::new(
            tmp.path(),
            patterns(&["src/main/**/*.java"]),
            patterns(&["**/gen"]),
        );
        assert_eq!(files(&scanner), vec!["src/main/java/Api.java"]);
    }

    #[test]
    fn missing_root_is_access_error() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new(tmp.path().join("missing"), Vec::new(), Vec::new());
        assert!(matches!(scanner.entries(), Err(ApiDocError::Access { .. })));
    }

    #[test]
    fn invalid_glob_rejected() {
        let err = compile_patterns(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }

    #[test]
    fn read_produces_relative_source_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "pkg/A.java");
        let scanner = Scanner::new(tmp.path(), Vec::new(), Vec::new());
        let entry = scanner.entries().unwrap().next().unwrap();
        let ScanEntry::File(file) = entry else {
            panic!("expected a file entry");
        };
        let source = file.read().unwrap();
        assert_eq!(source.path, PathBuf::from("pkg/A.java"));
        assert_eq!(source.content, "class X {}");
    }
}
