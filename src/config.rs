//! Run configuration: `apidoc.toml` discovery, defaults and validation.
//!
//! The CLI loads the discovered file (if any) and overlays its flags on top.
//! [`Config::validate`] runs before scanning so that bad formats, globs or
//! output paths fail fast.

use crate::error::ConfigError;
use crate::scanner::compile_patterns;
use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name looked up in the scanned root.
pub const CONFIG_FILE_NAME: &str = "apidoc.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Json,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Everything a run can be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Format names (`markdown`/`md`, `html`, `json`).
    pub formats: Vec<String>,
    pub output: Option<PathBuf>,
    /// Globs relative to the root; empty means every source file.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_private: bool,

    /// Document title; defaults to the root directory name.
    pub title: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    /// Document date; defaults to today.
    pub date: Option<String>,
    /// Overrides the application name discovered from Spring config files.
    pub application_name: Option<String>,
    pub use_git_branch_as_version: bool,

    pub show_call_location: bool,
    pub show_request_json: bool,
    pub show_response_json: bool,
    pub frontmatter: bool,
    /// Text placed before the rendered body; `${name}` is replaced by the title.
    pub prefix: Option<String>,

    /// Class name → field names hidden from endpoint tables.
    /// `*` or an empty list hides the whole class.
    pub exclude_fields: IndexMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            formats: vec!["markdown".to_string()],
            output: None,
            include: Vec::new(),
            exclude: Vec::new(),
            include_private: false,
            title: None,
            author: None,
            version: None,
            date: None,
            application_name: None,
            use_git_branch_as_version: true,
            show_call_location: true,
            show_request_json: true,
            show_response_json: true,
            frontmatter: true,
            prefix: None,
            exclude_fields: IndexMap::new(),
        }
    }
}

/// The parts of a [`Config`] that need checking before a run starts.
#[derive(Debug, Clone)]
pub struct Validated {
    /// Deduplicated, in the order given.
    pub formats: Vec<OutputFormat>,
    pub include: Vec<Pattern>,
    pub exclude: Vec<Pattern>,
}

impl Config {
    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<Validated, ConfigError> {
        let mut formats = Vec::new();
        for name in &self.formats {
            let format: OutputFormat = name.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }

        if let Some(ref output) = self.output {
            if output.exists() && !output.is_dir() {
                return Err(ConfigError::OutputNotDirectory(output.clone()));
            }
        }

        Ok(Validated {
            formats,
            include: compile_patterns(&self.include)?,
            exclude: compile_patterns(&self.exclude)?,
        })
    }
}

/// Finds `apidoc.toml` in a project root.
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    /// Load the discovered file, or the defaults when there is none.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.find() {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.formats, vec!["markdown"]);
        assert!(config.use_git_branch_as_version);
        assert!(config.show_request_json);
        assert!(!config.include_private);
        let validated = config.validate().unwrap();
        assert_eq!(validated.formats, vec![OutputFormat::Markdown]);
    }

    #[test]
    fn format_aliases_and_dedup() {
        let config = Config {
            formats: vec!["md".into(), "json".into(), "markdown".into(), "html".into()],
            ..Default::default()
        };
        let validated = config.validate().unwrap();
        assert_eq!(
            validated.formats,
            vec![OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Html]
        );
    }

    #[test]
    fn unknown_format() {
        let config = Config {
            formats: vec!["xml".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "unknown format: xml. Use markdown, html, or json");
    }

    #[test]
    fn empty_formats() {
        let config = Config {
            formats: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoFormats)));
    }

    #[test]
    fn output_must_not_be_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("out.md");
        fs::write(&file, "").unwrap();
        let config = Config {
            output: Some(file),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputNotDirectory(_))
        ));
    }

    #[test]
    fn invalid_exclude_glob() {
        let config = Config {
            exclude: vec!["a/[".into()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn load_from_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
formats = ["markdown", "json"]
author = "peach"
application_name = "shop"
show_response_json = false

[exclude_fields]
"com.demo.BaseEntity" = ["createTime"]
Secret = []
"#,
        )
        .unwrap();

        let config = ConfigDiscovery::new(tmp.path()).load_or_default().unwrap();
        assert_eq!(config.formats, vec!["markdown", "json"]);
        assert_eq!(config.author.as_deref(), Some("peach"));
        assert!(!config.show_response_json);
        assert!(config.show_request_json);
        let keys: Vec<&str> = config.exclude_fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["com.demo.BaseEntity", "Secret"]);
        assert_eq!(config.exclude_fields["com.demo.BaseEntity"], vec!["createTime"]);
        assert!(config.exclude_fields["Secret"].is_empty());
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "colour = true\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ConfigDiscovery::new(tmp.path()).load_or_default().unwrap();
        assert_eq!(config, Config::default());
    }
}
