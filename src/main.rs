//! apidoc: generate API documentation from Java sources.
//!
//! - `apidoc path/to/project` prints markdown to stdout
//! - `apidoc -o docs -f markdown -f html path/to/project` writes `docs/api.md` and `docs/api.html`

use anyhow::{bail, Context, Result};
use apidoc::config::{Config, ConfigDiscovery};
use apidoc::logger::init_logger;
use apidoc::RenderOutput;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix template picked up from a directory or the output directory.
const PREFIX_FILE_NAME: &str = "_prefix.md";

#[derive(Parser)]
#[command(
    name = "apidoc",
    version,
    about = "Generate API reference and HTTP endpoint documentation from Java sources"
)]
struct Cli {
    /// Project root to scan
    root: Option<PathBuf>,

    /// Output directory; without it a single format is printed to stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), html, json. Repeatable.
    #[arg(short = 'f', long = "format")]
    formats: Vec<String>,

    /// Config file (default: apidoc.toml in the root, if present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Only document files matching this glob (relative to the root). Repeatable.
    #[arg(long)]
    include: Vec<String>,

    /// Skip files and directories matching this glob. Repeatable.
    #[arg(long)]
    exclude: Vec<String>,

    /// Include private declarations in the reference
    #[arg(long)]
    include_private: bool,

    /// Application name used as the first URL segment of every endpoint
    #[arg(long)]
    app_name: Option<String>,

    /// Document version (default: derived from the git branch)
    #[arg(long)]
    version_label: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Document title (default: the root directory name)
    #[arg(long)]
    title: Option<String>,

    /// Disable YAML frontmatter
    #[arg(long)]
    no_frontmatter: bool,

    /// Prefix template file or directory containing _prefix.md.
    /// Supports ${name} substitution.
    #[arg(short = 'p', long)]
    prefix: Option<String>,

    /// Write diagnostics as JSON to this file
    #[arg(long)]
    diagnostics: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short = 'q', long)]
    quiet: bool,

    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet, cli.no_color);

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = build_config(&cli, &root)?;

    let validated = config.validate().context("invalid configuration")?;
    if config.output.is_none() && validated.formats.len() > 1 {
        bail!("--output is required when more than one format is selected");
    }

    let generated = apidoc::generate(&root, &config)
        .with_context(|| format!("failed to generate documentation for {}", root.display()))?;

    for diagnostic in &generated.diagnostics {
        warn!("{}", diagnostic);
    }
    if let Some(ref path) = cli.diagnostics {
        let json = serde_json::to_string_pretty(&generated.diagnostics)
            .context("failed to serialize diagnostics")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    match config.output {
        Some(ref dir) => write_outputs(dir, &generated.outputs)?,
        None => {
            let mut stdout = io::stdout().lock();
            for output in &generated.outputs {
                stdout
                    .write_all(output.content.as_bytes())
                    .context("failed to write to stdout")?;
            }
        }
    }
    Ok(())
}

/// Discovered (or given) config file with the command-line flags on top.
fn build_config(cli: &Cli, root: &Path) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => ConfigDiscovery::new(root).load_or_default()?,
    };

    if !cli.formats.is_empty() {
        config.formats = cli.formats.clone();
    }
    if cli.output.is_some() {
        config.output = cli.output.clone();
    }
    if !cli.include.is_empty() {
        config.include = cli.include.clone();
    }
    config.exclude.extend(cli.exclude.iter().cloned());
    config.include_private |= cli.include_private;
    if cli.no_frontmatter {
        config.frontmatter = false;
    }
    for (target, flag) in [
        (&mut config.application_name, &cli.app_name),
        (&mut config.version, &cli.version_label),
        (&mut config.author, &cli.author),
        (&mut config.title, &cli.title),
    ] {
        if flag.is_some() {
            *target = flag.clone();
        }
    }

    let prefix = resolve_prefix(cli.prefix.as_deref(), config.output.as_deref())?;
    if prefix.is_some() {
        config.prefix = prefix;
    }
    Ok(config)
}

/// Resolve the prefix template from the -p flag.
///
/// A file is read as is; a directory is searched for `_prefix.md`. Without
/// the flag the output directory is checked for `_prefix.md`.
fn resolve_prefix(prefix_arg: Option<&str>, output_dir: Option<&Path>) -> Result<Option<String>> {
    match prefix_arg {
        Some(p) => {
            let path = Path::new(p);
            if path.is_file() {
                Ok(Some(fs::read_to_string(path).with_context(|| {
                    format!("failed to read prefix file: {}", path.display())
                })?))
            } else if path.is_dir() {
                let candidate = path.join(PREFIX_FILE_NAME);
                if candidate.is_file() {
                    Ok(Some(fs::read_to_string(&candidate).with_context(|| {
                        format!("failed to read prefix file: {}", candidate.display())
                    })?))
                } else {
                    bail!("no {} in {}", PREFIX_FILE_NAME, path.display());
                }
            } else {
                bail!("prefix not found: {}", p);
            }
        }
        None => {
            let Some(dir) = output_dir else {
                return Ok(None);
            };
            let candidate = dir.join(PREFIX_FILE_NAME);
            if candidate.is_file() {
                Ok(Some(fs::read_to_string(&candidate).with_context(|| {
                    format!("failed to read prefix file: {}", candidate.display())
                })?))
            } else {
                Ok(None)
            }
        }
    }
}

fn write_outputs(dir: &Path, outputs: &[RenderOutput]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    for output in outputs {
        let path = dir.join(&output.file_name);
        fs::write(&path, &output.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prefix_from_file_and_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("head.md");
        fs::write(&file, "# ${name}").unwrap();
        let prefix = resolve_prefix(file.to_str(), None).unwrap();
        assert_eq!(prefix.as_deref(), Some("# ${name}"));

        fs::write(tmp.path().join(PREFIX_FILE_NAME), "dir prefix").unwrap();
        let prefix = resolve_prefix(tmp.path().to_str(), None).unwrap();
        assert_eq!(prefix.as_deref(), Some("dir prefix"));
    }

    #[test]
    fn prefix_fallback_to_output_dir() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_prefix(None, Some(tmp.path())).unwrap(), None);
        fs::write(tmp.path().join(PREFIX_FILE_NAME), "out prefix").unwrap();
        let prefix = resolve_prefix(None, Some(tmp.path())).unwrap();
        assert_eq!(prefix.as_deref(), Some("out prefix"));
    }

    #[test]
    fn missing_prefix_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.md");
        assert!(resolve_prefix(missing.to_str(), None).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("apidoc.toml"),
            "formats = [\"json\"]\nauthor = \"file\"\nexclude = [\"gen/**\"]\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "apidoc",
            "--author",
            "flag",
            "-f",
            "html",
            "--exclude",
            "test/**",
            "--no-frontmatter",
        ]);
        let config = build_config(&cli, tmp.path()).unwrap();
        assert_eq!(config.formats, vec!["html"]);
        assert_eq!(config.author.as_deref(), Some("flag"));
        assert_eq!(config.exclude, vec!["gen/**", "test/**"]);
        assert!(!config.frontmatter);
    }
}
