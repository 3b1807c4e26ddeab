//! Document version from the current git branch.
//!
//! Reads `.git/HEAD` directly (following `gitdir:` files used by worktrees
//! and submodules) rather than shelling out to git.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Version used when no branch can be determined.
pub const DEFAULT_VERSION: &str = "V1.0.0";

static RE_VERSION_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Vv]?\d+\.\d+(\.\d+)?").unwrap());

static RE_EMBEDDED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(\.\d+)?)").unwrap());

static RE_COMMIT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").unwrap());

/// Formatted version for the repository containing `start`, if any.
pub fn branch_version(start: &Path) -> Option<String> {
    let git_dir = find_git_dir(start)?;
    let branch = read_branch(&git_dir)?;
    Some(format_branch_name(&branch))
}

/// Find the git directory of the repository containing `start`.
pub fn find_git_dir(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let dot_git = dir.join(".git");
        if dot_git.is_dir() {
            return Some(dot_git);
        }
        if dot_git.is_file() {
            let content = fs::read_to_string(&dot_git).ok()?;
            let target = content.lines().next()?.strip_prefix("gitdir:")?.trim();
            let target = Path::new(target);
            return Some(if target.is_absolute() {
                target.to_path_buf()
            } else {
                dir.join(target)
            });
        }
    }
    None
}

/// Branch name from `HEAD`; a detached head gives the short commit hash.
pub fn read_branch(git_dir: &Path) -> Option<String> {
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let line = head.lines().next()?.trim();
    if let Some(branch) = line.strip_prefix("ref: refs/heads/") {
        let branch = branch.trim();
        return (!branch.is_empty()).then(|| branch.to_string());
    }
    if RE_COMMIT_HASH.is_match(line) {
        return Some(line[..7].to_string());
    }
    None
}

/// Turn a branch name into a version label.
///
/// "1.2.0" → "V1.2.0", "v2.0" → "V2.0", "release/1.0.0" → "V1.0.0";
/// names without a version are returned unchanged.
pub fn format_branch_name(branch: &str) -> String {
    if branch.is_empty() {
        return DEFAULT_VERSION.to_string();
    }
    if RE_VERSION_LIKE.is_match(branch) {
        return match branch.strip_prefix(['V', 'v']) {
            Some(rest) => format!("V{}", rest),
            None => format!("V{}", branch),
        };
    }
    if let Some(caps) = RE_EMBEDDED_VERSION.captures(branch) {
        return format!("V{}", &caps[1]);
    }
    branch.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn version_like_branches() {
        assert_eq!(format_branch_name("1.2.0"), "V1.2.0");
        assert_eq!(format_branch_name("v1.2"), "V1.2");
        assert_eq!(format_branch_name("V3.1.5"), "V3.1.5");
        assert_eq!(format_branch_name("2.0.1-rc1"), "V2.0.1-rc1");
    }

    #[test]
    fn embedded_versions_are_extracted() {
        assert_eq!(format_branch_name("release/1.0.0"), "V1.0.0");
        assert_eq!(format_branch_name("feature/v2.0.0"), "V2.0.0");
        assert_eq!(format_branch_name("hotfix-1.2.3"), "V1.2.3");
    }

    #[test]
    fn other_names_kept() {
        assert_eq!(format_branch_name("main"), "main");
        assert_eq!(format_branch_name("feature/login"), "feature/login");
        assert_eq!(format_branch_name(""), DEFAULT_VERSION);
    }

    #[test]
    fn reads_branch_from_head() {
        let tmp = TempDir::new().unwrap();
        let git = tmp.path().join(".git");
        fs::create_dir_all(&git).unwrap();
        fs::write(git.join("HEAD"), "ref: refs/heads/release/3.1.5\n").unwrap();

        let nested = tmp.path().join("svc/src");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(branch_version(&nested).as_deref(), Some("V3.1.5"));
    }

    #[test]
    fn detached_head_gives_short_hash() {
        let tmp = TempDir::new().unwrap();
        let git = tmp.path().join(".git");
        fs::create_dir_all(&git).unwrap();
        fs::write(git.join("HEAD"), "0123456789abcdef0123456789abcdef01234567\n").unwrap();
        assert_eq!(read_branch(&git).as_deref(), Some("0123456"));
    }

    #[test]
    fn follows_gitdir_file() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real-git");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("HEAD"), "ref: refs/heads/develop\n").unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join(".git"), "gitdir: ../real-git\n").unwrap();

        let git_dir = find_git_dir(&work).unwrap();
        assert_eq!(read_branch(&git_dir).as_deref(), Some("develop"));
    }
}
