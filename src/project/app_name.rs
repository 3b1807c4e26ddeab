//! Application name discovery from Spring Boot configuration files.
//!
//! Searches upward from a source file for `src/main/resources` and reads the
//! servlet context path or the application name from `application` /
//! `bootstrap` properties or YAML files.

use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Shown when no application name can be found.
pub const PLACEHOLDER: &str = "[application]";

/// How many directory levels are searched above the starting point.
const MAX_SEARCH_LEVEL: usize = 20;

const CONFIG_FILES: &[&str] = &[
    "application.properties",
    "bootstrap.properties",
    "application.yml",
    "bootstrap.yml",
];

/// Application name for sources under `start`, if any config declares one.
pub fn find_application_name(start: &Path) -> Option<String> {
    for dir in start.ancestors().take(MAX_SEARCH_LEVEL) {
        let resources = dir.join("src").join("main").join("resources");
        if !resources.is_dir() {
            continue;
        }
        debug!("looking for application name in {}", resources.display());
        if let Some(name) = read_from_resources(&resources) {
            return Some(name);
        }
    }
    None
}

/// The resources directory itself first, then its immediate subdirectories
/// in name order.
fn read_from_resources(resources: &Path) -> Option<String> {
    if let Some(name) = read_from_directory(resources) {
        return Some(name);
    }
    let mut subdirs: Vec<_> = fs::read_dir(resources)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();
    subdirs.iter().find_map(|dir| read_from_directory(dir))
}

fn read_from_directory(dir: &Path) -> Option<String> {
    CONFIG_FILES.iter().find_map(|file| {
        let path = dir.join(file);
        let content = fs::read_to_string(&path).ok()?;
        let name = if file.ends_with(".properties") {
            from_properties(&content)
        } else {
            from_yaml(&content)
        };
        if let Some(ref name) = name {
            debug!("application name `{}` from {}", name, path.display());
        }
        name
    })
}

/// `server.servlet.context-path`, then `spring.application.name`, then
/// `spring.main.application.name`.
fn from_properties(content: &str) -> Option<String> {
    let props = parse_properties(content);
    let get = |key: &str| {
        props
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    };
    get("server.servlet.context-path")
        .and_then(context_path_name)
        .or_else(|| get("spring.application.name").map(str::to_string))
        .or_else(|| get("spring.main.application.name").map(str::to_string))
}

/// Minimal `.properties` reader: `key=value`, `key: value` or `key value`,
/// comments, and backslash line continuations.
fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut logical = String::new();
    for raw in content.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        if let Some(continued) = line.strip_suffix('\\') {
            logical.push_str(continued);
            continue;
        }
        logical.push_str(line);
        let split = logical.find(['=', ':']).or_else(|| logical.find(char::is_whitespace));
        let (key, value) = match split {
            Some(i) => (&logical[..i], &logical[i + 1..]),
            None => (logical.as_str(), ""),
        };
        entries.push((key.trim().to_string(), value.trim().to_string()));
        logical.clear();
    }
    entries
}

/// `server.servlet.context-path`, then `spring.application.name`. Every
/// document of a multi-document file is considered, first match wins.
fn from_yaml(content: &str) -> Option<String> {
    let mut context_path = None;
    let mut application_name = None;
    for document in serde_yaml::Deserializer::from_str(content) {
        let Ok(value) = Value::deserialize(document) else {
            continue;
        };
        if context_path.is_none() {
            context_path = lookup(&value, &["server", "servlet", "context-path"]).and_then(|v| context_path_name(&v));
        }
        if application_name.is_none() {
            application_name = lookup(&value, &["spring", "application", "name"]).filter(|v| !v.is_empty());
        }
    }
    context_path.or(application_name)
}

/// Nested lookup that also accepts dotted keys (`spring.application.name: x`).
fn lookup(value: &Value, path: &[&str]) -> Option<String> {
    if path.is_empty() {
        return match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
    }
    for split in 1..=path.len() {
        let key = path[..split].join(".");
        if let Some(child) = value.get(key.as_str()) {
            if let Some(found) = lookup(child, &path[split..]) {
                return Some(found);
            }
        }
    }
    None
}

/// Context path without its leading slash; `/` alone names nothing.
fn context_path_name(path: &str) -> Option<String> {
    let name = path.trim().trim_start_matches('/');
    (!name.is_empty()).then(|| name.to_string())
}
