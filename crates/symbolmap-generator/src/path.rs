//! Path helpers for comparable file paths

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Protocol (`phar:`, `phar://`, `phar://c:`) or drive (`c:`) prefix
fn prefix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([0-9a-z]{2,}:(?://(?:[a-z]:)?)?|[a-z]:)").expect("Invalid regex")
    })
}

fn drive_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:^|://)[a-z]:$").expect("Invalid regex"))
}

fn repeated_separator_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[^:])[\\/]{2,}").expect("Invalid regex"))
}

/// True for `/unix`, `c:\windows` and `\\unc` paths
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/') || path.as_bytes().get(1) == Some(&b':') || path.starts_with("\\\\")
}

/// Collapse runs of separators into one `/`, leaving `scheme://` intact
pub fn collapse_separators(path: &str) -> String {
    repeated_separator_pattern()
        .replace_all(path, "${1}/")
        .into_owned()
}

/// Normalize a path: backslashes become slashes, the trailing slash is
/// dropped, and redundant separators and `.`/`..` segments are collapsed.
///
/// UNC (`//host`), protocol and drive prefixes are kept, with drive letters
/// upper-cased.
pub fn normalize_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    let mut absolute = "";

    if path.starts_with("//") && path.len() > 2 {
        absolute = "//";
        path = path[2..].to_string();
    }

    let mut prefix = String::new();
    if let Some(m) = prefix_pattern().find(&path) {
        prefix = m.as_str().to_string();
        path = path[m.end()..].to_string();
    }

    if let Some(rest) = path.strip_prefix('/') {
        absolute = "/";
        path = rest.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    let mut up = false;
    for chunk in path.split('/') {
        if chunk == ".." && (!absolute.is_empty() || up) {
            parts.pop();
            up = !(parts.is_empty() || parts.last() == Some(&".."));
        } else if chunk != "." && !chunk.is_empty() {
            parts.push(chunk);
            up = chunk != "..";
        }
    }

    let prefix = drive_pattern().replace_all(&prefix, |caps: &Captures| caps[0].to_uppercase());
    format!("{}{}{}", prefix, absolute, parts.join("/"))
}
