//! Candidate file discovery

use crate::error::GeneratorError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// List the files under `path` whose extension is one of `extensions`.
///
/// `path` may be a file, a directory or a glob pattern matching directories.
/// Directories listed in `excluded_dirs` are not entered: a bare name
/// excludes that directory at any depth, a name containing `/` is matched
/// against the path relative to the search root. Results are sorted by file
/// name within each directory so repeated runs see the same order.
pub fn discover(
    path: &Path,
    extensions: &[String],
    excluded_dirs: &[String],
) -> Result<Vec<PathBuf>, GeneratorError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        return Ok(walk(path, extensions, excluded_dirs));
    }

    let pattern = path.to_string_lossy();
    if !pattern.contains('*') {
        return Err(GeneratorError::InvalidPath(path.to_path_buf()));
    }

    let matches = glob::glob(&pattern).map_err(|e| GeneratorError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in matches.filter_map(|e| e.ok()) {
        if entry.is_dir() {
            files.extend(walk(&entry, extensions, excluded_dirs));
        } else if has_extension(&entry, extensions) {
            files.push(entry);
        }
    }
    Ok(files)
}

fn walk(root: &Path, extensions: &[String], excluded_dirs: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(root, entry, excluded_dirs))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect()
}

fn is_excluded_dir(root: &Path, entry: &DirEntry, excluded_dirs: &[String]) -> bool {
    if excluded_dirs.is_empty() || entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let relative = entry
        .path()
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let name = entry.file_name().to_string_lossy();

    excluded_dirs.iter().any(|excluded| {
        let excluded = excluded.trim_matches('/');
        if excluded.contains('/') {
            relative == excluded
        } else {
            name == excluded
        }
    })
}

pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["php".to_string(), "inc".to_string()]
    }

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn test_walk_filters_extensions_and_sorts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.php");
        touch(dir.path(), "a.inc");
        touch(dir.path(), "c.txt");
        touch(dir.path(), "sub/d.php");

        let files = discover(dir.path(), &exts(), &[]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.inc", "b.php", "sub/d.php"]);
    }

    #[test]
    fn test_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/A.php");
        touch(dir.path(), "src/tests/B.php");
        touch(dir.path(), "vendor/pkg/C.php");
        touch(dir.path(), "lib/vendor/D.php");

        let files = discover(
            dir.path(),
            &exts(),
            &["tests".to_string(), "/vendor/pkg".to_string()],
        )
        .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["D.php", "A.php"]);
    }

    #[test]
    fn test_single_file_and_invalid_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.php");
        let file = dir.path().join("one.php");
        assert_eq!(discover(&file, &exts(), &[]).unwrap(), vec![file]);

        let missing = dir.path().join("missing");
        assert!(matches!(
            discover(&missing, &exts(), &[]),
            Err(GeneratorError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_glob_pattern() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg-a/src/A.php");
        touch(dir.path(), "pkg-b/src/B.php");
        touch(dir.path(), "other/C.php");

        let pattern = dir.path().join("pkg-*").join("src");
        let files = discover(&pattern, &exts(), &[]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("pkg-a/src/A.php"));
    }
}
