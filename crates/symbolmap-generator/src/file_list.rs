//! Duplicate-scan membership list

use std::collections::HashSet;

/// Real paths of files that were already folded into a map.
///
/// Share one list across several `scan_paths` calls with overlapping inputs
/// so that no file is extracted twice.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    files: HashSet<String>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>) {
        self.files.insert(path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let mut list = FileList::new();
        assert!(!list.contains("/a.php"));
        list.add("/a.php");
        list.add("/a.php");
        assert!(list.contains("/a.php"));
        assert_eq!(list.len(), 1);
    }
}
