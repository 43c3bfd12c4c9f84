//! Cross-file symbol map
//!
//! Maps each qualified name to the first path it was seen in (the canonical
//! path) and keeps a ledger of any other distinct paths that declared the same
//! name. Keys are case-sensitive: `Foo` and `foo` are separate entries even
//! though PHP would reject such a redeclaration at load time.

use crate::error::MapError;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Filter applied to the ambiguous ledger before it is reported
#[derive(Debug, Clone, Default)]
pub enum AmbiguityFilter {
    /// Drop paths that look like tests, fixtures, examples or stubs
    #[default]
    Default,
    /// Drop paths matching a caller-supplied pattern
    Pattern(Regex),
    /// Report every ambiguous path
    Disabled,
}

impl AmbiguityFilter {
    pub fn default_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"(?i)/(test|fixture|example|stub)s?/").expect("Invalid regex")
        })
    }

    fn pattern(&self) -> Option<&Regex> {
        match self {
            AmbiguityFilter::Default => Some(Self::default_pattern()),
            AmbiguityFilter::Pattern(regex) => Some(regex),
            AmbiguityFilter::Disabled => None,
        }
    }

    /// True when the path should be hidden from the ambiguous report
    pub fn excludes(&self, path: &str) -> bool {
        match self.pattern() {
            Some(regex) => regex.is_match(&path.replace('\\', "/")),
            None => false,
        }
    }
}

/// Name to path map with an ambiguous-paths ledger
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    ambiguous: Vec<(String, Vec<String>)>,
    ambiguous_index: HashMap<String, usize>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path for `name`, replacing any previous one
    pub fn add_symbol(&mut self, name: impl Into<String>, path: impl Into<String>) {
        let name = name.into();
        let path = path.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = path,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, path));
            }
        }
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get_symbol_path(&self, name: &str) -> Result<&str, MapError> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_str())
            .ok_or_else(|| MapError::NotFound(name.to_string()))
    }

    /// Append `path` to the ledger for `name` unless it is already listed
    pub fn add_ambiguous_symbol(&mut self, name: impl Into<String>, path: impl Into<String>) {
        let name = name.into();
        let path = path.into();
        match self.ambiguous_index.get(&name) {
            Some(&i) => {
                let paths = &mut self.ambiguous[i].1;
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            None => {
                self.ambiguous_index
                    .insert(name.clone(), self.ambiguous.len());
                self.ambiguous.push((name, vec![path]));
            }
        }
    }

    /// Fold one (name, path) observation into the map.
    ///
    /// The first path seen for a name becomes canonical. A different path is
    /// added to the ambiguous ledger; repeating the canonical path is a no-op.
    /// Returns true when the observation made the name ambiguous.
    pub fn record(&mut self, name: &str, path: &str) -> bool {
        let same_as_canonical = self.index.get(name).map(|&i| self.entries[i].1 == path);
        match same_as_canonical {
            None => {
                self.add_symbol(name, path);
                false
            }
            Some(true) => false,
            Some(false) => {
                self.add_ambiguous_symbol(name, path);
                true
            }
        }
    }

    /// Record every name in `names` against the same path
    pub fn fold<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, path: &str) -> usize {
        names
            .into_iter()
            .filter(|name| self.record(name, path))
            .count()
    }

    pub fn get_map(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_str()))
    }

    /// Ambiguous ledger with filtered paths removed.
    ///
    /// Names whose list becomes empty after filtering are omitted.
    pub fn get_ambiguous_symbols(&self, filter: &AmbiguityFilter) -> Vec<(String, Vec<String>)> {
        self.ambiguous
            .iter()
            .filter_map(|(name, paths)| {
                let kept: Vec<String> = paths
                    .iter()
                    .filter(|path| !filter.excludes(path))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (name.clone(), kept))
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order the canonical map by name (byte order)
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
    }
}

impl Serialize for SymbolMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, path) in &self.entries {
            map.serialize_entry(name, path)?;
        }
        map.end()
    }
}
