//! Per-file accumulator of qualified declaration names

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of declaration recorded in a [`SymbolSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Class,
    Interface,
    Trait,
    Enum,
    Function,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 5] = [
        SymbolKind::Class,
        SymbolKind::Interface,
        SymbolKind::Trait,
        SymbolKind::Enum,
        SymbolKind::Function,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Trait => "trait",
            SymbolKind::Enum => "enum",
            SymbolKind::Function => "function",
        }
    }

    /// Classes, interfaces, traits and enums share the autoload class map
    pub fn is_class_like(&self) -> bool {
        !matches!(self, SymbolKind::Function)
    }

    fn index(&self) -> usize {
        match self {
            SymbolKind::Class => 0,
            SymbolKind::Interface => 1,
            SymbolKind::Trait => 2,
            SymbolKind::Enum => 3,
            SymbolKind::Function => 4,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl Bucket {
    fn insert(&mut self, name: String) -> bool {
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }
}

/// Five buckets of qualified names, each ordered by first insertion
#[derive(Debug, Clone, Default)]
pub struct SymbolSet {
    buckets: [Bucket; 5],
}

impl PartialEq for SymbolSet {
    fn eq(&self, other: &Self) -> bool {
        self.buckets
            .iter()
            .zip(other.buckets.iter())
            .all(|(a, b)| a.names == b.names)
    }
}

impl Eq for SymbolSet {}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns false when it was already present
    pub fn add(&mut self, kind: SymbolKind, name: impl Into<String>) -> bool {
        self.buckets[kind.index()].insert(name.into())
    }

    pub fn get(&self, kind: SymbolKind) -> &[String] {
        &self.buckets[kind.index()].names
    }

    pub fn contains(&self, kind: SymbolKind, name: &str) -> bool {
        self.buckets[kind.index()].seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.names.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.names.is_empty())
    }

    /// Class, interface, trait and enum names in bucket order
    pub fn class_like(&self) -> impl Iterator<Item = &str> {
        SymbolKind::ALL
            .into_iter()
            .filter(SymbolKind::is_class_like)
            .flat_map(move |kind| self.get(kind).iter().map(String::as_str))
    }

    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.get(SymbolKind::Function).iter().map(String::as_str)
    }

    /// Snapshot of all five buckets
    pub fn get_all(&self) -> SymbolBuckets {
        SymbolBuckets {
            classes: self.get(SymbolKind::Class).to_vec(),
            interfaces: self.get(SymbolKind::Interface).to_vec(),
            traits: self.get(SymbolKind::Trait).to_vec(),
            enums: self.get(SymbolKind::Enum).to_vec(),
            functions: self.get(SymbolKind::Function).to_vec(),
        }
    }
}

/// Owned, serializable view of a [`SymbolSet`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolBuckets {
    #[serde(rename = "class")]
    pub classes: Vec<String>,
    #[serde(rename = "interface")]
    pub interfaces: Vec<String>,
    #[serde(rename = "trait")]
    pub traits: Vec<String>,
    #[serde(rename = "enum")]
    pub enums: Vec<String>,
    #[serde(rename = "function")]
    pub functions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = SymbolSet::new();
        assert!(set.add(SymbolKind::Class, "Foo\\Bar"));
        assert!(!set.add(SymbolKind::Class, "Foo\\Bar"));
        assert_eq!(set.get(SymbolKind::Class), ["Foo\\Bar"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_name_in_different_buckets() {
        let mut set = SymbolSet::new();
        set.add(SymbolKind::Class, "Foo");
        set.add(SymbolKind::Function, "Foo");
        assert_eq!(set.len(), 2);
        assert!(set.contains(SymbolKind::Function, "Foo"));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut set = SymbolSet::new();
        set.add(SymbolKind::Trait, "Zeta");
        set.add(SymbolKind::Trait, "Alpha");
        set.add(SymbolKind::Trait, "Zeta");
        assert_eq!(set.get(SymbolKind::Trait), ["Zeta", "Alpha"]);
    }

    #[test]
    fn test_class_like_excludes_functions() {
        let mut set = SymbolSet::new();
        set.add(SymbolKind::Enum, "E");
        set.add(SymbolKind::Class, "C");
        set.add(SymbolKind::Function, "f");
        let names: Vec<_> = set.class_like().collect();
        assert_eq!(names, ["C", "E"]);
        assert_eq!(set.functions().collect::<Vec<_>>(), ["f"]);
    }

    #[test]
    fn test_get_all_serializes_with_kind_keys() {
        let mut set = SymbolSet::new();
        set.add(SymbolKind::Interface, "I");
        let json = serde_json::to_value(set.get_all()).unwrap();
        assert_eq!(json["interface"][0], "I");
        assert!(json["class"].as_array().unwrap().is_empty());
        assert!(json.get("enum").is_some());
    }
}
