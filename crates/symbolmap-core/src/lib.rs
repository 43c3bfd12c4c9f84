//! symbolmap-core: Declaration extraction for PHP class and function maps
//!
//! This crate provides:
//! - `extract()` / `extract_file()`: Namespace-scope declarations of one file
//! - `TextScanner`: Raw-text scanner that also produces cleaned source
//! - `Lexer` + `TokenScanner`: Token-stream scanner used as a cross-check
//! - `SymbolExtractionStrategy`: Common contract of both scanners
//! - `SymbolSet`: Per-file declaration buckets
//! - `SymbolMap`: Cross-file name to path map with an ambiguity ledger

pub mod cursor;
mod error;
pub mod keyword;
pub mod lexer;
pub mod strategy;
mod symbol_map;
mod symbol_set;
pub mod text_scan;
pub mod token_scan;

pub use error::{ExtractError, MapError};
pub use keyword::{Keyword, KeywordTable};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use strategy::{
    cross_check, Divergence, StrategyKind, SymbolExtractionStrategy, TextScanStrategy,
    TokenStreamStrategy,
};
pub use symbol_map::{AmbiguityFilter, SymbolMap};
pub use symbol_set::{SymbolBuckets, SymbolKind, SymbolSet};
pub use text_scan::{FirstMatch, TextScan, TextScanner};
pub use token_scan::TokenScanner;

use std::path::Path;

/// Extract declarations from source text with the text-scan strategy
pub fn extract(source: impl AsRef<[u8]>) -> Result<SymbolSet, ExtractError> {
    TextScanStrategy::new().extract(source.as_ref())
}

/// Read a file and extract its declarations with the text-scan strategy
pub fn extract_file(path: impl AsRef<Path>) -> Result<SymbolSet, ExtractError> {
    TextScanStrategy::new().extract_file(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_buckets() {
        let symbols = extract("<?php namespace Foo; class Bar {} function baz() {}").unwrap();
        let buckets = symbols.get_all();
        assert_eq!(
            buckets,
            SymbolBuckets {
                classes: vec!["Foo\\Bar".to_string()],
                interfaces: vec![],
                traits: vec![],
                enums: vec![],
                functions: vec!["Foo\\baz".to_string()],
            }
        );
    }

    #[test]
    fn test_literals_only_yield_nothing() {
        let src = "<?php\n$s = 'class Foo {';\n/* interface I {} */\n$h = <<<'T'\ntrait X {\nT;\n";
        assert!(extract(src).unwrap().is_empty());
    }
}
