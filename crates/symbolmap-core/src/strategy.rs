//! Interchangeable extraction strategies
//!
//! Both strategies satisfy one contract: raw source bytes in, a [`SymbolSet`]
//! of namespace-scope declarations out. [`cross_check`] runs both and reports
//! the first bucket where they disagree.

use crate::error::ExtractError;
use crate::keyword::KeywordTable;
use crate::lexer::tokenize;
use crate::symbol_set::{SymbolKind, SymbolSet};
use crate::text_scan::TextScanner;
use crate::token_scan::TokenScanner;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Capability shared by every extraction strategy
pub trait SymbolExtractionStrategy: Send + Sync {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    fn extract(&self, source: &[u8]) -> Result<SymbolSet, ExtractError>;

    fn extract_file(&self, path: &Path) -> Result<SymbolSet, ExtractError> {
        let source = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract(&source)
    }
}

/// Character-cursor scanner over raw text
#[derive(Debug, Clone)]
pub struct TextScanStrategy {
    table: &'static KeywordTable,
}

impl TextScanStrategy {
    pub fn new() -> Self {
        Self {
            table: KeywordTable::standard(),
        }
    }

    pub fn with_table(table: &'static KeywordTable) -> Self {
        Self { table }
    }
}

impl Default for TextScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolExtractionStrategy for TextScanStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, source: &[u8]) -> Result<SymbolSet, ExtractError> {
        Ok(TextScanner::new(source, self.table).scan()?.symbols)
    }
}

/// Lexes the file first, then walks the tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenStreamStrategy;

impl SymbolExtractionStrategy for TokenStreamStrategy {
    fn name(&self) -> &'static str {
        "tokens"
    }

    fn extract(&self, source: &[u8]) -> Result<SymbolSet, ExtractError> {
        let tokens = tokenize(source);
        TokenScanner::new(&tokens).scan()
    }
}

/// Strategy selector as it appears in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Text,
    Tokens,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn SymbolExtractionStrategy> {
        match self {
            StrategyKind::Text => Box::new(TextScanStrategy::new()),
            StrategyKind::Tokens => Box::new(TokenStreamStrategy),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Text => "text",
            StrategyKind::Tokens => "tokens",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(StrategyKind::Text),
            "tokens" | "token" => Ok(StrategyKind::Tokens),
            other => Err(format!(
                "Unknown strategy '{}' (expected 'text' or 'tokens')",
                other
            )),
        }
    }
}

/// First bucket in which the two strategies disagree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub kind: SymbolKind,
    pub text_scan: Vec<String>,
    pub token_stream: Vec<String>,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bucket differs: text scan {:?}, token stream {:?}",
            self.kind, self.text_scan, self.token_stream
        )
    }
}

/// Run both strategies over `source` and compare the results bucket by bucket.
///
/// An error from either strategy is returned as is.
pub fn cross_check(source: &[u8]) -> Result<Option<Divergence>, ExtractError> {
    let text = TextScanStrategy::new().extract(source)?;
    let tokens = TokenStreamStrategy.extract(source)?;

    Ok(SymbolKind::ALL.iter().find_map(|&kind| {
        let (a, b) = (text.get(kind), tokens.get(kind));
        (a != b).then(|| Divergence {
            kind,
            text_scan: a.to_vec(),
            token_stream: b.to_vec(),
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("text".parse::<StrategyKind>(), Ok(StrategyKind::Text));
        assert_eq!("Tokens".parse::<StrategyKind>(), Ok(StrategyKind::Tokens));
        assert!("ast".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::default(), StrategyKind::Text);
    }

    #[test]
    fn test_built_strategies_agree() {
        let src = b"<?php namespace A; final class B {} interface C {} function d() {}";
        let text = StrategyKind::Text.build();
        let tokens = StrategyKind::Tokens.build();
        assert_eq!(text.name(), "text");
        assert_eq!(tokens.name(), "tokens");
        assert_eq!(text.extract(src).unwrap(), tokens.extract(src).unwrap());
    }

    #[test]
    fn test_cross_check_agreement() {
        let src = b"<?php $f = function () {}; class A { const B = 1; }";
        assert_eq!(cross_check(src).unwrap(), None);
    }

    #[test]
    fn test_extract_file_missing() {
        let err = TextScanStrategy::new()
            .extract_file(Path::new("/definitely/not/here.php"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert_eq!(err.offset(), None);
    }
}
