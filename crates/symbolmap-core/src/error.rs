//! Error types for symbol extraction and symbol map lookups

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while extracting declarations from one file
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A body skip reached end of input with unbalanced braces
    #[error("Unterminated body: brace opened at byte {offset} is never closed")]
    UnterminatedBody { offset: usize },

    /// A declaration keyword was confirmed but no opening brace follows it
    #[error("Structural delimiter not found: no '{{' after `{keyword}` at byte {offset}")]
    StructuralDelimiterNotFound { keyword: &'static str, offset: usize },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Byte offset in the source where the failure was detected, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            ExtractError::UnterminatedBody { offset }
            | ExtractError::StructuralDelimiterNotFound { offset, .. } => Some(*offset),
            ExtractError::Io { .. } => None,
        }
    }
}

/// Failures raised by symbol map lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("Symbol {0} is not present in the map")]
    NotFound(String),
}
