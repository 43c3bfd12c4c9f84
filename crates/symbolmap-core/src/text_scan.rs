//! Raw-text scanning strategy
//!
//! Walks the source byte by byte, delegating literals and comments to the
//! [`Cursor`] primitives. Alongside the symbols it builds a "clean" copy of the
//! source in which strings read `null`, comments are gone and every recorded
//! declaration body is collapsed to `{}`.

use crate::cursor::{is_ident_char, is_ident_start, is_whitespace, Cursor};
use crate::error::ExtractError;
use crate::keyword::{
    follows_access_operator, is_reserved_class_name, preceded_by_word, Keyword, KeywordTable,
};
use crate::symbol_set::{SymbolKind, SymbolSet};

/// Placeholder written in place of every skipped string literal
const STRING_PLACEHOLDER: &[u8] = b"null";

/// Result of a full scan
#[derive(Debug, Clone)]
pub struct TextScan {
    pub symbols: SymbolSet,
    pub clean: String,
}

/// First type-like declaration found in single-match mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstMatch {
    pub kind: SymbolKind,
    /// Local (unqualified) name
    pub name: String,
    /// Clean output up to the match followed by the matched keyword and name
    pub text: String,
}

/// Character-cursor state machine over one source file
pub struct TextScanner<'a> {
    cursor: Cursor<'a>,
    table: &'a KeywordTable,
    clean: Vec<u8>,
    namespace: String,
    symbols: SymbolSet,
    first_only: bool,
}

impl<'a> TextScanner<'a> {
    pub fn new(source: &'a [u8], table: &'a KeywordTable) -> Self {
        Self {
            cursor: Cursor::new(source),
            table,
            clean: Vec::with_capacity(source.len() / 2),
            namespace: String::new(),
            symbols: SymbolSet::new(),
            first_only: false,
        }
    }

    /// Scan the whole file
    pub fn scan(mut self) -> Result<TextScan, ExtractError> {
        self.run()?;
        Ok(TextScan {
            symbols: self.symbols,
            clean: String::from_utf8_lossy(&self.clean).into_owned(),
        })
    }

    /// Stop at the first class, interface, trait or enum declaration
    pub fn find_first(mut self) -> Result<Option<FirstMatch>, ExtractError> {
        self.first_only = true;
        self.run()
    }

    fn run(&mut self) -> Result<Option<FirstMatch>, ExtractError> {
        while self.cursor.skip_language_region_start() {
            self.clean.extend_from_slice(b"<?");
            if let Some(found) = self.scan_region()? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Scan until the region closes or the input ends
    fn scan_region(&mut self) -> Result<Option<FirstMatch>, ExtractError> {
        while let Some(byte) = self.cursor.current() {
            if self.cursor.at_region_end() {
                self.copy(2);
                return Ok(None);
            }

            if self.cursor.skip_literal().is_some() {
                self.clean.extend_from_slice(STRING_PLACEHOLDER);
                continue;
            }
            if self.cursor.skip_comment().is_some() {
                continue;
            }

            let src = self.cursor.source();
            let pos = self.cursor.pos();
            if let Some(keyword) = self.table.match_at(src, pos) {
                if follows_access_operator(src, pos) {
                    self.copy(keyword.as_str().len());
                    continue;
                }
                if let Some(found) = self.declaration(keyword)? {
                    return Ok(Some(found));
                }
                continue;
            }

            self.clean.push(byte);
            self.cursor.advance(1);
            let run = self.table.rest_run(self.cursor.rest());
            self.copy(run);
        }
        Ok(None)
    }

    fn declaration(&mut self, keyword: Keyword) -> Result<Option<FirstMatch>, ExtractError> {
        match keyword {
            Keyword::Namespace => {
                self.namespace_statement();
                Ok(None)
            }
            Keyword::Symbol(SymbolKind::Function) => {
                self.function_declaration()?;
                Ok(None)
            }
            Keyword::Symbol(kind) => self.class_like_declaration(kind),
        }
    }

    /// Replace the namespace context with the name that follows `namespace`
    fn namespace_statement(&mut self) {
        self.copy(Keyword::Namespace.as_str().len());
        // `namespace\foo()` is a relative name, not a declaration
        if self.cursor.current() == Some(b'\\') {
            return;
        }

        let mut name = Vec::new();
        loop {
            match self.cursor.current() {
                Some(byte) if is_whitespace(byte) => self.copy(1),
                Some(_) if self.cursor.skip_comment().is_some() => {}
                Some(byte) if is_ident_char(byte) || byte == b'\\' => {
                    name.push(byte);
                    self.copy(1);
                }
                Some(b';' | b'{') => {
                    self.copy(1);
                    break;
                }
                _ => break,
            }
        }
        self.namespace = String::from_utf8_lossy(&name).into_owned();
    }

    fn class_like_declaration(
        &mut self,
        kind: SymbolKind,
    ) -> Result<Option<FirstMatch>, ExtractError> {
        let src = self.cursor.source();
        let start = self.cursor.pos();

        let mut ahead = self.cursor;
        ahead.advance(kind.as_str().len());
        let name = if ahead.skip_trivia() {
            ahead.read_identifier()
        } else {
            None
        };
        let name = name.filter(|name| !is_reserved_class_name(name));
        let anonymous = kind == SymbolKind::Class
            && (preceded_by_word(src, start, b"new") || anonymous_class_follows(self.cursor));

        let name = match name {
            Some(name) if !anonymous => name,
            _ if anonymous => {
                // members of an anonymous class body must not leak out
                self.skip_declaration(kind.as_str(), start)?;
                return Ok(None);
            }
            // `class:` named argument, `class` as a bare word
            _ => {
                self.copy(kind.as_str().len());
                return Ok(None);
            }
        };

        if self.first_only {
            let mut text = std::mem::take(&mut self.clean);
            text.extend_from_slice(&src[start..ahead.pos()]);
            return Ok(Some(FirstMatch {
                kind,
                name: String::from_utf8_lossy(name).into_owned(),
                text: String::from_utf8_lossy(&text).into_owned(),
            }));
        }

        self.record(kind, name);
        self.skip_declaration(kind.as_str(), start)?;
        Ok(None)
    }

    fn function_declaration(&mut self) -> Result<(), ExtractError> {
        let keyword = SymbolKind::Function.as_str();
        let src = self.cursor.source();
        let start = self.cursor.pos();

        if preceded_by_word(src, start, b"use") {
            self.copy(keyword.len());
            return Ok(());
        }

        let mut ahead = self.cursor;
        ahead.advance(keyword.len());
        ahead.skip_trivia();
        if ahead.current() == Some(b'&') {
            ahead.advance(1);
            ahead.skip_trivia();
        }

        match ahead.current() {
            Some(b'(') => self.skip_declaration(keyword, start),
            Some(byte) if is_ident_start(byte) => {
                if let Some(name) = ahead.read_identifier() {
                    self.record(SymbolKind::Function, name);
                }
                self.skip_declaration(keyword, start)
            }
            _ => {
                self.copy(keyword.len());
                Ok(())
            }
        }
    }

    fn record(&mut self, kind: SymbolKind, name: &[u8]) {
        let name = String::from_utf8_lossy(name);
        let qualified = if self.namespace.is_empty() {
            name.into_owned()
        } else {
            format!("{}\\{}", self.namespace, name)
        };
        self.symbols.add(kind, qualified);
    }

    /// Copy the declaration header, skip its body and write `{}` instead
    fn skip_declaration(&mut self, keyword: &'static str, start: usize) -> Result<(), ExtractError> {
        self.seek_body(keyword, start)?;
        self.cursor.skip_balanced_body()?;
        self.clean.extend_from_slice(b"{}");
        Ok(())
    }

    /// Advance to the `{` that opens the declaration body.
    ///
    /// Braces inside parentheses (default values, closure arguments) and
    /// inside literals or comments are not body openers.
    fn seek_body(&mut self, keyword: &'static str, start: usize) -> Result<(), ExtractError> {
        let mut parens = 0usize;
        while let Some(byte) = self.cursor.current() {
            if self.cursor.skip_literal().is_some() {
                self.clean.extend_from_slice(STRING_PLACEHOLDER);
                continue;
            }
            if self.cursor.skip_comment().is_some() {
                continue;
            }
            if self.cursor.at_region_end() {
                self.cursor.skip_inline_region();
                continue;
            }

            match byte {
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' if parens == 0 => return Ok(()),
                _ => {}
            }
            self.copy(1);
        }

        Err(ExtractError::StructuralDelimiterNotFound {
            keyword,
            offset: start,
        })
    }

    /// Copy `n` source bytes to the clean output and advance past them
    fn copy(&mut self, n: usize) {
        let start = self.cursor.pos();
        self.cursor.advance(n);
        let end = self.cursor.pos();
        self.clean.extend_from_slice(self.cursor.slice(start..end));
    }
}

/// True when `class` at the cursor is followed by constructor arguments, a
/// body or an `extends`/`implements` clause instead of a name
fn anonymous_class_follows(mut ahead: Cursor<'_>) -> bool {
    ahead.advance(SymbolKind::Class.as_str().len());
    ahead.skip_trivia();
    match ahead.current() {
        Some(b'(' | b'{') => true,
        _ => ahead.read_identifier().is_some_and(is_reserved_class_name),
    }
}
