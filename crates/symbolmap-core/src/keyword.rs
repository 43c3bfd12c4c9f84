//! Declaration keyword table
//!
//! Built once and shared by reference. Dispatch is keyed by the lowercased
//! first byte of each keyword, and the table also owns the compiled rule that
//! finds the next byte able to start a string, comment, tag or keyword.

use crate::cursor::is_ident_char;
use crate::symbol_set::SymbolKind;
use regex::bytes::Regex;
use std::sync::OnceLock;

/// A keyword the scanners react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Symbol(SymbolKind),
    Namespace,
}

impl Keyword {
    pub const ALL: [Keyword; 6] = [
        Keyword::Symbol(SymbolKind::Class),
        Keyword::Symbol(SymbolKind::Interface),
        Keyword::Symbol(SymbolKind::Trait),
        Keyword::Symbol(SymbolKind::Enum),
        Keyword::Symbol(SymbolKind::Function),
        Keyword::Namespace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Symbol(kind) => kind.as_str(),
            Keyword::Namespace => "namespace",
        }
    }
}

/// Bytes that can never be skipped by the rest-run rule
const STRUCTURAL_BYTES: &[u8] = b"?\"'</#";

/// Immutable keyword configuration
#[derive(Debug, Clone)]
pub struct KeywordTable {
    keywords: Vec<Keyword>,
    dispatch: Vec<Vec<usize>>,
    rest: Regex,
}

impl KeywordTable {
    pub fn new(keywords: &[Keyword]) -> Self {
        let mut dispatch = vec![Vec::new(); 256];
        let mut stop_bytes: Vec<u8> = STRUCTURAL_BYTES.to_vec();

        for (index, keyword) in keywords.iter().enumerate() {
            let first = keyword.as_str().as_bytes()[0];
            dispatch[first as usize].push(index);
            stop_bytes.push(first);
            stop_bytes.push(first.to_ascii_uppercase());
        }

        let class: String = stop_bytes
            .iter()
            .map(|&b| format!("\\x{:02x}", b))
            .collect();
        let rest = Regex::new(&format!("(?-u)\\A[^{}]+", class))
            .expect("rest pattern only contains escaped bytes");

        Self {
            keywords: keywords.to_vec(),
            dispatch,
            rest,
        }
    }

    /// Table with every class-like keyword plus `function` and `namespace`
    pub fn standard() -> &'static KeywordTable {
        static STANDARD: OnceLock<KeywordTable> = OnceLock::new();
        STANDARD.get_or_init(|| KeywordTable::new(&Keyword::ALL))
    }

    /// Table for locating the next type-like declaration only
    pub fn class_like() -> &'static KeywordTable {
        static CLASS_LIKE: OnceLock<KeywordTable> = OnceLock::new();
        CLASS_LIKE.get_or_init(|| {
            KeywordTable::new(&[
                Keyword::Symbol(SymbolKind::Class),
                Keyword::Symbol(SymbolKind::Interface),
                Keyword::Symbol(SymbolKind::Trait),
                Keyword::Symbol(SymbolKind::Enum),
                Keyword::Namespace,
            ])
        })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Recognize a keyword starting at `pos`.
    ///
    /// The keyword must be a whole word and the preceding byte must not be an
    /// identifier byte, `$` or `\` (a segment of a qualified name such as
    /// `App\Enum\Status`). Member access through `::` or `->` is left to
    /// [`follows_access_operator`], since a bare `>` or `:` also ends `=>`
    /// and `?:`.
    pub fn match_at(&self, src: &[u8], pos: usize) -> Option<Keyword> {
        let first = src.get(pos)?.to_ascii_lowercase();
        let candidates = &self.dispatch[first as usize];
        if candidates.is_empty() || pos == 0 {
            return None;
        }

        let before = src[pos - 1];
        if is_ident_char(before) || matches!(before, b'$' | b'\\') {
            return None;
        }

        candidates
            .iter()
            .map(|&index| self.keywords[index])
            .find(|keyword| {
                let text = keyword.as_str().as_bytes();
                src.get(pos..pos + text.len())
                    .is_some_and(|word| word.eq_ignore_ascii_case(text))
                    && !src.get(pos + text.len()).is_some_and(|&b| is_ident_char(b))
            })
    }

    /// Length of the run at the start of `bytes` that holds nothing of interest
    pub fn rest_run(&self, bytes: &[u8]) -> usize {
        self.rest.find(bytes).map_or(0, |m| m.end())
    }
}

/// True for names that follow `class` in anonymous class expressions
pub(crate) fn is_reserved_class_name(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"extends") || name.eq_ignore_ascii_case(b"implements")
}

/// True when the last non-whitespace bytes before `pos` are `::` or `->`
pub(crate) fn follows_access_operator(src: &[u8], pos: usize) -> bool {
    let mut end = pos.min(src.len());
    while end > 0 && src[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    end >= 2 && matches!(&src[end - 2..end], b"::" | b"->")
}

/// True when the word ending just before `pos` (ignoring whitespace) is `word`
pub(crate) fn preceded_by_word(src: &[u8], pos: usize, word: &[u8]) -> bool {
    let mut end = pos.min(src.len());
    while end > 0 && src[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    if end < word.len() {
        return false;
    }

    let start = end - word.len();
    src[start..end].eq_ignore_ascii_case(word)
        && (start == 0 || !(is_ident_char(src[start - 1]) || src[start - 1] == b'$'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_case_insensitive() {
        let table = KeywordTable::standard();
        assert_eq!(
            table.match_at(b" CLASS Foo", 1),
            Some(Keyword::Symbol(SymbolKind::Class))
        );
        assert_eq!(table.match_at(b" Namespace Foo;", 1), Some(Keyword::Namespace));
    }

    #[test]
    fn test_lookbehind_rejects_access_and_variables() {
        let table = KeywordTable::standard();
        assert_eq!(table.match_at(b"$class", 1), None);
        assert_eq!(table.match_at(b"myclass", 2), None);
        assert_eq!(table.match_at(b"use App\\Enum\\Status;", 8), None);
        assert!(follows_access_operator(b"Foo::class", 5));
        assert!(follows_access_operator(b"$a->class", 4));
        assert!(follows_access_operator(b"$a?->class", 5));
    }

    #[test]
    fn test_closure_after_arrow_or_elvis_is_a_keyword() {
        let table = KeywordTable::standard();
        let function = Some(Keyword::Symbol(SymbolKind::Function));
        assert_eq!(table.match_at(b"'k'=>function", 5), function);
        assert_eq!(table.match_at(b"$x ?:function", 5), function);
        assert!(!follows_access_operator(b"'k'=>function", 5));
        assert!(!follows_access_operator(b"$x ?:function", 5));
    }

    #[test]
    fn test_whole_word_required() {
        let table = KeywordTable::standard();
        assert_eq!(table.match_at(b" class_exists()", 1), None);
        assert_eq!(table.match_at(b" enumerate", 1), None);
        assert_eq!(
            table.match_at(b" function(", 1),
            Some(Keyword::Symbol(SymbolKind::Function))
        );
    }

    #[test]
    fn test_start_of_input_never_matches() {
        assert_eq!(KeywordTable::standard().match_at(b"class Foo", 0), None);
    }

    #[test]
    fn test_class_like_table_has_no_function() {
        let table = KeywordTable::class_like();
        assert_eq!(table.match_at(b" function foo", 1), None);
        assert!(!table.keywords().contains(&Keyword::Symbol(SymbolKind::Function)));
    }

    #[test]
    fn test_rest_run_stops_at_interesting_bytes() {
        let table = KeywordTable::standard();
        assert_eq!(table.rest_run(b"$a = 1; class"), 8);
        assert_eq!(table.rest_run(b"abd'x'"), 3);
        assert_eq!(table.rest_run(b"<?php"), 0);
        assert_eq!(table.rest_run(b"xyz # c"), 4);
        assert_eq!(table.rest_run(b"\xff\xfe/"), 2);
    }

    #[test]
    fn test_follows_access_operator() {
        assert!(follows_access_operator(b"Foo:: class", 6));
        assert!(follows_access_operator(b"$a ->\n trait", 7));
        assert!(!follows_access_operator(b"'k' => function", 7));
    }

    #[test]
    fn test_preceded_by_word() {
        assert!(preceded_by_word(b"return new  class", 12, b"new"));
        assert!(preceded_by_word(b"use function", 4, b"use"));
        assert!(!preceded_by_word(b"renew class", 6, b"new"));
        assert!(!preceded_by_word(b"$new class", 5, b"new"));
    }
}
