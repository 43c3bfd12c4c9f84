//! PHP lexer
//!
//! Produces just enough token kinds for declaration discovery. Strings,
//! heredocs and comments are opaque tokens; their boundaries come from the same
//! [`Cursor`] primitives the text scanner uses.

use crate::cursor::{find, is_ident_char, is_ident_start, is_whitespace, Comment, Cursor, Literal};
use crate::keyword::is_reserved_class_name;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenTag,
    CloseTag,
    InlineHtml,
    Whitespace,
    Comment,
    DocComment,
    String,
    Heredoc,
    Variable,
    Identifier,
    /// Qualified (`A\B`), fully qualified (`\A\B`) or relative (`namespace\A`)
    Name,
    NsSeparator,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Namespace,
    New,
    Use,
    DoubleColon,
    ObjectOperator,
    Ampersand,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Semicolon,
    Other,
}

impl TokenKind {
    /// Tokens skipped when looking at the previous or next significant token
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment | TokenKind::OpenTag
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a [u8],
    /// Byte offset of the first byte
    pub offset: usize,
    /// 1-based line of the first byte
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    line: usize,
    in_code: bool,
    last_significant: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(source),
            line: 1,
            in_code: false,
            last_significant: None,
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.cursor.is_eof() {
            return None;
        }

        let start = self.cursor.pos();
        let kind = if self.in_code {
            self.code_token()
        } else {
            self.inline_token()
        };

        let text = self.cursor.slice(start..self.cursor.pos());
        let token = Token {
            kind,
            text,
            offset: start,
            line: self.line,
        };
        self.line += text.iter().filter(|&&b| b == b'\n').count();
        if !kind.is_ignorable() {
            self.last_significant = Some(kind);
        }
        Some(token)
    }

    fn inline_token(&mut self) -> TokenKind {
        match find(self.cursor.rest(), b"<?") {
            Some(0) => {
                self.open_tag();
                TokenKind::OpenTag
            }
            Some(offset) => {
                self.cursor.advance(offset);
                TokenKind::InlineHtml
            }
            None => {
                self.cursor.advance(self.cursor.rest().len());
                TokenKind::InlineHtml
            }
        }
    }

    /// `<?php` plus one whitespace character, `<?=` or a bare `<?`
    fn open_tag(&mut self) {
        self.in_code = true;
        if self.cursor.starts_with_ignore_case(b"<?php") {
            let mut ahead = self.cursor;
            ahead.advance(5);
            match ahead.current() {
                None => {
                    self.cursor = ahead;
                    return;
                }
                Some(b'\r') => {
                    ahead.advance(if ahead.peek_is(b'\n') { 2 } else { 1 });
                    self.cursor = ahead;
                    return;
                }
                Some(byte) if is_whitespace(byte) => {
                    ahead.advance(1);
                    self.cursor = ahead;
                    return;
                }
                _ => {}
            }
        }
        let len = if self.cursor.starts_with(b"<?=") { 3 } else { 2 };
        self.cursor.advance(len);
    }

    fn code_token(&mut self) -> TokenKind {
        let Some(byte) = self.cursor.current() else {
            return TokenKind::Other;
        };

        if is_whitespace(byte) {
            while self.cursor.current().is_some_and(is_whitespace) {
                self.cursor.advance(1);
            }
            return TokenKind::Whitespace;
        }

        if self.cursor.at_region_end() {
            self.cursor.advance(2);
            match self.cursor.current() {
                Some(b'\n') => self.cursor.advance(1),
                Some(b'\r') => self.cursor.advance(if self.cursor.peek_is(b'\n') { 2 } else { 1 }),
                _ => {}
            }
            self.in_code = false;
            return TokenKind::CloseTag;
        }

        if let Some(comment) = self.cursor.skip_comment() {
            return match comment {
                Comment::Doc => TokenKind::DocComment,
                _ => TokenKind::Comment,
            };
        }

        if let Some(literal) = self.cursor.skip_literal() {
            return match literal {
                Literal::String => TokenKind::String,
                Literal::Heredoc => TokenKind::Heredoc,
            };
        }

        match byte {
            b'$' if self.next_is_ident_start(1) => {
                self.cursor.advance(1);
                self.cursor.read_identifier();
                TokenKind::Variable
            }
            b'\\' if self.next_is_ident_start(1) => {
                self.read_name_segments();
                TokenKind::Name
            }
            b'\\' => self.single(TokenKind::NsSeparator),
            _ if is_ident_start(byte) => self.word(),
            b'0'..=b'9' => {
                while self.cursor.current().is_some_and(is_ident_char) {
                    self.cursor.advance(1);
                }
                TokenKind::Other
            }
            b':' if self.cursor.peek_is(b':') => {
                self.cursor.advance(2);
                TokenKind::DoubleColon
            }
            b'-' if self.cursor.peek_is(b'>') => {
                self.cursor.advance(2);
                TokenKind::ObjectOperator
            }
            b'?' if self.cursor.starts_with(b"?->") => {
                self.cursor.advance(3);
                TokenKind::ObjectOperator
            }
            b'&' => self.single(TokenKind::Ampersand),
            b'{' => self.single(TokenKind::LeftBrace),
            b'}' => self.single(TokenKind::RightBrace),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b';' => self.single(TokenKind::Semicolon),
            _ => self.single(TokenKind::Other),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance(1);
        kind
    }

    fn next_is_ident_start(&self, offset: usize) -> bool {
        self.cursor
            .rest()
            .get(offset)
            .is_some_and(|&b| is_ident_start(b))
    }

    /// Consume `\ident` pairs following the cursor
    fn read_name_segments(&mut self) {
        while self.cursor.current() == Some(b'\\') && self.next_is_ident_start(1) {
            self.cursor.advance(1);
            self.cursor.read_identifier();
        }
    }

    /// An identifier, keyword or qualified name starting with an identifier
    fn word(&mut self) -> TokenKind {
        let word = self.cursor.read_identifier().unwrap_or_default();
        if self.cursor.current() == Some(b'\\') && self.next_is_ident_start(1) {
            self.read_name_segments();
            return TokenKind::Name;
        }

        if self.last_significant == Some(TokenKind::ObjectOperator) {
            return TokenKind::Identifier;
        }
        if word.eq_ignore_ascii_case(b"class") {
            return TokenKind::Class;
        }
        if self.last_significant == Some(TokenKind::DoubleColon) {
            return TokenKind::Identifier;
        }

        match word.to_ascii_lowercase().as_slice() {
            b"interface" => TokenKind::Interface,
            b"trait" => TokenKind::Trait,
            b"function" => TokenKind::Function,
            b"namespace" => TokenKind::Namespace,
            b"new" => TokenKind::New,
            b"use" => TokenKind::Use,
            b"enum" if self.enum_name_follows() => TokenKind::Enum,
            _ => TokenKind::Identifier,
        }
    }

    /// `enum` only declares an enum when trivia and a usable name follow
    fn enum_name_follows(&self) -> bool {
        let mut ahead = self.cursor;
        ahead.skip_trivia()
            && ahead
                .read_identifier()
                .is_some_and(|name| !is_reserved_class_name(name))
    }
}

/// Lex a whole buffer
pub fn tokenize(source: &[u8]) -> Vec<Token<'_>> {
    Lexer::new(source).tokenize()
}
