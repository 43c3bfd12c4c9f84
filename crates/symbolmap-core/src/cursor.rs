//! Byte cursor over raw PHP source
//!
//! Provides the delimiter-skipping primitives shared by the text scanner and
//! the lexer: language tags, quoted strings, heredoc/nowdoc literals, line and
//! block comments, and brace-balanced bodies. Every skip consumes the braces it
//! contains, so brace depth is only ever counted on structural braces.

use crate::error::ExtractError;
use std::ops::Range;

/// First byte of a PHP identifier (`[a-zA-Z_\x80-\xff]`)
#[inline]
pub fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}

/// Any byte of a PHP identifier after the first
#[inline]
pub fn is_ident_char(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

/// Whitespace as the PHP lexer understands it
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Kind of literal consumed by [`Cursor::skip_literal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    String,
    Heredoc,
}

/// Kind of comment consumed by [`Cursor::skip_comment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comment {
    Line,
    Block,
    Doc,
}

/// Opening marker of a heredoc or nowdoc literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeredocOpening {
    /// Length of the marker including the line terminator
    pub len: usize,
    /// Byte range of the delimiter identifier in the source
    pub delimiter: Range<usize>,
}

/// Immutable source buffer with a forward-moving byte offset
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    pub fn source(&self) -> &'a [u8] {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn current(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Check the byte right after the current one
    pub fn peek_is(&self, byte: u8) -> bool {
        self.src.get(self.pos + 1) == Some(&byte)
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
    }

    /// Remaining input from the cursor onward
    pub fn rest(&self) -> &'a [u8] {
        &self.src[self.pos.min(self.src.len())..]
    }

    pub fn slice(&self, range: Range<usize>) -> &'a [u8] {
        let end = range.end.min(self.src.len());
        &self.src[range.start.min(end)..end]
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn starts_with_ignore_case(&self, prefix: &[u8]) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// True when the cursor sits on a closing `?>` tag
    pub fn at_region_end(&self) -> bool {
        self.current() == Some(b'?') && self.peek_is(b'>')
    }

    /// Advance past the next `<?` opening tag.
    ///
    /// Returns `false` (with the cursor at end of input) when no tag remains.
    pub fn skip_language_region_start(&mut self) -> bool {
        match find(self.rest(), b"<?") {
            Some(offset) => {
                self.pos += offset + 2;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    /// Skip a `?>` tag and the inline text up to and including the next `<?`
    pub fn skip_inline_region(&mut self) {
        self.advance(2);
        self.skip_language_region_start();
    }

    /// Skip a quoted literal starting at the current quote byte.
    ///
    /// A backslash only escapes the quote itself or another backslash.
    /// Unterminated strings run to end of input.
    pub fn skip_string(&mut self, quote: u8) {
        self.advance(1);
        while let Some(byte) = self.current() {
            if byte == b'\\' && (self.peek_is(b'\\') || self.peek_is(quote)) {
                self.advance(2);
                continue;
            }

            self.advance(1);
            if byte == quote {
                break;
            }
        }
    }

    /// Recognize `<<<` [ \t]* ['"]? IDENT ['"]? NEWLINE at the cursor
    pub fn heredoc_opening(&self) -> Option<HeredocOpening> {
        if !self.starts_with(b"<<<") {
            return None;
        }

        let src = self.src;
        let mut i = self.pos + 3;
        while matches!(src.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }

        let quote = match src.get(i) {
            Some(&q @ (b'\'' | b'"')) => {
                i += 1;
                Some(q)
            }
            _ => None,
        };

        let start = i;
        if !src.get(i).is_some_and(|&b| is_ident_start(b)) {
            return None;
        }
        while src.get(i).is_some_and(|&b| is_ident_char(b)) {
            i += 1;
        }
        let end = i;

        if let Some(q) = quote {
            if src.get(i) != Some(&q) {
                return None;
            }
            i += 1;
        }

        match src.get(i) {
            Some(b'\r') => {
                i += 1;
                if src.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            Some(b'\n') => i += 1,
            _ => return None,
        }

        Some(HeredocOpening {
            len: i - self.pos,
            delimiter: start..end,
        })
    }

    /// Consume heredoc/nowdoc content lines until the closing delimiter.
    ///
    /// The cursor must sit at the start of the first content line. A line
    /// closes the literal when, after horizontal whitespace only, it holds the
    /// delimiter not followed by an identifier byte.
    pub fn skip_heredoc(&mut self, delimiter: &[u8]) {
        while let Some(byte) = self.current() {
            match byte {
                b' ' | b'\t' => {
                    self.advance(1);
                    continue;
                }
                _ if self.starts_with(delimiter)
                    && !self
                        .src
                        .get(self.pos + delimiter.len())
                        .is_some_and(|&b| is_ident_char(b)) =>
                {
                    self.advance(delimiter.len());
                    return;
                }
                _ => {}
            }

            self.skip_to_line_end();
            while matches!(self.current(), Some(b'\r' | b'\n')) {
                self.advance(1);
            }
        }
    }

    /// Skip a string, heredoc or nowdoc literal if one starts here
    pub fn skip_literal(&mut self) -> Option<Literal> {
        match self.current()? {
            quote @ (b'"' | b'\'') => {
                self.skip_string(quote);
                Some(Literal::String)
            }
            b'<' => {
                let opening = self.heredoc_opening()?;
                let delimiter = self.slice(opening.delimiter);
                self.advance(opening.len);
                self.skip_heredoc(delimiter);
                Some(Literal::Heredoc)
            }
            _ => None,
        }
    }

    /// Skip a `//`, `#` or `/* */` comment if one starts here.
    ///
    /// `#[` opens an attribute, not a comment.
    pub fn skip_comment(&mut self) -> Option<Comment> {
        match self.current()? {
            b'/' if self.peek_is(b'/') => {
                self.skip_line_comment();
                Some(Comment::Line)
            }
            b'#' if !self.peek_is(b'[') => {
                self.skip_line_comment();
                Some(Comment::Line)
            }
            b'/' if self.peek_is(b'*') => {
                let doc = self.src.get(self.pos + 2) == Some(&b'*')
                    && self.src.get(self.pos + 3) != Some(&b'/');
                self.skip_block_comment();
                Some(if doc { Comment::Doc } else { Comment::Block })
            }
            _ => None,
        }
    }

    /// Line comments end before the newline or before a closing `?>` tag
    pub fn skip_line_comment(&mut self) {
        while let Some(byte) = self.current() {
            if byte == b'\r' || byte == b'\n' || self.at_region_end() {
                return;
            }
            self.advance(1);
        }
    }

    /// Block comments are not nested; an unterminated one runs to end of input
    pub fn skip_block_comment(&mut self) {
        self.advance(2);
        match find(self.rest(), b"*/") {
            Some(offset) => self.advance(offset + 2),
            None => self.pos = self.src.len(),
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(byte) = self.current() {
            if byte == b'\r' || byte == b'\n' {
                return;
            }
            self.advance(1);
        }
    }

    /// Skip whitespace and comments; returns whether anything was consumed
    pub fn skip_trivia(&mut self) -> bool {
        let start = self.pos;
        loop {
            match self.current() {
                Some(byte) if is_whitespace(byte) => self.advance(1),
                Some(_) if self.skip_comment().is_some() => {}
                _ => break,
            }
        }
        self.pos != start
    }

    /// Read an identifier at the cursor, if one starts here
    pub fn read_identifier(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        if !self.current().is_some_and(is_ident_start) {
            return None;
        }
        while self.current().is_some_and(is_ident_char) {
            self.advance(1);
        }
        Some(self.slice(start..self.pos))
    }

    /// Advance from an opening `{` to just past its matching `}`.
    ///
    /// Braces inside strings, heredocs, comments and inline `?>...<?` regions
    /// never change the depth.
    pub fn skip_balanced_body(&mut self) -> Result<(), ExtractError> {
        let offset = self.pos;
        self.advance(1);
        let mut depth = 1usize;

        while let Some(byte) = self.current() {
            if self.skip_literal().is_some() || self.skip_comment().is_some() {
                continue;
            }

            if self.at_region_end() {
                self.skip_inline_region();
                continue;
            }

            self.advance(1);
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        Err(ExtractError::UnterminatedBody { offset })
    }
}

/// Position of the first occurrence of `needle` in `haystack`
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
