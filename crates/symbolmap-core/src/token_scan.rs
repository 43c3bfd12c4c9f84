//! Token-stream scanning strategy

use crate::error::ExtractError;
use crate::keyword::is_reserved_class_name;
use crate::lexer::{Token, TokenKind};
use crate::symbol_set::{SymbolKind, SymbolSet};

/// Walks a lexed token sequence and records namespace-scope declarations
pub struct TokenScanner<'t, 'a> {
    tokens: &'t [Token<'a>],
    index: usize,
    namespace: String,
    symbols: SymbolSet,
}

impl<'t, 'a> TokenScanner<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            index: 0,
            namespace: String::new(),
            symbols: SymbolSet::new(),
        }
    }

    pub fn scan(mut self) -> Result<SymbolSet, ExtractError> {
        while let Some(token) = self.tokens.get(self.index) {
            match token.kind {
                TokenKind::Namespace => self.namespace_statement(),
                TokenKind::Class => self.class_declaration()?,
                TokenKind::Interface => self.named_declaration(SymbolKind::Interface)?,
                TokenKind::Trait => self.named_declaration(SymbolKind::Trait)?,
                TokenKind::Enum => self.named_declaration(SymbolKind::Enum)?,
                TokenKind::Function => self.function_declaration()?,
                _ => self.index += 1,
            }
        }
        Ok(self.symbols)
    }

    fn namespace_statement(&mut self) {
        self.index += 1;
        let mut name = String::new();
        while let Some(token) = self.tokens.get(self.index) {
            match token.kind {
                kind if kind.is_ignorable() => {}
                TokenKind::Identifier | TokenKind::Name | TokenKind::NsSeparator => {
                    name.push_str(&token.text_lossy());
                }
                TokenKind::Semicolon | TokenKind::LeftBrace => {
                    self.index += 1;
                    break;
                }
                _ => break,
            }
            self.index += 1;
        }
        self.namespace = name;
    }

    fn class_declaration(&mut self) -> Result<(), ExtractError> {
        let keyword = self.index;
        match self.previous_significant(keyword).map(|t| t.kind) {
            Some(TokenKind::DoubleColon) => {
                self.index += 1;
                return Ok(());
            }
            Some(TokenKind::New) => return self.skip_declaration(keyword),
            _ => {}
        }

        match self.declared_name(keyword) {
            Some(name) => {
                self.record(SymbolKind::Class, name);
                self.skip_declaration(keyword)
            }
            None if self.anonymous_class_follows(keyword) => self.skip_declaration(keyword),
            // `class:` named argument
            None => {
                self.index += 1;
                Ok(())
            }
        }
    }

    /// Constructor arguments, a body or an `extends`/`implements` clause
    /// right after an unnamed `class`
    fn anonymous_class_follows(&self, keyword: usize) -> bool {
        let Some(next) = self.next_significant(keyword + 1) else {
            return false;
        };
        let token = self.tokens[next];
        match token.kind {
            TokenKind::LeftParen | TokenKind::LeftBrace => true,
            TokenKind::Identifier => is_reserved_class_name(token.text),
            _ => false,
        }
    }

    fn named_declaration(&mut self, kind: SymbolKind) -> Result<(), ExtractError> {
        let keyword = self.index;
        match self.declared_name(keyword) {
            Some(name) => {
                self.record(kind, name);
                self.skip_declaration(keyword)
            }
            None => {
                self.index += 1;
                Ok(())
            }
        }
    }

    fn function_declaration(&mut self) -> Result<(), ExtractError> {
        let keyword = self.index;
        if self
            .previous_significant(keyword)
            .is_some_and(|t| t.kind == TokenKind::Use)
        {
            self.index += 1;
            return Ok(());
        }

        let mut next = self.next_significant(keyword + 1);
        if next.is_some_and(|i| self.tokens[i].kind == TokenKind::Ampersand) {
            next = next.and_then(|i| self.next_significant(i + 1));
        }

        match next.map(|i| self.tokens[i]) {
            Some(token) if token.kind == TokenKind::LeftParen => self.skip_declaration(keyword),
            Some(token) if token.kind == TokenKind::Identifier => {
                self.record(SymbolKind::Function, token);
                self.skip_declaration(keyword)
            }
            _ => {
                self.index += 1;
                Ok(())
            }
        }
    }

    /// Identifier directly following the keyword, if it can name a type
    fn declared_name(&self, keyword: usize) -> Option<Token<'a>> {
        let token = self.tokens[self.next_significant(keyword + 1)?];
        (token.kind == TokenKind::Identifier && !is_reserved_class_name(token.text))
            .then_some(token)
    }

    fn record(&mut self, kind: SymbolKind, name: Token<'a>) {
        let name = name.text_lossy();
        let qualified = if self.namespace.is_empty() {
            name.into_owned()
        } else {
            format!("{}\\{}", self.namespace, name)
        };
        self.symbols.add(kind, qualified);
    }

    /// Find the body opener after `keyword`, then step past its closing brace
    fn skip_declaration(&mut self, keyword: usize) -> Result<(), ExtractError> {
        let keyword_token = self.tokens[keyword];
        let mut index = keyword + 1;
        let mut parens = 0usize;

        let open = loop {
            let Some(token) = self.tokens.get(index) else {
                return Err(ExtractError::StructuralDelimiterNotFound {
                    keyword: keyword_name(keyword_token.kind),
                    offset: keyword_token.offset,
                });
            };
            match token.kind {
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                TokenKind::LeftBrace if parens == 0 => break index,
                _ => {}
            }
            index += 1;
        };

        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.index = i + 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        Err(ExtractError::UnterminatedBody {
            offset: self.tokens[open].offset,
        })
    }

    fn previous_significant(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens[..index]
            .iter()
            .rev()
            .find(|t| !t.kind.is_ignorable())
    }

    fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_ignorable())
    }
}

fn keyword_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Class => SymbolKind::Class.as_str(),
        TokenKind::Interface => SymbolKind::Interface.as_str(),
        TokenKind::Trait => SymbolKind::Trait.as_str(),
        TokenKind::Enum => SymbolKind::Enum.as_str(),
        _ => SymbolKind::Function.as_str(),
    }
}
