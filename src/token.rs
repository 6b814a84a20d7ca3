//! Tokens produced by the lexer driver and consumed by the parser driver.
//!
//!     A token is a classified slice of the input: a kind tag, the literal text that was
//!     matched, the byte offset where it starts and a skip flag. Skip tokens (whitespace,
//!     comments) take part in lexing but are dropped before parsing.
//!
//!     As a parser symbol a token is identified by its kind and text only. The offset is
//!     carried for reporting but never takes part in derivative caching, so a forest leaf
//!     built from a cached derivative reports the offset of the first equal token that
//!     node saw.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Kind tag of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenKind(String);

impl TokenKind {
    /// The generic kind. As a token class it matches tokens of every kind.
    pub const GENERIC: &'static str = "Token";
    pub const IDENTIFIER: &'static str = "Identifier";
    pub const KEYWORD: &'static str = "Keyword";
    pub const WHITESPACE: &'static str = "Whitespace";
    pub const COMMENT: &'static str = "Comment";
    pub const NEWLINE: &'static str = "NewLine";
    pub const INDENT: &'static str = "Indent";
    pub const DEDENT: &'static str = "Dedent";

    pub fn new(name: impl Into<String>) -> Self {
        TokenKind(name.into())
    }

    pub fn generic() -> Self {
        TokenKind::new(Self::GENERIC)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_generic(&self) -> bool {
        self.0 == Self::GENERIC
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenKind {
    fn from(name: &str) -> Self {
        TokenKind::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character of `text` in the lexed input
    pub offset: usize,
    #[serde(default)]
    pub skip: bool,
}

impl Token {
    pub fn new(kind: impl Into<TokenKind>, text: impl Into<String>, offset: usize) -> Self {
        Token {
            kind: kind.into(),
            text: text.into(),
            offset,
            skip: false,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.text.len()
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind.as_str() == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}

/// Destination for tokens emitted by the lexer.
pub trait TokenSink {
    fn push(&mut self, token: Token);
}

impl TokenSink for Vec<Token> {
    fn push(&mut self, token: Token) {
        Vec::push(self, token);
    }
}
