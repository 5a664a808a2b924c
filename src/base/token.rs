//! Lexical token model.
//!
//! Tokens are immutable once lexed and owned exclusively by the token
//! sequence; everything downstream borrows them through [`TokenCursor`].
//!
//! [`TokenCursor`]: super::TokenCursor

use smol_str::SmolStr;

/// Classification tag carried by every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    /// An ordinary token: identifier, keyword, number, punctuator.
    #[default]
    Standard,
    /// A string literal. The token text keeps its surrounding quotes.
    String,
    /// A comment with no following token to attach to.
    Comment,
}

/// A single lexical token.
///
/// `comment` holds comment text attached to this token: a comment trailing
/// it on the same line, or a comment that opened the line this token starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: SmolStr,
    pub line: u32,
    pub kind: TokenKind,
    pub comment: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<SmolStr>, line: u32, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            line,
            kind,
            comment: None,
        }
    }

    /// The text of a string-literal token without its quotes.
    ///
    /// Returns the raw text for non-string tokens.
    pub fn unquoted(&self) -> &str {
        if self.kind == TokenKind::String && self.text.len() >= 2 {
            &self.text[1..self.text.len() - 1]
        } else {
            &self.text
        }
    }
}
