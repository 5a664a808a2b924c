//! Logos-based lexer for the material-law DSL.
//!
//! Produces the flat [`Token`] stream the rest of the engine consumes. Code
//! blocks embedded in the DSL are near-native source text, so the lexer
//! recognizes a generic expression vocabulary (identifiers, numbers,
//! strings, multi-character operators) rather than a closed keyword set;
//! DSL keywords are single `@`-prefixed tokens.
//!
//! Comments never appear in the token stream as separate entries: a comment
//! is attached to the token it trails on the same line, or to the next token
//! produced. Only a comment with no following token survives as a
//! [`TokenKind::Comment`] token.

use logos::Logos;

use crate::base::{LineIndex, Token, TokenKind};

/// Tokenize an entire source text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let index = LineIndex::new(input);
    let mut tokens: Vec<Token> = Vec::new();
    // Comment text waiting for the next token to attach to.
    let mut pending: Option<(String, u32)> = None;

    let mut lexer = LogosToken::lexer(input);
    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let line = index.line_of(lexer.span().start);
        let kind = match result {
            Ok(LogosToken::LineComment) | Ok(LogosToken::BlockComment) => {
                attach_comment(&mut tokens, &mut pending, comment_text(text), line);
                continue;
            }
            Ok(LogosToken::String) => TokenKind::String,
            Ok(_) => TokenKind::Standard,
            // Unrecognized bytes are carried through verbatim: code blocks
            // are re-emitted, not compiled, by this engine.
            Err(()) => TokenKind::Standard,
        };
        let mut token = Token::new(text, line, kind);
        if let Some((comment, _)) = pending.take() {
            token.comment = Some(comment);
        }
        tokens.push(token);
    }
    if let Some((comment, line)) = pending {
        let mut token = Token::new("", line, TokenKind::Comment);
        token.comment = Some(comment);
        tokens.push(token);
    }
    tokens
}

/// Strip comment delimiters and surrounding whitespace.
fn comment_text(raw: &str) -> String {
    let body = if let Some(stripped) = raw.strip_prefix("//") {
        stripped
    } else {
        raw.trim_start_matches("/*").trim_end_matches("*/")
    };
    body.trim().to_string()
}

fn attach_comment(
    tokens: &mut [Token],
    pending: &mut Option<(String, u32)>,
    comment: String,
    line: u32,
) {
    // Trailing position: attach to the token this comment follows.
    if let Some(last) = tokens.last_mut() {
        if last.line == line {
            match &mut last.comment {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(&comment);
                }
                None => last.comment = Some(comment),
            }
            return;
        }
    }
    // Leading position: keep for the next token.
    match pending {
        Some((existing, _)) => {
            existing.push('\n');
            existing.push_str(&comment);
        }
        None => *pending = Some((comment, line)),
    }
}

/// Logos token enum. Most variants collapse to [`TokenKind::Standard`]; the
/// split only matters for longest-match lexing.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    /// DSL keyword: the `@` sigil plus the keyword name, one token.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    Keyword,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // Multi-character punctuation (must come before single-char)
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("**")]
    StarStar,

    // Single-character punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
}
