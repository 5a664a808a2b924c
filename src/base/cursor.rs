//! Replayable position into a token sequence.

use super::token::Token;

/// A borrowed position into an ordered, immutable token sequence.
///
/// Many cursors may coexist read-only over one sequence. [`save`] and
/// [`restore`] give the only sanctioned rewind: a handler that must re-parse
/// an upcoming range under a different rewrite policy saves the position,
/// extracts once, restores, and extracts again.
///
/// [`save`]: TokenCursor::save
/// [`restore`]: TokenCursor::restore
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn at(tokens: &'a [Token], pos: usize) -> Self {
        Self { tokens, pos }
    }

    /// The token under the cursor, or `None` at end of stream.
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Look ahead `n` tokens past the current one.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consume and return the token under the cursor.
    pub fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The source line of the current token, or of the last token when the
    /// stream is exhausted.
    pub fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    /// The token immediately before the cursor, if any.
    pub fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Cheap copy of the cursor position for later [`restore`].
    ///
    /// [`restore`]: TokenCursor::restore
    pub fn save(&self) -> usize {
        self.pos
    }

    pub fn restore(&mut self, mark: usize) {
        debug_assert!(mark <= self.tokens.len());
        self.pos = mark;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TokenKind;

    fn stream() -> Vec<Token> {
        ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(*t, i as u32 + 1, TokenKind::Standard))
            .collect()
    }

    #[test]
    fn test_save_restore_replays_identical_range() {
        let tokens = stream();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.advance();
        let mark = cursor.save();
        let first: Vec<_> = std::iter::from_fn(|| cursor.bump().map(|t| t.text.clone())).collect();
        cursor.restore(mark);
        let second: Vec<_> = std::iter::from_fn(|| cursor.bump().map(|t| t.text.clone())).collect();
        assert_eq!(first, second);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_current_line_at_end_is_last_token_line() {
        let tokens = stream();
        let mut cursor = TokenCursor::new(&tokens);
        while cursor.bump().is_some() {}
        assert_eq!(cursor.current_line(), 3);
    }
}
