//! Integer expression evaluation for symbolic array sizes.
//!
//! Array declarations such as `x[2*N]` may reference previously declared
//! integer constants. The evaluator handles `+ - * / %`, unary minus and
//! parentheses with the usual precedence.

use thiserror::Error;

use crate::base::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown constant '{0}'")]
    UnknownSymbol(String),
    #[error("malformed expression: {0}")]
    Malformed(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate a token slice as an integer expression, resolving identifiers
/// through `lookup`.
pub fn evaluate(
    tokens: &[Token],
    lookup: &dyn Fn(&str) -> Option<i64>,
) -> Result<i64, EvalError> {
    let mut parser = ExprParser { tokens, pos: 0, lookup };
    let value = parser.expression()?;
    if parser.pos != tokens.len() {
        return Err(EvalError::Malformed(format!(
            "unexpected '{}'",
            parser.tokens[parser.pos].text
        )));
    }
    Ok(value)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    lookup: &'a dyn Fn(&str) -> Option<i64>,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|t| t.text.as_str())
    }

    fn bump(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expression(&mut self) -> Result<i64, EvalError> {
        let mut value = self.term()?;
        loop {
            let add = match self.peek() {
                Some("+") => true,
                Some("-") => false,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            value = if add { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, EvalError> {
        let mut value = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(op @ ("*" | "/" | "%")) => op.as_bytes()[0],
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            if rhs == 0 && op != b'*' {
                return Err(EvalError::DivisionByZero);
            }
            value = match op {
                b'*' => value * rhs,
                b'/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, EvalError> {
        let Some(token) = self.bump().cloned() else {
            return Err(EvalError::Malformed("empty expression".into()));
        };
        if token.kind != TokenKind::Standard {
            return Err(EvalError::Malformed(format!("unexpected '{}'", token.text)));
        }
        match token.text.as_str() {
            "-" => Ok(-self.factor()?),
            "(" => {
                let value = self.expression()?;
                match self.bump() {
                    Some(t) if t.text == ")" => Ok(value),
                    _ => Err(EvalError::Malformed("expected ')'".into())),
                }
            }
            text if text.chars().all(|c| c.is_ascii_digit()) => text
                .parse()
                .map_err(|_| EvalError::Malformed(format!("bad integer '{text}'"))),
            text if crate::base::is_valid_identifier(text) => {
                (self.lookup)(text).ok_or_else(|| EvalError::UnknownSymbol(text.to_string()))
            }
            text => Err(EvalError::Malformed(format!("unexpected '{text}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn eval(expr: &str) -> Result<i64, EvalError> {
        let tokens = tokenize(expr);
        evaluate(&tokens, &|name| (name == "N").then_some(3))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3"), Ok(7));
        assert_eq!(eval("( 1 + 2 ) * 3"), Ok(9));
        assert_eq!(eval("2 * N"), Ok(6));
        assert_eq!(eval("- N + 10"), Ok(7));
        assert_eq!(eval("7 % 4"), Ok(3));
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(eval("2 * M"), Err(EvalError::UnknownSymbol("M".into())));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(eval("2 +"), Err(EvalError::Malformed(_))));
        assert!(matches!(eval("( 2"), Err(EvalError::Malformed(_))));
        assert!(matches!(eval("2 3"), Err(EvalError::Malformed(_))));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("4 / ( N - 3 )"), Err(EvalError::DivisionByZero));
    }
}
