//! Error taxonomy shared by every stage of the pipeline.
//!
//! Propagation is fail-fast: any error aborts analysis of the current file.
//! Nested-import failures are wrapped with the importing file's name so the
//! driver can surface the full chain (top file → import chain → line).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected end of input at line {line}")]
    UnexpectedEndOfInput { line: u32 },

    #[error("expected '{expected}', read '{found}' at line {line}")]
    ExpectedToken {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("unterminated block starting at line {line} ({depth} block(s) still open)")]
    UnterminatedBlock { line: u32, depth: u32 },

    #[error("read ';' before the end of block at line {line}")]
    UnexpectedSemicolon { line: u32 },

    #[error("'{name}' is not a valid identifier (line {line})")]
    InvalidIdentifier { name: String, line: u32 },

    #[error("variable '{name}' already declared (line {line})")]
    DuplicateName { name: String, line: u32 },

    #[error("name '{name}' already reserved (line {line})")]
    NameAlreadyReserved { name: String, line: u32 },

    #[error("unknown keyword '{keyword}' at line {line}")]
    UnknownKeyword { keyword: String, line: u32 },

    #[error("no word beginning with '@' is allowed here ('{keyword}', line {line})")]
    MisplacedKeyword { keyword: String, line: u32 },

    #[error("invalid array size for '{name}': {reason} (line {line})")]
    ArrayDimension {
        name: String,
        reason: String,
        line: u32,
    },

    #[error("interface '{interface}': {message}")]
    Backend { interface: String, message: String },

    #[error("error while importing '{file}'")]
    Import {
        file: String,
        #[source]
        source: Box<Error>,
    },

    #[error("could not read '{file}'")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an error produced while analysing an imported file with the
    /// importing file's context.
    pub fn while_importing(self, file: impl Into<String>) -> Self {
        Error::Import {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// The source line the error points at, if it carries one.
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::UnexpectedEndOfInput { line }
            | Error::ExpectedToken { line, .. }
            | Error::UnterminatedBlock { line, .. }
            | Error::UnexpectedSemicolon { line }
            | Error::InvalidIdentifier { line, .. }
            | Error::DuplicateName { line, .. }
            | Error::NameAlreadyReserved { line, .. }
            | Error::UnknownKeyword { line, .. }
            | Error::MisplacedKeyword { line, .. }
            | Error::ArrayDimension { line, .. } => Some(*line),
            Error::Import { source, .. } => source.line(),
            Error::Backend { .. } | Error::Io { .. } => None,
        }
    }

    /// Render the full import chain as a single diagnostic.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
