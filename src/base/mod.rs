//! Foundation types for the matforge toolchain.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`Token`], [`TokenKind`] - Lexical tokens with line and comment info
//! - [`TokenCursor`] - Replayable position into a token sequence
//! - [`LineIndex`] - Byte offset to line number conversion
//! - [`is_valid_identifier`] - Identifier validation
//!
//! This module has NO dependencies on other matforge modules.

mod cursor;
mod ident;
mod line_index;
mod token;

pub use cursor::TokenCursor;
pub use ident::is_valid_identifier;
pub use line_index::LineIndex;
pub use token::{Token, TokenKind};
