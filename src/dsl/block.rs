//! Code-block extraction: the incremental text-to-text rewriter.
//!
//! A code block is a delimiter-bounded span of near-native source text
//! embedded in the DSL. Extraction consumes tokens up to the matching close
//! delimiter (honoring nesting), classifies every identifier against the
//! [`NameRegistry`], rewrites variable references according to the options'
//! qualification policy, and tracks source lines so generated code can be
//! mapped back to DSL input.

use indexmap::IndexSet;

use crate::base::{Token, TokenCursor};
use crate::error::{Error, Result};

use super::options::CodeBlockParserOptions;
use super::registry::NameRegistry;

/// The result of one extraction call. Immutable after construction; owned
/// by whichever description object requested it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    /// Rewritten code text, tokens space-separated.
    pub code: String,
    /// Comments attached to the block's tokens, newline-separated.
    pub description: String,
    /// Ordinary variables referenced by the block.
    pub variables: IndexSet<String>,
    /// Static/constant variables referenced by the block.
    pub static_variables: IndexSet<String>,
}

impl CodeBlock {
    fn append_description(&mut self, comment: &str) {
        if !self.description.is_empty() {
            self.description.push('\n');
        }
        self.description.push_str(comment);
    }
}

/// Scope-entry operators: an identifier preceded by one of these is already
/// qualified and must not be rewritten.
fn is_scope_operator(text: &str) -> bool {
    matches!(text, "." | "->" | "::")
}

/// Extract the next code block from the cursor.
///
/// The cursor must sit on the opening delimiter; on success it is positioned
/// immediately after the matching closing delimiter. `file_name` is the
/// originating DSL file, used for positional markers.
pub fn read_next_block(
    cursor: &mut TokenCursor<'_>,
    options: &CodeBlockParserOptions,
    registry: &NameRegistry,
    file_name: &str,
) -> Result<CodeBlock> {
    let open = options.open_delim.as_str();
    let close = options.close_delim.as_str();

    let opening = cursor.peek().ok_or(Error::UnexpectedEndOfInput {
        line: cursor.current_line(),
    })?;
    if opening.text != open {
        return Err(Error::ExpectedToken {
            expected: open.to_string(),
            found: opening.text.to_string(),
            line: opening.line,
        });
    }
    let opened_at = opening.line;
    cursor.advance();

    let mut block = CodeBlock::default();
    let mut depth: u32 = 0;
    let mut emitted_line: Option<u32> = None;
    let mut first = true;

    loop {
        let Some(token) = cursor.peek() else {
            return Err(Error::UnterminatedBlock {
                line: opened_at,
                depth: depth + 1,
            });
        };

        if token.text == close && depth == 0 {
            cursor.advance();
            break;
        }

        // A ';' immediately following the open delimiter stands for "no
        // code": consume it without emitting.
        if first && token.text == ";" {
            first = false;
            cursor.advance();
            continue;
        }

        if token.text == ";" && depth == 0 && !options.allow_semicolon {
            return Err(Error::UnexpectedSemicolon { line: token.line });
        }

        if emitted_line != Some(token.line) {
            let mid_block = emitted_line.is_some();
            emitted_line = Some(token.line);
            if options.emit_line_markers {
                if mid_block {
                    block.code.push('\n');
                }
                block
                    .code
                    .push_str(&format!("// line {} \"{}\"\n", token.line, file_name));
            } else if mid_block {
                block.code.push('\n');
            }
        }

        if let Some(comment) = &token.comment {
            block.append_description(comment);
        }

        if let Some(observer) = &options.token_observer {
            observer(token)?;
        }

        emit_token(&mut block, token, cursor.previous(), options, registry);
        block.code.push(' ');

        // Same open and close delimiters cancel out here, so nesting never
        // accumulates and the next occurrence closes the block.
        if token.text == open {
            depth += 1;
        }
        if token.text == close {
            depth -= 1;
        }

        first = false;
        cursor.advance();
    }

    Ok(block)
}

/// Classify one token against the registry and append its rewritten text.
fn emit_token(
    block: &mut CodeBlock,
    token: &Token,
    previous: Option<&Token>,
    options: &CodeBlockParserOptions,
    registry: &NameRegistry,
) {
    let prev_text = previous.map(|t| t.text.as_str());
    let after_scope_op = prev_text.is_some_and(is_scope_operator);
    let after_deref = prev_text == Some("*");

    if registry.is_static_variable(&token.text) {
        block.static_variables.insert(token.text.to_string());
        if !after_scope_op && options.qualify_static {
            if let Some(owner) = &options.static_qualifier {
                block.code.push_str(owner);
                block.code.push_str("::");
            }
        }
        block.code.push_str(&token.text);
    } else if registry.is_variable(&token.text) {
        block.variables.insert(token.text.to_string());
        let rewritten = if after_scope_op {
            token.text.to_string()
        } else if let Some(modifier) = &options.variable_modifier {
            modifier(&token.text, options.qualify_members)
        } else if options.qualify_members {
            format!("{}{}", options.self_prefix, token.text)
        } else {
            token.text.to_string()
        };
        if after_deref {
            block.code.push('(');
            block.code.push_str(&rewritten);
            block.code.push(')');
        } else {
            block.code.push_str(&rewritten);
        }
    } else {
        block.code.push_str(&token.text);
    }
}
