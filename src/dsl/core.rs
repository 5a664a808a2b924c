//! State and reader helpers shared by every DSL front-end.
//!
//! [`DslCore`] owns the token stream, the cursor position, the name
//! registry and the targets manifest for one file's analysis. The reader
//! methods consume tokens left-to-right; the only sanctioned rewind is the
//! cursor replay inside [`read_block_pair`].
//!
//! [`read_block_pair`]: DslCore::read_block_pair

use std::path::Path;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{Token, TokenCursor, TokenKind, is_valid_identifier};
use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::lexer::tokenize;
use crate::targets::TargetsDescription;

use super::block::{self, CodeBlock};
use super::eval::{self, EvalError};
use super::options::CodeBlockParserOptions;
use super::registry::{NameRegistry, RegistryError};
use super::variables::{
    StaticVariableDescription, StaticVariableDescriptionContainer, VariableDescription,
    VariableDescriptionContainer,
};

/// Free-text metadata gathered from `@Author`, `@Date` and `@Description`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescription {
    pub file_name: String,
    pub author: String,
    pub date: String,
    pub description: String,
}

/// Code sections every front-end accepts and passes through to generators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonSections {
    pub includes: String,
    pub members: String,
    pub private_code: String,
    pub sources: String,
}

impl CommonSections {
    fn append(target: &mut String, code: &str) {
        target.push_str(code);
        if !code.ends_with('\n') {
            target.push('\n');
        }
    }
}

/// Options for [`DslCore::read_var_list`].
#[derive(Debug, Clone, Default)]
pub struct VarListOptions {
    /// Explicit type; `None` reads the type from the stream.
    pub type_name: Option<String>,
    pub allow_array: bool,
    /// Also register the `d`-prefixed increment name for each variable.
    pub add_increment: bool,
    pub allow_rebind: bool,
}

/// Shared analysis state: one instance per DSL-variant instance.
pub struct DslCore {
    pub file_name: String,
    tokens: Vec<Token>,
    pos: usize,
    pub registry: NameRegistry,
    pub integer_constants: FxHashMap<SmolStr, i64>,
    /// Comment attached to the keyword currently being treated; seeds the
    /// description of the next extracted block.
    pub current_comment: Option<String>,
    pub targets: TargetsDescription,
    pub file_description: FileDescription,
    pub sections: CommonSections,
    pub static_variables: StaticVariableDescriptionContainer,
    pub material: String,
    pub library: Option<String>,
    /// Declared name of the law/behaviour/model, once known.
    pub class_name: Option<SmolStr>,
    /// Function names of material laws pulled in through `@MaterialLaw`.
    pub material_laws: Vec<String>,
    /// Library dependencies declared through `@Link`.
    pub link_libraries: Vec<String>,
    pub interfaces: Vec<String>,
    /// Files generated by nested analyses (`@Import`, `@MaterialLaw`).
    pub nested_files: Vec<GeneratedFile>,
}

impl DslCore {
    pub fn new() -> Self {
        let mut core = Self {
            file_name: String::new(),
            tokens: Vec::new(),
            pos: 0,
            registry: NameRegistry::new(),
            integer_constants: FxHashMap::default(),
            current_comment: None,
            targets: TargetsDescription::new(),
            file_description: FileDescription::default(),
            sections: CommonSections::default(),
            static_variables: Vec::new(),
            material: String::new(),
            library: None,
            class_name: None,
            material_laws: Vec::new(),
            link_libraries: Vec::new(),
            interfaces: Vec::new(),
            nested_files: Vec::new(),
        };
        // Words generated code relies on; never shadowable by user variables.
        for name in ["self", "std", "core", "real", "material", "policy"] {
            core.registry
                .reserve(name, false)
                .expect("fresh registry cannot hold reservations");
        }
        core
    }

    /// Install the token stream for a source text, with leading commands
    /// prepended in the order given.
    pub fn load_source(&mut self, name: &str, source: &str, leading_commands: &[String]) {
        tracing::debug!(file = name, commands = leading_commands.len(), "loading source");
        self.file_name = name.to_string();
        self.file_description.file_name = name.to_string();
        let mut tokens: Vec<Token> = Vec::new();
        for command in leading_commands {
            tokens.extend(tokenize(command));
        }
        tokens.extend(tokenize(source));
        self.tokens = tokens;
        self.pos = 0;
    }

    pub fn read_file(&mut self, path: &Path, leading_commands: &[String]) -> Result<()> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io {
            file: path.display().to_string(),
            source: e,
        })?;
        self.load_source(&path.display().to_string(), &source, leading_commands);
        Ok(())
    }

    // ========================================================================
    // Cursor access
    // ========================================================================

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    /// The current token, or `UnexpectedEndOfInput` past the stream.
    pub fn current(&self) -> Result<&Token> {
        self.tokens.get(self.pos).ok_or(Error::UnexpectedEndOfInput {
            line: self.tokens.last().map(|t| t.line).unwrap_or(1),
        })
    }

    // ========================================================================
    // Registry wrappers attaching the current source line
    // ========================================================================

    fn registry_error(&self, error: RegistryError) -> Error {
        let line = self.current_line();
        match error {
            RegistryError::InvalidIdentifier(name) => Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            },
            RegistryError::DuplicateName(name) => Error::DuplicateName {
                name: name.to_string(),
                line,
            },
            RegistryError::AlreadyReserved(name) => Error::NameAlreadyReserved {
                name: name.to_string(),
                line,
            },
        }
    }

    pub fn reserve(&mut self, name: &str, allow_rebind: bool) -> Result<()> {
        self.registry
            .reserve(name, allow_rebind)
            .map_err(|e| self.registry_error(e))
    }

    pub fn register_variable(&mut self, name: &str, allow_rebind: bool) -> Result<()> {
        self.registry
            .register_variable(name, allow_rebind)
            .map_err(|e| self.registry_error(e))
    }

    pub fn register_static_variable(&mut self, name: &str) -> Result<()> {
        self.registry
            .register_static_variable(name)
            .map_err(|e| self.registry_error(e))
    }

    // ========================================================================
    // Elementary readers
    // ========================================================================

    /// Consume the current token, which must equal `expected`.
    pub fn read_specified_token(&mut self, expected: &str) -> Result<()> {
        let token = self.current()?;
        if token.text != expected {
            return Err(Error::ExpectedToken {
                expected: expected.to_string(),
                found: token.text.to_string(),
                line: token.line,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Concatenate token texts up to the terminating `;`. Sigil-prefixed
    /// tokens are reserved for keyword position and rejected here.
    pub fn read_until_end_of_instruction(&mut self) -> Result<String> {
        let mut res = String::new();
        loop {
            let token = self.current()?;
            if token.text == ";" {
                break;
            }
            if token.text.starts_with('@') {
                return Err(Error::MisplacedKeyword {
                    keyword: token.text.to_string(),
                    line: token.line,
                });
            }
            if !token.text.is_empty() {
                res.push_str(&token.text);
                res.push(' ');
            }
            self.pos += 1;
        }
        self.pos += 1;
        res.truncate(res.trim_end().len());
        Ok(res)
    }

    /// Read exactly one word followed by `;`.
    pub fn read_only_one_token(&mut self) -> Result<SmolStr> {
        let token = self.current()?;
        if token.text == ";" {
            return Err(Error::ExpectedToken {
                expected: "a word".to_string(),
                found: ";".to_string(),
                line: token.line,
            });
        }
        let word = token.text.clone();
        self.pos += 1;
        self.read_specified_token(";")?;
        Ok(word)
    }

    /// Read a string literal, without its quotes.
    pub fn read_string(&mut self) -> Result<String> {
        let token = self.current()?;
        if token.kind != TokenKind::String {
            return Err(Error::ExpectedToken {
                expected: "a string".to_string(),
                found: token.text.to_string(),
                line: token.line,
            });
        }
        let value = token.unquoted().to_string();
        self.pos += 1;
        Ok(value)
    }

    /// Read a comma-separated token list bounded by `open`/`close`. An
    /// absent list (next token is not `open`) yields an empty vector.
    pub fn read_list(&mut self, open: &str, close: &str) -> Result<Vec<Token>> {
        let mut items = Vec::new();
        if self.current()?.text != open {
            return Ok(items);
        }
        self.pos += 1;
        loop {
            let token = self.current()?;
            if token.text == close {
                self.pos += 1;
                return Ok(items);
            }
            items.push(token.clone());
            self.pos += 1;
            let separator = self.current()?;
            match separator.text.as_str() {
                t if t == close => {}
                "," => {
                    self.pos += 1;
                    let next = self.current()?;
                    if next.text == close {
                        return Err(Error::ExpectedToken {
                            expected: "a new item".to_string(),
                            found: next.text.to_string(),
                            line: next.line,
                        });
                    }
                }
                other => {
                    return Err(Error::ExpectedToken {
                        expected: format!("',' or '{close}'"),
                        found: other.to_string(),
                        line: separator.line,
                    });
                }
            }
        }
    }

    pub fn read_array_of_string(&mut self) -> Result<Vec<String>> {
        let items = self.read_list("{", "}")?;
        items
            .iter()
            .map(|token| {
                if token.kind != TokenKind::String {
                    return Err(Error::ExpectedToken {
                        expected: "a string".to_string(),
                        found: token.text.to_string(),
                        line: token.line,
                    });
                }
                Ok(token.unquoted().to_string())
            })
            .collect()
    }

    pub fn read_string_or_array_of_string(&mut self) -> Result<Vec<String>> {
        if self.current()?.text == "{" {
            self.read_array_of_string()
        } else {
            Ok(vec![self.read_string()?])
        }
    }

    pub fn read_boolean(&mut self) -> Result<bool> {
        let token = self.current()?;
        let value = match token.text.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(Error::ExpectedToken {
                    expected: "'true' or 'false'".to_string(),
                    found: other.to_string(),
                    line: token.line,
                });
            }
        };
        self.pos += 1;
        Ok(value)
    }

    pub fn read_unsigned(&mut self) -> Result<u32> {
        let token = self.current()?;
        let value = token.text.parse().map_err(|_| Error::ExpectedToken {
            expected: "an unsigned integer".to_string(),
            found: token.text.to_string(),
            line: token.line,
        })?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_double(&mut self) -> Result<f64> {
        let token = self.current()?;
        let value = token.text.parse().map_err(|_| Error::ExpectedToken {
            expected: "a floating-point value".to_string(),
            found: token.text.to_string(),
            line: token.line,
        })?;
        self.pos += 1;
        Ok(value)
    }

    fn read_integer(&mut self) -> Result<i64> {
        let token = self.current()?;
        let value = token.text.parse().map_err(|_| Error::ExpectedToken {
            expected: "an integer".to_string(),
            found: token.text.to_string(),
            line: token.line,
        })?;
        self.pos += 1;
        Ok(value)
    }

    /// Optional `=`, `{…}` or `(…)` initialisation syntax around a value.
    fn initialisation_closing(&mut self) -> Result<Option<&'static str>> {
        let closing = match self.current()?.text.as_str() {
            "=" => None,
            "{" => Some("}"),
            "(" => Some(")"),
            _ => return Ok(None),
        };
        self.pos += 1;
        Ok(closing)
    }

    pub fn read_initialisation_value(&mut self) -> Result<f64> {
        let closing = self.initialisation_closing()?;
        let value = self.read_double()?;
        if let Some(delim) = closing {
            self.read_specified_token(delim)?;
        }
        Ok(value)
    }

    fn read_integer_initialisation(&mut self) -> Result<i64> {
        let closing = self.initialisation_closing()?;
        let value = self.read_integer()?;
        if let Some(delim) = closing {
            self.read_specified_token(delim)?;
        }
        Ok(value)
    }

    /// Read a type name: an identifier with optional `::` path segments.
    pub fn read_type(&mut self) -> Result<String> {
        let token = self.current()?;
        if !is_valid_identifier(&token.text) {
            return Err(Error::InvalidIdentifier {
                name: token.text.to_string(),
                line: token.line,
            });
        }
        let mut type_name = token.text.to_string();
        self.pos += 1;
        while self.peek().is_some_and(|t| t.text == "::") {
            self.pos += 1;
            let segment = self.current()?;
            if !is_valid_identifier(&segment.text) {
                return Err(Error::InvalidIdentifier {
                    name: segment.text.to_string(),
                    line: segment.line,
                });
            }
            type_name.push_str("::");
            type_name.push_str(&segment.text);
            self.pos += 1;
        }
        Ok(type_name)
    }

    // ========================================================================
    // Block extraction
    // ========================================================================

    /// Extract the next code block, seeding its description with the
    /// comment attached to the keyword being treated.
    pub fn read_block(&mut self, options: &CodeBlockParserOptions) -> Result<CodeBlock> {
        let mut cursor = TokenCursor::at(&self.tokens, self.pos);
        let mut block =
            block::read_next_block(&mut cursor, options, &self.registry, &self.file_name)?;
        self.pos = cursor.position();
        if let Some(comment) = self.current_comment.take() {
            if block.description.is_empty() {
                block.description = comment;
            } else {
                block.description = format!("{comment}\n{}", block.description);
            }
        }
        Ok(block)
    }

    /// Extract the same upcoming block twice under two option sets, via
    /// cursor replay. Registry state is only read during extraction, so
    /// both renderings observe identical classifications.
    pub fn read_block_pair(
        &mut self,
        first: &CodeBlockParserOptions,
        second: &CodeBlockParserOptions,
    ) -> Result<(CodeBlock, CodeBlock)> {
        let comment = self.current_comment.clone();
        let mark = self.pos;
        let block_a = self.read_block(first)?;
        let end = self.pos;
        self.pos = mark;
        self.current_comment = comment;
        let block_b = self.read_block(second)?;
        debug_assert_eq!(self.pos, end);
        Ok((block_a, block_b))
    }

    /// Options qualifying both member and static references against the
    /// declared class name.
    pub fn qualified_block_options(&self) -> CodeBlockParserOptions {
        match &self.class_name {
            Some(name) => CodeBlockParserOptions::qualified(name.clone()),
            None => CodeBlockParserOptions {
                qualify_static: true,
                qualify_members: true,
                ..CodeBlockParserOptions::default()
            },
        }
    }

    // ========================================================================
    // Variable lists
    // ========================================================================

    fn read_array_size(&mut self, name: &str, line: u32) -> Result<u32> {
        let mut expression = Vec::new();
        loop {
            let token = self.current()?;
            if token.text == "]" {
                break;
            }
            if token.kind != TokenKind::Standard || token.text == ";" {
                return Err(Error::ArrayDimension {
                    name: name.to_string(),
                    reason: format!("unexpected '{}'", token.text),
                    line,
                });
            }
            expression.push(token.clone());
            self.pos += 1;
        }
        if expression.is_empty() {
            return Err(Error::ArrayDimension {
                name: name.to_string(),
                reason: "empty array size".to_string(),
                line,
            });
        }
        let constants = &self.integer_constants;
        let value = eval::evaluate(&expression, &|symbol| constants.get(symbol).copied())
            .map_err(|e| Error::ArrayDimension {
                name: name.to_string(),
                reason: match e {
                    EvalError::UnknownSymbol(s) => format!("unknown constant '{s}'"),
                    other => other.to_string(),
                },
                line,
            })?;
        if value <= 0 {
            return Err(Error::ArrayDimension {
                name: name.to_string(),
                reason: format!("array size must be positive, got {value}"),
                line,
            });
        }
        self.read_specified_token("]")?;
        Ok(value as u32)
    }

    /// Read `name[, name…];` declarations, registering every name.
    pub fn read_var_list(&mut self, options: &VarListOptions) -> Result<VariableDescriptionContainer> {
        let type_name = match &options.type_name {
            Some(t) => t.clone(),
            None => self.read_type()?,
        };
        let statement_comment = self.current_comment.take();
        let mut container = Vec::new();
        let mut end_comment: Option<String> = None;
        loop {
            let token = self.current()?;
            let name = token.text.clone();
            let line = token.line;
            let name_comment = token.comment.clone();
            if !is_valid_identifier(&name) {
                return Err(Error::InvalidIdentifier {
                    name: name.to_string(),
                    line,
                });
            }
            self.pos += 1;
            let mut array_size = 1;
            if self.current()?.text == "[" {
                if !options.allow_array {
                    return Err(Error::ArrayDimension {
                        name: name.to_string(),
                        reason: "arrays are not allowed here".to_string(),
                        line,
                    });
                }
                self.pos += 1;
                array_size = self.read_array_size(&name, line)?;
            }
            let separator = self.current()?;
            let at_end = match separator.text.as_str() {
                "," => {
                    self.pos += 1;
                    false
                }
                ";" => {
                    end_comment = separator.comment.clone();
                    self.pos += 1;
                    true
                }
                other => {
                    return Err(Error::ExpectedToken {
                        expected: format!("',' or ';' after '{name}'"),
                        found: other.to_string(),
                        line: separator.line,
                    });
                }
            };
            self.register_variable(&name, options.allow_rebind)?;
            if options.add_increment {
                self.register_variable(&format!("d{name}"), options.allow_rebind)?;
            }
            let mut variable = VariableDescription::new(type_name.clone(), name, array_size, line);
            variable.description = statement_comment.clone().or(name_comment);
            container.push(variable);
            if at_end {
                break;
            }
        }
        if let Some(comment) = end_comment {
            for variable in &mut container {
                match &mut variable.description {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&comment);
                    }
                    None => variable.description = Some(comment.clone()),
                }
            }
        }
        Ok(container)
    }

    /// Read `name [= value][, …];` parameter declarations, recording
    /// default values into `defaults`.
    pub fn read_parameter_list(
        &mut self,
        defaults: &mut FxHashMap<SmolStr, f64>,
    ) -> Result<VariableDescriptionContainer> {
        let statement_comment = self.current_comment.take();
        let mut container = Vec::new();
        loop {
            let token = self.current()?;
            let name = token.text.clone();
            let line = token.line;
            if !is_valid_identifier(&name) {
                return Err(Error::InvalidIdentifier {
                    name: name.to_string(),
                    line,
                });
            }
            self.pos += 1;
            let next = self.current()?;
            if matches!(next.text.as_str(), "=" | "{" | "(") {
                let value = self.read_initialisation_value()?;
                if defaults.insert(name.clone(), value).is_some() {
                    return Err(Error::DuplicateName {
                        name: name.to_string(),
                        line,
                    });
                }
            }
            let separator = self.current()?;
            let at_end = match separator.text.as_str() {
                "," => {
                    self.pos += 1;
                    false
                }
                ";" => {
                    self.pos += 1;
                    true
                }
                other => {
                    return Err(Error::ExpectedToken {
                        expected: format!("',' or ';' after '{name}'"),
                        found: other.to_string(),
                        line: separator.line,
                    });
                }
            };
            self.register_variable(&name, false)?;
            let mut variable = VariableDescription::new("real", name, 1, line);
            variable.description = statement_comment.clone();
            container.push(variable);
            if at_end {
                break;
            }
        }
        Ok(container)
    }

    // ========================================================================
    // Handlers for the common keyword set
    // ========================================================================

    pub fn treat_author(&mut self) -> Result<()> {
        self.file_description.author = self.read_until_end_of_instruction()?;
        Ok(())
    }

    pub fn treat_date(&mut self) -> Result<()> {
        self.file_description.date = self.read_until_end_of_instruction()?;
        Ok(())
    }

    pub fn treat_description(&mut self) -> Result<()> {
        self.read_specified_token("{")?;
        let opened_at = self.current_line();
        let mut text = String::new();
        let mut line = opened_at;
        let mut depth = 1u32;
        loop {
            let Ok(token) = self.current() else {
                return Err(Error::UnterminatedBlock {
                    line: opened_at,
                    depth,
                });
            };
            if token.text == "}" && depth == 1 {
                self.pos += 1;
                break;
            }
            if token.text == "{" {
                depth += 1;
            } else if token.text == "}" {
                depth -= 1;
            }
            while line < token.line {
                text.push('\n');
                line += 1;
            }
            text.push_str(token.unquoted());
            text.push(' ');
            self.pos += 1;
        }
        self.file_description.description = text.trim().to_string();
        Ok(())
    }

    /// `@DSL`/`@Parser` names the variant; selection already happened, so
    /// the statement is consumed and ignored.
    pub fn treat_dsl(&mut self) -> Result<()> {
        self.read_until_end_of_instruction()?;
        Ok(())
    }

    pub fn treat_material(&mut self) -> Result<()> {
        let name = self.read_only_one_token()?;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line: self.current_line(),
            });
        }
        self.material = name.to_string();
        Ok(())
    }

    pub fn treat_library(&mut self) -> Result<()> {
        let name = self.read_only_one_token()?;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line: self.current_line(),
            });
        }
        self.library = Some(name.to_string());
        Ok(())
    }

    pub fn treat_includes(&mut self) -> Result<()> {
        let block = self.read_block(&CodeBlockParserOptions::default())?;
        CommonSections::append(&mut self.sections.includes, &block.code);
        Ok(())
    }

    pub fn treat_sources(&mut self) -> Result<()> {
        let block = self.read_block(&CodeBlockParserOptions::default())?;
        CommonSections::append(&mut self.sections.sources, &block.code);
        Ok(())
    }

    pub fn treat_members(&mut self) -> Result<()> {
        let options = self.qualified_block_options();
        let block = self.read_block(&options)?;
        CommonSections::append(&mut self.sections.members, &block.code);
        Ok(())
    }

    pub fn treat_private(&mut self) -> Result<()> {
        let options = self.qualified_block_options();
        let block = self.read_block(&options)?;
        CommonSections::append(&mut self.sections.private_code, &block.code);
        Ok(())
    }

    pub fn treat_static_variable(&mut self) -> Result<()> {
        let type_name = self.read_type()?;
        let token = self.current()?;
        let name = token.text.clone();
        let line = token.line;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            });
        }
        self.pos += 1;
        let value = self.read_initialisation_value()?;
        self.read_specified_token(";")?;
        self.register_static_variable(&name)?;
        self.static_variables.push(StaticVariableDescription {
            type_name,
            name,
            line,
            value,
        });
        Ok(())
    }

    pub fn treat_integer_constant(&mut self) -> Result<()> {
        let token = self.current()?;
        let name = token.text.clone();
        let line = token.line;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            });
        }
        self.pos += 1;
        let value = self.read_integer_initialisation()?;
        self.read_specified_token(";")?;
        self.register_static_variable(&name)?;
        if self.integer_constants.insert(name.clone(), value).is_some() {
            return Err(Error::DuplicateName {
                name: name.to_string(),
                line,
            });
        }
        self.static_variables.push(StaticVariableDescription {
            type_name: "int".to_string(),
            name,
            line,
            value: value as f64,
        });
        Ok(())
    }

    pub fn treat_link(&mut self) -> Result<()> {
        let libraries = self.read_string_or_array_of_string()?;
        self.read_specified_token(";")?;
        for library in libraries {
            if !self.link_libraries.contains(&library) {
                self.link_libraries.push(library);
            }
        }
        Ok(())
    }

    /// `@Import`: run a full nested analysis over each named file and merge
    /// its manifest into this one. The nested variant owns a fresh
    /// registry; only its targets and generated files flow back.
    pub fn treat_import(&mut self) -> Result<()> {
        let files = self.read_string_or_array_of_string()?;
        self.read_specified_token(";")?;
        for file in files {
            let engine = crate::driver::Engine::with_interfaces(self.interfaces.clone());
            let outcome = engine
                .process_file(Path::new(&file), &[])
                .map_err(|e| e.while_importing(file.clone()))?;
            self.targets.merge(&outcome.targets);
            self.nested_files.extend(outcome.files);
        }
        Ok(())
    }

    /// `@MaterialLaw`: analyse a material-property file, reserve its
    /// generated function name, record a use-declaration for it, and merge
    /// its build artifacts.
    pub fn treat_material_law(&mut self) -> Result<()> {
        let files = self.read_string_or_array_of_string()?;
        self.read_specified_token(";")?;
        for file in files {
            self.handle_material_law(&file)?;
        }
        Ok(())
    }

    fn handle_material_law(&mut self, file: &str) -> Result<()> {
        let engine = crate::driver::Engine::with_interfaces(vec!["native".to_string()]);
        let outcome = engine
            .process_file(Path::new(file), &[])
            .map_err(|e| e.while_importing(file.to_string()))?;
        let super::DslDescription::MaterialProperty(law) = &outcome.description else {
            return Err(Error::Backend {
                interface: "native".to_string(),
                message: format!("'{file}' does not describe a material property"),
            });
        };
        let function = crate::interfaces::material_law_function_name(&law.material, &law.law);
        self.reserve(&function, false)?;
        CommonSections::append(
            &mut self.sections.includes,
            &format!("use material_laws::{function} ;"),
        );
        self.material_laws.push(function);
        if !self.link_libraries.contains(&"MaterialLaw".to_string()) {
            self.link_libraries.push("MaterialLaw".to_string());
        }
        self.targets.merge(&outcome.targets);
        self.nested_files.extend(outcome.files);
        Ok(())
    }
}

impl Default for DslCore {
    fn default() -> Self {
        Self::new()
    }
}
