//! Configuration record driving one code-block extraction.

use smol_str::SmolStr;

/// Pluggable rewrite applied to every ordinary-variable reference.
///
/// Receives the variable name and whether member qualification was
/// requested; returns the full replacement text. When a modifier is
/// installed it takes over from the default `self.`-prefixing.
pub type VariableModifier = Box<dyn Fn(&str, bool) -> String>;

/// Side-effect hook invoked with every token, regardless of
/// classification. Returning an error aborts the extraction.
pub type TokenObserver = Box<dyn Fn(&crate::base::Token) -> Result<(), crate::Error>>;

/// Options for [`read_next_block`].
///
/// [`read_next_block`]: super::block::read_next_block
pub struct CodeBlockParserOptions {
    /// Opening delimiter.
    pub open_delim: SmolStr,
    /// Closing delimiter.
    pub close_delim: SmolStr,
    /// Prefix static-variable references with the owning type's name.
    pub qualify_static: bool,
    /// Prefix member-variable references with the self-reference prefix.
    pub qualify_members: bool,
    /// Accept bare `;` tokens at nesting depth zero.
    pub allow_semicolon: bool,
    /// Emit `// line N "file"` positional markers on line changes.
    pub emit_line_markers: bool,
    /// Self-reference prefix used when `qualify_members` is set.
    pub self_prefix: SmolStr,
    /// Owning type name used when `qualify_static` is set.
    pub static_qualifier: Option<SmolStr>,
    /// Optional rewrite hook for ordinary-variable references.
    pub variable_modifier: Option<VariableModifier>,
    /// Optional per-token side-effect hook.
    pub token_observer: Option<TokenObserver>,
}

impl Default for CodeBlockParserOptions {
    fn default() -> Self {
        Self {
            open_delim: SmolStr::new_static("{"),
            close_delim: SmolStr::new_static("}"),
            qualify_static: false,
            qualify_members: false,
            allow_semicolon: true,
            emit_line_markers: true,
            self_prefix: SmolStr::new_static("self."),
            static_qualifier: None,
            variable_modifier: None,
            token_observer: None,
        }
    }
}

impl CodeBlockParserOptions {
    /// Options qualifying both member and static references, the usual
    /// setting for blocks pasted into generated type bodies.
    pub fn qualified(static_qualifier: impl Into<SmolStr>) -> Self {
        Self {
            qualify_static: true,
            qualify_members: true,
            static_qualifier: Some(static_qualifier.into()),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for CodeBlockParserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBlockParserOptions")
            .field("open_delim", &self.open_delim)
            .field("close_delim", &self.close_delim)
            .field("qualify_static", &self.qualify_static)
            .field("qualify_members", &self.qualify_members)
            .field("allow_semicolon", &self.allow_semicolon)
            .field("emit_line_markers", &self.emit_line_markers)
            .field("self_prefix", &self.self_prefix)
            .field("static_qualifier", &self.static_qualifier)
            .field("variable_modifier", &self.variable_modifier.is_some())
            .field("token_observer", &self.token_observer.is_some())
            .finish()
    }
}
