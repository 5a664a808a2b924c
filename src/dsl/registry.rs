//! Symbol-collision prevention between user code and generated code.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::is_valid_identifier;

/// Failure raised by a registry operation. The DSL layer attaches the
/// offending source line when converting into [`crate::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(SmolStr),
    #[error("variable '{0}' already declared")]
    DuplicateName(SmolStr),
    #[error("name '{0}' already reserved")]
    AlreadyReserved(SmolStr),
}

/// Three disjoint namespaces with insert-with-uniqueness-check semantics.
///
/// The registry is the single source of truth letting the code-block
/// rewriter classify every token in O(1): reserved names are language and
/// library words that must never be shadowed, variable names qualify as
/// member references, static names qualify as owner-type references.
///
/// One registry exists per DSL-variant instance; it is mutated during file
/// analysis and only read during code-block rewriting, which keeps cursor
/// replay side-effect-free.
#[derive(Debug, Default)]
pub struct NameRegistry {
    reserved: FxHashSet<SmolStr>,
    variables: FxHashSet<SmolStr>,
    statics: FxHashSet<SmolStr>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as reserved.
    ///
    /// With `allow_rebind` the insertion is idempotent; without it a second
    /// reservation of the same name fails.
    pub fn reserve(&mut self, name: &str, allow_rebind: bool) -> Result<(), RegistryError> {
        if allow_rebind {
            self.reserved.insert(SmolStr::new(name));
            Ok(())
        } else if self.reserved.insert(SmolStr::new(name)) {
            Ok(())
        } else {
            Err(RegistryError::AlreadyReserved(SmolStr::new(name)))
        }
    }

    /// Validate and record an ordinary variable name, reserving it as well.
    pub fn register_variable(
        &mut self,
        name: &str,
        allow_rebind: bool,
    ) -> Result<(), RegistryError> {
        if !is_valid_identifier(name) {
            return Err(RegistryError::InvalidIdentifier(SmolStr::new(name)));
        }
        if allow_rebind {
            self.variables.insert(SmolStr::new(name));
        } else if !self.variables.insert(SmolStr::new(name)) {
            return Err(RegistryError::DuplicateName(SmolStr::new(name)));
        }
        self.reserve(name, allow_rebind)
    }

    /// Validate and record a static/constant variable name. Always strict:
    /// there is no rebind escape for statics.
    pub fn register_static_variable(&mut self, name: &str) -> Result<(), RegistryError> {
        if !is_valid_identifier(name) {
            return Err(RegistryError::InvalidIdentifier(SmolStr::new(name)));
        }
        if !self.statics.insert(SmolStr::new(name)) {
            return Err(RegistryError::DuplicateName(SmolStr::new(name)));
        }
        self.reserve(name, false)
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn is_static_variable(&self, name: &str) -> bool {
        self.statics.contains(name)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }
}
