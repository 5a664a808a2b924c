//! Backend code generators.
//!
//! An interface generator turns a resolved description object into
//! target-specific source text and contributes the resulting build
//! artifacts to the shared [`TargetsDescription`]. Generators never own the
//! manifest; they mutate the one passed to them for the duration of
//! generation. The crate ships the `native` pass-through generator; solver
//! backends plug in behind the same trait.

mod native;

pub use native::NativeInterface;

use crate::dsl::DslDescription;
use crate::error::Result;
use crate::targets::TargetsDescription;

/// A file rendered by a generator. Byte-writing is the driver's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

pub trait InterfaceGenerator {
    fn name(&self) -> &str;

    /// Whether this backend emits a bounds-check companion entry point for
    /// every generated function.
    fn requires_bounds_check(&self) -> bool {
        false
    }

    /// Record this backend's build artifacts into the manifest.
    fn contribute(
        &self,
        targets: &mut TargetsDescription,
        description: &DslDescription,
    ) -> Result<()>;

    /// Render this backend's output files.
    fn generate(&self, description: &DslDescription) -> Result<Vec<GeneratedFile>>;
}

/// Look up a generator by name.
pub fn get(name: &str) -> Option<Box<dyn InterfaceGenerator>> {
    match name {
        "native" => Some(Box::new(NativeInterface)),
        _ => None,
    }
}

/// Interfaces used when none were selected explicitly.
pub fn default_interfaces() -> Vec<String> {
    vec!["native".to_string()]
}

/// Deterministic function name for a material-property law: the declared
/// name alone, or `material_name` when a material is given.
pub fn material_law_function_name(material: &str, law: &str) -> String {
    if material.is_empty() {
        law.to_string()
    } else {
        format!("{material}_{law}")
    }
}

/// Logical library a set of artifacts lands in: the explicit library name,
/// else the material, else `fallback`.
pub fn library_name_base(library: Option<&str>, material: &str, fallback: &str) -> String {
    match library {
        Some(name) if !name.is_empty() => name.to_string(),
        _ if !material.is_empty() => material.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_naming() {
        assert_eq!(material_law_function_name("", "YoungModulus"), "YoungModulus");
        assert_eq!(
            material_law_function_name("Inconel", "YoungModulus"),
            "Inconel_YoungModulus"
        );
    }

    #[test]
    fn test_library_naming() {
        assert_eq!(library_name_base(None, "", "MaterialLaw"), "MaterialLaw");
        assert_eq!(library_name_base(None, "Inconel", "MaterialLaw"), "Inconel");
        assert_eq!(
            library_name_base(Some("libAlloys"), "Inconel", "MaterialLaw"),
            "libAlloys"
        );
    }

    #[test]
    fn test_registry_lookup() {
        assert!(get("native").is_some());
        assert!(get("no-such-backend").is_none());
    }
}
