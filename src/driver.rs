//! The engine driving per-file processing.
//!
//! For each input file the engine selects a DSL variant, runs its analysis
//! and generation, and hands back the resulting build manifest and file
//! contents. Writing bytes to disk is kept separate so callers (and nested
//! analyses) can merge results before anything lands on the filesystem.

use std::path::Path;

use crate::base::Token;
use crate::dsl::{Dsl, DslDescription, DslKind, DslVariant, FileDescription};
use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::lexer::tokenize;
use crate::targets::TargetsDescription;

/// Everything produced by processing one file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub kind: DslKind,
    pub description: DslDescription,
    pub file: FileDescription,
    pub targets: TargetsDescription,
    pub files: Vec<GeneratedFile>,
}

/// Name of the manifest written next to generated sources.
pub const MANIFEST_FILE: &str = "targets.lst";

#[derive(Debug, Clone, Default)]
pub struct Engine {
    interfaces: Vec<String>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interfaces(interfaces: Vec<String>) -> Self {
        let mut engine = Self::new();
        for name in interfaces {
            engine.set_interface(&name);
        }
        engine
    }

    /// Select an interface for subsequent files.
    pub fn set_interface(&mut self, name: &str) {
        if !self.interfaces.iter().any(|n| n == name) {
            self.interfaces.push(name.to_string());
        }
    }

    /// Process one DSL file: variant selection, analysis, generation.
    pub fn process_file(&self, path: &Path, leading_commands: &[String]) -> Result<ProcessedFile> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io {
            file: path.display().to_string(),
            source: e,
        })?;
        self.process_source(&path.display().to_string(), &source, leading_commands)
    }

    /// Process an in-memory source under the given file name.
    pub fn process_source(
        &self,
        name: &str,
        source: &str,
        leading_commands: &[String],
    ) -> Result<ProcessedFile> {
        let kind = select_dsl_kind(source)?;
        tracing::debug!(file = name, kind = kind.as_str(), "selected DSL variant");
        let mut variant = DslVariant::for_kind(kind);
        variant.set_interfaces(&self.interfaces);
        variant.analyse_source(name, source, leading_commands)?;
        let files = variant.generate_output_files()?;
        Ok(ProcessedFile {
            kind,
            description: variant.description(),
            file: variant.file_description().clone(),
            targets: variant.targets().clone(),
            files,
        })
    }

    /// Write generated files and the build manifest under `directory`.
    ///
    /// Nothing is written when processing failed earlier, so a partial
    /// output tree never exists.
    pub fn write_output(&self, directory: &Path, processed: &ProcessedFile) -> Result<()> {
        let io_error = |file: String| {
            move |e: std::io::Error| Error::Io { file, source: e }
        };
        std::fs::create_dir_all(directory)
            .map_err(io_error(directory.display().to_string()))?;
        for file in &processed.files {
            let path = directory.join(&file.name);
            std::fs::write(&path, &file.contents)
                .map_err(io_error(path.display().to_string()))?;
        }
        let manifest = directory.join(MANIFEST_FILE);
        std::fs::write(&manifest, processed.targets.to_string())
            .map_err(io_error(manifest.display().to_string()))?;
        Ok(())
    }
}

/// Pick the front-end for a source text.
///
/// An explicit `@DSL`/`@Parser` declaration wins; otherwise the file is
/// scanned for discriminating keywords, defaulting to the material-property
/// front-end.
pub fn select_dsl_kind(source: &str) -> Result<DslKind> {
    let tokens = tokenize(source);
    if let Some(kind) = explicit_dsl_declaration(&tokens)? {
        return Ok(kind);
    }
    for token in &tokens {
        match token.text.as_str() {
            "@Behaviour" | "@FlowRule" | "@Integrator" | "@ComputeStress" | "@StateVariable" => {
                return Ok(DslKind::Behaviour);
            }
            "@Model" => return Ok(DslKind::Model),
            _ => {}
        }
    }
    Ok(DslKind::MaterialProperty)
}

fn explicit_dsl_declaration(tokens: &[Token]) -> Result<Option<DslKind>> {
    for (index, token) in tokens.iter().enumerate() {
        if token.text != "@DSL" && token.text != "@Parser" {
            continue;
        }
        let Some(value) = tokens.get(index + 1) else {
            return Err(Error::UnexpectedEndOfInput { line: token.line });
        };
        let kind = match value.text.as_str() {
            "MaterialProperty" | "MaterialLaw" => DslKind::MaterialProperty,
            "Model" => DslKind::Model,
            name if name.contains("Behaviour") || name.starts_with("Isotropic")
                || name == "Default" =>
            {
                DslKind::Behaviour
            }
            other => {
                return Err(Error::UnknownKeyword {
                    keyword: other.to_string(),
                    line: value.line,
                });
            }
        };
        return Ok(Some(kind));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_declaration_wins() {
        assert_eq!(
            select_dsl_kind("@DSL Model;\n@Behaviour X;").unwrap(),
            DslKind::Model
        );
        assert_eq!(
            select_dsl_kind("@Parser MaterialLaw;").unwrap(),
            DslKind::MaterialProperty
        );
        assert_eq!(
            select_dsl_kind("@DSL DefaultBehaviour;").unwrap(),
            DslKind::Behaviour
        );
    }

    #[test]
    fn test_inference_from_keywords() {
        assert_eq!(
            select_dsl_kind("@FlowRule { }").unwrap(),
            DslKind::Behaviour
        );
        assert_eq!(select_dsl_kind("@Model M;").unwrap(), DslKind::Model);
        assert_eq!(
            select_dsl_kind("@Law L;").unwrap(),
            DslKind::MaterialProperty
        );
    }

    #[test]
    fn test_unknown_dsl_name_is_an_error() {
        assert!(select_dsl_kind("@DSL Frobnicator;").is_err());
    }
}
