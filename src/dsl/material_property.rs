//! Material-property front-end: point-wise laws `y = f(x…)`.

use std::path::Path;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{TokenKind, is_valid_identifier};
use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::targets::TargetsDescription;

use super::block::CodeBlock;
use super::core::{CommonSections, DslCore, FileDescription, VarListOptions};
use super::keywords::KeywordDispatcher;
use super::options::CodeBlockParserOptions;
use super::variables::{
    StaticVariableDescriptionContainer, VariableDescription, VariableDescriptionContainer,
};
use super::{Dsl, DslDescription, DslKind};

/// Resolved description of a material-property law.
#[derive(Debug, Clone)]
pub struct MaterialPropertyDescription {
    /// Declared law name (`@Law`).
    pub law: String,
    pub material: String,
    pub library: Option<String>,
    pub inputs: VariableDescriptionContainer,
    pub output: VariableDescription,
    pub parameters: VariableDescriptionContainer,
    pub parameter_defaults: FxHashMap<SmolStr, f64>,
    pub function: CodeBlock,
    pub file: FileDescription,
    pub sections: CommonSections,
    pub static_variables: StaticVariableDescriptionContainer,
    pub link_libraries: Vec<String>,
}

pub struct MaterialPropertyDsl {
    core: DslCore,
    keywords: KeywordDispatcher<Self>,
    inputs: VariableDescriptionContainer,
    output: Option<VariableDescription>,
    parameters: VariableDescriptionContainer,
    parameter_defaults: FxHashMap<SmolStr, f64>,
    function: Option<CodeBlock>,
}

impl AsMut<DslCore> for MaterialPropertyDsl {
    fn as_mut(&mut self) -> &mut DslCore {
        &mut self.core
    }
}

impl MaterialPropertyDsl {
    pub fn new() -> Self {
        let mut keywords = KeywordDispatcher::new();
        super::register_common_keywords(&mut keywords);
        keywords.register("@Law", Self::treat_law);
        keywords.register("@Input", Self::treat_input);
        keywords.register("@Output", Self::treat_output);
        keywords.register("@Parameter", Self::treat_parameter);
        keywords.register("@Constant", Self::treat_constant);
        keywords.register("@Function", Self::treat_function);
        Self {
            core: DslCore::new(),
            keywords,
            inputs: Vec::new(),
            output: None,
            parameters: Vec::new(),
            parameter_defaults: FxHashMap::default(),
            function: None,
        }
    }

    fn treat_law(&mut self) -> Result<()> {
        let line = self.core.current_line();
        let name = self.core.read_only_one_token()?;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            });
        }
        if self.core.class_name.is_some() {
            return Err(Error::DuplicateName {
                name: name.to_string(),
                line,
            });
        }
        self.core.reserve(&name, false)?;
        self.core.class_name = Some(name);
        Ok(())
    }

    fn treat_input(&mut self) -> Result<()> {
        let inputs = self.core.read_var_list(&VarListOptions {
            type_name: Some("real".to_string()),
            ..VarListOptions::default()
        })?;
        self.inputs.extend(inputs);
        Ok(())
    }

    fn treat_output(&mut self) -> Result<()> {
        let line = self.core.current_line();
        let name = self.core.read_only_one_token()?;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            });
        }
        if self.output.is_some() {
            return Err(Error::DuplicateName {
                name: name.to_string(),
                line,
            });
        }
        self.core.register_variable(&name, false)?;
        self.output = Some(VariableDescription::new("real", name, 1, line));
        Ok(())
    }

    fn treat_parameter(&mut self) -> Result<()> {
        let parameters = self.core.read_parameter_list(&mut self.parameter_defaults)?;
        self.parameters.extend(parameters);
        Ok(())
    }

    /// `@Constant A 1.5e-3;` — a named real constant, owned by the law type.
    fn treat_constant(&mut self) -> Result<()> {
        let token = self.core.current()?;
        let name = token.text.clone();
        let line = token.line;
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                name: name.to_string(),
                line,
            });
        }
        self.core.advance();
        let value = self.core.read_initialisation_value()?;
        self.core.read_specified_token(";")?;
        self.core.register_static_variable(&name)?;
        self.core
            .static_variables
            .push(super::variables::StaticVariableDescription {
                type_name: "real".to_string(),
                name,
                line,
                value,
            });
        Ok(())
    }

    fn treat_function(&mut self) -> Result<()> {
        let line = self.core.current_line();
        if self.function.is_some() {
            return Err(Error::DuplicateName {
                name: "@Function".to_string(),
                line,
            });
        }
        // The output variable must be assignable inside the body.
        if self.output.is_none() {
            self.core.register_variable("res", false)?;
            self.output = Some(VariableDescription::new("real", "res", 1, line));
        }
        let options = CodeBlockParserOptions {
            token_observer: Some(super::sigil_guard()),
            ..CodeBlockParserOptions::default()
        };
        self.function = Some(self.core.read_block(&options)?);
        Ok(())
    }

    fn analyse(&mut self) -> Result<()> {
        while let Some(token) = self.core.peek() {
            if token.kind == TokenKind::Comment {
                self.core.advance();
                continue;
            }
            let keyword = token.text.clone();
            let line = token.line;
            let comment = token.comment.clone();
            self.core.current_comment = comment;
            let Some(handler) = self.keywords.get(&keyword) else {
                return Err(Error::UnknownKeyword {
                    keyword: keyword.to_string(),
                    line,
                });
            };
            tracing::trace!(keyword = %keyword, line, "treating keyword");
            self.core.advance();
            handler(self)?;
        }
        self.finalize()
    }

    fn finalize(&mut self) -> Result<()> {
        let line = self.core.current_line();
        if self.core.class_name.is_none() {
            return Err(Error::ExpectedToken {
                expected: "@Law".to_string(),
                found: "end of file".to_string(),
                line,
            });
        }
        if self.function.is_none() {
            return Err(Error::ExpectedToken {
                expected: "@Function".to_string(),
                found: "end of file".to_string(),
                line,
            });
        }
        Ok(())
    }

    fn build_description(&self) -> MaterialPropertyDescription {
        MaterialPropertyDescription {
            law: self
                .core
                .class_name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            material: self.core.material.clone(),
            library: self.core.library.clone(),
            inputs: self.inputs.clone(),
            output: self
                .output
                .clone()
                .unwrap_or_else(|| VariableDescription::new("real", "res", 1, 0)),
            parameters: self.parameters.clone(),
            parameter_defaults: self.parameter_defaults.clone(),
            function: self.function.clone().unwrap_or_default(),
            file: self.core.file_description.clone(),
            sections: self.core.sections.clone(),
            static_variables: self.core.static_variables.clone(),
            link_libraries: self.core.link_libraries.clone(),
        }
    }
}

impl Default for MaterialPropertyDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl Dsl for MaterialPropertyDsl {
    fn kind(&self) -> DslKind {
        DslKind::MaterialProperty
    }

    fn analyse_file(&mut self, path: &Path, leading_commands: &[String]) -> Result<()> {
        self.core.read_file(path, leading_commands)?;
        self.analyse()
    }

    fn analyse_source(
        &mut self,
        name: &str,
        source: &str,
        leading_commands: &[String],
    ) -> Result<()> {
        self.core.load_source(name, source, leading_commands);
        self.analyse()
    }

    fn generate_output_files(&mut self) -> Result<Vec<GeneratedFile>> {
        let description = self.description();
        super::run_interfaces(&mut self.core, &description)
    }

    fn description(&self) -> DslDescription {
        DslDescription::MaterialProperty(self.build_description())
    }

    fn targets(&self) -> &TargetsDescription {
        &self.core.targets
    }

    fn file_description(&self) -> &FileDescription {
        &self.core.file_description
    }

    fn set_interfaces(&mut self, names: &[String]) {
        for name in names {
            if !self.core.interfaces.contains(name) {
                self.core.interfaces.push(name.clone());
            }
        }
    }

    fn keywords(&self) -> Vec<String> {
        self.keywords.keywords()
    }
}
