//! Model front-end: evolution of internal quantities between time steps.

use std::path::Path;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{TokenKind, is_valid_identifier};
use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::targets::TargetsDescription;

use super::block::CodeBlock;
use super::core::{DslCore, FileDescription, VarListOptions};
use super::keywords::KeywordDispatcher;
use super::options::CodeBlockParserOptions;
use super::variables::{StaticVariableDescriptionContainer, VariableDescriptionContainer};
use super::{Dsl, DslDescription, DslKind};

/// Resolved description of a model.
#[derive(Debug, Clone)]
pub struct ModelDescription {
    /// Declared model name (`@Model`).
    pub model: String,
    pub material: String,
    pub library: Option<String>,
    pub inputs: VariableDescriptionContainer,
    pub outputs: VariableDescriptionContainer,
    pub parameters: VariableDescriptionContainer,
    pub parameter_defaults: FxHashMap<SmolStr, f64>,
    pub constant_material_properties: VariableDescriptionContainer,
    pub function: CodeBlock,
    pub material_laws: Vec<String>,
    pub file: FileDescription,
    pub sections: super::core::CommonSections,
    pub static_variables: StaticVariableDescriptionContainer,
    pub link_libraries: Vec<String>,
}

pub struct ModelDsl {
    core: DslCore,
    keywords: KeywordDispatcher<Self>,
    inputs: VariableDescriptionContainer,
    outputs: VariableDescriptionContainer,
    parameters: VariableDescriptionContainer,
    parameter_defaults: FxHashMap<SmolStr, f64>,
    constant_material_properties: VariableDescriptionContainer,
    function: Option<CodeBlock>,
}

impl AsMut<DslCore> for ModelDsl {
    fn as_mut(&mut self) -> &mut DslCore {
        &mut self.core
    }
}

impl ModelDsl {
    pub fn new() -> Self {
        let mut keywords = KeywordDispatcher::new();
        super::register_common_keywords(&mut keywords);
        keywords.register("@Model", Self::treat_model);
        keywords.register("@Input", Self::treat_input);
        keywords.register("@Output", Self::treat_output);
        keywords.register("@Parameter", Self::treat_parameter);
        keywords.register("@ConstantMaterialProperty", Self::treat_constant_material_property);
        keywords.register("@MaterialLaw", |d: &mut Self| d.core.treat_material_law());
        keywords.register("@Function", Self::treat_function);
        Self {
            core: DslCore::new(),
            keywords,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            parameter_defaults: FxHashMap::default(),
            constant_material_properties: Vec::new(),
            function: None,
        }
    }

    fn treat_model(&mut self) -> Result<()> {
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
        let variables = self.core.read_var_list(&VarListOptions {
            type_name: Some("real".to_string()),
            allow_array: true,
            ..VarListOptions::default()
        })?;
        self.inputs.extend(variables);
        Ok(())
    }

    /// Outputs keep their previous value available as `name_1`.
    fn treat_output(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            type_name: Some("real".to_string()),
            allow_array: true,
            ..VarListOptions::default()
        })?;
        for variable in &variables {
            self.core
                .register_variable(&format!("{}_1", variable.name), false)?;
        }
        self.outputs.extend(variables);
        Ok(())
    }

    fn treat_parameter(&mut self) -> Result<()> {
        let parameters = self.core.read_parameter_list(&mut self.parameter_defaults)?;
        self.parameters.extend(parameters);
        Ok(())
    }

    fn treat_constant_material_property(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            type_name: Some("real".to_string()),
            ..VarListOptions::default()
        })?;
        self.constant_material_properties.extend(variables);
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
                expected: "@Model".to_string(),
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

    fn build_description(&self) -> ModelDescription {
        ModelDescription {
            model: self
                .core
                .class_name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            material: self.core.material.clone(),
            library: self.core.library.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            parameters: self.parameters.clone(),
            parameter_defaults: self.parameter_defaults.clone(),
            constant_material_properties: self.constant_material_properties.clone(),
            function: self.function.clone().unwrap_or_default(),
            material_laws: self.core.material_laws.clone(),
            file: self.core.file_description.clone(),
            sections: self.core.sections.clone(),
            static_variables: self.core.static_variables.clone(),
            link_libraries: self.core.link_libraries.clone(),
        }
    }
}

impl Default for ModelDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl Dsl for ModelDsl {
    fn kind(&self) -> DslKind {
        DslKind::Model
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
        DslDescription::Model(self.build_description())
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
