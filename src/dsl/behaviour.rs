//! Behaviour front-end: integration of a constitutive law over a time step.

use std::path::Path;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::{TokenKind, is_valid_identifier};
use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::targets::TargetsDescription;

use super::block::CodeBlock;
use super::core::{DslCore, FileDescription, VarListOptions};
use super::keywords::KeywordDispatcher;
use super::options::{CodeBlockParserOptions, VariableModifier};
use super::variables::{
    StaticVariableDescriptionContainer, VariableDescription, VariableDescriptionContainer,
};
use super::{Dsl, DslDescription, DslKind};

/// Named code sections a behaviour may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSectionKind {
    FlowRule,
    /// The flow-rule body rendered without member qualification, emitted as
    /// a free function by backends that need one.
    FlowRuleUnqualified,
    Integrator,
    ComputeStress,
    /// Stress at the end of the time step, rendered from the same block as
    /// `ComputeStress` but without time interpolation.
    ComputeFinalStress,
    InitLocalVariables,
}

impl CodeSectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeSectionKind::FlowRule => "FlowRule",
            CodeSectionKind::FlowRuleUnqualified => "FlowRuleUnqualified",
            CodeSectionKind::Integrator => "Integrator",
            CodeSectionKind::ComputeStress => "ComputeStress",
            CodeSectionKind::ComputeFinalStress => "ComputeFinalStress",
            CodeSectionKind::InitLocalVariables => "InitLocalVariables",
        }
    }
}

/// Resolved description of a behaviour.
#[derive(Debug, Clone)]
pub struct BehaviourDescription {
    /// Declared behaviour name (`@Behaviour`).
    pub class_name: String,
    pub material: String,
    pub library: Option<String>,
    pub material_properties: VariableDescriptionContainer,
    pub state_variables: VariableDescriptionContainer,
    pub external_state_variables: VariableDescriptionContainer,
    pub local_variables: VariableDescriptionContainer,
    pub parameters: VariableDescriptionContainer,
    pub parameter_defaults: FxHashMap<SmolStr, f64>,
    pub code_sections: IndexMap<CodeSectionKind, CodeBlock>,
    /// Time-interpolation coefficient.
    pub theta: f64,
    /// Convergence criterion of the local integration.
    pub epsilon: f64,
    pub iter_max: u32,
    pub requires_stiffness_tensor: bool,
    pub material_laws: Vec<String>,
    pub file: FileDescription,
    pub sections: super::core::CommonSections,
    pub static_variables: StaticVariableDescriptionContainer,
    pub link_libraries: Vec<String>,
}

pub struct BehaviourDsl {
    core: DslCore,
    keywords: KeywordDispatcher<Self>,
    material_properties: VariableDescriptionContainer,
    state_variables: VariableDescriptionContainer,
    external_state_variables: VariableDescriptionContainer,
    local_variables: VariableDescriptionContainer,
    parameters: VariableDescriptionContainer,
    parameter_defaults: FxHashMap<SmolStr, f64>,
    code_sections: IndexMap<CodeSectionKind, CodeBlock>,
    theta: f64,
    epsilon: f64,
    iter_max: u32,
    requires_stiffness_tensor: bool,
}

impl AsMut<DslCore> for BehaviourDsl {
    fn as_mut(&mut self) -> &mut DslCore {
        &mut self.core
    }
}

impl BehaviourDsl {
    pub fn new() -> Self {
        let mut keywords = KeywordDispatcher::new();
        super::register_common_keywords(&mut keywords);
        keywords.register("@Behaviour", Self::treat_behaviour);
        keywords.register("@MaterialProperty", Self::treat_material_property);
        keywords.register("@StateVariable", Self::treat_state_variable);
        keywords.register("@ExternalStateVariable", Self::treat_external_state_variable);
        keywords.register("@LocalVariable", Self::treat_local_variable);
        keywords.register("@Parameter", Self::treat_parameter);
        keywords.register("@MaterialLaw", |d: &mut Self| d.core.treat_material_law());
        keywords.register("@FlowRule", Self::treat_flow_rule);
        keywords.register("@Integrator", Self::treat_integrator);
        keywords.register("@ComputeStress", Self::treat_compute_stress);
        keywords.register("@InitLocalVariables", Self::treat_init_local_variables);
        keywords.register("@Theta", Self::treat_theta);
        keywords.register("@Epsilon", Self::treat_epsilon);
        keywords.register("@IterMax", Self::treat_iter_max);
        keywords.register("@RequireStiffnessTensor", Self::treat_require_stiffness_tensor);

        let mut core = DslCore::new();
        // Main variables of a small-strain behaviour: total strain, its
        // increment over the step, and the stress.
        for name in ["eto", "deto", "sig"] {
            core.registry
                .register_variable(name, false)
                .expect("fresh registry");
        }
        // Temperature is always available as an external state variable.
        for name in ["T", "dT", "T_"] {
            core.registry
                .register_variable(name, false)
                .expect("fresh registry");
        }
        for name in ["theta", "epsilon", "iterMax", "NewtonIntegration"] {
            core.registry.reserve(name, false).expect("fresh registry");
        }

        Self {
            core,
            keywords,
            material_properties: Vec::new(),
            state_variables: Vec::new(),
            external_state_variables: vec![VariableDescription::new("temperature", "T", 1, 0)],
            local_variables: vec![VariableDescription::new("temperature", "T_", 1, 0)],
            parameters: Vec::new(),
            parameter_defaults: FxHashMap::default(),
            code_sections: IndexMap::new(),
            theta: 0.5,
            epsilon: 1e-8,
            iter_max: 100,
            requires_stiffness_tensor: false,
        }
    }

    fn treat_behaviour(&mut self) -> Result<()> {
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

    fn treat_material_property(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            allow_array: true,
            ..VarListOptions::default()
        })?;
        self.material_properties.extend(variables);
        Ok(())
    }

    fn treat_state_variable(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            allow_array: true,
            add_increment: true,
            ..VarListOptions::default()
        })?;
        self.state_variables.extend(variables);
        Ok(())
    }

    /// External state variables also get a registered `name_` companion
    /// holding the value interpolated at `theta` inside the time step.
    fn treat_external_state_variable(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            allow_array: true,
            add_increment: true,
            ..VarListOptions::default()
        })?;
        for variable in &variables {
            let interpolated = format!("{}_", variable.name);
            self.core.register_variable(&interpolated, false)?;
            self.local_variables.push(VariableDescription::new(
                variable.type_name.clone(),
                interpolated,
                variable.array_size,
                variable.line,
            ));
        }
        self.external_state_variables.extend(variables);
        Ok(())
    }

    fn treat_local_variable(&mut self) -> Result<()> {
        let variables = self.core.read_var_list(&VarListOptions {
            allow_array: true,
            ..VarListOptions::default()
        })?;
        self.local_variables.extend(variables);
        Ok(())
    }

    fn treat_parameter(&mut self) -> Result<()> {
        let parameters = self.core.read_parameter_list(&mut self.parameter_defaults)?;
        self.parameters.extend(parameters);
        Ok(())
    }

    fn treat_theta(&mut self) -> Result<()> {
        let line = self.core.current_line();
        let value = self.core.read_double()?;
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::ExpectedToken {
                expected: "a theta value in [0,1]".to_string(),
                found: value.to_string(),
                line,
            });
        }
        self.core.read_specified_token(";")?;
        self.theta = value;
        Ok(())
    }

    fn treat_epsilon(&mut self) -> Result<()> {
        let line = self.core.current_line();
        let value = self.core.read_double()?;
        if value < 0.0 {
            return Err(Error::ExpectedToken {
                expected: "a positive epsilon value".to_string(),
                found: value.to_string(),
                line,
            });
        }
        self.core.read_specified_token(";")?;
        self.epsilon = value;
        Ok(())
    }

    fn treat_iter_max(&mut self) -> Result<()> {
        let line = self.core.current_line();
        let value = self.core.read_unsigned()?;
        if value == 0 {
            return Err(Error::ExpectedToken {
                expected: "a non-zero iteration count".to_string(),
                found: "0".to_string(),
                line,
            });
        }
        self.core.read_specified_token(";")?;
        self.iter_max = value;
        Ok(())
    }

    fn treat_require_stiffness_tensor(&mut self) -> Result<()> {
        let explicit = matches!(self.core.current()?.text.as_str(), "true" | "false");
        self.requires_stiffness_tensor = if explicit { self.core.read_boolean()? } else { true };
        self.core.read_specified_token(";")?;
        Ok(())
    }

    /// Variables interpolated at `theta` inside the time step: the
    /// temperature and every (external) state variable.
    fn interpolated_names(&self) -> FxHashSet<SmolStr> {
        let mut names: FxHashSet<SmolStr> = FxHashSet::default();
        names.insert(SmolStr::new_static("T"));
        for variable in self.state_variables.iter().chain(&self.external_state_variables) {
            names.insert(variable.name.clone());
        }
        names
    }

    /// Rewrite interpolated quantities to their `name_` companion,
    /// qualifying with `self.` when requested.
    fn interpolation_modifier(&self) -> VariableModifier {
        let interpolated = self.interpolated_names();
        Box::new(move |name, add_self| {
            let suffix = if interpolated.contains(name) { "_" } else { "" };
            if add_self {
                format!("self.{name}{suffix}")
            } else {
                format!("{name}{suffix}")
            }
        })
    }

    fn section_options(&self, qualify: bool, modifier: Option<VariableModifier>) -> CodeBlockParserOptions {
        CodeBlockParserOptions {
            qualify_static: qualify,
            qualify_members: qualify,
            static_qualifier: self.core.class_name.clone(),
            variable_modifier: modifier,
            token_observer: Some(super::sigil_guard()),
            ..CodeBlockParserOptions::default()
        }
    }

    fn store_section(&mut self, kind: CodeSectionKind, block: CodeBlock) -> Result<()> {
        if self.code_sections.insert(kind, block).is_some() {
            return Err(Error::DuplicateName {
                name: kind.as_str().to_string(),
                line: self.core.current_line(),
            });
        }
        Ok(())
    }

    /// The flow rule fixes the integration scheme, so an explicit
    /// `@Integrator` becomes meaningless afterwards (and vice versa). The
    /// body is rendered twice through cursor replay: once qualified for the
    /// behaviour type, once bare for free-function emission.
    fn treat_flow_rule(&mut self) -> Result<()> {
        let qualified = self.section_options(true, Some(self.interpolation_modifier()));
        let raw = self.section_options(false, Some(self.interpolation_modifier()));
        let (main, unqualified) = self.core.read_block_pair(&qualified, &raw)?;
        self.store_section(CodeSectionKind::FlowRule, main)?;
        self.store_section(CodeSectionKind::FlowRuleUnqualified, unqualified)?;
        self.keywords.disable("@Integrator");
        Ok(())
    }

    fn treat_integrator(&mut self) -> Result<()> {
        let options = self.section_options(true, None);
        let block = self.core.read_block(&options)?;
        self.store_section(CodeSectionKind::Integrator, block)?;
        self.keywords.disable("@FlowRule");
        Ok(())
    }

    /// One block, two renderings: the mid-step stress (interpolated
    /// quantities) and the end-of-step stress (final quantities).
    fn treat_compute_stress(&mut self) -> Result<()> {
        let mid_step = self.section_options(true, Some(self.interpolation_modifier()));
        let final_step = self.section_options(true, None);
        let (mid, fin) = self.core.read_block_pair(&mid_step, &final_step)?;
        self.store_section(CodeSectionKind::ComputeStress, mid)?;
        self.store_section(CodeSectionKind::ComputeFinalStress, fin)?;
        Ok(())
    }

    fn treat_init_local_variables(&mut self) -> Result<()> {
        let options = self.section_options(true, None);
        let block = self.core.read_block(&options)?;
        self.store_section(CodeSectionKind::InitLocalVariables, block)
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
                expected: "@Behaviour".to_string(),
                found: "end of file".to_string(),
                line,
            });
        }
        // Integration parameters become ordinary parameters with their
        // current values unless the user already declared them.
        for (name, value) in [
            ("theta", self.theta),
            ("epsilon", self.epsilon),
            ("iterMax", self.iter_max as f64),
        ] {
            if !self.parameters.iter().any(|p| p.name == name) {
                self.parameters
                    .push(VariableDescription::new("real", name, 1, 0));
                self.parameter_defaults.insert(SmolStr::new(name), value);
            }
        }
        Ok(())
    }

    fn build_description(&self) -> BehaviourDescription {
        BehaviourDescription {
            class_name: self
                .core
                .class_name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            material: self.core.material.clone(),
            library: self.core.library.clone(),
            material_properties: self.material_properties.clone(),
            state_variables: self.state_variables.clone(),
            external_state_variables: self.external_state_variables.clone(),
            local_variables: self.local_variables.clone(),
            parameters: self.parameters.clone(),
            parameter_defaults: self.parameter_defaults.clone(),
            code_sections: self.code_sections.clone(),
            theta: self.theta,
            epsilon: self.epsilon,
            iter_max: self.iter_max,
            requires_stiffness_tensor: self.requires_stiffness_tensor,
            material_laws: self.core.material_laws.clone(),
            file: self.core.file_description.clone(),
            sections: self.core.sections.clone(),
            static_variables: self.core.static_variables.clone(),
            link_libraries: self.core.link_libraries.clone(),
        }
    }
}

impl Default for BehaviourDsl {
    fn default() -> Self {
        Self::new()
    }
}

impl Dsl for BehaviourDsl {
    fn kind(&self) -> DslKind {
        DslKind::Behaviour
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
        DslDescription::Behaviour(self.build_description())
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
