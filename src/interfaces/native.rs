//! The native pass-through generator.
//!
//! Re-emits a resolved description as plain Rust source so the law can be
//! linked into the host simulation directly, with no solver-specific glue.
//! Also the reference implementation of the generator contract: naming,
//! bounds-check companions and manifest contributions of every other
//! backend follow the same scheme.

use std::fmt::Write as _;

use crate::dsl::{
    BehaviourDescription, CodeSectionKind, DslDescription, FileDescription,
    MaterialPropertyDescription, ModelDescription, VariableDescription,
};
use crate::error::Result;
use crate::targets::TargetsDescription;

use super::{GeneratedFile, InterfaceGenerator, library_name_base, material_law_function_name};

pub struct NativeInterface;

impl NativeInterface {
    fn source_file_name(function: &str) -> String {
        format!("{function}-native.rs")
    }

    fn header(file: &FileDescription) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Generated by the native interface from '{}'.", file.file_name);
        if !file.author.is_empty() {
            let _ = writeln!(out, "// author: {}", file.author);
        }
        if !file.date.is_empty() {
            let _ = writeln!(out, "// date: {}", file.date);
        }
        for line in file.description.lines() {
            let _ = writeln!(out, "// {line}");
        }
        out.push_str("#![allow(non_snake_case, non_upper_case_globals, unused)]\n\n");
        out
    }

    fn argument(variable: &VariableDescription) -> String {
        if variable.is_scalar() {
            format!("{}: f64", variable.name)
        } else {
            format!("{}: [f64; {}]", variable.name, variable.array_size)
        }
    }

    fn field(variable: &VariableDescription) -> String {
        if variable.is_scalar() {
            format!("    pub {}: f64,\n", variable.name)
        } else {
            format!("    pub {}: [f64; {}],\n", variable.name, variable.array_size)
        }
    }

    fn static_constants(out: &mut String, d: &[crate::dsl::StaticVariableDescription]) {
        for constant in d {
            if constant.type_name == "int" {
                let _ = writeln!(out, "pub const {}: i64 = {};", constant.name, constant.value as i64);
            } else {
                let _ = writeln!(out, "pub const {}: f64 = {:?};", constant.name, constant.value);
            }
        }
        if !d.is_empty() {
            out.push('\n');
        }
    }

    fn generate_material_property(&self, d: &MaterialPropertyDescription) -> GeneratedFile {
        let function = material_law_function_name(&d.material, &d.law);
        let mut out = Self::header(&d.file);
        if !d.sections.includes.is_empty() {
            out.push_str(&d.sections.includes);
            out.push('\n');
        }
        Self::static_constants(&mut out, &d.static_variables);
        let args: Vec<String> = d.inputs.iter().map(Self::argument).collect();
        let _ = writeln!(out, "pub fn {function}({}) -> f64 {{", args.join(", "));
        for parameter in &d.parameters {
            let value = d
                .parameter_defaults
                .get(&parameter.name)
                .copied()
                .unwrap_or_default();
            let _ = writeln!(out, "    let {}: f64 = {value:?};", parameter.name);
        }
        let _ = writeln!(out, "    let mut {}: f64 = 0.0;", d.output.name);
        out.push_str(&d.function.code);
        out.push('\n');
        let _ = writeln!(out, "    {}", d.output.name);
        out.push_str("}\n\n");
        let _ = writeln!(
            out,
            "pub fn {function}_check_bounds({}) -> i32 {{\n    0\n}}",
            args.join(", ")
        );
        if !d.sections.sources.is_empty() {
            out.push('\n');
            out.push_str(&d.sections.sources);
        }
        GeneratedFile {
            name: Self::source_file_name(&function),
            contents: out,
        }
    }

    fn generate_behaviour(&self, d: &BehaviourDescription) -> GeneratedFile {
        let entry = material_law_function_name(&d.material, &d.class_name);
        let mut out = Self::header(&d.file);
        if !d.sections.includes.is_empty() {
            out.push_str(&d.sections.includes);
            out.push('\n');
        }
        Self::static_constants(&mut out, &d.static_variables);
        let _ = writeln!(out, "pub struct {} {{", d.class_name);
        for variable in &d.material_properties {
            out.push_str(&Self::field(variable));
        }
        for variable in d.state_variables.iter().chain(&d.external_state_variables) {
            out.push_str(&Self::field(variable));
            let mut increment = variable.clone();
            increment.name = format!("d{}", variable.name).into();
            out.push_str(&Self::field(&increment));
        }
        for variable in d.local_variables.iter().chain(&d.parameters) {
            out.push_str(&Self::field(variable));
        }
        out.push_str("}\n\n");
        let _ = writeln!(out, "impl {} {{", d.class_name);
        let _ = writeln!(out, "    pub const theta: f64 = {:?};", d.theta);
        let _ = writeln!(out, "    pub const epsilon: f64 = {:?};", d.epsilon);
        let _ = writeln!(out, "    pub const iterMax: u32 = {};", d.iter_max);
        out.push('\n');
        if !d.sections.members.is_empty() {
            out.push_str(&d.sections.members);
            out.push('\n');
        }
        out.push_str("    pub fn init_local_variables(&mut self) {\n");
        for variable in &d.external_state_variables {
            let _ = writeln!(
                out,
                "        self.{name}_ = self.{name} + Self::theta * self.d{name} ;",
                name = variable.name
            );
        }
        if let Some(block) = d.code_sections.get(&CodeSectionKind::InitLocalVariables) {
            out.push_str(&block.code);
            out.push('\n');
        }
        out.push_str("    }\n\n");
        for (kind, method) in [
            (CodeSectionKind::ComputeStress, "compute_stress"),
            (CodeSectionKind::ComputeFinalStress, "compute_final_stress"),
            (CodeSectionKind::FlowRule, "flow_rule"),
            (CodeSectionKind::Integrator, "integrate"),
        ] {
            if let Some(block) = d.code_sections.get(&kind) {
                let _ = writeln!(out, "    pub fn {method}(&mut self) {{");
                out.push_str(&block.code);
                out.push_str("\n    }\n\n");
            }
        }
        if !d.sections.private_code.is_empty() {
            out.push_str(&d.sections.private_code);
            out.push('\n');
        }
        out.push_str("}\n");
        // The unqualified flow-rule rendering becomes a free function over
        // the variables the block references.
        if let Some(block) = d.code_sections.get(&CodeSectionKind::FlowRuleUnqualified) {
            let args: Vec<String> = block
                .variables
                .iter()
                .map(|name| format!("mut {name}: f64"))
                .collect();
            out.push('\n');
            let _ = writeln!(out, "pub fn {entry}_flow_rule({}) {{", args.join(", "));
            out.push_str(&block.code);
            out.push_str("\n}\n");
        }
        if !d.sections.sources.is_empty() {
            out.push('\n');
            out.push_str(&d.sections.sources);
        }
        GeneratedFile {
            name: Self::source_file_name(&entry),
            contents: out,
        }
    }

    fn generate_model(&self, d: &ModelDescription) -> GeneratedFile {
        let function = material_law_function_name(&d.material, &d.model);
        let mut out = Self::header(&d.file);
        if !d.sections.includes.is_empty() {
            out.push_str(&d.sections.includes);
            out.push('\n');
        }
        Self::static_constants(&mut out, &d.static_variables);
        let mut args: Vec<String> = d
            .outputs
            .iter()
            .map(|v| format!("{}: &mut f64", v.name))
            .collect();
        args.extend(d.inputs.iter().map(Self::argument));
        args.extend(d.constant_material_properties.iter().map(Self::argument));
        let _ = writeln!(out, "pub fn {function}({}) {{", args.join(", "));
        for parameter in &d.parameters {
            let value = d
                .parameter_defaults
                .get(&parameter.name)
                .copied()
                .unwrap_or_default();
            let _ = writeln!(out, "    let {}: f64 = {value:?};", parameter.name);
        }
        out.push_str(&d.function.code);
        out.push_str("\n}\n\n");
        let inputs_only: Vec<String> = d.inputs.iter().map(Self::argument).collect();
        let _ = writeln!(
            out,
            "pub fn {function}_check_bounds({}) -> i32 {{\n    0\n}}",
            inputs_only.join(", ")
        );
        if !d.sections.sources.is_empty() {
            out.push('\n');
            out.push_str(&d.sections.sources);
        }
        GeneratedFile {
            name: Self::source_file_name(&function),
            contents: out,
        }
    }
}

impl InterfaceGenerator for NativeInterface {
    fn name(&self) -> &str {
        "native"
    }

    fn requires_bounds_check(&self) -> bool {
        true
    }

    fn contribute(
        &self,
        targets: &mut TargetsDescription,
        description: &DslDescription,
    ) -> Result<()> {
        match description {
            DslDescription::MaterialProperty(d) => {
                let function = material_law_function_name(&d.material, &d.law);
                let library =
                    library_name_base(d.library.as_deref(), &d.material, "MaterialLaw");
                tracing::debug!(%library, %function, "native contribution");
                let entry = targets.library(&library);
                entry.sources.insert(Self::source_file_name(&function));
                entry.entry_points.insert(function.clone());
                if self.requires_bounds_check() {
                    entry.entry_points.insert(format!("{function}_check_bounds"));
                }
                entry.link_flags.extend(d.link_libraries.iter().cloned());
            }
            DslDescription::Behaviour(d) => {
                let entry_name = material_law_function_name(&d.material, &d.class_name);
                let library = library_name_base(d.library.as_deref(), &d.material, "Behaviour");
                tracing::debug!(%library, %entry_name, "native contribution");
                let entry = targets.library(&library);
                entry.sources.insert(Self::source_file_name(&entry_name));
                entry.entry_points.insert(entry_name);
                entry.link_flags.extend(d.link_libraries.iter().cloned());
            }
            DslDescription::Model(d) => {
                let function = material_law_function_name(&d.material, &d.model);
                let library = library_name_base(d.library.as_deref(), &d.material, "Model");
                tracing::debug!(%library, %function, "native contribution");
                let entry = targets.library(&library);
                entry.sources.insert(Self::source_file_name(&function));
                entry.entry_points.insert(function.clone());
                if self.requires_bounds_check() {
                    entry.entry_points.insert(format!("{function}_check_bounds"));
                }
                entry.link_flags.extend(d.link_libraries.iter().cloned());
            }
        }
        Ok(())
    }

    fn generate(&self, description: &DslDescription) -> Result<Vec<GeneratedFile>> {
        let file = match description {
            DslDescription::MaterialProperty(d) => self.generate_material_property(d),
            DslDescription::Behaviour(d) => self.generate_behaviour(d),
            DslDescription::Model(d) => self.generate_model(d),
        };
        Ok(vec![file])
    }
}
