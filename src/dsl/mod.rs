//! DSL front-ends.
//!
//! Three variants share the parsing and rewriting machinery but produce
//! different description objects: material properties (point-wise laws),
//! behaviours (integration of a constitutive law over a time step) and
//! models (evolution of internal quantities). Shared logic lives in
//! [`DslCore`] and is composed, not inherited; each variant owns its
//! keyword table and dispatches through the [`Dsl`] capability trait.

pub mod block;
pub mod core;
pub mod eval;
pub mod keywords;
pub mod options;
pub mod registry;
pub mod variables;

mod behaviour;
mod material_property;
mod model;

use std::path::Path;

pub use behaviour::{BehaviourDescription, BehaviourDsl, CodeSectionKind};
pub use block::CodeBlock;
pub use self::core::{CommonSections, DslCore, FileDescription, VarListOptions};
pub use keywords::{KeywordDispatcher, KeywordHandler};
pub use material_property::{MaterialPropertyDescription, MaterialPropertyDsl};
pub use model::{ModelDescription, ModelDsl};
pub use options::CodeBlockParserOptions;
pub use registry::NameRegistry;
pub use variables::{
    StaticVariableDescription, StaticVariableDescriptionContainer, VariableDescription,
    VariableDescriptionContainer,
};

use crate::error::{Error, Result};
use crate::interfaces::GeneratedFile;
use crate::targets::TargetsDescription;

/// The front-end flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DslKind {
    MaterialProperty,
    Behaviour,
    Model,
}

impl DslKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DslKind::MaterialProperty => "material property",
            DslKind::Behaviour => "behaviour",
            DslKind::Model => "model",
        }
    }
}

/// A resolved description object, handed to interface generators.
#[derive(Debug, Clone)]
pub enum DslDescription {
    MaterialProperty(MaterialPropertyDescription),
    Behaviour(BehaviourDescription),
    Model(ModelDescription),
}

/// Capability set shared by every front-end variant.
pub trait Dsl {
    fn kind(&self) -> DslKind;

    /// Analyse a file, with `leading_commands` logically prepended to its
    /// token stream in the order given.
    fn analyse_file(&mut self, path: &Path, leading_commands: &[String]) -> Result<()>;

    /// Analyse an in-memory source under the given file name.
    fn analyse_source(&mut self, name: &str, source: &str, leading_commands: &[String])
    -> Result<()>;

    /// Run the selected interface generators. Must be called after a
    /// successful analysis; mutates the targets manifest and returns the
    /// generated file contents.
    fn generate_output_files(&mut self) -> Result<Vec<GeneratedFile>>;

    /// The resolved description object.
    fn description(&self) -> DslDescription;

    fn targets(&self) -> &TargetsDescription;

    fn file_description(&self) -> &FileDescription;

    fn set_interfaces(&mut self, names: &[String]);

    /// The keywords this variant currently accepts.
    fn keywords(&self) -> Vec<String>;
}

/// Closed sum over the concrete front-ends, so drivers can hold "some DSL"
/// without dynamic dispatch.
pub enum DslVariant {
    MaterialProperty(MaterialPropertyDsl),
    Behaviour(BehaviourDsl),
    Model(ModelDsl),
}

impl DslVariant {
    pub fn for_kind(kind: DslKind) -> Self {
        match kind {
            DslKind::MaterialProperty => {
                DslVariant::MaterialProperty(MaterialPropertyDsl::new())
            }
            DslKind::Behaviour => DslVariant::Behaviour(BehaviourDsl::new()),
            DslKind::Model => DslVariant::Model(ModelDsl::new()),
        }
    }

    fn inner(&self) -> &dyn Dsl {
        match self {
            DslVariant::MaterialProperty(dsl) => dsl,
            DslVariant::Behaviour(dsl) => dsl,
            DslVariant::Model(dsl) => dsl,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Dsl {
        match self {
            DslVariant::MaterialProperty(dsl) => dsl,
            DslVariant::Behaviour(dsl) => dsl,
            DslVariant::Model(dsl) => dsl,
        }
    }
}

impl Dsl for DslVariant {
    fn kind(&self) -> DslKind {
        self.inner().kind()
    }

    fn analyse_file(&mut self, path: &Path, leading_commands: &[String]) -> Result<()> {
        self.inner_mut().analyse_file(path, leading_commands)
    }

    fn analyse_source(
        &mut self,
        name: &str,
        source: &str,
        leading_commands: &[String],
    ) -> Result<()> {
        self.inner_mut().analyse_source(name, source, leading_commands)
    }

    fn generate_output_files(&mut self) -> Result<Vec<GeneratedFile>> {
        self.inner_mut().generate_output_files()
    }

    fn description(&self) -> DslDescription {
        self.inner().description()
    }

    fn targets(&self) -> &TargetsDescription {
        self.inner().targets()
    }

    fn file_description(&self) -> &FileDescription {
        self.inner().file_description()
    }

    fn set_interfaces(&mut self, names: &[String]) {
        self.inner_mut().set_interfaces(names)
    }

    fn keywords(&self) -> Vec<String> {
        self.inner().keywords()
    }
}

/// Register the keyword set every variant accepts.
pub(crate) fn register_common_keywords<D: AsMut<DslCore>>(dispatcher: &mut KeywordDispatcher<D>) {
    dispatcher.register("@Author", |d: &mut D| d.as_mut().treat_author());
    dispatcher.register("@Date", |d: &mut D| d.as_mut().treat_date());
    dispatcher.register("@Description", |d: &mut D| d.as_mut().treat_description());
    dispatcher.register("@DSL", |d: &mut D| d.as_mut().treat_dsl());
    dispatcher.register("@Parser", |d: &mut D| d.as_mut().treat_dsl());
    dispatcher.register("@Material", |d: &mut D| d.as_mut().treat_material());
    dispatcher.register("@Library", |d: &mut D| d.as_mut().treat_library());
    dispatcher.register("@Includes", |d: &mut D| d.as_mut().treat_includes());
    dispatcher.register("@Sources", |d: &mut D| d.as_mut().treat_sources());
    dispatcher.register("@Members", |d: &mut D| d.as_mut().treat_members());
    dispatcher.register("@Private", |d: &mut D| d.as_mut().treat_private());
    dispatcher.register("@StaticVariable", |d: &mut D| d.as_mut().treat_static_variable());
    dispatcher.register("@StaticVar", |d: &mut D| d.as_mut().treat_static_variable());
    dispatcher.register("@IntegerConstant", |d: &mut D| {
        d.as_mut().treat_integer_constant()
    });
    dispatcher.register("@Link", |d: &mut D| d.as_mut().treat_link());
    dispatcher.register("@Import", |d: &mut D| d.as_mut().treat_import());
}

/// Run the selected interfaces over a resolved description: each one first
/// records its build artifacts into the shared manifest, then renders its
/// files. Files produced by nested analyses are carried through.
pub(crate) fn run_interfaces(
    core: &mut DslCore,
    description: &DslDescription,
) -> Result<Vec<GeneratedFile>> {
    let names = if core.interfaces.is_empty() {
        crate::interfaces::default_interfaces()
    } else {
        core.interfaces.clone()
    };
    let mut files = std::mem::take(&mut core.nested_files);
    for name in &names {
        let generator = crate::interfaces::get(name).ok_or_else(|| Error::Backend {
            interface: name.clone(),
            message: "unknown interface".to_string(),
        })?;
        tracing::debug!(interface = %name, "running interface generator");
        generator.contribute(&mut core.targets, description)?;
        files.extend(generator.generate(description)?);
    }
    Ok(files)
}

/// Token observer rejecting sigil-prefixed words inside code blocks:
/// keywords are only legal at keyword position.
pub(crate) fn sigil_guard() -> options::TokenObserver {
    Box::new(|token| {
        if token.text.starts_with('@') {
            Err(Error::MisplacedKeyword {
                keyword: token.text.to_string(),
                line: token.line,
            })
        } else {
            Ok(())
        }
    })
}
