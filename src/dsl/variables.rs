//! Variable bookkeeping shared by every front-end.

use smol_str::SmolStr;

/// A declared variable: material property, state variable, parameter,
/// input or output field.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescription {
    pub type_name: String,
    pub name: SmolStr,
    /// Resolved array size; scalars have size 1.
    pub array_size: u32,
    /// Declaration line in the DSL source.
    pub line: u32,
    pub description: Option<String>,
}

impl VariableDescription {
    pub fn new(type_name: impl Into<String>, name: impl Into<SmolStr>, array_size: u32, line: u32) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            array_size,
            line,
            description: None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.array_size == 1
    }
}

pub type VariableDescriptionContainer = Vec<VariableDescription>;

/// A static/constant variable with its resolved value.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticVariableDescription {
    pub type_name: String,
    pub name: SmolStr,
    pub line: u32,
    pub value: f64,
}

pub type StaticVariableDescriptionContainer = Vec<StaticVariableDescription>;
