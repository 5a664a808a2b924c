//! Material-property front-end: analysis and native generation.

use matforge::Error;
use matforge::dsl::{Dsl, DslDescription, DslKind, MaterialPropertyDsl};

const CONDUCTIVITY: &str = r#"
@DSL MaterialLaw;
@Law ThermalConductivity;
@Material VanadiumAlloy;
@Author Keller;
@Description {
  Thermal conductivity as a function of temperature.
}
@Input T;
@Output k;
@Parameter A = 7.8e-2, B = 1.2e-2;
@Constant Tref 293.15;
@Function {
  k = A + B * ( T / Tref ) ;
}
"#;

fn analyse(source: &str) -> MaterialPropertyDsl {
    let mut dsl = MaterialPropertyDsl::new();
    dsl.analyse_source("ThermalConductivity.mfront", source, &[])
        .unwrap();
    dsl
}

#[test]
fn test_analysis_fills_description() {
    let dsl = analyse(CONDUCTIVITY);
    let DslDescription::MaterialProperty(d) = dsl.description() else {
        panic!("wrong description kind");
    };
    assert_eq!(dsl.kind(), DslKind::MaterialProperty);
    assert_eq!(d.law, "ThermalConductivity");
    assert_eq!(d.material, "VanadiumAlloy");
    assert_eq!(d.inputs.len(), 1);
    assert_eq!(d.inputs[0].name, "T");
    assert_eq!(d.output.name, "k");
    assert_eq!(d.parameters.len(), 2);
    assert_eq!(d.parameter_defaults["A"], 7.8e-2);
    assert_eq!(d.static_variables.len(), 1);
    assert_eq!(d.static_variables[0].name, "Tref");
    assert_eq!(d.file.author, "Keller");
    assert!(d.file.description.contains("Thermal conductivity"));
}

#[test]
fn test_function_block_records_references() {
    let dsl = analyse(CONDUCTIVITY);
    let DslDescription::MaterialProperty(d) = dsl.description() else {
        panic!("wrong description kind");
    };
    for name in ["k", "A", "B", "T"] {
        assert!(d.function.variables.contains(name), "missing '{name}'");
    }
    assert!(d.function.static_variables.contains("Tref"));
    // No qualification in a free-function body.
    assert!(d.function.code.contains("Tref"));
    assert!(!d.function.code.contains("self."));
}

#[test]
fn test_native_generation_and_contribution() {
    let mut dsl = analyse(CONDUCTIVITY);
    let files = dsl.generate_output_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "VanadiumAlloy_ThermalConductivity-native.rs");
    assert!(files[0]
        .contents
        .contains("pub fn VanadiumAlloy_ThermalConductivity"));
    assert!(files[0]
        .contents
        .contains("pub fn VanadiumAlloy_ThermalConductivity_check_bounds"));

    let library = dsl.targets().get_library("VanadiumAlloy").unwrap();
    assert!(library
        .sources
        .contains("VanadiumAlloy_ThermalConductivity-native.rs"));
    assert!(library
        .entry_points
        .contains("VanadiumAlloy_ThermalConductivity"));
    assert!(library
        .entry_points
        .contains("VanadiumAlloy_ThermalConductivity_check_bounds"));
}

#[test]
fn test_law_without_material_uses_bare_name() {
    let source = "@Law YoungModulus;\n@Function { res = 150.e9 ; }";
    let mut dsl = analyse(source);
    let files = dsl.generate_output_files().unwrap();
    assert_eq!(files[0].name, "YoungModulus-native.rs");
    assert!(dsl.targets().get_library("MaterialLaw").is_some());
}

#[test]
fn test_duplicate_input_fails() {
    let mut dsl = MaterialPropertyDsl::new();
    let err = dsl
        .analyse_source("t.mfront", "@Law L;\n@Input T;\n@Input T;", &[])
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { .. }));
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_unknown_keyword_carries_line() {
    let mut dsl = MaterialPropertyDsl::new();
    let err = dsl
        .analyse_source("t.mfront", "@Law L;\n@Frobnicate;", &[])
        .unwrap_err();
    let Error::UnknownKeyword { keyword, line } = err else {
        panic!("expected UnknownKeyword, got {err:?}");
    };
    assert_eq!(keyword, "@Frobnicate");
    assert_eq!(line, 2);
}

#[test]
fn test_sigil_inside_instruction_is_rejected() {
    let mut dsl = MaterialPropertyDsl::new();
    let err = dsl
        .analyse_source("t.mfront", "@Law L;\n@Author John @Doe;", &[])
        .unwrap_err();
    assert!(matches!(err, Error::MisplacedKeyword { .. }));
}

#[test]
fn test_sigil_inside_function_block_is_rejected() {
    let mut dsl = MaterialPropertyDsl::new();
    let err = dsl
        .analyse_source("t.mfront", "@Law L;\n@Function { res = @Foo ; }", &[])
        .unwrap_err();
    assert!(matches!(err, Error::MisplacedKeyword { .. }));
}

#[test]
fn test_missing_function_is_an_error() {
    let mut dsl = MaterialPropertyDsl::new();
    let err = dsl.analyse_source("t.mfront", "@Law L;", &[]).unwrap_err();
    assert!(matches!(err, Error::ExpectedToken { .. }));
}

#[test]
fn test_leading_commands_are_prepended_in_order() {
    let mut dsl = MaterialPropertyDsl::new();
    dsl.analyse_source(
        "t.mfront",
        "@Function { res = 1. ; }",
        &[
            "@Law Injected;".to_string(),
            "@Material Steel;".to_string(),
        ],
    )
    .unwrap();
    let DslDescription::MaterialProperty(d) = dsl.description() else {
        panic!("wrong description kind");
    };
    assert_eq!(d.law, "Injected");
    assert_eq!(d.material, "Steel");
}
