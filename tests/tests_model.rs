//! Model front-end: analysis and native generation.

use matforge::Error;
use matforge::dsl::{Dsl, DslDescription, ModelDsl};

const SWELLING: &str = r#"
@DSL Model;
@Model SolidSwelling;
@Material UO2;
@Output s;
@Input Bu;
@Parameter alpha = 5.77e-4;
@Function {
  s = s_1 + alpha * Bu ;
}
"#;

fn analyse(source: &str) -> ModelDsl {
    let mut dsl = ModelDsl::new();
    dsl.analyse_source("SolidSwelling.mfront", source, &[]).unwrap();
    dsl
}

#[test]
fn test_analysis_fills_description() {
    let dsl = analyse(SWELLING);
    let DslDescription::Model(d) = dsl.description() else {
        panic!("wrong description kind");
    };
    assert_eq!(d.model, "SolidSwelling");
    assert_eq!(d.material, "UO2");
    assert_eq!(d.outputs.len(), 1);
    assert_eq!(d.inputs.len(), 1);
    assert_eq!(d.parameter_defaults["alpha"], 5.77e-4);
}

#[test]
fn test_outputs_keep_previous_value_available() {
    let dsl = analyse(SWELLING);
    let DslDescription::Model(d) = dsl.description() else {
        panic!("wrong description kind");
    };
    // `s_1` names the value at the previous time step.
    assert!(d.function.variables.contains("s"));
    assert!(d.function.variables.contains("s_1"));
}

#[test]
fn test_missing_function_fails() {
    let mut dsl = ModelDsl::new();
    let err = dsl
        .analyse_source("m.mfront", "@Model M;\n@Output s;", &[])
        .unwrap_err();
    assert!(matches!(err, Error::ExpectedToken { .. }));
}

#[test]
fn test_native_generation() {
    let mut dsl = analyse(SWELLING);
    let files = dsl.generate_output_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "UO2_SolidSwelling-native.rs");
    assert!(files[0].contents.contains("pub fn UO2_SolidSwelling"));
    let library = dsl.targets().get_library("UO2").unwrap();
    assert!(library.entry_points.contains("UO2_SolidSwelling"));
    assert!(library.entry_points.contains("UO2_SolidSwelling_check_bounds"));
}
