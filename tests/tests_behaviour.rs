//! Behaviour front-end: flow-rule rewriting, dual renderings, integration
//! parameters and array-size resolution.

use matforge::Error;
use matforge::dsl::{BehaviourDsl, CodeSectionKind, Dsl, DslDescription};

const NORTON: &str = r#"
@DSL DefaultBehaviour;
@Behaviour Norton;
@Material Inconel;
@MaterialProperty real young;
@MaterialProperty real nu;
@StateVariable real p;
@LocalVariable real seq;
@LocalVariable real f;
@Parameter A = 8.e-67, E = 8.2;
@FlowRule {
  f = seq - A ;
  df_dp = p ;
}
"#;

fn analyse(source: &str) -> BehaviourDsl {
    let mut dsl = BehaviourDsl::new();
    dsl.analyse_source("Norton.mfront", source, &[]).unwrap();
    dsl
}

fn behaviour_description(dsl: &BehaviourDsl) -> matforge::dsl::BehaviourDescription {
    match dsl.description() {
        DslDescription::Behaviour(d) => d,
        other => panic!("wrong description kind: {other:?}"),
    }
}

#[test]
fn test_analysis_fills_description() {
    let dsl = analyse(NORTON);
    let d = behaviour_description(&dsl);
    assert_eq!(d.class_name, "Norton");
    assert_eq!(d.material, "Inconel");
    assert_eq!(d.material_properties.len(), 2);
    assert_eq!(d.state_variables.len(), 1);
    // Temperature is implicitly available.
    assert!(d.external_state_variables.iter().any(|v| v.name == "T"));
    assert!(d.code_sections.contains_key(&CodeSectionKind::FlowRule));
}

#[test]
fn test_flow_rule_interpolates_state_variables() {
    let dsl = analyse(NORTON);
    let d = behaviour_description(&dsl);
    let flow = &d.code_sections[&CodeSectionKind::FlowRule];
    // State variables are read at theta inside the step, members are
    // self-qualified; local variables keep their plain spelling.
    assert!(flow.code.contains("self.p_"));
    assert!(flow.code.contains("self.A"));
    assert!(flow.code.contains("self.f"));
    assert!(flow.variables.contains("p"));
    assert!(flow.variables.contains("A"));
}

#[test]
fn test_flow_rule_dual_rendering_via_replay() {
    let dsl = analyse(NORTON);
    let d = behaviour_description(&dsl);
    let qualified = &d.code_sections[&CodeSectionKind::FlowRule];
    let raw = &d.code_sections[&CodeSectionKind::FlowRuleUnqualified];
    // Same block, same references, different qualification.
    assert_eq!(qualified.variables, raw.variables);
    assert!(raw.code.contains("p_"));
    assert!(!raw.code.contains("self."));
}

#[test]
fn test_flow_rule_disables_integrator() {
    let mut dsl = BehaviourDsl::new();
    let source = format!("{NORTON}\n@Integrator {{ }}");
    let err = dsl.analyse_source("Norton.mfront", &source, &[]).unwrap_err();
    let Error::UnknownKeyword { keyword, .. } = err else {
        panic!("expected UnknownKeyword, got {err:?}");
    };
    assert_eq!(keyword, "@Integrator");
}

#[test]
fn test_integrator_disables_flow_rule() {
    let mut dsl = BehaviourDsl::new();
    let source = "@Behaviour B;\n@Integrator { }\n@FlowRule { }";
    let err = dsl.analyse_source("B.mfront", source, &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownKeyword { .. }));
}

#[test]
fn test_compute_stress_renders_mid_and_final_step() {
    let source = r#"
@Behaviour Elastic;
@MaterialProperty real lambda;
@StateVariable real eel;
@ComputeStress {
  sig = lambda + eel ;
}
"#;
    let dsl = analyse(source);
    let d = behaviour_description(&dsl);
    let mid = &d.code_sections[&CodeSectionKind::ComputeStress];
    let fin = &d.code_sections[&CodeSectionKind::ComputeFinalStress];
    assert!(mid.code.contains("self.eel_"));
    assert!(fin.code.contains("self.eel"));
    assert!(!fin.code.contains("self.eel_"));
}

#[test]
fn test_integration_parameters() {
    let source = "@Behaviour B;\n@Theta 0.7;\n@Epsilon 1.e-10;\n@IterMax 50;";
    let dsl = analyse(source);
    let d = behaviour_description(&dsl);
    assert_eq!(d.theta, 0.7);
    assert_eq!(d.epsilon, 1.0e-10);
    assert_eq!(d.iter_max, 50);
    assert_eq!(d.parameter_defaults["theta"], 0.7);
}

#[test]
fn test_theta_out_of_range_fails() {
    let mut dsl = BehaviourDsl::new();
    let err = dsl
        .analyse_source("B.mfront", "@Behaviour B;\n@Theta 1.5;", &[])
        .unwrap_err();
    assert!(matches!(err, Error::ExpectedToken { .. }));
}

#[test]
fn test_iter_max_zero_fails() {
    let mut dsl = BehaviourDsl::new();
    let err = dsl
        .analyse_source("B.mfront", "@Behaviour B;\n@IterMax 0;", &[])
        .unwrap_err();
    assert!(matches!(err, Error::ExpectedToken { .. }));
}

// ============================================================================
// Scenario C: symbolic array sizes
// ============================================================================

#[test]
fn test_array_size_resolved_from_integer_constant() {
    let source = "@Behaviour B;\n@IntegerConstant N 3;\n@LocalVariable real x[2*N];";
    let dsl = analyse(source);
    let d = behaviour_description(&dsl);
    let x = d.local_variables.iter().find(|v| v.name == "x").unwrap();
    assert_eq!(x.array_size, 6);
}

#[test]
fn test_array_size_with_unknown_constant_fails() {
    let mut dsl = BehaviourDsl::new();
    let err = dsl
        .analyse_source("B.mfront", "@Behaviour B;\n@LocalVariable real x[2*N];", &[])
        .unwrap_err();
    let Error::ArrayDimension { name, reason, .. } = err else {
        panic!("expected ArrayDimension, got {err:?}");
    };
    assert_eq!(name, "x");
    assert!(reason.contains("N"));
}

#[test]
fn test_non_positive_array_size_fails() {
    let mut dsl = BehaviourDsl::new();
    let err = dsl
        .analyse_source(
            "B.mfront",
            "@Behaviour B;\n@IntegerConstant N 3;\n@LocalVariable real x[N-3];",
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, Error::ArrayDimension { .. }));
}

#[test]
fn test_state_variables_register_their_increments() {
    let mut dsl = BehaviourDsl::new();
    // `dp` is taken by the increment of `p`.
    let err = dsl
        .analyse_source(
            "B.mfront",
            "@Behaviour B;\n@StateVariable real p;\n@LocalVariable real dp;",
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { .. } | Error::NameAlreadyReserved { .. }));
}

#[test]
fn test_native_generation_emits_type_and_free_flow_rule() {
    let mut dsl = analyse(NORTON);
    let files = dsl.generate_output_files().unwrap();
    assert_eq!(files.len(), 1);
    let contents = &files[0].contents;
    assert!(contents.contains("pub struct Norton"));
    assert!(contents.contains("pub fn flow_rule(&mut self)"));
    assert!(contents.contains("pub fn Inconel_Norton_flow_rule("));
    let library = dsl.targets().get_library("Inconel").unwrap();
    assert!(library.sources.contains("Inconel_Norton-native.rs"));
    assert!(library.entry_points.contains("Inconel_Norton"));
}
