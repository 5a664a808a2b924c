//! Build-manifest invariants: idempotent insertion, set-union merge, and
//! deduplicated contributions from multiple interface generators.

use matforge::TargetsDescription;
use matforge::dsl::{Dsl, DslVariant};
use matforge::driver::select_dsl_kind;
use matforge::interfaces::{InterfaceGenerator, NativeInterface};

#[test]
fn test_manifest_idempotence() {
    let mut targets = TargetsDescription::new();
    for _ in 0..2 {
        targets.library("libX").sources.insert("Foo.src".into());
        targets.library("libX").headers.insert("Foo.hdr".into());
        targets.library("libX").entry_points.insert("Foo".into());
    }
    let library = targets.get_library("libX").unwrap();
    assert_eq!(library.sources.len(), 1);
    assert_eq!(library.headers.len(), 1);
    assert_eq!(library.entry_points.len(), 1);
}

#[test]
fn test_merge_unions_libraries_and_custom_targets() {
    let mut parent = TargetsDescription::new();
    parent.library("libX").sources.insert("Foo.src".into());
    parent.add_custom_target("doc", ["Foo.src".to_string()], ["render".to_string()]);

    let mut child = TargetsDescription::new();
    child.library("libX").sources.insert("Foo.src".into());
    child.library("libX").sources.insert("Bar.src".into());
    child.library("libY").link_flags.insert("m".into());
    child.add_custom_target("doc", ["Bar.src".to_string()], ["render".to_string()]);

    parent.merge(&child);

    let lib_x = parent.get_library("libX").unwrap();
    assert_eq!(
        lib_x.sources.iter().cloned().collect::<Vec<_>>(),
        vec!["Foo.src", "Bar.src"]
    );
    assert!(parent.get_library("libY").is_some());
    let (_, doc) = parent.custom_targets().next().unwrap();
    assert_eq!(doc.prerequisites.len(), 2);
    assert_eq!(doc.commands, vec!["render"]);
}

/// Scenario D: two generators contributing the same artifact to the same
/// library leave a manifest listing it once.
#[test]
fn test_two_generators_contributing_same_source() {
    let source = "@Law ThermalExpansion;\n@Library libX;\n@Function { res = 1.e-5 ; }";
    let kind = select_dsl_kind(source).unwrap();
    let mut variant = DslVariant::for_kind(kind);
    variant.analyse_source("ThermalExpansion.mfront", source, &[]).unwrap();
    let description = variant.description();

    let mut targets = TargetsDescription::new();
    let first = NativeInterface;
    let second = NativeInterface;
    first.contribute(&mut targets, &description).unwrap();
    second.contribute(&mut targets, &description).unwrap();

    let library = targets.get_library("libX").unwrap();
    assert_eq!(library.sources.len(), 1);
    assert_eq!(
        library.sources.iter().next().unwrap(),
        "ThermalExpansion-native.rs"
    );
}

#[test]
fn test_rendered_manifest_lists_each_artifact_once() {
    let mut targets = TargetsDescription::new();
    targets.library("libX").sources.insert("Foo.src".into());
    targets.library("libX").sources.insert("Foo.src".into());
    let rendered = targets.to_string();
    assert_eq!(rendered.matches("Foo.src").count(), 1);
}
