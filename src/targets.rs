//! Build manifest aggregated across interface generators.
//!
//! One [`TargetsDescription`] exists per processed file. Every selected
//! backend contributes sources, headers, entry points and link flags into
//! it; nested analyses (imported files) produce their own manifest which is
//! merged in afterwards. All collections are insertion-ordered sets:
//! inserting the same artifact twice is a no-op, and emission order is
//! deterministic.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

/// Build artifacts grouped under one logical library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryDescription {
    pub sources: IndexSet<String>,
    pub headers: IndexSet<String>,
    pub entry_points: IndexSet<String>,
    pub link_flags: IndexSet<String>,
}

impl LibraryDescription {
    fn merge(&mut self, other: &LibraryDescription) {
        self.sources.extend(other.sources.iter().cloned());
        self.headers.extend(other.headers.iter().cloned());
        self.entry_points.extend(other.entry_points.iter().cloned());
        self.link_flags.extend(other.link_flags.iter().cloned());
    }
}

/// A named auxiliary target with prerequisites and commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomTarget {
    pub prerequisites: IndexSet<String>,
    pub commands: Vec<String>,
}

/// The aggregated, deduplicated record of all build artifacts produced for
/// one processed file and its transitively imported files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetsDescription {
    libraries: IndexMap<String, LibraryDescription>,
    custom_targets: IndexMap<String, CustomTarget>,
}

impl TargetsDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// The library entry for `name`, created on first access.
    pub fn library(&mut self, name: &str) -> &mut LibraryDescription {
        self.libraries.entry(name.to_string()).or_default()
    }

    pub fn get_library(&self, name: &str) -> Option<&LibraryDescription> {
        self.libraries.get(name)
    }

    pub fn libraries(&self) -> impl Iterator<Item = (&str, &LibraryDescription)> {
        self.libraries.iter().map(|(n, l)| (n.as_str(), l))
    }

    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty() && self.custom_targets.is_empty()
    }

    /// Add a custom target; commands of an already-known target are extended
    /// only with commands not yet present.
    pub fn add_custom_target(
        &mut self,
        name: &str,
        prerequisites: impl IntoIterator<Item = String>,
        commands: impl IntoIterator<Item = String>,
    ) {
        let target = self.custom_targets.entry(name.to_string()).or_default();
        target.prerequisites.extend(prerequisites);
        for command in commands {
            if !target.commands.contains(&command) {
                target.commands.push(command);
            }
        }
    }

    pub fn custom_targets(&self) -> impl Iterator<Item = (&str, &CustomTarget)> {
        self.custom_targets.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Set-union merge of another manifest, preserving this manifest's
    /// insertion order for artifacts already present.
    pub fn merge(&mut self, other: &TargetsDescription) {
        for (name, library) in &other.libraries {
            self.libraries
                .entry(name.clone())
                .or_default()
                .merge(library);
        }
        for (name, target) in &other.custom_targets {
            self.add_custom_target(
                name,
                target.prerequisites.iter().cloned(),
                target.commands.iter().cloned(),
            );
        }
    }
}

/// Deterministic plain-text rendering consumed by downstream build tooling.
impl fmt::Display for TargetsDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, library) in &self.libraries {
            writeln!(f, "library: {name}")?;
            for field in [
                ("sources", &library.sources),
                ("headers", &library.headers),
                ("entry-points", &library.entry_points),
                ("link-flags", &library.link_flags),
            ] {
                if !field.1.is_empty() {
                    writeln!(
                        f,
                        "  {}: {}",
                        field.0,
                        field.1.iter().cloned().collect::<Vec<_>>().join(" ")
                    )?;
                }
            }
        }
        for (name, target) in &self.custom_targets {
            writeln!(
                f,
                "target: {name}: {}",
                target
                    .prerequisites
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            )?;
            for command in &target.commands {
                writeln!(f, "  {command}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut targets = TargetsDescription::new();
        targets.library("libX").sources.insert("Foo.rs".into());
        targets.library("libX").sources.insert("Foo.rs".into());
        assert_eq!(targets.get_library("libX").unwrap().sources.len(), 1);
    }

    #[test]
    fn test_merge_is_set_union_preserving_order() {
        let mut parent = TargetsDescription::new();
        parent.library("libX").sources.insert("A.rs".into());
        let mut child = TargetsDescription::new();
        child.library("libX").sources.insert("A.rs".into());
        child.library("libX").sources.insert("B.rs".into());
        child.library("libY").entry_points.insert("compute".into());
        parent.merge(&child);
        let sources: Vec<_> = parent
            .get_library("libX")
            .unwrap()
            .sources
            .iter()
            .cloned()
            .collect();
        assert_eq!(sources, vec!["A.rs", "B.rs"]);
        assert!(parent.get_library("libY").is_some());
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut targets = TargetsDescription::new();
        targets.library("libX").sources.insert("Foo.rs".into());
        targets.library("libX").entry_points.insert("Foo".into());
        targets.add_custom_target("doc", ["Foo.rs".to_string()], ["render docs".to_string()]);
        let first = targets.to_string();
        assert_eq!(first, targets.to_string());
        assert!(first.contains("library: libX"));
        assert!(first.contains("  sources: Foo.rs"));
        assert!(first.contains("target: doc: Foo.rs"));
    }
}
