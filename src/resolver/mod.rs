pub mod file_resolver;

pub use file_resolver::{ResolutionOutcome, canonical_key, resolve_specifier};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::graph::node::DependencyNode;

/// Statistics collected during the resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Imports mapped to an indexed file (each one is a graph edge).
    pub resolved: usize,
    /// Bare or absolute specifiers: packages, builtins, path aliases.
    pub external: usize,
    /// Relative specifiers with no indexed file at any probed location.
    pub unresolved: usize,
    /// Relative specifiers that resolved back to the importing file.
    pub self_references: usize,
}

/// Fill `resolved_target` on every import of every node.
///
/// Only relative specifiers are probed, and only against keys present in
/// `nodes`. An import resolving to its own file is left unresolved so it never
/// produces a dependents entry.
pub fn resolve_all(nodes: &mut BTreeMap<String, DependencyNode>, extensions: &[String]) -> ResolveStats {
    let known: BTreeSet<String> = nodes.keys().cloned().collect();
    let mut stats = ResolveStats::default();

    for (file, node) in nodes.iter_mut() {
        for import in &mut node.imports {
            let specifier = import.source_specifier.as_str();
            match resolve_specifier(file, specifier, &known, extensions) {
                ResolutionOutcome::Resolved(target) => {
                    tracing::debug!(%file, specifier, %target, "resolved import");
                    import.resolved_target = Some(target);
                    stats.resolved += 1;
                }
                ResolutionOutcome::SelfReference => {
                    tracing::debug!(%file, specifier, "import resolves to itself; no edge");
                    stats.self_references += 1;
                }
                ResolutionOutcome::External => {
                    stats.external += 1;
                }
                ResolutionOutcome::Unresolved => {
                    tracing::debug!(%file, specifier, "unresolved relative import");
                    stats.unresolved += 1;
                }
            }
        }
    }

    stats
}
