pub mod builder;
pub mod node;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::resolver::ResolveStats;
use node::DependencyNode;

/// One immutable generation of the project's import graph.
///
/// `dependents` is derived from `nodes` and is exactly the inverse of every
/// resolved import: `b ∈ dependents[a]` iff some import of `b` resolved to `a`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    /// Nodes keyed by root-relative canonical path.
    pub nodes: BTreeMap<String, DependencyNode>,
    /// Reverse index: target file -> files importing it.
    pub dependents: BTreeMap<String, BTreeSet<String>>,
    /// Unix timestamp (seconds) of the build that produced this graph.
    pub built_at: u64,
    pub file_count: usize,
    pub resolve_stats: ResolveStats,
}

impl DependencyGraph {
    /// Assemble a graph from resolved nodes, deriving the reverse index.
    pub fn from_nodes(
        nodes: BTreeMap<String, DependencyNode>,
        resolve_stats: ResolveStats,
        built_at: u64,
    ) -> Self {
        let mut dependents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (file, node) in &nodes {
            for target in node.imports.iter().filter_map(|imp| imp.resolved_target.as_ref()) {
                dependents.entry(target.clone()).or_default().insert(file.clone());
            }
        }

        Self {
            file_count: nodes.len(),
            nodes,
            dependents,
            built_at,
            resolve_stats,
        }
    }

    pub fn node(&self, file: &str) -> Option<&DependencyNode> {
        self.nodes.get(file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.nodes.contains_key(file)
    }

    /// Files that import `file` directly, in key order.
    pub fn dependents_of(&self, file: &str) -> impl Iterator<Item = &String> {
        self.dependents.get(file).into_iter().flatten()
    }

    pub fn total_imports(&self) -> usize {
        self.nodes.values().map(|n| n.imports.len()).sum()
    }

    pub fn total_exports(&self) -> usize {
        self.nodes.values().map(|n| n.exports.len()).sum()
    }

    /// Compare content only, ignoring the build timestamp.
    pub fn same_content(&self, other: &DependencyGraph) -> bool {
        self.nodes == other.nodes && self.dependents == other.dependents
    }
}
