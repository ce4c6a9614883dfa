use std::collections::HashMap;

use petgraph::Directed;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{Graph, NodeIndex};
use serde::Serialize;

use crate::graph::DependencyGraph;

/// A set of files forming a circular dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Files forming the cycle, sorted by key.
    /// The first file is repeated at the end to close the visual cycle.
    pub files: Vec<String>,
}

/// Detect circular dependencies among resolved imports.
///
/// Uses Kosaraju's SCC algorithm on a file graph holding one edge per resolved
/// import. SCCs with more than one node are cycles; self-imports never become
/// edges so they cannot form a cycle on their own.
///
/// Returns cycles sorted by the first file in each cycle.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut file_graph: Graph<&str, (), Directed> = Graph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.nodes.len());

    for file in graph.nodes.keys() {
        index.insert(file.as_str(), file_graph.add_node(file.as_str()));
    }

    for (file, node) in &graph.nodes {
        for target in node.imports.iter().filter_map(|imp| imp.resolved_target.as_deref()) {
            if let (Some(&from), Some(&to)) = (index.get(file.as_str()), index.get(target)) {
                file_graph.add_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Cycle> = kosaraju_scc(&file_graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut files: Vec<String> = scc.iter().map(|&idx| file_graph[idx].to_owned()).collect();
            files.sort();
            let first = files[0].clone();
            files.push(first);
            Cycle { files }
        })
        .collect();

    cycles.sort_by(|a, b| a.files[0].cmp(&b.files[0]));
    tracing::debug!(cycles = cycles.len(), "cycle detection finished");

    cycles
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
