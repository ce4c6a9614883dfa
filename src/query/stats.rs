use serde::Serialize;

use crate::graph::DependencyGraph;

/// Summary of the current graph generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub file_count: usize,
    pub total_imports: usize,
    pub total_exports: usize,
    pub resolved_imports: usize,
    pub external_imports: usize,
    /// Relative specifiers that matched no indexed file.
    pub unresolved_imports: usize,
    /// Unix timestamp of the build, or `None` before the first build.
    pub last_built: Option<u64>,
}

/// Compute statistics from a graph, or all zeros when nothing has been built.
pub fn graph_stats(graph: Option<&DependencyGraph>) -> GraphStats {
    let Some(graph) = graph else {
        return GraphStats::default();
    };

    GraphStats {
        file_count: graph.file_count,
        total_imports: graph.total_imports(),
        total_exports: graph.total_exports(),
        resolved_imports: graph.resolve_stats.resolved,
        external_imports: graph.resolve_stats.external,
        unresolved_imports: graph.resolve_stats.unresolved,
        last_built: Some(graph.built_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::DependencyNode;
    use crate::parser::exports::extract_exports;
    use crate::parser::imports::extract_imports;
    use crate::resolver::resolve_all;
    use std::collections::BTreeMap;

    #[test]
    fn test_stats_before_first_build() {
        let stats = graph_stats(None);
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.last_built, None);
    }

    #[test]
    fn test_stats_counts_imports_and_exports() {
        let sources = [
            ("a.ts", "export function a() {}\nexport const b = 1;"),
            ("c.ts", "import { a } from './a';\nimport fs from 'fs';\nimport './gone';"),
        ];
        let mut nodes: BTreeMap<String, DependencyNode> = sources
            .iter()
            .map(|(file, src)| {
                (
                    (*file).to_owned(),
                    DependencyNode::new((*file).to_owned(), extract_imports(src), extract_exports(src)),
                )
            })
            .collect();
        let resolve = resolve_all(&mut nodes, &["ts".to_owned()]);
        let graph = DependencyGraph::from_nodes(nodes, resolve, 1_700_000_000);

        assert_eq!(
            graph_stats(Some(&graph)),
            GraphStats {
                file_count: 2,
                total_imports: 3,
                total_exports: 2,
                resolved_imports: 1,
                external_imports: 1,
                unresolved_imports: 1,
                last_built: Some(1_700_000_000),
            }
        );
    }
}
