use std::collections::BTreeMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::parser::DeclarationExtractor;
use crate::resolver::resolve_all;
use crate::walker::SourceScanner;

use super::DependencyGraph;
use super::node::DependencyNode;

/// Builds a complete [`DependencyGraph`] from a source tree.
///
/// Runs three sequential passes:
///
/// 1. **Scan + extract**: walk the tree and extract declarations from each
///    readable file. Unreadable or non-UTF-8 files are logged and left out.
/// 2. **Resolve**: map relative specifiers to indexed keys.
/// 3. **Index**: derive the reverse `dependents` index from resolved edges.
pub struct GraphBuilder<'a> {
    scanner: &'a SourceScanner,
    extractor: &'a dyn DeclarationExtractor,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(scanner: &'a SourceScanner, extractor: &'a dyn DeclarationExtractor) -> Self {
        Self { scanner, extractor }
    }

    /// Build a fresh graph. Fails only when the root cannot be enumerated.
    pub fn build(&self) -> Result<DependencyGraph> {
        let start = Instant::now();
        self.scanner.ensure_root_readable()?;

        let mut nodes: BTreeMap<String, DependencyNode> = BTreeMap::new();
        let mut skipped = 0usize;

        for key in self.scanner.walk() {
            let path = self.scanner.root().join(&key);
            let text = match std::fs::read_to_string(&path) {
                Ok(t) => t,
                Err(err) => {
                    tracing::warn!(file = %key, "skipping unreadable file: {err}");
                    skipped += 1;
                    continue;
                }
            };

            let imports = self.extractor.extract_imports(&text);
            let exports = self.extractor.extract_exports(&text);
            nodes.insert(key.clone(), DependencyNode::new(key, imports, exports));
        }

        let resolve_stats = resolve_all(&mut nodes, self.scanner.extensions());

        let built_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let graph = DependencyGraph::from_nodes(nodes, resolve_stats, built_at);

        tracing::info!(
            files = graph.file_count,
            skipped,
            resolved = graph.resolve_stats.resolved,
            external = graph.resolve_stats.external,
            unresolved = graph.resolve_stats.unresolved,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dependency graph built"
        );

        Ok(graph)
    }
}
