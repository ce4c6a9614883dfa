use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::GraphCache;
use crate::config::ImpactConfig;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::graph::builder::GraphBuilder;
use crate::parser::{DeclarationExtractor, PatternExtractor};
use crate::query::breaking::{self, BreakingChange};
use crate::query::circular::{self, Cycle};
use crate::query::impact::{self, ChangeImpactResult, ImpactOptions};
use crate::query::stats::{self, GraphStats};
use crate::resolver::canonical_key;
use crate::resolver::file_resolver::absolute_path;
use crate::walker::SourceScanner;

/// Entry point for change-impact queries against one project root.
///
/// Owns the configuration, the extractor and the graph cache. Every query reads
/// one complete graph generation, building it first when the cache is empty or
/// stale. Safe to share across threads.
pub struct ImpactAnalyzer {
    root: PathBuf,
    config: ImpactConfig,
    scanner: SourceScanner,
    extractor: Box<dyn DeclarationExtractor>,
    cache: GraphCache,
}

impl ImpactAnalyzer {
    /// Analyzer for `root` with `impact-graph.toml` loaded from it, if present.
    pub fn new(root: &Path) -> Self {
        Self::with_config(root, ImpactConfig::load(root))
    }

    pub fn with_config(root: &Path, config: ImpactConfig) -> Self {
        Self::with_extractor(root, config, Box::new(PatternExtractor))
    }

    /// Swap in a different declaration extractor.
    ///
    /// `root` is made absolute once here so absolute targets always line up with it.
    pub fn with_extractor(root: &Path, config: ImpactConfig, extractor: Box<dyn DeclarationExtractor>) -> Self {
        let root = absolute_path(root);
        Self {
            scanner: SourceScanner::new(&root, &config),
            root,
            cache: GraphCache::new(config.cache_ttl()),
            config,
            extractor,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Options seeded from the config: its `max_depth`, everything else default.
    pub fn default_options(&self) -> ImpactOptions {
        ImpactOptions {
            max_depth: self.config.max_depth(),
            ..ImpactOptions::default()
        }
    }

    /// Return the cached graph, or build one when the cache is empty, stale or
    /// `force` is set. A failed build leaves the previous generation cached.
    pub fn build_graph(&self, force: bool) -> Result<Arc<DependencyGraph>> {
        self.cache.get_or_build(force, || {
            GraphBuilder::new(&self.scanner, self.extractor.as_ref()).build()
        })
    }

    /// Files transitively affected by changing `targets`.
    ///
    /// Targets may be absolute, `./`-prefixed or use `\` separators; they are
    /// normalised to graph keys first. Unknown targets simply have no dependents.
    pub fn analyze_impact<S: AsRef<str>>(&self, targets: &[S], options: &ImpactOptions) -> Result<ChangeImpactResult> {
        let graph = self.build_graph(false)?;
        let keys = self.target_keys(targets);
        Ok(impact::analyze_impact(&graph, &keys, options, &self.config.thresholds))
    }

    /// Removed or re-shaped exports of `file` that break at least one importer.
    pub fn detect_breaking_changes(&self, file: &str, old_text: &str, new_text: &str) -> Result<Vec<BreakingChange>> {
        let graph = self.build_graph(false)?;
        let Some(key) = self.key(file) else {
            return Ok(Vec::new());
        };
        Ok(breaking::detect_breaking_changes(
            &graph,
            self.extractor.as_ref(),
            &key,
            old_text,
            new_text,
        ))
    }

    /// Impact of editing one file, with `breaking_changes` filled in.
    ///
    /// Both halves read the same graph generation.
    pub fn analyze_change(
        &self,
        file: &str,
        old_text: &str,
        new_text: &str,
        options: &ImpactOptions,
    ) -> Result<ChangeImpactResult> {
        let graph = self.build_graph(false)?;
        let keys = self.target_keys(&[file]);
        let mut result = impact::analyze_impact(&graph, &keys, options, &self.config.thresholds);
        if let Some(key) = keys.first() {
            result.breaking_changes =
                breaking::detect_breaking_changes(&graph, self.extractor.as_ref(), key, old_text, new_text);
        }
        Ok(result)
    }

    /// Statistics of the cached generation. Never builds.
    pub fn get_graph_stats(&self) -> GraphStats {
        stats::graph_stats(self.cache.current().as_deref())
    }

    pub fn find_cycles(&self) -> Result<Vec<Cycle>> {
        let graph = self.build_graph(false)?;
        Ok(circular::find_cycles(&graph))
    }

    /// Drop the cached graph so the next query rebuilds.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn key(&self, input: &str) -> Option<String> {
        let key = canonical_key(&self.root, input);
        if key.is_none() {
            tracing::warn!(target_file = input, "target is outside the project root; ignored");
        }
        key
    }

    fn target_keys<S: AsRef<str>>(&self, targets: &[S]) -> Vec<String> {
        targets.iter().filter_map(|t| self.key(t.as_ref())).collect()
    }
}
