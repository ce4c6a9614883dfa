use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::config::ImpactThresholds;
use crate::graph::DependencyGraph;
use crate::query::breaking::BreakingChange;

/// Default hop limit for reverse traversal.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Path segments that mark a directory of tests or fixtures.
const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "__mocks__", "spec", "e2e"];

/// Knobs for a single impact query.
#[derive(Debug, Clone)]
pub struct ImpactOptions {
    /// Maximum number of reverse hops from a target.
    pub max_depth: usize,
    /// Glob patterns (or path prefixes) of dependents to leave out.
    pub exclude_patterns: Vec<String>,
    /// Keep test-like files in the affected set.
    pub include_tests: bool,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            exclude_patterns: Vec::new(),
            include_tests: false,
        }
    }
}

/// Coarse classification of how far a change reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    /// Classify an affected-file count against the configured thresholds.
    pub fn classify(affected: usize, thresholds: &ImpactThresholds) -> Self {
        if affected >= thresholds.critical {
            ImpactLevel::Critical
        } else if affected >= thresholds.high {
            ImpactLevel::High
        } else if affected >= thresholds.medium {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

/// Why one file ended up in the affected set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactDetail {
    pub file: String,
    pub reason: String,
    /// Symbols this file imports from the file it was reached through.
    pub imported_symbols: Vec<String>,
    /// Number of distinct imported symbols; 1 for namespace or side-effect use.
    pub usage_count: usize,
    pub severity: Severity,
    /// Reverse hops from the target.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeImpactResult {
    pub target_files: Vec<String>,
    /// Lexicographically sorted.
    pub affected_files: Vec<String>,
    pub impact_level: ImpactLevel,
    pub details: Vec<ImpactDetail>,
    pub suggestions: Vec<String>,
    pub breaking_changes: Vec<BreakingChange>,
}

struct Visit {
    file: String,
    depth: usize,
    origin: String,
}

/// Compute the files transitively affected by changing `targets`.
///
/// Breadth-first over the reverse `dependents` index, seeded with every target
/// at depth 0. A shared visited set guarantees termination on cycles and gives
/// each file its shortest hop distance. Targets are not pre-marked as visited,
/// so a target appears in its own result only through a cycle via another file.
/// Excluded and filtered-out test files are neither reported nor expanded.
pub fn analyze_impact(
    graph: &DependencyGraph,
    targets: &[String],
    options: &ImpactOptions,
    thresholds: &ImpactThresholds,
) -> ChangeImpactResult {
    let excludes = compile_excludes(&options.exclude_patterns);

    let mut target_files: Vec<String> = Vec::new();
    for t in targets {
        if !target_files.contains(t) {
            target_files.push(t.clone());
        }
    }

    let mut queue: VecDeque<Visit> = target_files
        .iter()
        .map(|t| Visit {
            file: t.clone(),
            depth: 0,
            origin: t.clone(),
        })
        .collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut affected: Vec<String> = Vec::new();
    let mut details: Vec<ImpactDetail> = Vec::new();

    while let Some(current) = queue.pop_front() {
        if current.depth >= options.max_depth {
            continue;
        }

        for dependent in graph.dependents_of(&current.file) {
            if !visited.insert(dependent.clone()) {
                continue;
            }
            if is_excluded(dependent, &options.exclude_patterns, &excludes) {
                tracing::debug!(file = %dependent, "excluded from impact set");
                continue;
            }
            if !options.include_tests && is_test_file(dependent) {
                continue;
            }

            let depth = current.depth + 1;
            details.push(describe(graph, dependent, &current.file, &current.origin, depth));
            affected.push(dependent.clone());
            queue.push_back(Visit {
                file: dependent.clone(),
                depth,
                origin: current.origin.clone(),
            });
        }
    }

    affected.sort();
    details.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.file.cmp(&b.file)));

    let impact_level = ImpactLevel::classify(affected.len(), thresholds);
    let suggestions = build_suggestions(&affected, thresholds);

    ChangeImpactResult {
        target_files,
        affected_files: affected,
        impact_level,
        details,
        suggestions,
        breaking_changes: Vec::new(),
    }
}

/// Build the detail record for `file`, reached through its import of `via`.
fn describe(graph: &DependencyGraph, file: &str, via: &str, origin: &str, depth: usize) -> ImpactDetail {
    let imported_symbols = graph
        .node(file)
        .map(|n| n.symbols_imported_from(via))
        .unwrap_or_default();
    let usage_count = imported_symbols.len().max(1);

    let reason = if depth == 1 {
        format!("imports {via} directly")
    } else {
        format!("depends on {origin} through {via} ({depth} hops)")
    };

    ImpactDetail {
        file: file.to_owned(),
        reason,
        imported_symbols,
        usage_count,
        severity: Severity::Warning,
        depth,
    }
}

fn build_suggestions(affected: &[String], thresholds: &ImpactThresholds) -> Vec<String> {
    if affected.is_empty() {
        return vec!["No files depend on the target; it is safe to modify.".to_owned()];
    }

    let mut out = vec![format!(
        "Review {} affected file(s) before merging this change.",
        affected.len()
    )];

    let tests = affected.iter().filter(|f| is_test_file(f)).count();
    if tests > 0 {
        out.push(format!(
            "Update tests: {tests} affected test file(s) exercise the changed code."
        ));
    }

    if affected.len() >= thresholds.large_change {
        out.push(
            "Large blast radius: prefer a backward-compatible change, or deprecate the old API before removing it."
                .to_owned(),
        );
    }

    out
}

/// Returns true for spec/test files and files under test directories.
pub fn is_test_file(file: &str) -> bool {
    let name = file.rsplit('/').next().unwrap_or(file);
    if name.contains(".test.") || name.contains(".spec.") {
        return true;
    }
    file.split('/')
        .rev()
        .skip(1)
        .any(|dir| TEST_DIRS.contains(&dir))
}

fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter(|p| !p.trim_end_matches('/').is_empty())
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                tracing::warn!("ignoring invalid exclude pattern {p:?}: {err}");
                None
            }
        })
        .collect()
}

/// A file is excluded when a glob matches its whole key or one component, or
/// when a raw pattern names the file or one of its parent directories.
/// Empty patterns match nothing.
fn is_excluded(file: &str, raw: &[String], globs: &[glob::Pattern]) -> bool {
    raw.iter().any(|p| is_path_prefix(file, p))
        || globs
            .iter()
            .any(|g| g.matches(file) || file.split('/').any(|c| g.matches(c)))
}

/// `prefix` equals `file` or ends at a `/` boundary of it.
fn is_path_prefix(file: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match file.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::DependencyNode;
    use crate::parser::imports::{ImportKind, ImportReference};
    use crate::resolver::ResolveStats;
    use std::collections::BTreeMap;

    /// Build a graph from `(importer, target, symbols)` edges.
    fn graph(edges: &[(&str, &str, &[&str])], extra_files: &[&str]) -> DependencyGraph {
        let mut nodes: BTreeMap<String, DependencyNode> = BTreeMap::new();
        for file in extra_files {
            nodes.insert((*file).into(), DependencyNode::new((*file).into(), vec![], vec![]));
        }
        for (from, to, symbols) in edges {
            for f in [from, to] {
                nodes
                    .entry((*f).to_owned())
                    .or_insert_with(|| DependencyNode::new((*f).to_owned(), vec![], vec![]));
            }
            nodes.get_mut(*from).unwrap().imports.push(ImportReference {
                source_specifier: format!("./{to}"),
                resolved_target: Some((*to).to_owned()),
                imported_symbols: symbols.iter().map(|s| (*s).to_owned()).collect(),
                import_kind: if symbols.is_empty() {
                    ImportKind::Namespace
                } else {
                    ImportKind::Named
                },
                source_line: 1,
            });
        }
        DependencyGraph::from_nodes(nodes, ResolveStats::default(), 0)
    }

    fn run(graph: &DependencyGraph, targets: &[&str], options: &ImpactOptions) -> ChangeImpactResult {
        let targets: Vec<String> = targets.iter().map(|t| (*t).to_owned()).collect();
        analyze_impact(graph, &targets, options, &ImpactThresholds::default())
    }

    fn depth(n: usize) -> ImpactOptions {
        ImpactOptions {
            max_depth: n,
            ..ImpactOptions::default()
        }
    }

    #[test]
    fn test_direct_importer_is_affected() {
        let g = graph(&[("moduleB", "moduleA", &["helper"])], &[]);
        let result = run(&g, &["moduleA"], &ImpactOptions::default());

        assert_eq!(result.affected_files, vec!["moduleB"]);
        assert_eq!(result.impact_level, ImpactLevel::Low);
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].imported_symbols, vec!["helper"]);
        assert_eq!(result.details[0].usage_count, 1);
        assert_eq!(result.details[0].severity, Severity::Warning);
        assert!(result.breaking_changes.is_empty());
    }

    #[test]
    fn test_max_depth_bounds_the_chain() {
        let g = graph(&[("moduleB", "moduleA", &["a"]), ("moduleC", "moduleB", &["b"])], &[]);

        assert_eq!(run(&g, &["moduleA"], &depth(1)).affected_files, vec!["moduleB"]);
        assert_eq!(
            run(&g, &["moduleA"], &depth(2)).affected_files,
            vec!["moduleB", "moduleC"]
        );
        assert!(run(&g, &["moduleA"], &depth(0)).affected_files.is_empty());

        let deep = run(&g, &["moduleA"], &depth(2));
        assert_eq!(deep.details[1].depth, 2);
        assert!(deep.details[1].reason.contains("moduleA"));
        assert!(deep.details[1].reason.contains("moduleB"));
    }

    #[test]
    fn test_larger_depth_is_a_superset() {
        let g = graph(
            &[
                ("b", "a", &["x"]),
                ("c", "b", &["x"]),
                ("d", "c", &["x"]),
                ("e", "a", &["x"]),
                ("d", "e", &["x"]),
                ("f", "d", &["x"]),
            ],
            &[],
        );
        for n in 0..6 {
            let small: HashSet<String> = run(&g, &["a"], &depth(n)).affected_files.into_iter().collect();
            let large: HashSet<String> = run(&g, &["a"], &depth(n + 1)).affected_files.into_iter().collect();
            assert!(small.is_subset(&large), "depth {n} result must be within depth {}", n + 1);
        }
    }

    #[test]
    fn test_cycle_terminates_and_target_returns_only_via_cycle() {
        let g = graph(&[("b", "a", &["x"]), ("a", "b", &["y"]), ("c", "b", &["y"])], &[]);
        let result = run(&g, &["a"], &ImpactOptions::default());
        assert_eq!(result.affected_files, vec!["a", "b", "c"]);

        // Without a cycle the target never lists itself.
        let acyclic = graph(&[("b", "a", &["x"])], &[]);
        let result = run(&acyclic, &["a"], &ImpactOptions::default());
        assert_eq!(result.affected_files, vec!["b"]);
    }

    #[test]
    fn test_tests_filtered_unless_requested() {
        let g = graph(
            &[
                ("src/user.ts", "src/db.ts", &["query"]),
                ("src/db.test.ts", "src/db.ts", &["query"]),
                ("tests/integration/db.ts", "src/db.ts", &["query"]),
            ],
            &[],
        );

        let default = run(&g, &["src/db.ts"], &ImpactOptions::default());
        assert_eq!(default.affected_files, vec!["src/user.ts"]);

        let with_tests = run(
            &g,
            &["src/db.ts"],
            &ImpactOptions {
                include_tests: true,
                ..ImpactOptions::default()
            },
        );
        assert_eq!(with_tests.affected_files.len(), 3);
        assert!(
            with_tests.suggestions.iter().any(|s| s.starts_with("Update tests")),
            "test hint expected: {:?}",
            with_tests.suggestions
        );
    }

    #[test]
    fn test_exclude_patterns() {
        let g = graph(
            &[
                ("src/a.ts", "src/core.ts", &["x"]),
                ("legacy/b.ts", "src/core.ts", &["x"]),
                ("src/gen/c.generated.ts", "src/core.ts", &["x"]),
                ("src/d.ts", "legacy/b.ts", &["y"]),
            ],
            &[],
        );
        let result = run(
            &g,
            &["src/core.ts"],
            &ImpactOptions {
                exclude_patterns: vec!["legacy/".into(), "*.generated.ts".into()],
                ..ImpactOptions::default()
            },
        );
        assert_eq!(
            result.affected_files,
            vec!["src/a.ts"],
            "excluded files are not expanded either"
        );
    }

    #[test]
    fn test_prefix_excludes_respect_path_segments() {
        let g = graph(
            &[
                ("src/a.ts", "core.ts", &["x"]),
                ("src2/a.ts", "core.ts", &["x"]),
                ("lib/b.ts", "core.ts", &["x"]),
            ],
            &[],
        );
        let excluding = |pattern: &str| {
            run(
                &g,
                &["core.ts"],
                &ImpactOptions {
                    exclude_patterns: vec![pattern.to_owned()],
                    ..ImpactOptions::default()
                },
            )
            .affected_files
        };

        assert_eq!(excluding("src"), vec!["lib/b.ts", "src2/a.ts"]);
        assert_eq!(excluding("src/"), vec!["lib/b.ts", "src2/a.ts"]);
        assert_eq!(excluding("lib/b.ts"), vec!["src/a.ts", "src2/a.ts"]);
        assert_eq!(
            excluding(""),
            vec!["lib/b.ts", "src/a.ts", "src2/a.ts"],
            "an empty pattern excludes nothing"
        );
    }

    #[test]
    fn test_empty_targets_yield_empty_low_result() {
        let g = graph(&[("b", "a", &["x"])], &[]);
        let result = run(&g, &[], &ImpactOptions::default());
        assert!(result.affected_files.is_empty());
        assert_eq!(result.impact_level, ImpactLevel::Low);
        assert_eq!(result.suggestions.len(), 1);
        assert!(result.suggestions[0].contains("safe to modify"));

        let unknown = run(&g, &["nope.ts"], &ImpactOptions::default());
        assert!(unknown.affected_files.is_empty());
        assert_eq!(unknown.target_files, vec!["nope.ts"]);
    }

    #[test]
    fn test_thirty_dependents_is_critical() {
        const API: &[&str] = &["api"];
        let names: Vec<String> = (0..30).map(|i| format!("dep{i:02}.ts")).collect();
        let edges: Vec<(&str, &str, &[&str])> = names.iter().map(|n| (n.as_str(), "core.ts", API)).collect();
        let g = graph(&edges, &[]);

        let result = run(&g, &["core.ts"], &ImpactOptions::default());
        assert_eq!(result.affected_files.len(), 30);
        assert_eq!(result.impact_level, ImpactLevel::Critical);
        assert!(
            result.suggestions.iter().any(|s| s.contains("backward-compatible")),
            "suggestions: {:?}",
            result.suggestions
        );
        let mut sorted = result.affected_files.clone();
        sorted.sort();
        assert_eq!(result.affected_files, sorted);
    }

    #[test]
    fn test_level_thresholds() {
        let t = ImpactThresholds::default();
        assert_eq!(ImpactLevel::classify(0, &t), ImpactLevel::Low);
        assert_eq!(ImpactLevel::classify(3, &t), ImpactLevel::Low);
        assert_eq!(ImpactLevel::classify(4, &t), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::classify(10, &t), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::classify(11, &t), ImpactLevel::High);
        assert_eq!(ImpactLevel::classify(25, &t), ImpactLevel::High);
        assert_eq!(ImpactLevel::classify(26, &t), ImpactLevel::Critical);
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file("src/a.test.ts"));
        assert!(is_test_file("src/a.spec.tsx"));
        assert!(is_test_file("src/__tests__/a.ts"));
        assert!(is_test_file("tests/a.ts"));
        assert!(!is_test_file("src/testing.ts"));
        assert!(!is_test_file("src/tests.ts"), "only directories named tests count");
    }

    #[test]
    fn test_namespace_usage_counts_once() {
        let g = graph(&[("b", "a", &[])], &[]);
        let result = run(&g, &["a"], &ImpactOptions::default());
        assert!(result.details[0].imported_symbols.is_empty());
        assert_eq!(result.details[0].usage_count, 1);
    }
}
