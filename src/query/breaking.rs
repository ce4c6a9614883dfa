use std::collections::HashSet;

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::parser::DeclarationExtractor;
use crate::parser::exports::{ExportKind, ExportReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    Removed,
    SignatureChanged,
}

/// An exported symbol that was removed or changed while something imports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakingChange {
    pub file: String,
    pub symbol: String,
    pub change_type: ChangeType,
    /// Files importing `symbol` by name or through a namespace import. Sorted.
    pub affected_files: Vec<String>,
    pub suggestion: String,
}

/// Diff the exports of two versions of `file` and report the changes that
/// reach at least one real importer.
///
/// Two heuristics:
///
/// - **removed**: a name exported by `old_text` is missing from `new_text`.
/// - **signature-changed**: a function exported by both versions has a
///   different parameter count, measured by [`parameter_count`] on the
///   declaration line only. Multi-line or bracketed parameter lists can be
///   miscounted.
///
/// A change with no importer is not reported. Wildcard re-exports are ignored.
pub fn detect_breaking_changes(
    graph: &DependencyGraph,
    extractor: &dyn DeclarationExtractor,
    file: &str,
    old_text: &str,
    new_text: &str,
) -> Vec<BreakingChange> {
    let old_exports = extractor.extract_exports(old_text);
    let new_exports = extractor.extract_exports(new_text);
    let new_names: HashSet<&str> = new_exports.iter().map(|e| e.symbol_name.as_str()).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut changes = Vec::new();

    for old in &old_exports {
        if old.is_wildcard() || !seen.insert(old.symbol_name.as_str()) {
            continue;
        }
        let symbol = old.symbol_name.as_str();

        if !new_names.contains(symbol) {
            let importers = importers_of_symbol(graph, file, symbol);
            if importers.is_empty() {
                tracing::debug!(%file, symbol, "removed export has no importers");
                continue;
            }
            changes.push(BreakingChange {
                file: file.to_owned(),
                symbol: symbol.to_owned(),
                change_type: ChangeType::Removed,
                suggestion: format!(
                    "`{symbol}` is still imported by {} file(s); restore it or keep a deprecated re-export until they migrate.",
                    importers.len()
                ),
                affected_files: importers,
            });
            continue;
        }

        if old.export_kind != ExportKind::Function {
            continue;
        }
        let Some(new) = first_function(&new_exports, symbol) else {
            continue;
        };
        let before = declaration_line(old_text, old.source_line).and_then(parameter_count);
        let after = declaration_line(new_text, new.source_line).and_then(parameter_count);
        let (Some(before), Some(after)) = (before, after) else {
            continue;
        };
        if before == after {
            continue;
        }

        let importers = importers_of_symbol(graph, file, symbol);
        if importers.is_empty() {
            tracing::debug!(%file, symbol, "changed signature has no importers");
            continue;
        }
        changes.push(BreakingChange {
            file: file.to_owned(),
            symbol: symbol.to_owned(),
            change_type: ChangeType::SignatureChanged,
            suggestion: format!(
                "`{symbol}` went from {before} to {after} parameter(s); update callers in {} file(s) or make the new parameters optional.",
                importers.len()
            ),
            affected_files: importers,
        });
    }

    changes
}

/// Dependents of `file` that import `symbol` by name or hold a namespace import.
/// Side-effect imports do not count.
pub fn importers_of_symbol(graph: &DependencyGraph, file: &str, symbol: &str) -> Vec<String> {
    graph
        .dependents_of(file)
        .filter(|dependent| {
            graph
                .node(dependent)
                .is_some_and(|n| n.imports_of(file).any(|imp| imp.references_symbol(symbol)))
        })
        .cloned()
        .collect()
}

fn first_function<'a>(exports: &'a [ExportReference], symbol: &str) -> Option<&'a ExportReference> {
    exports
        .iter()
        .find(|e| e.symbol_name == symbol && e.export_kind == ExportKind::Function)
}

fn declaration_line(text: &str, line: usize) -> Option<&str> {
    text.lines().nth(line.checked_sub(1)?)
}

/// Count parameters on a declaration line by raw separator counting.
///
/// Takes the text between the first `(` and its matching `)` (or the end of
/// the line), returns 0 when it is blank, otherwise commas + 1. Commas nested
/// in brackets, defaults or type arguments are counted too.
pub fn parameter_count(line: &str) -> Option<usize> {
    let open = line.find('(')?;
    let rest = &line[open + 1..];

    let mut depth = 0usize;
    let mut end = rest.len();
    for (idx, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = idx;
                break;
            }
            ')' => depth -= 1,
            _ => {}
        }
    }

    let params = &rest[..end];
    if params.trim().is_empty() {
        Some(0)
    } else {
        Some(params.matches(',').count() + 1)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::DependencyNode;
    use crate::parser::PatternExtractor;
    use crate::parser::imports::extract_imports;
    use crate::resolver::{ResolveStats, resolve_all};
    use std::collections::BTreeMap;

    /// Build a graph from in-memory `(file, source)` pairs.
    fn graph(files: &[(&str, &str)]) -> DependencyGraph {
        let mut nodes: BTreeMap<String, DependencyNode> = files
            .iter()
            .map(|(file, src)| {
                (
                    (*file).to_owned(),
                    DependencyNode::new((*file).to_owned(), extract_imports(src), Vec::new()),
                )
            })
            .collect();
        let stats: ResolveStats = resolve_all(&mut nodes, &["ts".to_owned()]);
        DependencyGraph::from_nodes(nodes, stats, 0)
    }

    fn detect(g: &DependencyGraph, file: &str, old: &str, new: &str) -> Vec<BreakingChange> {
        detect_breaking_changes(g, &PatternExtractor, file, old, new)
    }

    #[test]
    fn test_signature_change_with_caller() {
        let g = graph(&[
            ("moduleX.ts", ""),
            ("caller.ts", "import { run } from './moduleX';\nrun(1);"),
        ]);
        let changes = detect(
            &g,
            "moduleX.ts",
            "export function run(x) {}",
            "export function run(x, y) {}",
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::SignatureChanged);
        assert_eq!(changes[0].symbol, "run");
        assert_eq!(changes[0].affected_files, vec!["caller.ts"]);
    }

    #[test]
    fn test_removed_export_without_importers_is_silent() {
        let g = graph(&[
            ("lib.ts", ""),
            ("user.ts", "import { current } from './lib';"),
        ]);
        let changes = detect(
            &g,
            "lib.ts",
            "export const current = 1;\nexport function legacy() {}",
            "export const current = 1;",
        );
        assert!(changes.is_empty(), "legacy has no importers: {changes:?}");
    }

    #[test]
    fn test_removed_export_with_named_and_namespace_importers() {
        let g = graph(&[
            ("lib.ts", ""),
            ("named.ts", "import { legacy } from './lib';"),
            ("ns.ts", "import * as lib from './lib';"),
            ("other.ts", "import { current } from './lib';"),
            ("side.ts", "import './lib';"),
        ]);
        let changes = detect(
            &g,
            "lib.ts",
            "export function legacy() {}\nexport const current = 1;",
            "export const current = 1;",
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::Removed);
        assert_eq!(changes[0].affected_files, vec!["named.ts", "ns.ts"]);
    }

    #[test]
    fn test_removed_default_export_reaches_default_importers() {
        let g = graph(&[("App.ts", ""), ("main.ts", "import App from './App';")]);
        let changes = detect(&g, "App.ts", "export default class App {}", "export class App {}");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].symbol, "default");
        assert_eq!(changes[0].affected_files, vec!["main.ts"]);
    }

    #[test]
    fn test_unchanged_arity_and_non_functions_are_ignored() {
        let g = graph(&[
            ("m.ts", ""),
            ("u.ts", "import { f, C } from './m';"),
        ]);
        let changes = detect(
            &g,
            "m.ts",
            "export function f(a, b) {}\nexport class C { constructor(a) {} }",
            "export function f(x, y) {}\nexport class C { constructor(a, b) {} }",
        );
        assert!(changes.is_empty(), "{changes:?}");
    }

    #[test]
    fn test_wildcard_reexport_removal_ignored() {
        let g = graph(&[("index.ts", ""), ("u.ts", "import * as all from './index';")]);
        let changes = detect(&g, "index.ts", "export * from './a';", "");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_type_only_wildcard_removal_ignored() {
        let g = graph(&[("types.ts", ""), ("u.ts", "import * as t from './types';")]);
        let changes = detect(&g, "types.ts", "export type * from './shapes';", "");
        assert!(changes.is_empty(), "{changes:?}");
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(parameter_count("export function f() {"), Some(0));
        assert_eq!(parameter_count("export function f(  ) {"), Some(0));
        assert_eq!(parameter_count("export function f(a) {"), Some(1));
        assert_eq!(parameter_count("export function f(a, b: number) {"), Some(2));
        assert_eq!(parameter_count("export function f(cb: (x) => void, y) {"), Some(2));
        assert_eq!(parameter_count("export function f(a,"), Some(2), "runs to end of line");
        assert_eq!(parameter_count("export const x = 1;"), None);
        // Documented over-count on bracketed defaults.
        assert_eq!(parameter_count("export function f(a = [1, 2]) {"), Some(2));
    }
}
