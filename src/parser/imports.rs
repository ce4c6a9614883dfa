use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::line_of_offset;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// The shape of an import declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `import { a, b as c } from './m'` (optionally with a leading default binding).
    Named,
    /// `import X from './m'`
    Default,
    /// `import * as ns from './m'`, and `export * from './m'`.
    Namespace,
    /// `import './m'`
    SideEffect,
}

/// One import (or re-export) declaration extracted from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReference {
    /// The module specifier exactly as written, e.g. `"react"` or `"../util"`.
    pub source_specifier: String,
    /// Canonical key of the imported file. `None` for external, unresolved and
    /// self-referencing specifiers.
    pub resolved_target: Option<String>,
    /// Names imported from the target, by their exported name. A default binding
    /// is recorded as `default`. Empty for namespace and side-effect forms.
    pub imported_symbols: Vec<String>,
    pub import_kind: ImportKind,
    /// 1-based line of the `import`/`export` keyword.
    pub source_line: usize,
}

impl ImportReference {
    /// True when this declaration makes `symbol` of the target visible to the importer.
    pub fn references_symbol(&self, symbol: &str) -> bool {
        self.import_kind == ImportKind::Namespace || self.imported_symbols.iter().any(|s| s == symbol)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `import [type] <clause> from '<spec>'`. Only a brace group may span lines; the
/// statement itself must start a line.
const IMPORT_FROM: &str = r#"(?m)^[ \t]*import[ \t]+(?:type[ \t]+)?(?P<clause>(?:[\w$]+[ \t]*,[ \t]*)?\{[^}]*\}|[\w$]+(?:[ \t]*,[ \t]*\*[ \t]*as[ \t]+[\w$]+)?|\*[ \t]*as[ \t]+[\w$]+)\s*\bfrom\b\s*['"](?P<spec>[^'"\n]+)['"]"#;

/// `import '<spec>'`
const IMPORT_SIDE_EFFECT: &str = r#"(?m)^[ \t]*import[ \t]*['"](?P<spec>[^'"\n]+)['"]"#;

/// `export [type] { ... } from '<spec>'`, `export * [as ns] from '<spec>'`
const REEXPORT_FROM: &str = r#"(?m)^[ \t]*export[ \t]+(?:type[ \t]+)?(?P<clause>\*(?:[ \t]+as[ \t]+[\w$]+)?|\{[^}]*\})\s*\bfrom\b\s*['"](?P<spec>[^'"\n]+)['"]"#;

static IMPORT_FROM_RE: OnceLock<Regex> = OnceLock::new();
static IMPORT_SIDE_EFFECT_RE: OnceLock<Regex> = OnceLock::new();
static REEXPORT_FROM_RE: OnceLock<Regex> = OnceLock::new();

fn import_from_re() -> &'static Regex {
    IMPORT_FROM_RE.get_or_init(|| Regex::new(IMPORT_FROM).expect("invalid import pattern"))
}

fn side_effect_re() -> &'static Regex {
    IMPORT_SIDE_EFFECT_RE
        .get_or_init(|| Regex::new(IMPORT_SIDE_EFFECT).expect("invalid side-effect import pattern"))
}

fn reexport_re() -> &'static Regex {
    REEXPORT_FROM_RE.get_or_init(|| Regex::new(REEXPORT_FROM).expect("invalid re-export pattern"))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract import declarations from `text`, ordered by position.
///
/// Re-export statements are reported as imports too, since the re-exporting file
/// depends on the module it forwards from. Dynamic `import()`, `require()` and
/// conditional forms are not recognised.
pub fn extract_imports(text: &str) -> Vec<ImportReference> {
    let mut found: Vec<(usize, ImportReference)> = Vec::new();

    for caps in import_from_re().captures_iter(text) {
        let (Some(whole), Some(clause), Some(spec)) = (caps.get(0), caps.name("clause"), caps.name("spec"))
        else {
            continue;
        };
        let (import_kind, imported_symbols) = parse_import_clause(clause.as_str());
        found.push((
            whole.start(),
            reference(text, whole.start(), spec.as_str(), import_kind, imported_symbols),
        ));
    }

    for caps in side_effect_re().captures_iter(text) {
        let (Some(whole), Some(spec)) = (caps.get(0), caps.name("spec")) else {
            continue;
        };
        found.push((
            whole.start(),
            reference(text, whole.start(), spec.as_str(), ImportKind::SideEffect, Vec::new()),
        ));
    }

    for caps in reexport_re().captures_iter(text) {
        let (Some(whole), Some(clause), Some(spec)) = (caps.get(0), caps.name("clause"), caps.name("spec"))
        else {
            continue;
        };
        let clause = clause.as_str();
        let (import_kind, imported_symbols) = if clause.starts_with('*') {
            (ImportKind::Namespace, Vec::new())
        } else {
            (ImportKind::Named, brace_names(clause, NameSide::Original))
        };
        found.push((
            whole.start(),
            reference(text, whole.start(), spec.as_str(), import_kind, imported_symbols),
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, r)| r).collect()
}

fn reference(
    text: &str,
    offset: usize,
    specifier: &str,
    import_kind: ImportKind,
    imported_symbols: Vec<String>,
) -> ImportReference {
    ImportReference {
        source_specifier: specifier.to_owned(),
        resolved_target: None,
        imported_symbols,
        import_kind,
        source_line: line_of_offset(text, offset),
    }
}

/// Classify an import clause.
///
/// - `X` -> Default, `[default]`
/// - `{ a, b as c }` -> Named, `[a, b]`
/// - `X, { a }` -> Named, `[default, a]`
/// - `* as ns` / `X, * as ns` -> Namespace, `[]`
fn parse_import_clause(clause: &str) -> (ImportKind, Vec<String>) {
    let clause = clause.trim();

    if clause.contains('*') {
        return (ImportKind::Namespace, Vec::new());
    }

    match clause.find('{') {
        Some(brace) => {
            let default_part = clause[..brace].trim().trim_end_matches(',').trim();
            let mut names = Vec::new();
            if !default_part.is_empty() {
                names.push("default".to_owned());
            }
            names.extend(brace_names(&clause[brace..], NameSide::Original));
            (ImportKind::Named, names)
        }
        None => (ImportKind::Default, vec!["default".to_owned()]),
    }
}

/// Which side of `a as b` to keep.
#[derive(Clone, Copy)]
pub(crate) enum NameSide {
    /// `a`: the name the source module exports.
    Original,
    /// `b`: the name this module binds or exports.
    Alias,
}

/// Split a `{ a, type b, c as d }` group into names.
pub(crate) fn brace_names(group: &str, side: NameSide) -> Vec<String> {
    group
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
            if item.is_empty() {
                return None;
            }
            let mut parts = item.split_whitespace();
            let original = parts.next()?;
            let alias = match (parts.next(), parts.next()) {
                (Some("as"), Some(alias)) => alias,
                _ => original,
            };
            Some(match side {
                NameSide::Original => original.to_owned(),
                NameSide::Alias => alias.to_owned(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
