use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::imports::{NameSide, brace_names};
use super::line_of_offset;

/// Name recorded for `export default ...`.
pub const DEFAULT_EXPORT: &str = "default";
/// Name recorded for `export * from '...'`, which forwards an unknown set of names.
pub const WILDCARD_EXPORT: &str = "*";

/// The category of an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Function,
    Class,
    InterfaceOrType,
    /// `const`/`let`/`var`/`enum` declarations and entries of `export { ... }` lists.
    Const,
    Default,
}

/// One exported symbol extracted from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReference {
    pub symbol_name: String,
    pub export_kind: ExportKind,
    /// 1-based line of the `export` keyword.
    pub source_line: usize,
    pub is_re_export: bool,
    /// The specifier this symbol is forwarded from, for re-exports.
    pub re_export_origin: Option<String>,
}

impl ExportReference {
    pub fn is_wildcard(&self) -> bool {
        self.symbol_name == WILDCARD_EXPORT
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `export default ...`
const EXPORT_DEFAULT: &str = r"(?m)^[ \t]*export[ \t]+default\b";

/// `export [declare] [abstract] [async] <keyword> <name>`; only `function` may carry a `*`.
const EXPORT_DECLARATION: &str = r"(?m)^[ \t]*export[ \t]+(?:declare[ \t]+)?(?:abstract[ \t]+)?(?:async[ \t]+)?(?P<kw>function[ \t]*\*|(?:function|class|interface|type|(?:const[ \t]+)?enum|const|let|var)\b)[ \t]*(?P<name>[A-Za-z_$][\w$]*)";

/// `export [type] { a, b as c } [from '<spec>']`
const EXPORT_LIST: &str = r#"(?m)^[ \t]*export[ \t]+(?:type[ \t]+)?\{(?P<names>[^}]*)\}(?:\s*\bfrom\b\s*['"](?P<spec>[^'"\n]+)['"])?"#;

/// `export [type] * [as ns] from '<spec>'`
const EXPORT_STAR: &str = r#"(?m)^[ \t]*export[ \t]+(?:type[ \t]+)?\*(?:[ \t]+as[ \t]+(?P<alias>[\w$]+))?\s*\bfrom\b\s*['"](?P<spec>[^'"\n]+)['"]"#;

static EXPORT_DEFAULT_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_LIST_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_STAR_RE: OnceLock<Regex> = OnceLock::new();

fn default_re() -> &'static Regex {
    EXPORT_DEFAULT_RE.get_or_init(|| Regex::new(EXPORT_DEFAULT).expect("invalid default export pattern"))
}

fn declaration_re() -> &'static Regex {
    EXPORT_DECLARATION_RE
        .get_or_init(|| Regex::new(EXPORT_DECLARATION).expect("invalid export declaration pattern"))
}

fn list_re() -> &'static Regex {
    EXPORT_LIST_RE.get_or_init(|| Regex::new(EXPORT_LIST).expect("invalid export list pattern"))
}

fn star_re() -> &'static Regex {
    EXPORT_STAR_RE.get_or_init(|| Regex::new(EXPORT_STAR).expect("invalid export star pattern"))
}

fn kind_for_keyword(keyword: &str) -> ExportKind {
    match keyword {
        "function" => ExportKind::Function,
        "class" => ExportKind::Class,
        "interface" | "type" => ExportKind::InterfaceOrType,
        _ => ExportKind::Const,
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract exported symbols from `text`, ordered by position.
///
/// Destructured (`export const { a } = o`) and computed export names are not
/// recognised.
pub fn extract_exports(text: &str) -> Vec<ExportReference> {
    let mut found: Vec<(usize, ExportReference)> = Vec::new();

    for m in default_re().find_iter(text) {
        found.push((
            m.start(),
            export(text, m.start(), DEFAULT_EXPORT, ExportKind::Default, None),
        ));
    }

    for caps in declaration_re().captures_iter(text) {
        let (Some(whole), Some(kw), Some(name)) = (caps.get(0), caps.name("kw"), caps.name("name")) else {
            continue;
        };
        let keyword = kw
            .as_str()
            .trim_end_matches(['*', ' ', '\t'])
            .rsplit([' ', '\t'])
            .next()
            .unwrap_or("");
        found.push((
            whole.start(),
            export(text, whole.start(), name.as_str(), kind_for_keyword(keyword), None),
        ));
    }

    for caps in list_re().captures_iter(text) {
        let (Some(whole), Some(names)) = (caps.get(0), caps.name("names")) else {
            continue;
        };
        let origin = caps.name("spec").map(|s| s.as_str().to_owned());
        for name in brace_names(names.as_str(), NameSide::Alias) {
            let kind = if name == DEFAULT_EXPORT {
                ExportKind::Default
            } else {
                ExportKind::Const
            };
            found.push((whole.start(), export(text, whole.start(), &name, kind, origin.clone())));
        }
    }

    for caps in star_re().captures_iter(text) {
        let (Some(whole), Some(spec)) = (caps.get(0), caps.name("spec")) else {
            continue;
        };
        let name = caps.name("alias").map_or(WILDCARD_EXPORT, |a| a.as_str());
        found.push((
            whole.start(),
            export(text, whole.start(), name, ExportKind::Const, Some(spec.as_str().to_owned())),
        ));
    }

    // Stable: names from one `export { ... }` list keep their written order.
    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, e)| e).collect()
}

fn export(
    text: &str,
    offset: usize,
    name: &str,
    export_kind: ExportKind,
    re_export_origin: Option<String>,
) -> ExportReference {
    ExportReference {
        symbol_name: name.to_owned(),
        export_kind,
        source_line: line_of_offset(text, offset),
        is_re_export: re_export_origin.is_some(),
        re_export_origin,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
