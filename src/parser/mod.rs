pub mod exports;
pub mod imports;

use exports::ExportReference;
use imports::ImportReference;

/// Extracts module declarations from the text of one file.
///
/// Both methods are deterministic and return declarations in source order.
/// Graph building and impact queries only see the returned records, so a real
/// parser can replace [`PatternExtractor`] without touching them.
pub trait DeclarationExtractor: Send + Sync {
    fn extract_imports(&self, text: &str) -> Vec<ImportReference>;
    fn extract_exports(&self, text: &str) -> Vec<ExportReference>;
}

/// Line-anchored regex extraction of ES module declarations.
///
/// Recognises the canonical shapes only: named, default, namespace and
/// side-effect imports; function/class/interface/type/const exports, export
/// lists, re-exports and default exports. Dynamic `import()`, `require()`,
/// conditional and computed declarations yield nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl DeclarationExtractor for PatternExtractor {
    fn extract_imports(&self, text: &str) -> Vec<ImportReference> {
        imports::extract_imports(text)
    }

    fn extract_exports(&self, text: &str) -> Vec<ExportReference> {
        exports::extract_exports(text)
    }
}

/// 1-based line number containing byte `offset` of `text`.
pub(crate) fn line_of_offset(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
