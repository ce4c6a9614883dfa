use serde::Serialize;

use crate::parser::exports::ExportReference;
use crate::parser::imports::ImportReference;

/// One source file's extracted import/export facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// Root-relative, `/`-separated path.
    pub file: String,
    /// Imports in source order, with `resolved_target` filled in by the resolver.
    pub imports: Vec<ImportReference>,
    /// Exports in source order.
    pub exports: Vec<ExportReference>,
}

impl DependencyNode {
    pub fn new(file: String, imports: Vec<ImportReference>, exports: Vec<ExportReference>) -> Self {
        Self {
            file,
            imports,
            exports,
        }
    }

    /// Imports of this node that resolved to `target`.
    pub fn imports_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a ImportReference> + 'a {
        self.imports
            .iter()
            .filter(move |imp| imp.resolved_target.as_deref() == Some(target))
    }

    /// Distinct symbol names this node imports from `target`, in first-seen order.
    pub fn symbols_imported_from(&self, target: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for imp in self.imports_of(target) {
            for name in &imp.imported_symbols {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }
}
