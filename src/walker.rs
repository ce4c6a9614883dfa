use std::path::{Path, PathBuf};

use crate::config::ImpactConfig;
use crate::error::{ImpactError, Result};
use crate::resolver::file_resolver::relative_key;

/// Enumerates candidate source files under a project root.
///
/// Filtering is by extension allow-list and directory-name exclude list, plus
/// `.gitignore` rules and any extra glob patterns from the config. Every call to
/// [`SourceScanner::walk`] starts a fresh walk, so the sequence is restartable.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl SourceScanner {
    pub fn new(root: &Path, config: &ImpactConfig) -> Self {
        let exclude_patterns = config
            .exclude
            .iter()
            .flatten()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::warn!("ignoring invalid exclude pattern {p:?}: {err}");
                    None
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            extensions: config.extensions(),
            excluded_dirs: config.excluded_dirs(),
            exclude_patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extensions in probe order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Fails when the root itself cannot be listed. Unreadable subdirectories are
    /// not checked here; the walk skips them.
    pub fn ensure_root_readable(&self) -> Result<()> {
        std::fs::read_dir(&self.root)
            .map(|_| ())
            .map_err(|source| ImpactError::RootUnreadable {
                path: self.root.clone(),
                source,
            })
    }

    /// Lazily yield root-relative, `/`-separated keys of every source file.
    ///
    /// Entries are visited in file-name order so repeated walks over an unchanged
    /// tree yield the same sequence.
    pub fn walk(&self) -> impl Iterator<Item = String> + '_ {
        let excluded_dirs = self.excluded_dirs.clone();
        let walker = ignore::WalkBuilder::new(&self.root)
            .standard_filters(true)
            // Dot-directories such as `.storybook/` hold real sources; VCS and tool
            // caches are covered by the excluded-dir list instead.
            .hidden(false)
            // Read .gitignore files even when the directory is not inside a git repository.
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                !(is_dir
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded_dirs.iter().any(|d| d == name)))
            })
            .build();

        walker.filter_map(move |result| {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry: {err}");
                    return None;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                return None;
            }

            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.extensions.iter().any(|allowed| allowed == ext) {
                return None;
            }

            let key = relative_key(&self.root, path)?;
            if self.is_excluded(&key) {
                tracing::debug!(file = %key, "excluded by config pattern");
                return None;
            }
            Some(key)
        })
    }

    /// Returns true if `key` matches any exclusion pattern, either as a whole
    /// path or on a single component.
    fn is_excluded(&self, key: &str) -> bool {
        self.exclude_patterns.iter().any(|pattern| {
            pattern.matches(key) || key.split('/').any(|component| pattern.matches(component))
        })
    }
}
