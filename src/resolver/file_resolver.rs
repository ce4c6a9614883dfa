use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// The outcome of resolving a single import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Resolved to the canonical key of an indexed file.
    Resolved(String),
    /// Resolved to the importing file itself. Treated as a no-op edge.
    SelfReference,
    /// Bare or absolute specifier: a package, builtin or alias. Never an edge.
    External,
    /// Relative specifier with no indexed file at any probed location.
    Unresolved,
}

/// Returns `true` for `./x`, `../x`, `.` and `..` specifiers.
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Convert an on-disk path under `root` into a `/`-separated relative key.
///
/// Returns `None` when `path` is not under `root`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Absolute form of `path`: canonicalized when it exists, otherwise joined to
/// the current directory. Falls back to `path` unchanged.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically normalise a `/`-separated path: drop `.` and empty segments and
/// fold `..` into its parent.
///
/// Returns `None` if the path climbs above its starting point.
pub fn normalize(path: &str) -> Option<String> {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop()?;
            }
            s => out.push(s),
        }
    }
    Some(out.join("/"))
}

/// Turn caller-supplied file names (absolute, `./`-prefixed, or `\`-separated)
/// into canonical node keys.
///
/// Absolute inputs are matched against the absolute form of `root`, so a
/// relative root such as `.` still accepts absolute targets.
pub fn canonical_key(root: &Path, input: &str) -> Option<String> {
    let as_path = Path::new(input);
    if as_path.is_absolute() {
        return relative_key(root, as_path)
            .or_else(|| relative_key(&absolute_path(root), as_path))
            .or_else(|| relative_key(&absolute_path(root), &absolute_path(as_path)));
    }
    let unified = input.replace('\\', "/");
    normalize(&unified).filter(|key| !key.is_empty())
}

/// Resolve a relative `specifier` written in `importer` against the set of
/// indexed keys.
///
/// Probe order: the exact joined path, then `path.<ext>` for each extension,
/// then `path/index.<ext>` for each extension. The first indexed key wins.
pub fn resolve_specifier(
    importer: &str,
    specifier: &str,
    known: &BTreeSet<String>,
    extensions: &[String],
) -> ResolutionOutcome {
    if !is_relative(specifier) {
        return ResolutionOutcome::External;
    }

    let dir = match importer.rfind('/') {
        Some(idx) => &importer[..idx],
        None => "",
    };
    let joined = if dir.is_empty() {
        specifier.to_owned()
    } else {
        format!("{dir}/{specifier}")
    };
    let base = match normalize(&joined) {
        Some(b) => b,
        None => return ResolutionOutcome::Unresolved,
    };

    let with_ext = extensions.iter().map(|ext| format!("{base}.{ext}"));
    let index = extensions.iter().map(|ext| {
        if base.is_empty() {
            format!("index.{ext}")
        } else {
            format!("{base}/index.{ext}")
        }
    });

    std::iter::once(base.clone())
        .chain(with_ext)
        .chain(index)
        .find(|candidate| known.contains(candidate))
        .map(|target| {
            if target == importer {
                ResolutionOutcome::SelfReference
            } else {
                ResolutionOutcome::Resolved(target)
            }
        })
        .unwrap_or(ResolutionOutcome::Unresolved)
}
