use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ImpactError, Result};

/// Name of the optional configuration file at the project root.
pub const CONFIG_FILE: &str = "impact-graph.toml";

/// Source extensions probed by the scanner and the resolver, in probe order.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Directory names never descended into: VCS metadata, build output,
/// dependency caches and coverage artifacts.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    "target",
    "coverage",
    ".nyc_output",
    ".cache",
];

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_MAX_DEPTH: usize = 10;

/// Affected-file counts at which each impact level begins.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImpactThresholds {
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    /// From this many affected files on, suggestions recommend a
    /// backward-compatible or deprecation-based rollout.
    pub large_change: usize,
}

impl Default for ImpactThresholds {
    fn default() -> Self {
        Self {
            medium: 4,
            high: 11,
            critical: 26,
            large_change: 11,
        }
    }
}

/// Configuration loaded from `impact-graph.toml` at the project root.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ImpactConfig {
    /// Additional glob patterns to exclude from scanning.
    pub exclude: Option<Vec<String>>,
    /// Directory names excluded in addition to [`DEFAULT_EXCLUDED_DIRS`].
    pub exclude_dirs: Option<Vec<String>>,
    /// Replaces [`DEFAULT_EXTENSIONS`] when set. Order is the probe order.
    pub extensions: Option<Vec<String>>,
    /// Seconds a built graph stays fresh (default 300).
    pub cache_ttl_secs: Option<u64>,
    /// Default traversal depth for impact queries (default 10).
    pub max_depth: Option<usize>,
    pub thresholds: ImpactThresholds,
}

impl ImpactConfig {
    /// Load configuration from `impact-graph.toml` in the given root directory.
    ///
    /// Returns a default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        match Self::try_load(root) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Strict variant of [`ImpactConfig::load`]: a missing file is still the
    /// default config, but read and parse failures are reported.
    pub fn try_load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ImpactError::Config {
            path: config_path.clone(),
            detail: e.to_string(),
        })?;
        toml::from_str::<Self>(&contents).map_err(|e| ImpactError::Config {
            path: config_path,
            detail: e.to_string(),
        })
    }

    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(exts) if !exts.is_empty() => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_owned())
                .collect(),
            _ => DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
        }
    }

    pub fn excluded_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = DEFAULT_EXCLUDED_DIRS.iter().map(|d| (*d).to_owned()).collect();
        if let Some(extra) = &self.exclude_dirs {
            dirs.extend(extra.iter().cloned());
        }
        dirs
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }
}
