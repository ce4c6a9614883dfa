//! Change-impact analysis for TypeScript/JavaScript source trees.
//!
//! Scans a project, extracts import/export declarations, builds a reverse
//! dependency index and answers "which files are affected if I change these?"
//! and "which of my export changes break an importer?". [`ImpactAnalyzer`] is
//! the entry point; the modules below are usable on their own.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod walker;

pub use analyzer::ImpactAnalyzer;
pub use config::{ImpactConfig, ImpactThresholds};
pub use error::{ImpactError, Result};
pub use graph::DependencyGraph;
pub use parser::{DeclarationExtractor, PatternExtractor};
pub use query::breaking::{BreakingChange, ChangeType};
pub use query::circular::Cycle;
pub use query::impact::{ChangeImpactResult, ImpactDetail, ImpactLevel, ImpactOptions};
pub use query::stats::GraphStats;
