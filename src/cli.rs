use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Change-impact analysis for TypeScript/JavaScript codebases.
///
/// impact-graph indexes the import/export declarations of a project into a
/// reverse dependency graph and reports which files are affected by a change.
#[derive(Parser, Debug)]
#[command(
    name = "impact-graph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Increase log verbosity on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the files transitively affected by changing one or more files.
    ///
    /// Performs a breadth-first walk over reverse imports from every target.
    Impact {
        /// Path to the project root.
        root: PathBuf,

        /// Changed files, relative to the root or absolute.
        #[arg(required = true)]
        targets: Vec<String>,

        /// Maximum number of reverse hops (defaults to the config value, 10).
        #[arg(long)]
        max_depth: Option<usize>,

        /// Leave out dependents matching this glob or path prefix. Repeatable.
        #[arg(long = "exclude", value_name = "GLOB")]
        exclude: Vec<String>,

        /// Keep test files in the affected set.
        #[arg(long)]
        include_tests: bool,

        /// Previous version of the single target; adds breaking-change detection
        /// against the target's current contents.
        #[arg(long, value_name = "OLD_FILE")]
        against: Option<PathBuf>,

        /// Output results as JSON instead of compact lines.
        #[arg(long)]
        json: bool,
    },

    /// Report removed or re-shaped exports of a file that break an importer.
    Breaking {
        /// Path to the project root.
        root: PathBuf,

        /// The changed file, relative to the root or absolute.
        file: String,

        /// File holding the previous contents.
        #[arg(long, value_name = "OLD_FILE")]
        old: PathBuf,

        /// File holding the new contents (defaults to the file on disk).
        #[arg(long, value_name = "NEW_FILE")]
        new: Option<PathBuf>,

        /// Output results as JSON instead of compact lines.
        #[arg(long)]
        json: bool,
    },

    /// Graph statistics: files, imports, exports and resolution counts.
    Stats {
        /// Path to the project root.
        root: PathBuf,

        /// Output results as JSON instead of compact lines.
        #[arg(long)]
        json: bool,
    },

    /// Detect circular dependencies between files.
    ///
    /// Uses Kosaraju's SCC algorithm over resolved imports.
    Cycles {
        /// Path to the project root.
        root: PathBuf,

        /// Output results as JSON instead of compact lines.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_args_parse() {
        let cli = Cli::try_parse_from([
            "impact-graph",
            "impact",
            "proj",
            "src/a.ts",
            "src/b.ts",
            "--max-depth",
            "3",
            "--exclude",
            "legacy/**",
            "--exclude",
            "vendor",
            "--json",
        ])
        .expect("parse");

        match cli.command {
            Commands::Impact {
                targets,
                max_depth,
                exclude,
                include_tests,
                json,
                ..
            } => {
                assert_eq!(targets, vec!["src/a.ts", "src/b.ts"]);
                assert_eq!(max_depth, Some(3));
                assert_eq!(exclude, vec!["legacy/**", "vendor"]);
                assert!(!include_tests);
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_impact_requires_a_target() {
        assert!(Cli::try_parse_from(["impact-graph", "impact", "proj"]).is_err());
    }

    #[test]
    fn test_breaking_requires_old() {
        assert!(Cli::try_parse_from(["impact-graph", "breaking", "proj", "a.ts"]).is_err());
        let cli = Cli::try_parse_from(["impact-graph", "-vv", "breaking", "proj", "a.ts", "--old", "a.old.ts"])
            .expect("parse");
        assert_eq!(cli.verbose, 2);
    }
}
