mod cli;
mod output;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use impact_graph::{ImpactAnalyzer, ImpactOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Impact {
            root,
            targets,
            max_depth,
            exclude,
            include_tests,
            against,
            json,
        } => {
            let analyzer = ImpactAnalyzer::new(&root);
            let defaults = analyzer.default_options();
            let options = ImpactOptions {
                max_depth: max_depth.unwrap_or(defaults.max_depth),
                exclude_patterns: exclude,
                include_tests,
            };

            let result = match against {
                Some(old_path) => {
                    let [target] = targets.as_slice() else {
                        bail!("--against needs exactly one target, got {}", targets.len());
                    };
                    let old = read_text(&old_path)?;
                    let new = read_text(&root.join(target))?;
                    analyzer.analyze_change(target, &old, &new, &options)?
                }
                None => analyzer.analyze_impact(&targets, &options)?,
            };

            if json {
                output::print_json(&result)?;
            } else {
                output::print_impact(&result);
            }
        }

        Commands::Breaking {
            root,
            file,
            old,
            new,
            json,
        } => {
            let analyzer = ImpactAnalyzer::new(&root);
            let old_text = read_text(&old)?;
            let new_text = match new {
                Some(path) => read_text(&path)?,
                None => read_text(&root.join(&file))?,
            };
            let changes = analyzer.detect_breaking_changes(&file, &old_text, &new_text)?;

            if json {
                output::print_json(&changes)?;
            } else {
                output::print_breaking(&changes);
            }
        }

        Commands::Stats { root, json } => {
            let analyzer = ImpactAnalyzer::new(&root);
            analyzer
                .build_graph(false)
                .with_context(|| format!("failed to index {}", root.display()))?;
            let stats = analyzer.get_graph_stats();

            if json {
                output::print_json(&stats)?;
            } else {
                output::print_stats(&stats);
            }
        }

        Commands::Cycles { root, json } => {
            let analyzer = ImpactAnalyzer::new(&root);
            let cycles = analyzer.find_cycles()?;

            if json {
                output::print_json(&cycles)?;
            } else {
                output::print_cycles(&cycles);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for JSON consumers.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
