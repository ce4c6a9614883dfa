use anyhow::Result;
use serde::Serialize;

use impact_graph::{BreakingChange, ChangeImpactResult, ChangeType, Cycle, GraphStats, ImpactLevel};

/// Pretty-print any result as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Compact one-line-per-fact rendering of an impact result.
pub fn print_impact(result: &ChangeImpactResult) {
    for detail in &result.details {
        if detail.imported_symbols.is_empty() {
            println!("impact {} depth {}", detail.file, detail.depth);
        } else {
            println!(
                "impact {} depth {} uses {}",
                detail.file,
                detail.depth,
                detail.imported_symbols.join(",")
            );
        }
    }
    println!(
        "{} files affected, level {}",
        result.affected_files.len(),
        level_str(result.impact_level)
    );
    for suggestion in &result.suggestions {
        println!("hint {suggestion}");
    }
    if !result.breaking_changes.is_empty() {
        print_breaking(&result.breaking_changes);
    }
}

pub fn print_breaking(changes: &[BreakingChange]) {
    for change in changes {
        println!(
            "breaking {} {} {} -> {}",
            change_type_str(change.change_type),
            change.file,
            change.symbol,
            change.affected_files.join(",")
        );
    }
    println!("{} breaking changes found", changes.len());
}

pub fn print_stats(stats: &GraphStats) {
    println!("files {}", stats.file_count);
    println!("imports {} exports {}", stats.total_imports, stats.total_exports);
    println!(
        "resolved {} external {} unresolved {}",
        stats.resolved_imports, stats.external_imports, stats.unresolved_imports
    );
    match stats.last_built {
        Some(ts) => println!("built {ts}"),
        None => println!("built never"),
    }
}

pub fn print_cycles(cycles: &[Cycle]) {
    for cycle in cycles {
        println!("cycle {}", cycle.files.join(" -> "));
    }
    println!("{} cycles found", cycles.len());
}

fn level_str(level: ImpactLevel) -> &'static str {
    match level {
        ImpactLevel::Low => "low",
        ImpactLevel::Medium => "medium",
        ImpactLevel::High => "high",
        ImpactLevel::Critical => "critical",
    }
}

fn change_type_str(kind: ChangeType) -> &'static str {
    match kind {
        ChangeType::Removed => "removed",
        ChangeType::SignatureChanged => "signature-changed",
    }
}
