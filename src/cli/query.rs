//! Query commands (order, show, missing, cycles, check)

use anyhow::Result;
use thiserror::Error;

use super::output::Output;
use crate::domain::{Analysis, NodeKey};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Kustomization not found: {0}")]
    NotFound(NodeKey),

    #[error("Dependency check failed: {missing} missing reference(s), {cycles} cycle(s)")]
    CheckFailed { missing: usize, cycles: usize },
}

fn join_keys<'a>(keys: impl IntoIterator<Item = &'a NodeKey>) -> String {
    keys.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Show the deployment order, grouped by level
pub fn order(output: &Output, analysis: &Analysis) -> Result<()> {
    let by_level = analysis.levels.by_level();
    output.verbose_ctx("order", &format!("{} levels", by_level.len()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "max_level": analysis.levels.max_level(),
            "levels": by_level,
        }));
    } else if by_level.is_empty() {
        println!("No Kustomizations found.");
    } else {
        for (level, keys) in &by_level {
            if *level == 0 {
                println!("Level 0 (root):");
            } else {
                println!("Level {}:", level);
            }
            for key in keys {
                let path = analysis
                    .graph
                    .node(key)
                    .map(|node| node.path.as_str())
                    .unwrap_or_default();
                println!("  {:<40} {}", key.to_string(), path);
            }
        }
    }

    Ok(())
}

/// Show everything known about one Kustomization
pub fn show(output: &Output, analysis: &Analysis, key_str: &str) -> Result<()> {
    let key: NodeKey = key_str.parse()?;
    let report = analysis
        .node_report(&key)
        .ok_or_else(|| QueryError::NotFound(key.clone()))?;

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    println!("{}", report.key);
    println!("{}", "=".repeat(40));
    println!("File:  {}", report.source_location);
    println!("Path:  {}", report.path);
    println!("Level: {}", report.level);
    println!();

    if report.dependencies.is_empty() {
        println!("Dependencies: none");
    } else {
        println!("Dependencies:");
        for dep in &report.dependencies {
            if analysis.graph.contains(dep) {
                println!("  {}", dep);
            } else {
                println!("  {} (not found)", dep);
            }
        }
    }

    if report.dependents.is_empty() {
        println!("Dependents: none");
    } else {
        println!("Dependents:");
        for dependent in &report.dependents {
            println!("  {}", dependent);
        }
    }

    if !report.chain.is_empty() {
        println!();
        println!("Dependency chain:");
        for (layer, keys) in &report.chain {
            let label = if *layer == 0 {
                "Direct".to_string()
            } else {
                format!("Level {}", layer + 1)
            };
            println!("  {:<8} {}", format!("{}:", label), join_keys(keys));
        }
        println!();
        println!(
            "All dependencies ({}): {}",
            report.closure.len(),
            join_keys(&report.closure)
        );
    }

    Ok(())
}

/// List dangling dependency references and who makes them
pub fn missing(output: &Output, analysis: &Analysis) -> Result<()> {
    output.verbose_ctx(
        "missing",
        &format!("Found {} missing references", analysis.missing.len()),
    );

    if output.is_json() {
        let items: Vec<_> = analysis
            .missing
            .iter()
            .map(|key| {
                serde_json::json!({
                    "key": key,
                    "referenced_by": analysis.graph.dependents(key),
                })
            })
            .collect();
        output.data(&items);
    } else if analysis.missing.is_empty() {
        println!("No missing dependencies.");
    } else {
        println!("Missing dependencies ({}):", analysis.missing.len());
        println!("{:<40} REFERENCED BY", "KEY");
        println!("{}", "-".repeat(80));
        for key in &analysis.missing {
            println!(
                "{:<40} {}",
                key.to_string(),
                join_keys(analysis.graph.dependents(key))
            );
        }
    }

    Ok(())
}

/// List dependency cycles
pub fn cycles(output: &Output, analysis: &Analysis) -> Result<()> {
    output.verbose_ctx("cycles", &format!("Found {} cycles", analysis.cycles.len()));

    if output.is_json() {
        output.data(&analysis.cycles);
    } else if analysis.cycles.is_empty() {
        println!("No dependency cycles.");
    } else {
        println!("Dependency cycles ({}):", analysis.cycles.len());
        for cycle in &analysis.cycles {
            println!("  {}", join_keys(cycle));
        }
    }

    Ok(())
}

/// Fail when the graph has dangling references or cycles
pub fn check(output: &Output, analysis: &Analysis) -> Result<()> {
    let missing = analysis.missing.len();
    let cycles = analysis.cycles.len();

    if output.is_json() {
        output.data(&serde_json::json!({
            "kustomizations": analysis.graph.len(),
            "missing": analysis.missing,
            "cycles": analysis.cycles,
            "ok": analysis.is_clean(),
        }));
    } else {
        println!("Kustomizations: {}", analysis.graph.len());
        println!("Missing dependencies: {}", missing);
        for key in &analysis.missing {
            println!("  {}", key);
        }
        println!("Cycles: {}", cycles);
        for cycle in &analysis.cycles {
            println!("  {}", join_keys(cycle));
        }
    }

    if analysis.is_clean() {
        Ok(())
    } else {
        Err(QueryError::CheckFailed { missing, cycles }.into())
    }
}
