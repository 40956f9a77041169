//! Shared scan-and-analyze step used by every command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::{Analysis, DependencyGraph};
use crate::storage::ManifestScanner;

/// Scans `dir` for manifests and runs every analyzer over the result
///
/// Scan issues are reported as warnings; only a missing directory fails.
pub fn analyze(output: &Output, dir: &Path, manifest_file: &str) -> Result<Analysis> {
    output.verbose_ctx(
        "scan",
        &format!("Scanning {} for {} files", dir.display(), manifest_file),
    );

    let scan = ManifestScanner::new(dir, manifest_file).scan()?;
    output.verbose_ctx(
        "scan",
        &format!(
            "Read {} files, {} declarations, {} issues",
            scan.files_scanned,
            scan.declarations.len(),
            scan.issues.len()
        ),
    );

    for issue in &scan.issues {
        output.warn(&format!("Error processing {}: {}", issue.file, issue.message));
    }

    let graph = DependencyGraph::from_declarations(&scan.declarations);
    output.verbose_ctx("graph", &format!("Found {} Kustomizations", graph.len()));

    let analysis = Analysis::run(graph);
    output.verbose_ctx(
        "graph",
        &format!(
            "Max level {}, {} missing references, {} cycles",
            analysis.levels.max_level(),
            analysis.missing.len(),
            analysis.cycles.len()
        ),
    );

    Ok(analysis)
}
