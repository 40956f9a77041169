//! Report generation command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::Analysis;
use crate::report::MarkdownReport;

/// Render the markdown report and write it to `path`
pub fn generate(output: &Output, analysis: &Analysis, path: &Path) -> Result<()> {
    let markdown = MarkdownReport::new(analysis).render();
    output.verbose_ctx(
        "generate",
        &format!("Rendered {} bytes for {}", markdown.len(), path.display()),
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, markdown)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    if !analysis.missing.is_empty() {
        output.warn(&format!(
            "{} dependencies referenced but not found",
            analysis.missing.len()
        ));
    }

    output.success(&format!(
        "Dependency visualization generated: {} ({} Kustomizations)",
        path.display(),
        analysis.graph.len()
    ));

    Ok(())
}
