//! Markdown dependency report
//!
//! Renders an [`Analysis`] into the document checked into the cluster
//! repository. Every section iterates in sorted order so the same input
//! always renders byte-identical output.

use crate::domain::{Analysis, NodeKey};

pub const REPORT_TITLE: &str = "# Flux Kustomization Dependencies";

const FOOTER: &str = "*Generated automatically by the Flux Kustomization Dependency Visualizer*";

/// Markdown renderer over a finished analysis
pub struct MarkdownReport<'a> {
    analysis: &'a Analysis,
    lines: Vec<String>,
}

impl<'a> MarkdownReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            lines: Vec::new(),
        }
    }

    /// Renders the full document
    pub fn render(mut self) -> String {
        self.header();
        self.namespace_summary();
        self.dependency_overview();
        self.deployment_order();
        self.dependency_matrix();
        self.missing_dependencies();
        self.cycles();
        self.file_locations();

        self.push("---");
        self.push(FOOTER);
        self.lines.join("\n")
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Inline code for a key, as displayed everywhere in the report
    fn code(key: &NodeKey) -> String {
        format!("`{}`", key)
    }

    fn header(&mut self) {
        let total = self.analysis.graph.len();

        self.push(REPORT_TITLE);
        self.blank();
        self.push("This document shows the dependency relationships between all Flux Kustomizations in the cluster.");
        self.blank();
        self.push(format!("**Total Kustomizations:** {}", total));
        self.blank();

        self.push("## Table of Contents");
        self.blank();
        self.push("1. [Summary by Namespace](#summary-by-namespace)");
        self.push("2. [Complete Dependency Overview](#complete-dependency-overview)");
        self.push("3. [Deployment Order (Dependency Hierarchy)](#deployment-order-dependency-hierarchy)");
        self.push("4. [Detailed Dependency Matrix](#detailed-dependency-matrix)");
        self.push("5. [File Locations](#file-locations)");
        self.blank();
    }

    fn namespace_summary(&mut self) {
        self.push("## Summary by Namespace");
        self.blank();
        self.push("| Namespace | Kustomizations | Count |");
        self.push("|-----------|----------------|-------|");

        for (namespace, names) in self.analysis.graph.namespaces() {
            self.push(format!(
                "| `{}` | {} | {} |",
                namespace,
                names.join(", "),
                names.len()
            ));
        }
        self.blank();
    }

    fn dependency_overview(&mut self) {
        self.push("## Complete Dependency Overview");
        self.blank();
        self.push("This section shows all dependencies (direct and indirect) for each kustomization.");
        self.blank();

        let analysis = self.analysis;
        for key in analysis.graph.sorted_keys() {
            self.push(format!("### {}", key));
            self.blank();

            let closure = match analysis.closure(&key) {
                Some(closure) if !closure.is_empty() => closure,
                _ => {
                    self.push("**Dependencies:** *None (root level)*");
                    self.blank();
                    continue;
                }
            };

            self.push(format!("**Total Dependencies:** {}", closure.len()));
            self.blank();

            if let Some(chain) = analysis.chain(&key).filter(|c| !c.is_empty()) {
                self.push("**Dependency Chain:**");
                self.blank();
                for (layer, keys) in chain {
                    if keys.is_empty() {
                        continue;
                    }
                    let label = if *layer == 0 {
                        "Direct".to_string()
                    } else {
                        format!("Level {}", layer + 1)
                    };
                    let rendered: Vec<_> = keys.iter().map(Self::code).collect();
                    self.push(format!("- **{}:** {}", label, rendered.join(", ")));
                }
                self.blank();
            }

            let flat: Vec<_> = closure.iter().map(Self::code).collect();
            self.push("**All Dependencies (flat list):**");
            self.push(flat.join(", "));
            self.blank();
            self.blank();
        }
    }

    fn deployment_order(&mut self) {
        self.push("## Deployment Order (Dependency Hierarchy)");
        self.blank();
        self.push("This shows the deployment order based on dependencies. Items at the top are deployed first.");
        self.blank();

        let analysis = self.analysis;
        for (level, keys) in analysis.levels.by_level() {
            self.push(format!("### Level {}", level));
            if level == 0 {
                self.push("*Root level - no dependencies*");
            } else {
                self.push(format!("*Depends on items from level {} and below*", level - 1));
            }
            self.blank();

            for key in &keys {
                let node = match analysis.graph.node(key) {
                    Some(node) => node,
                    None => continue,
                };
                self.push(format!("- **{}**", key));
                self.push(format!("  - *File:* `{}`", node.source_location));
                self.push(format!("  - *Path:* `{}`", node.path));

                let deps = analysis.graph.dependencies(key);
                if !deps.is_empty() {
                    let rendered: Vec<_> = deps
                        .iter()
                        .map(|dep| {
                            if analysis.graph.contains(dep) {
                                Self::code(dep)
                            } else {
                                format!("`{}` ⚠️ *not found*", dep)
                            }
                        })
                        .collect();
                    self.push(format!("  - *Dependencies:* {}", rendered.join(", ")));
                }
            }
            self.blank();
        }
    }

    fn dependency_matrix(&mut self) {
        self.push("## Detailed Dependency Matrix");
        self.blank();
        self.push("| Kustomization | Namespace | Dependencies | Dependents |");
        self.push("|---------------|-----------|--------------|------------|");

        let analysis = self.analysis;
        let graph = &analysis.graph;
        for key in graph.sorted_keys() {
            let deps = graph.dependencies(&key);
            let deps_str = if deps.is_empty() {
                "*None*".to_string()
            } else {
                deps.iter()
                    .map(|dep| {
                        if graph.contains(dep) {
                            Self::code(dep)
                        } else {
                            format!("`{}` ⚠️", dep)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("<br>")
            };

            let dependents = graph.dependents(&key);
            let dependents_str = if dependents.is_empty() {
                "*None*".to_string()
            } else {
                dependents
                    .iter()
                    .filter(|dep| graph.contains(dep))
                    .map(Self::code)
                    .collect::<Vec<_>>()
                    .join("<br>")
            };

            self.push(format!(
                "| `{}` | `{}` | {} | {} |",
                key.name(),
                key.namespace(),
                deps_str,
                dependents_str
            ));
        }
        self.blank();
    }

    fn missing_dependencies(&mut self) {
        if self.analysis.missing.is_empty() {
            return;
        }

        self.push("## ⚠️ Missing Dependencies");
        self.blank();
        self.push("The following dependencies are referenced but not found:");
        self.blank();
        let analysis = self.analysis;
        for key in &analysis.missing {
            self.push(format!("- {}", Self::code(key)));
        }
        self.blank();
    }

    fn cycles(&mut self) {
        if self.analysis.cycles.is_empty() {
            return;
        }

        self.push("## ⚠️ Dependency Cycles");
        self.blank();
        self.push("The following Kustomizations depend on each other in a cycle. Their levels above are approximate:");
        self.blank();
        let analysis = self.analysis;
        for cycle in &analysis.cycles {
            let rendered: Vec<_> = cycle.iter().map(Self::code).collect();
            self.push(format!("- {}", rendered.join(" ↔ ")));
        }
        self.blank();
    }

    fn file_locations(&mut self) {
        self.push("## File Locations");
        self.blank();
        self.push("| Kustomization | File Path |");
        self.push("|---------------|-----------|");

        let analysis = self.analysis;
        for node in analysis.graph.sorted_keys().iter().filter_map(|k| analysis.graph.node(k)) {
            self.push(format!("| `{}` | `{}` |", node.key, node.source_location));
        }
        self.blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Declaration, DependencyGraph, DependencyRef};

    fn render(decls: &[Declaration]) -> String {
        let analysis = Analysis::run(DependencyGraph::from_declarations(decls));
        MarkdownReport::new(&analysis).render()
    }

    fn sample() -> Vec<Declaration> {
        vec![
            Declaration::new("apps", "web")
                .with_path("./apps/web")
                .with_source("kubernetes/apps/web/ks.yaml")
                .depends_on(DependencyRef::new("db"))
                .depends_on(DependencyRef::in_namespace("ghost", "infra")),
            Declaration::new("apps", "db")
                .with_source("kubernetes/apps/db/ks.yaml")
                .depends_on(DependencyRef::new("storage")),
            Declaration::new("apps", "storage").with_source("kubernetes/apps/storage/ks.yaml"),
        ]
    }

    #[test]
    fn empty_analysis_renders_skeleton() {
        let md = render(&[]);

        assert!(md.starts_with(REPORT_TITLE));
        assert!(md.contains("**Total Kustomizations:** 0"));
        assert!(!md.contains("Missing Dependencies\n"));
        assert!(md.ends_with(FOOTER));
    }

    #[test]
    fn renders_chain_and_flat_list() {
        let md = render(&sample());

        assert!(md.contains("### apps/web\n\n**Total Dependencies:** 2"));
        assert!(md.contains("- **Direct:** `apps/db`"));
        assert!(md.contains("- **Level 2:** `apps/storage`"));
        assert!(md.contains("**All Dependencies (flat list):**\n`apps/db`, `apps/storage`"));
        assert!(md.contains("### apps/storage\n\n**Dependencies:** *None (root level)*"));
    }

    #[test]
    fn renders_levels_with_dangling_marker() {
        let md = render(&sample());

        assert!(md.contains("### Level 0\n*Root level - no dependencies*"));
        assert!(md.contains("### Level 2\n*Depends on items from level 1 and below*"));
        assert!(md.contains("  - *Dependencies:* `apps/db`, `infra/ghost` ⚠️ *not found*"));
    }

    #[test]
    fn renders_matrix_and_missing_section() {
        let md = render(&sample());

        assert!(md.contains("| `db` | `apps` | `apps/storage` | `apps/web` |"));
        assert!(md.contains("| `web` | `apps` | `apps/db`<br>`infra/ghost` ⚠️ | *None* |"));
        assert!(md.contains("## ⚠️ Missing Dependencies"));
        assert!(md.contains("- `infra/ghost`"));
        assert!(md.contains("| `apps/web` | `kubernetes/apps/web/ks.yaml` |"));
    }

    #[test]
    fn renders_cycle_section_only_for_cycles() {
        assert!(!render(&sample()).contains("Dependency Cycles"));

        let cyclic = vec![
            Declaration::new("ns1", "a").depends_on(DependencyRef::new("b")),
            Declaration::new("ns1", "b").depends_on(DependencyRef::new("a")),
        ];
        let md = render(&cyclic);
        assert!(md.contains("## ⚠️ Dependency Cycles"));
        assert!(md.contains("- `ns1/a` ↔ `ns1/b`"));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render(&sample()), render(&sample()));
    }
}
