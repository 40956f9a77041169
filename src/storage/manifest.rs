//! Flux manifest scanning
//!
//! Walks a directory tree for manifest files (`ks.yaml` by default), reads
//! every YAML document in them, and turns Flux `Kustomization` documents
//! into [`Declaration`]s. A bad file or document is recorded as a
//! [`ScanIssue`] and skipped; it never aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use walkdir::WalkDir;

use crate::domain::{Declaration, DependencyRef};

/// API group prefix of Flux Kustomizations
pub const FLUX_KUSTOMIZE_API: &str = "kustomize.toolkit.fluxcd.io";

/// Kind of the documents the scanner keeps
pub const KUSTOMIZATION_KIND: &str = "Kustomization";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest directory not found: {0}")]
    RootNotFound(PathBuf),
}

/// A problem found while scanning, tied to the file it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    pub file: String,
    pub message: String,
}

/// Declarations found by a scan, in file then document order
#[derive(Debug, Default)]
pub struct ScanResult {
    pub declarations: Vec<Declaration>,
    pub files_scanned: usize,
    pub issues: Vec<ScanIssue>,
}

#[derive(Debug, Deserialize)]
struct KustomizationDoc {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: Spec,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    name: Option<String>,
    namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spec {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    depends_on: Vec<DependencyRef>,
}

/// Scanner over a manifest directory
pub struct ManifestScanner {
    root: PathBuf,
    file_name: String,
}

impl ManifestScanner {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    /// Returns the scanned directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans every manifest file below the root
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root.is_dir() {
            return Err(ManifestError::RootNotFound(self.root.clone()).into());
        }

        let mut result = ScanResult::default();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let file = e
                        .path()
                        .map(|p| self.display_path(p))
                        .unwrap_or_else(|| self.root.display().to_string());
                    result.issues.push(ScanIssue {
                        file,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != self.file_name.as_str() {
                continue;
            }

            result.files_scanned += 1;
            let source = self.display_path(entry.path());

            match fs::read_to_string(entry.path()) {
                Ok(content) => {
                    let (declarations, messages) = parse_documents(&content, &source);
                    result.declarations.extend(declarations);
                    result.issues.extend(messages.into_iter().map(|message| ScanIssue {
                        file: source.clone(),
                        message,
                    }));
                }
                Err(e) => result.issues.push(ScanIssue {
                    file: source,
                    message: format!("Failed to read file: {}", e),
                }),
            }
        }

        Ok(result)
    }

    /// Path shown in reports: relative to the parent of the scanned root
    fn display_path(&self, path: &Path) -> String {
        let base = self.root.parent().unwrap_or(&self.root);
        let rel = path.strip_prefix(base).unwrap_or(path);
        let mut s = rel.to_string_lossy().to_string();
        if std::path::MAIN_SEPARATOR != '/' {
            s = s.replace(std::path::MAIN_SEPARATOR, "/");
        }
        s
    }
}

/// Parses every document in a manifest file
///
/// Returns the Flux Kustomizations found plus one message per document
/// that was relevant but unusable. A YAML syntax error ends the file.
pub fn parse_documents(content: &str, source: &str) -> (Vec<Declaration>, Vec<String>) {
    let mut declarations = Vec::new();
    let mut messages = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                messages.push(format!("Invalid YAML in document {}: {}", index + 1, e));
                break;
            }
        };

        if !is_flux_kustomization(&value) {
            continue;
        }

        match to_declaration(value, source) {
            Ok(declaration) => declarations.push(declaration),
            Err(message) => messages.push(format!("Document {}: {}", index + 1, message)),
        }
    }

    (declarations, messages)
}

fn is_flux_kustomization(value: &Value) -> bool {
    value.get("kind").and_then(Value::as_str) == Some(KUSTOMIZATION_KIND)
        && value
            .get("apiVersion")
            .and_then(Value::as_str)
            .is_some_and(|api| api.starts_with(FLUX_KUSTOMIZE_API))
}

fn to_declaration(value: Value, source: &str) -> Result<Declaration, String> {
    let doc: KustomizationDoc = serde_yaml::from_value(value).map_err(|e| e.to_string())?;

    let name = doc
        .metadata
        .name
        .filter(|n| !n.is_empty())
        .ok_or("missing metadata.name")?;
    let namespace = doc
        .metadata
        .namespace
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("Kustomization '{}' is missing metadata.namespace", name))?;

    Ok(Declaration {
        name,
        namespace,
        path: doc.spec.path.unwrap_or_default(),
        source_location: source.to_string(),
        depends_on: doc.spec.depends_on,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const APP_KS: &str = r#"---
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: plex
  namespace: media
spec:
  path: ./kubernetes/apps/media/plex/app
  dependsOn:
    - name: storage
    - name: cert-manager
      namespace: cert-manager
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: not-a-kustomization
  namespace: media
---
apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
resources:
  - ./app
"#;

    #[test]
    fn parses_flux_kustomizations_only() {
        let (decls, messages) = parse_documents(APP_KS, "kubernetes/apps/media/plex/ks.yaml");

        assert!(messages.is_empty(), "{:?}", messages);
        assert_eq!(decls.len(), 1);

        let plex = &decls[0];
        assert_eq!(plex.name, "plex");
        assert_eq!(plex.namespace, "media");
        assert_eq!(plex.path, "./kubernetes/apps/media/plex/app");
        assert_eq!(plex.source_location, "kubernetes/apps/media/plex/ks.yaml");
        assert_eq!(
            plex.depends_on,
            vec![
                DependencyRef::new("storage"),
                DependencyRef::in_namespace("cert-manager", "cert-manager"),
            ]
        );
    }

    #[test]
    fn missing_spec_fields_default() {
        let yaml = r#"
apiVersion: kustomize.toolkit.fluxcd.io/v1beta2
kind: Kustomization
metadata:
  name: bare
  namespace: flux-system
spec: {}
"#;
        let (decls, messages) = parse_documents(yaml, "ks.yaml");
        assert!(messages.is_empty());
        assert_eq!(decls[0].path, "");
        assert!(decls[0].depends_on.is_empty());
    }

    #[test]
    fn missing_namespace_is_reported_and_skipped() {
        let yaml = r#"
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: orphan
spec:
  path: ./x
---
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: fine
  namespace: ns
"#;
        let (decls, messages) = parse_documents(yaml, "ks.yaml");

        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "fine");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("orphan"));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let (decls, messages) = parse_documents("kind: [unclosed", "ks.yaml");
        assert!(decls.is_empty());
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn empty_documents_are_skipped() {
        let (decls, messages) = parse_documents("---\n---\n", "ks.yaml");
        assert!(decls.is_empty());
        assert!(messages.is_empty());
    }

    #[test]
    fn scan_walks_tree_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubernetes");

        let write = |rel: &str, name: &str, namespace: &str| {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(
                &path,
                format!(
                    "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: {}\n  namespace: {}\n",
                    name, namespace
                ),
            )
            .unwrap();
        };

        write("apps/b/ks.yaml", "b", "apps");
        write("apps/a/ks.yaml", "a", "apps");
        write("apps/a/other.yaml", "ignored", "apps");
        fs::write(root.join("apps/a/app.yaml"), "::: not yaml").unwrap();

        let result = ManifestScanner::new(&root, "ks.yaml").scan().unwrap();

        assert_eq!(result.files_scanned, 2);
        assert!(result.issues.is_empty());
        let names: Vec<_> = result.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            result.declarations[0].source_location,
            "kubernetes/apps/a/ks.yaml"
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let scanner = ManifestScanner::new(dir.path().join("nope"), "ks.yaml");
        assert!(scanner.scan().is_err());
    }
}
