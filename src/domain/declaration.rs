//! Declarations handed to the graph builder
//!
//! One declaration per Kustomization document. The scanner produces these;
//! tests construct them directly.

use serde::{Deserialize, Serialize};

use super::key::NodeKey;

/// A reference to another unit in `spec.dependsOn`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub name: String,

    /// Absent means "same namespace as the declaring unit"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl DependencyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn in_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Resolves to a key, defaulting the namespace to the declaring unit's
    pub fn resolve(&self, declaring_namespace: &str) -> NodeKey {
        let namespace = self.namespace.as_deref().unwrap_or(declaring_namespace);
        NodeKey::new(namespace, self.name.as_str())
    }
}

/// A single declared deployable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub namespace: String,

    /// `spec.path`, carried through untouched
    #[serde(default)]
    pub path: String,

    /// Where the declaration came from (file path)
    #[serde(default)]
    pub source_location: String,

    #[serde(default)]
    pub depends_on: Vec<DependencyRef>,
}

impl Declaration {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            path: String::new(),
            source_location: String::new(),
            depends_on: Vec::new(),
        }
    }

    /// Adds a dependency (builder style)
    pub fn depends_on(mut self, dep: DependencyRef) -> Self {
        self.depends_on.push(dep);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_location = source.into();
        self
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.namespace.as_str(), self.name.as_str())
    }

    /// Dependency keys with the default-namespace rule applied, in declared order
    pub fn dependency_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.depends_on.iter().map(|dep| dep.resolve(&self.namespace))
    }
}
