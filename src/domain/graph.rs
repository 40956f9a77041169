//! Dependency graph for Kustomizations
//!
//! Built once from a snapshot of declarations and read-only afterwards.
//! Dangling references and cycles are legal graph content: the builder
//! never rejects an edge, and the analyzers cope with both.
//!
//! ## Duplicate keys
//!
//! When two declarations share a key, the later one replaces the node
//! (path, source location, its own `dependency_keys`), but the adjacency
//! indexes keep every edge added by either declaration.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::declaration::Declaration;
use super::key::NodeKey;

/// A declared deployable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub key: NodeKey,

    /// Deployment path (`spec.path`)
    pub path: String,

    /// Originating file, for rendering only
    pub source_location: String,

    /// Dependencies listed by the declaration that won for this key
    pub dependency_keys: Vec<NodeKey>,
}

impl Node {
    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn namespace(&self) -> &str {
        self.key.namespace()
    }
}

/// Node set plus forward and reverse adjacency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: HashMap<NodeKey, Node>,

    /// Keys in first-seen order
    order: Vec<NodeKey>,

    /// key -> keys it depends on, declaration order, duplicates kept
    dependencies: HashMap<NodeKey, Vec<NodeKey>>,

    /// key -> keys depending on it, discovery order
    dependents: HashMap<NodeKey, Vec<NodeKey>>,
}

impl DependencyGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from declarations, in order
    pub fn from_declarations<'a>(declarations: impl IntoIterator<Item = &'a Declaration>) -> Self {
        let mut graph = Self::new();
        for declaration in declarations {
            graph.add_declaration(declaration);
        }
        graph
    }

    fn add_declaration(&mut self, declaration: &Declaration) {
        let key = declaration.key();
        let dependency_keys: Vec<NodeKey> = declaration.dependency_keys().collect();

        for dep_key in &dependency_keys {
            self.dependencies
                .entry(key.clone())
                .or_default()
                .push(dep_key.clone());
            self.dependents
                .entry(dep_key.clone())
                .or_default()
                .push(key.clone());
        }

        if !self.nodes.contains_key(&key) {
            self.order.push(key.clone());
        }

        self.nodes.insert(
            key.clone(),
            Node {
                key,
                path: declaration.path.clone(),
                source_location: declaration.source_location.clone(),
                dependency_keys,
            },
        );
    }

    /// Returns the node for a key, if declared
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Returns true if the key was declared
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Returns the number of declared nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was declared
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in first-seen order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|key| self.nodes.get(key))
    }

    /// Iterates keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.order.iter()
    }

    /// Returns all declared keys sorted by namespace, then name
    pub fn sorted_keys(&self) -> Vec<NodeKey> {
        let mut keys = self.order.clone();
        keys.sort();
        keys
    }

    /// Returns the recorded dependencies of a key (dangling entries included)
    pub fn dependencies(&self, key: &NodeKey) -> &[NodeKey] {
        self.dependencies
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns dependencies of a key that point at declared nodes
    pub fn known_dependencies<'a>(
        &'a self,
        key: &NodeKey,
    ) -> impl Iterator<Item = &'a NodeKey> + 'a {
        self.dependencies(key)
            .iter()
            .filter(move |dep| self.contains(dep))
    }

    /// Returns the keys that depend on a key (undeclared dependents included)
    pub fn dependents(&self, key: &NodeKey) -> &[NodeKey] {
        self.dependents
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns nodes that declare no dependencies at all
    pub fn roots(&self) -> Vec<&NodeKey> {
        self.keys()
            .filter(|key| self.dependencies(key).is_empty())
            .collect()
    }

    /// Returns every referenced key that was never declared
    pub fn missing_keys(&self) -> BTreeSet<NodeKey> {
        self.dependencies
            .values()
            .flatten()
            .filter(|dep| !self.contains(dep))
            .cloned()
            .collect()
    }

    /// Groups node names by namespace, names sorted
    pub fn namespaces(&self) -> BTreeMap<String, Vec<String>> {
        let mut namespaces: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for node in self.nodes() {
            namespaces
                .entry(node.namespace().to_string())
                .or_default()
                .push(node.name().to_string());
        }
        for names in namespaces.values_mut() {
            names.sort();
        }
        namespaces
    }

    /// Finds dependency cycles among declared nodes
    ///
    /// Each cycle is a strongly connected component with more than one
    /// member, or a single node that depends on itself. Members are sorted,
    /// and so is the returned list. Analyzer results are unaffected.
    pub fn find_cycles(&self) -> Vec<Vec<NodeKey>> {
        let mut graph: DiGraph<NodeKey, ()> = DiGraph::new();
        let mut node_map: HashMap<&NodeKey, NodeIndex> = HashMap::new();

        for key in &self.order {
            node_map.insert(key, graph.add_node(key.clone()));
        }

        for key in &self.order {
            let from = node_map[key];
            for dep in self.dependencies(key) {
                if let Some(&to) = node_map.get(dep) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        let mut cycles: Vec<Vec<NodeKey>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut keys: Vec<NodeKey> = scc.iter().map(|idx| graph[*idx].clone()).collect();
                keys.sort();
                keys
            })
            .collect();
        cycles.sort();
        cycles
    }
}
