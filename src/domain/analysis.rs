//! Full analysis run
//!
//! Bundles the graph with every derived view a report needs. Levels are
//! computed once up front; closures and chains are computed per declared
//! node.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::chain::{chain_of, Chain};
use super::closure::closure_of;
use super::graph::DependencyGraph;
use super::key::NodeKey;
use super::levels::{self, Levels};

/// Everything known about one declared node
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub key: NodeKey,
    pub path: String,
    pub source_location: String,
    pub level: usize,
    pub dependencies: Vec<NodeKey>,
    pub dependents: Vec<NodeKey>,
    pub closure: BTreeSet<NodeKey>,
    pub chain: Chain,
}

/// Analyzer output over a whole graph
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub levels: Levels,
    pub closures: BTreeMap<NodeKey, BTreeSet<NodeKey>>,
    pub chains: BTreeMap<NodeKey, Chain>,
    pub missing: BTreeSet<NodeKey>,
    pub cycles: Vec<Vec<NodeKey>>,
}

impl Analysis {
    /// Runs every analyzer over the graph
    pub fn run(graph: DependencyGraph) -> Self {
        let levels = levels::compute(&graph);
        let closures = graph
            .keys()
            .map(|key| (key.clone(), closure_of(&graph, key)))
            .collect();
        let chains = graph
            .keys()
            .map(|key| (key.clone(), chain_of(&graph, key)))
            .collect();
        let missing = graph.missing_keys();
        let cycles = graph.find_cycles();

        Self {
            graph,
            levels,
            closures,
            chains,
            missing,
            cycles,
        }
    }

    /// Returns the closure of a declared node
    pub fn closure(&self, key: &NodeKey) -> Option<&BTreeSet<NodeKey>> {
        self.closures.get(key)
    }

    /// Returns the chain of a declared node
    pub fn chain(&self, key: &NodeKey) -> Option<&Chain> {
        self.chains.get(key)
    }

    /// Collects the per-node view for a declared node
    pub fn node_report(&self, key: &NodeKey) -> Option<NodeReport> {
        let node = self.graph.node(key)?;
        Some(NodeReport {
            key: key.clone(),
            path: node.path.clone(),
            source_location: node.source_location.clone(),
            level: self.levels.get(key).unwrap_or(0),
            dependencies: self.graph.dependencies(key).to_vec(),
            dependents: self.graph.dependents(key).to_vec(),
            closure: self.closure(key).cloned().unwrap_or_default(),
            chain: self.chain(key).cloned().unwrap_or_default(),
        })
    }

    /// Per-node views, sorted by key
    pub fn node_reports(&self) -> Vec<NodeReport> {
        self.graph
            .sorted_keys()
            .iter()
            .filter_map(|key| self.node_report(key))
            .collect()
    }

    /// Returns true if no dangling reference or cycle was found
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.cycles.is_empty()
    }
}
