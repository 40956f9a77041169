//! Layered dependency chains
//!
//! Breadth-first view of a node's dependencies: layer 0 holds the direct
//! dependencies, layer `n` the dependencies first reached from layer `n - 1`.
//! Each node shows up once per query, at the shallowest layer reaching it.

use std::collections::{BTreeMap, HashSet};

use super::graph::DependencyGraph;
use super::key::NodeKey;

/// Layer index -> keys first discovered at that layer, in discovery order
pub type Chain = BTreeMap<usize, Vec<NodeKey>>;

/// Computes the layered dependency chain for `key`
///
/// Only declared nodes appear. The queried key is treated as already seen,
/// so it never appears in its own chain even when it sits on a cycle.
pub fn chain_of(graph: &DependencyGraph, key: &NodeKey) -> Chain {
    let mut chain = Chain::new();
    let mut seen: HashSet<&NodeKey> = HashSet::new();
    seen.insert(key);

    let mut frontier: Vec<&NodeKey> = Vec::new();
    for dep in graph.known_dependencies(key) {
        if seen.insert(dep) {
            frontier.push(dep);
        }
    }

    let mut layer = 0;
    while !frontier.is_empty() {
        let mut next: Vec<&NodeKey> = Vec::new();
        for current in &frontier {
            for dep in graph.known_dependencies(current) {
                if seen.insert(dep) {
                    next.push(dep);
                }
            }
        }

        chain.insert(layer, frontier.into_iter().cloned().collect());
        frontier = next;
        layer += 1;
    }

    chain
}
