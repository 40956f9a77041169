//! Transitive dependency sets
//!
//! Depth-first expansion where every branch carries its own record of the
//! nodes on its path. A node is only kept from re-expanding along the path
//! that already contains it, so the same node may be expanded again through
//! a sibling branch. On graphs with heavy fan-in this costs more than a
//! globally deduplicated walk; the resulting set is the same.

use std::collections::{BTreeSet, HashSet};

use super::graph::DependencyGraph;
use super::key::NodeKey;

/// Stack entry: a node to expand plus the path that led to it
struct Frame<'g> {
    key: &'g NodeKey,
    path: HashSet<&'g NodeKey>,
}

/// Returns every declared node reachable from `key` through dependency edges
///
/// Dangling references are skipped. The queried key itself is never part
/// of the result, even when it sits on a cycle.
pub fn closure_of(graph: &DependencyGraph, key: &NodeKey) -> BTreeSet<NodeKey> {
    let mut result: BTreeSet<NodeKey> = BTreeSet::new();
    let mut stack = vec![Frame {
        key,
        path: HashSet::new(),
    }];

    while let Some(Frame { key: current, mut path }) = stack.pop() {
        path.insert(current);

        for dep in graph.known_dependencies(current) {
            if dep != key {
                result.insert(dep.clone());
            }
            if !path.contains(dep) {
                stack.push(Frame {
                    key: dep,
                    path: path.clone(),
                });
            }
        }
    }

    result
}
