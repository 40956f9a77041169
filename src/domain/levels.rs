//! Deployment levels
//!
//! A node's level is the length of the longest chain of declared
//! dependencies beneath it: roots sit at 0, everything else at one more than
//! its deepest known dependency. Dangling dependencies are ignored.
//!
//! Cycles are not resolved. When the traversal reaches a node that is still
//! being evaluated, it uses whatever level is recorded for it so far, which
//! is 0 for a node still in progress. The result is a best-effort ordering
//! that never loops; use [`DependencyGraph::find_cycles`] to detect when it
//! is approximate.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::graph::DependencyGraph;
use super::key::NodeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Resolved(usize),
}

impl VisitState {
    /// Level observed by a caller revisiting this node
    fn recorded_level(self) -> usize {
        match self {
            VisitState::InProgress => 0,
            VisitState::Resolved(level) => level,
        }
    }
}

/// One pending evaluation on the traversal stack
struct Frame<'g> {
    key: &'g NodeKey,
    next_dep: usize,
    deepest: Option<usize>,
}

/// Level of every declared node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Levels(BTreeMap<NodeKey, usize>);

impl Levels {
    /// Returns the level of a declared node
    pub fn get(&self, key: &NodeKey) -> Option<usize> {
        self.0.get(key).copied()
    }

    /// Returns the deepest level, 0 for an empty graph
    pub fn max_level(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Groups keys by level, keys sorted within each level
    pub fn by_level(&self) -> BTreeMap<usize, Vec<NodeKey>> {
        let mut grouped: BTreeMap<usize, Vec<NodeKey>> = BTreeMap::new();
        for (key, level) in &self.0 {
            grouped.entry(*level).or_default().push(key.clone());
        }
        grouped
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, usize)> {
        self.0.iter().map(|(key, level)| (key, *level))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes levels for every declared node
///
/// Nodes are entered in first-seen order, so results involving cycles are
/// deterministic for a given input sequence.
pub fn compute(graph: &DependencyGraph) -> Levels {
    let mut state: HashMap<&NodeKey, VisitState> = HashMap::new();

    for key in graph.keys() {
        if !state.contains_key(key) {
            resolve(graph, key, &mut state);
        }
    }

    Levels(
        state
            .into_iter()
            .map(|(key, visit)| (key.clone(), visit.recorded_level()))
            .collect(),
    )
}

/// Depth-first evaluation of one unvisited node, using an explicit stack
fn resolve<'g>(
    graph: &'g DependencyGraph,
    start: &'g NodeKey,
    state: &mut HashMap<&'g NodeKey, VisitState>,
) {
    state.insert(start, VisitState::InProgress);
    let mut stack = vec![Frame {
        key: start,
        next_dep: 0,
        deepest: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let deps = graph.dependencies(frame.key);

        if frame.next_dep < deps.len() {
            let dep = &deps[frame.next_dep];
            frame.next_dep += 1;

            if !graph.contains(dep) {
                continue;
            }

            match state.get(dep) {
                Some(visit) => {
                    let level = visit.recorded_level();
                    frame.deepest = Some(frame.deepest.map_or(level, |d| d.max(level)));
                }
                None => {
                    state.insert(dep, VisitState::InProgress);
                    stack.push(Frame {
                        key: dep,
                        next_dep: 0,
                        deepest: None,
                    });
                }
            }
            continue;
        }

        let level = frame.deepest.map_or(0, |d| d + 1);
        let key = frame.key;
        state.insert(key, VisitState::Resolved(level));
        stack.pop();

        if let Some(parent) = stack.last_mut() {
            parent.deepest = Some(parent.deepest.map_or(level, |d| d.max(level)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Declaration, DependencyRef};

    fn key(s: &str) -> NodeKey {
        s.parse().unwrap()
    }

    fn graph(decls: &[(&str, &[&str])]) -> DependencyGraph {
        let decls: Vec<Declaration> = decls
            .iter()
            .map(|(k, deps)| {
                let k = key(k);
                deps.iter().fold(Declaration::new(k.namespace(), k.name()), |d, dep| {
                    let dep = key(dep);
                    d.depends_on(DependencyRef::in_namespace(dep.name(), dep.namespace()))
                })
            })
            .collect();
        DependencyGraph::from_declarations(&decls)
    }

    #[test]
    fn empty_graph_has_no_levels() {
        let levels = compute(&DependencyGraph::new());
        assert!(levels.is_empty());
        assert_eq!(levels.max_level(), 0);
    }

    #[test]
    fn simple_chain() {
        let g = graph(&[("ns1/a", &["ns1/b"]), ("ns1/b", &[])]);
        let levels = compute(&g);

        assert_eq!(levels.get(&key("ns1/a")), Some(1));
        assert_eq!(levels.get(&key("ns1/b")), Some(0));
    }

    #[test]
    fn diamond_takes_longest_path() {
        let g = graph(&[
            ("ns/a", &["ns/b", "ns/c"]),
            ("ns/b", &["ns/d"]),
            ("ns/c", &["ns/d"]),
            ("ns/d", &[]),
        ]);
        let levels = compute(&g);

        assert_eq!(levels.get(&key("ns/d")), Some(0));
        assert_eq!(levels.get(&key("ns/b")), Some(1));
        assert_eq!(levels.get(&key("ns/c")), Some(1));
        assert_eq!(levels.get(&key("ns/a")), Some(2));
        assert_eq!(levels.max_level(), 2);
    }

    #[test]
    fn uneven_branches_use_the_deepest() {
        let g = graph(&[
            ("ns/app", &["ns/shallow", "ns/deep"]),
            ("ns/shallow", &[]),
            ("ns/deep", &["ns/deeper"]),
            ("ns/deeper", &["ns/deepest"]),
            ("ns/deepest", &[]),
        ]);
        assert_eq!(compute(&g).get(&key("ns/app")), Some(3));
    }

    #[test]
    fn dangling_dependencies_are_ignored() {
        let g = graph(&[("ns1/a", &["ns2/x"])]);
        let levels = compute(&g);

        assert_eq!(levels.get(&key("ns1/a")), Some(0));
        assert_eq!(levels.get(&key("ns2/x")), None);
        assert_eq!(levels.len(), 1);
    }

    #[test]
    fn cycle_terminates_with_some_level() {
        let g = graph(&[("ns1/a", &["ns1/b"]), ("ns1/b", &["ns1/a"])]);
        let levels = compute(&g);

        // a is entered first; b sees a in progress (0) and lands on 1,
        // which lifts a to 2.
        assert_eq!(levels.get(&key("ns1/b")), Some(1));
        assert_eq!(levels.get(&key("ns1/a")), Some(2));
    }

    #[test]
    fn self_loop_terminates() {
        let g = graph(&[("ns/a", &["ns/a"])]);
        assert_eq!(compute(&g).get(&key("ns/a")), Some(1));
    }

    #[test]
    fn independent_of_query_order() {
        let forward = graph(&[("ns/a", &["ns/b"]), ("ns/b", &["ns/c"]), ("ns/c", &[])]);
        let backward = graph(&[("ns/c", &[]), ("ns/b", &["ns/c"]), ("ns/a", &["ns/b"])]);
        assert_eq!(compute(&forward), compute(&backward));
    }

    #[test]
    fn by_level_groups_sorted_keys() {
        let g = graph(&[
            ("ns/z", &["ns/root"]),
            ("ns/a", &["ns/root"]),
            ("ns/root", &[]),
        ]);
        let grouped = compute(&g).by_level();

        assert_eq!(grouped[&0], vec![key("ns/root")]);
        assert_eq!(grouped[&1], vec![key("ns/a"), key("ns/z")]);
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let names: Vec<String> = (0..20_000).map(|i| format!("ns/n{}", i)).collect();
        let decls: Vec<Declaration> = (0..names.len())
            .map(|i| {
                let d = Declaration::new("ns", format!("n{}", i));
                if i + 1 < names.len() {
                    d.depends_on(DependencyRef::new(format!("n{}", i + 1)))
                } else {
                    d
                }
            })
            .collect();
        let g = DependencyGraph::from_declarations(&decls);

        assert_eq!(compute(&g).get(&key("ns/n0")), Some(19_999));
    }
}
