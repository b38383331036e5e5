//! Parent → children index built from child→parent edges.

use crate::id::NodeId;
use crate::model::Edge;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Children of one parent, in edge order. Duplicates are kept.
pub type ChildList = SmallVec<[NodeId; 4]>;

/// Mapping from parent id (including the `preview` sink) to its raw,
/// unordered child ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildIndex {
    map: HashMap<NodeId, ChildList>,
}

impl ChildIndex {
    /// Index every edge under its parent. Never fails; dangling ids are
    /// indexed like any other.
    pub fn build(edges: &[Edge]) -> Self {
        let mut map: HashMap<NodeId, ChildList> = HashMap::new();
        for edge in edges {
            map.entry(edge.parent_of()).or_default().push(edge.child_of());
        }
        Self { map }
    }

    /// Raw children of `parent` (empty if it has none).
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        self.map.get(&parent).map(|c| c.as_slice()).unwrap_or(&[])
    }

    pub fn has_children(&self, parent: NodeId) -> bool {
        self.map.contains_key(&parent)
    }

    pub fn parents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.map.keys().copied()
    }

    /// Flatten back to `(parent, child)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.map
            .iter()
            .flat_map(|(parent, children)| children.iter().map(move |child| (*parent, *child)))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of parents with at least one child.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Ids that sit on a parent cycle: members of a strongly connected
    /// component with more than one node, plus self-parented nodes.
    pub fn cyclic_nodes(&self) -> HashSet<NodeId> {
        let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut slots: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut cyclic = HashSet::new();
        for (parent, child) in self.pairs() {
            if parent == child {
                cyclic.insert(child);
            }
            let p = *slots.entry(parent).or_insert_with(|| graph.add_node(parent));
            let c = *slots.entry(child).or_insert_with(|| graph.add_node(child));
            graph.update_edge(p, c, ());
        }
        for scc in tarjan_scc(&graph) {
            if scc.len() > 1 {
                cyclic.extend(scc.into_iter().map(|ix| graph[ix]));
            }
        }
        cyclic
    }
}
