//! Root resolution: which nodes start a rendered tree.
//!
//! "Being a child" means appearing as an edge's `source`. With a `preview`
//! sink in play, roots are exactly the children of the sink; without one,
//! every node that is nobody's child is a root.

use crate::id::NodeId;
use crate::model::{ComponentNode, Edge};
use std::collections::HashSet;

/// Ids acting as the `preview` sink: the literal `preview` plus any node
/// carrying that id or type.
pub fn sink_ids(nodes: &[ComponentNode]) -> HashSet<NodeId> {
    let mut sinks: HashSet<NodeId> = nodes.iter().filter(|n| n.is_sink()).map(|n| n.id).collect();
    sinks.insert(NodeId::preview());
    sinks
}

/// Whether a sink participates: a sink node exists or an edge targets one.
pub fn has_sink(nodes: &[ComponentNode], edges: &[Edge]) -> bool {
    let sinks = sink_ids(nodes);
    nodes.iter().any(ComponentNode::is_sink) || edges.iter().any(|e| sinks.contains(&e.parent_of()))
}

/// Resolve the root ids of a node/edge set.
///
/// Results are deduplicated and returned in first-seen order (edge order
/// for sink children, node order otherwise) so callers get a stable answer.
pub fn resolve_roots(nodes: &[ComponentNode], edges: &[Edge]) -> Vec<NodeId> {
    let sinks = sink_ids(nodes);

    if has_sink(nodes, edges) {
        let mut seen = HashSet::new();
        return edges
            .iter()
            .filter(|e| sinks.contains(&e.parent_of()))
            .map(Edge::child_of)
            .filter(|id| seen.insert(*id))
            .collect();
    }

    let roots = unparented(nodes, edges);
    if !roots.is_empty() {
        return roots;
    }

    // Every node is somebody's child (a cycle or a chain folding back on
    // itself): fall back to nodes that are nobody's parent.
    let parents: HashSet<NodeId> = edges.iter().map(Edge::parent_of).collect();
    let fallback = unique_ids(
        nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !id.is_preview() && !parents.contains(id)),
    );
    if !fallback.is_empty() {
        log::debug!("no unparented nodes, using {} leaf node(s) as roots", fallback.len());
    }
    fallback
}

/// Nodes with no parent edge at all, ignoring the sink rule. Used by the
/// normalizer's preview repair.
pub fn unparented(nodes: &[ComponentNode], edges: &[Edge]) -> Vec<NodeId> {
    let children: HashSet<NodeId> = edges.iter().map(Edge::child_of).collect();
    unique_ids(
        nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !id.is_preview() && !children.contains(id)),
    )
}

fn unique_ids(ids: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Position};

    fn node(id: &str, kind: ComponentType) -> ComponentNode {
        ComponentNode::new(NodeId::intern(id), kind, Position::default())
    }

    fn edge(id: &str, child: &str, parent: &str) -> Edge {
        Edge::new(NodeId::intern(id), NodeId::intern(child), NodeId::intern(parent))
    }

    fn ids(list: &[NodeId]) -> Vec<&str> {
        list.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn preview_edge_selects_roots() {
        let nodes = [node("s1", ComponentType::Section), node("c1", ComponentType::Column)];
        let edges = [edge("e1", "c1", "s1"), edge("e2", "s1", "preview")];
        assert_eq!(ids(&resolve_roots(&nodes, &edges)), ["s1"]);
    }

    #[test]
    fn unparented_nodes_are_roots_without_sink() {
        let nodes = [
            node("a", ComponentType::Section),
            node("b", ComponentType::Text),
            node("c", ComponentType::Section),
        ];
        let edges = [edge("e1", "b", "a")];
        assert_eq!(ids(&resolve_roots(&nodes, &edges)), ["a", "c"]);
    }

    #[test]
    fn sink_node_by_type_collects_its_children() {
        let nodes = [
            node("out", ComponentType::Preview),
            node("a", ComponentType::Section),
            node("b", ComponentType::Section),
        ];
        let edges = [edge("e1", "b", "out"), edge("e2", "b", "out")];
        assert_eq!(ids(&resolve_roots(&nodes, &edges)), ["b"]);
    }

    #[test]
    fn sink_node_without_edges_yields_no_roots() {
        let nodes = [node("preview", ComponentType::Preview), node("a", ComponentType::Text)];
        assert!(resolve_roots(&nodes, &[]).is_empty());
    }

    #[test]
    fn cycle_falls_back_to_non_parents() {
        // a -> b -> a plus c -> a: every node is a child, c is nobody's parent.
        let nodes = [
            node("a", ComponentType::Section),
            node("b", ComponentType::Row),
            node("c", ComponentType::Text),
        ];
        let edges = [edge("e1", "a", "b"), edge("e2", "b", "a"), edge("e3", "c", "a")];
        assert_eq!(ids(&resolve_roots(&nodes, &edges)), ["c"]);
    }

    #[test]
    fn pure_cycle_has_no_roots() {
        let nodes = [node("a", ComponentType::Section), node("b", ComponentType::Row)];
        let edges = [edge("e1", "a", "b"), edge("e2", "b", "a")];
        assert!(resolve_roots(&nodes, &edges).is_empty());
    }

    #[test]
    fn unparented_ignores_sink_rule() {
        let nodes = [node("a", ComponentType::Section), node("b", ComponentType::Text)];
        let edges = [edge("e1", "b", "a")];
        assert_eq!(ids(&unparented(&nodes, &edges)), ["a"]);
    }
}
