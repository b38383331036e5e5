//! Deterministic left-to-right ordering of a parent's children.

use crate::id::NodeId;
use crate::model::{ComponentNode, NodeMap};

/// Order `children` of `parent`.
///
/// An explicit `props.childOrder` on the parent goes first (only ids that
/// are actually among the children, every occurrence of each), the rest
/// follow in their existing order. Without one, children are stably sorted
/// by ascending `position.x`; unknown nodes sort as `x = 0`.
pub fn order_children(
    parent: Option<&ComponentNode>,
    children: &[NodeId],
    nodes: &NodeMap<'_>,
) -> Vec<NodeId> {
    if let Some(explicit) = parent.and_then(ComponentNode::child_order) {
        return apply_explicit_order(&explicit, children);
    }

    let mut ordered = children.to_vec();
    // `sort_by` is stable: equal x keeps the incoming order.
    ordered.sort_by(|a, b| x_of(*a, nodes).total_cmp(&x_of(*b, nodes)));
    ordered
}

fn x_of(id: NodeId, nodes: &NodeMap<'_>) -> f64 {
    nodes.get(&id).map(|n| n.position.order_x()).unwrap_or(0.0)
}

fn apply_explicit_order(explicit: &[NodeId], children: &[NodeId]) -> Vec<NodeId> {
    let mut remaining: Vec<NodeId> = children.to_vec();
    let mut ordered = Vec::with_capacity(children.len());
    for id in explicit {
        if ordered.contains(id) {
            continue;
        }
        let before = remaining.len();
        remaining.retain(|c| c != id);
        let taken = before - remaining.len();
        ordered.extend(std::iter::repeat_n(*id, taken));
    }
    ordered.extend(remaining);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Position};
    use std::collections::HashMap;

    fn node_at(id: &str, x: f64) -> ComponentNode {
        ComponentNode::new(NodeId::intern(id), ComponentType::Text, Position::new(x, 0.0))
    }

    fn map(nodes: &[ComponentNode]) -> NodeMap<'_> {
        nodes.iter().map(|n| (n.id, n)).collect::<HashMap<_, _>>()
    }

    fn ids(list: &[NodeId]) -> Vec<&str> {
        list.iter().map(NodeId::as_str).collect()
    }

    fn nid(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn sorts_by_ascending_x() {
        let nodes = [node_at("right", 300.0), node_at("left", 100.0)];
        let ordered = order_children(None, &[nid("right"), nid("left")], &map(&nodes));
        assert_eq!(ids(&ordered), ["left", "right"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let nodes = [node_at("a", 50.0), node_at("b", 50.0), node_at("c", 10.0)];
        let m = map(&nodes);
        let forward = order_children(None, &[nid("a"), nid("b"), nid("c")], &m);
        assert_eq!(ids(&forward), ["c", "a", "b"]);
        let reversed = order_children(None, &[nid("b"), nid("a"), nid("c")], &m);
        assert_eq!(ids(&reversed), ["c", "b", "a"]);
    }

    #[test]
    fn rerunning_is_identical() {
        let nodes = [node_at("a", 3.0), node_at("b", 1.0), node_at("c", 2.0)];
        let m = map(&nodes);
        let children = [nid("a"), nid("b"), nid("c")];
        assert_eq!(order_children(None, &children, &m), order_children(None, &children, &m));
    }

    #[test]
    fn missing_nodes_sort_as_zero() {
        let nodes = [node_at("neg", -10.0), node_at("pos", 10.0)];
        let ordered = order_children(None, &[nid("pos"), nid("ghost"), nid("neg")], &map(&nodes));
        assert_eq!(ids(&ordered), ["neg", "ghost", "pos"]);
    }

    #[test]
    fn explicit_order_goes_first() {
        let nodes = [node_at("a", 1.0), node_at("b", 2.0), node_at("c", 3.0)];
        let parent = ComponentNode::new(nid("row"), ComponentType::Row, Position::default())
            .with_prop("childOrder", serde_json::json!(["c", "zzz", "a", "c"]));
        let ordered = order_children(Some(&parent), &[nid("a"), nid("b"), nid("c")], &map(&nodes));
        assert_eq!(ids(&ordered), ["c", "a", "b"]);
    }

    #[test]
    fn explicit_order_keeps_duplicate_children() {
        let parent = ComponentNode::new(nid("row"), ComponentType::Row, Position::default())
            .with_prop("childOrder", serde_json::json!(["b"]));
        let ordered = order_children(
            Some(&parent),
            &[nid("a"), nid("b"), nid("a"), nid("b")],
            &HashMap::new(),
        );
        assert_eq!(ids(&ordered), ["b", "b", "a", "a"]);
    }
}
