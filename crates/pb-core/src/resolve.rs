//! Resolved view of a schema: node lookup, child index and ordered roots.
//!
//! This is what the tree renderer walks. Building it is cheap (one pass over
//! nodes and edges), so callers that render on every keystroke can either
//! rebuild it each time or memoize it per edge-set revision.

use crate::id::NodeId;
use crate::index::ChildIndex;
use crate::model::{ComponentNode, NodeMap, PageSchema};
use crate::order::order_children;
use crate::roots::resolve_roots;

/// Borrowed resolution of one [`PageSchema`].
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub nodes: NodeMap<'a>,
    pub index: ChildIndex,
    roots: Vec<NodeId>,
    /// The sink node, if the schema carries one explicitly.
    sink: Option<&'a ComponentNode>,
}

impl<'a> Resolution<'a> {
    pub fn new(schema: &'a PageSchema) -> Self {
        let nodes = schema.node_map();
        let index = ChildIndex::build(&schema.edges);
        let raw_roots = resolve_roots(&schema.nodes, &schema.edges);
        let sink = schema.nodes.iter().find(|n| n.is_sink());
        let roots = order_children(sink, &raw_roots, &nodes);
        log::trace!(
            "resolved {} node(s), {} parent(s), {} root(s)",
            nodes.len(),
            index.len(),
            roots.len()
        );
        Self {
            nodes,
            index,
            roots,
            sink,
        }
    }

    /// Root ids in render order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&'a ComponentNode> {
        self.nodes.get(&id).copied()
    }

    pub fn sink(&self) -> Option<&'a ComponentNode> {
        self.sink
    }

    /// Children of `parent` in render order.
    pub fn ordered_children(&self, parent: NodeId) -> Vec<NodeId> {
        order_children(self.node(parent), self.index.children(parent), &self.nodes)
    }
}
