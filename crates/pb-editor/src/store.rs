//! Graph store: the canvas's single source of truth.
//!
//! The store owns the [`PageSchema`] the user is editing and applies canvas
//! interactions to it as [`GraphMutation`]s:
//!
//! - Every applied mutation bumps the **revision** and publishes a
//!   [`SchemaEvent`] on the store's [`PreviewBus`].
//! - Mutations that add or remove nodes or edges also bump the **structure
//!   revision**. The child index, its cyclic ids and the raw root set
//!   depend only on structure, so they are memoized per structure revision
//!   and rebuilt lazily on the next read. Moving a node or editing its props leaves the
//!   memo intact; sibling order is recomputed from positions at render time.

use crate::events::{PreviewBus, SchemaEvent, Touched};
use pb_core::id::IdGenerator;
use pb_core::index::ChildIndex;
use pb_core::order::order_children;
use pb_core::roots::resolve_roots;
use pb_core::{ComponentNode, Edge, NodeId, PageSchema};
use pb_render::{VisualNode, render_roots};
use std::collections::HashSet;
use smallvec::smallvec;

/// A mutation applied to the schema from canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Insert a node, optionally wiring it under `parent` (or `preview`).
    AddNode {
        node: Box<ComponentNode>,
        parent: Option<NodeId>,
    },
    /// Remove a node and every edge touching it.
    RemoveNode { id: NodeId },
    MoveNode { id: NodeId, dx: f64, dy: f64 },
    SetLabel { id: NodeId, label: String },
    SetProp {
        id: NodeId,
        key: String,
        value: serde_json::Value,
    },
    RemoveProp { id: NodeId, key: String },
    /// Wire `child` under `parent` with a fresh edge id.
    Connect { child: NodeId, parent: NodeId },
    /// Remove an edge by id.
    Disconnect { edge: NodeId },
    /// Swap the whole document (import, undo/redo snapshots).
    Replace { schema: Box<PageSchema> },
}

impl GraphMutation {
    /// Whether applying this changes the node id set or the edge set.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GraphMutation::AddNode { .. }
                | GraphMutation::RemoveNode { .. }
                | GraphMutation::Connect { .. }
                | GraphMutation::Disconnect { .. }
                | GraphMutation::Replace { .. }
        )
    }
}

/// Child index and raw roots for one structure revision.
#[derive(Debug)]
struct Memo {
    structure_revision: u64,
    index: ChildIndex,
    cyclic: HashSet<NodeId>,
    roots: Vec<NodeId>,
}

pub struct SchemaStore {
    schema: PageSchema,
    revision: u64,
    structure_revision: u64,
    memo: Option<Memo>,
    /// How many times the memo was (re)built.
    builds: u64,
    ids: Box<dyn IdGenerator>,
    bus: PreviewBus,
}

impl SchemaStore {
    /// A store over `schema`. `ids` supplies edge ids for `AddNode` and
    /// `Connect`.
    pub fn new(schema: PageSchema, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            schema,
            revision: 0,
            structure_revision: 0,
            memo: None,
            builds: 0,
            ids,
            bus: PreviewBus::new(),
        }
    }

    pub fn schema(&self) -> &PageSchema {
        &self.schema
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn structure_revision(&self) -> u64 {
        self.structure_revision
    }

    pub fn bus(&self) -> &PreviewBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut PreviewBus {
        &mut self.bus
    }

    /// Ask every preview to re-render at the current revision.
    pub fn request_refresh(&mut self) {
        self.bus.request_refresh(self.revision);
    }

    /// A fresh id from the store's generator, skipping ids any node or edge
    /// of the current schema already uses.
    pub fn next_id(&mut self, prefix: &str) -> NodeId {
        loop {
            let id = self.ids.next_id(prefix);
            let taken = self.schema.node(id).is_some() || self.schema.edges.iter().any(|e| e.id == id);
            if !taken {
                return id;
            }
            log::trace!("generated id `{id}` is already in use, drawing another");
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply `mutation`. Returns `false` (and publishes nothing) when it
    /// refers to a node or edge that does not exist, or would duplicate a
    /// node id.
    pub fn apply(&mut self, mutation: GraphMutation) -> bool {
        let structural = mutation.is_structural();
        let Some(touched) = self.apply_inner(mutation) else {
            return false;
        };

        self.revision += 1;
        if structural {
            self.structure_revision += 1;
        }
        log::debug!(
            "revision {} (structure {}), touched {:?}",
            self.revision,
            self.structure_revision,
            touched
        );
        self.bus.publish(&SchemaEvent::Changed {
            revision: self.revision,
            structural,
            touched,
        });
        true
    }

    fn apply_inner(&mut self, mutation: GraphMutation) -> Option<Touched> {
        match mutation {
            GraphMutation::AddNode { node, parent } => {
                if self.schema.node(node.id).is_some() {
                    log::warn!("add: node `{}` already exists", node.id);
                    return None;
                }
                let id = node.id;
                self.schema.nodes.push(*node);
                let mut touched: Touched = smallvec![id];
                if let Some(parent) = parent {
                    let edge = self.next_id("edge");
                    self.schema.edges.push(Edge::new(edge, id, parent));
                    touched.push(parent);
                }
                Some(touched)
            }
            GraphMutation::RemoveNode { id } => {
                let before = self.schema.nodes.len();
                self.schema.nodes.retain(|n| n.id != id);
                if self.schema.nodes.len() == before {
                    return None;
                }
                let mut touched: Touched = smallvec![id];
                self.schema.edges.retain(|edge| {
                    if edge.child_of() == id {
                        touched.push(edge.parent_of());
                        false
                    } else if edge.parent_of() == id {
                        touched.push(edge.child_of());
                        false
                    } else {
                        true
                    }
                });
                Some(touched)
            }
            GraphMutation::MoveNode { id, dx, dy } => {
                let node = self.schema.node_mut(id)?;
                node.position.x += dx;
                node.position.y += dy;
                Some(smallvec![id])
            }
            GraphMutation::SetLabel { id, label } => {
                self.schema.node_mut(id)?.label = label;
                Some(smallvec![id])
            }
            GraphMutation::SetProp { id, key, value } => {
                self.schema.node_mut(id)?.props.insert(key, value);
                Some(smallvec![id])
            }
            GraphMutation::RemoveProp { id, key } => {
                self.schema.node_mut(id)?.props.remove(&key)?;
                Some(smallvec![id])
            }
            GraphMutation::Connect { child, parent } => {
                self.schema.node(child)?;
                let edge = self.next_id("edge");
                self.schema.edges.push(Edge::new(edge, child, parent));
                Some(smallvec![child, parent])
            }
            GraphMutation::Disconnect { edge } => {
                let at = self.schema.edges.iter().position(|e| e.id == edge)?;
                let removed = self.schema.edges.remove(at);
                Some(smallvec![removed.child_of(), removed.parent_of()])
            }
            GraphMutation::Replace { schema } => {
                self.schema = *schema;
                Some(Touched::new())
            }
        }
    }

    // ─── Memoized resolution ─────────────────────────────────────────────

    fn memo(&mut self) -> &Memo {
        let memo = match self.memo.take() {
            Some(memo) if memo.structure_revision == self.structure_revision => memo,
            _ => {
                self.builds += 1;
                log::trace!("rebuilding child index at structure revision {}", self.structure_revision);
                let index = ChildIndex::build(&self.schema.edges);
                Memo {
                    structure_revision: self.structure_revision,
                    cyclic: index.cyclic_nodes(),
                    index,
                    roots: resolve_roots(&self.schema.nodes, &self.schema.edges),
                }
            }
        };
        self.memo.insert(memo)
    }

    /// Parent → children index for the current structure.
    pub fn child_index(&mut self) -> &ChildIndex {
        &self.memo().index
    }

    /// Roots in render order.
    pub fn roots(&mut self) -> Vec<NodeId> {
        self.memo();
        self.ordered_roots()
    }

    /// Number of times the child index has been built. Stays put across
    /// non-structural edits.
    pub fn resolution_builds(&self) -> u64 {
        self.builds
    }

    /// Render the current schema to a visual forest through the memo.
    pub fn render(&mut self) -> Vec<VisualNode> {
        let roots = self.roots();
        let nodes = self.schema.node_map();
        let Some(memo) = self.memo.as_ref() else {
            return Vec::new();
        };
        render_roots(&roots, &nodes, &memo.index, &memo.cyclic)
    }

    fn ordered_roots(&self) -> Vec<NodeId> {
        let Some(memo) = self.memo.as_ref() else {
            return Vec::new();
        };
        let nodes = self.schema.node_map();
        let sink = self.schema.nodes.iter().find(|n| n.is_sink());
        order_children(sink, &memo.roots, &nodes)
    }
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("revision", &self.revision)
            .field("structure_revision", &self.structure_revision)
            .field("nodes", &self.schema.nodes.len())
            .field("edges", &self.schema.edges.len())
            .finish()
    }
}
