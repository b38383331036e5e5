//! Undo/Redo command stack.
//!
//! Every command is a pair of schema snapshots, taken before and after the
//! mutation, stored as MessagePack. Undo replaces the document with the
//! "before" snapshot and redo with the "after" one, so no mutation needs a
//! hand-written inverse.
//!
//! Drag gestures are **batched**: the snapshot is taken when the gesture
//! starts and again when it ends, and the whole gesture undoes in one step.

use crate::store::{GraphMutation, SchemaStore};
use pb_core::PageSchema;

/// One undoable step.
#[derive(Debug, Clone)]
pub struct Command {
    before: Vec<u8>,
    after: Vec<u8>,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured at the start of a batch.
    batch_snapshot: Option<Vec<u8>>,
    /// Whether any mutation applied during the current batch.
    batch_dirty: bool,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch group. Mutations until the matching `end_batch` are
    /// applied live but undo as one step.
    pub fn begin_batch(&mut self, store: &SchemaStore) {
        if self.batch_depth == 0 {
            self.batch_snapshot = snapshot(store.schema());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the document
    /// actually changed, one command is recorded.
    pub fn end_batch(&mut self, store: &SchemaStore, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let before = self.batch_snapshot.take();
        if self.batch_dirty {
            if let (Some(before), Some(after)) = (before, snapshot(store.schema())) {
                if before != after {
                    self.push(Command {
                        before,
                        after,
                        description: description.to_string(),
                    });
                }
            }
        }
        self.batch_dirty = false;
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply `mutation` to `store` and record it. Returns whether the
    /// mutation applied.
    pub fn execute(&mut self, store: &mut SchemaStore, mutation: GraphMutation, description: &str) -> bool {
        if self.batch_depth > 0 {
            let applied = store.apply(mutation);
            self.batch_dirty |= applied;
            return applied;
        }

        let before = snapshot(store.schema());
        if !store.apply(mutation) {
            return false;
        }
        match (before, snapshot(store.schema())) {
            (Some(before), Some(after)) => self.push(Command {
                before,
                after,
                description: description.to_string(),
            }),
            _ => log::warn!("`{description}` applied but could not be recorded for undo"),
        }
        true
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, store: &mut SchemaStore) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        restore(store, &cmd.before);
        let description = cmd.description.clone();
        self.redo_stack.push(cmd);
        Some(description)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, store: &mut SchemaStore) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        restore(store, &cmd.after);
        let description = cmd.description.clone();
        self.undo_stack.push(cmd);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // A new action invalidates the redo history.
        self.redo_stack.clear();
    }
}

fn snapshot(schema: &PageSchema) -> Option<Vec<u8>> {
    rmp_serde::to_vec_named(schema)
        .map_err(|err| log::error!("snapshot failed: {err}"))
        .ok()
}

fn restore(store: &mut SchemaStore, bytes: &[u8]) {
    match rmp_serde::from_slice::<PageSchema>(bytes) {
        Ok(schema) => {
            store.apply(GraphMutation::Replace {
                schema: Box::new(schema),
            });
        }
        Err(err) => log::error!("snapshot restore failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::id::SequentialIdGenerator;
    use pb_core::{ComponentNode, ComponentType, NodeId, Position};
    use pretty_assertions::assert_eq;

    fn nid(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn store() -> SchemaStore {
        let mut schema = PageSchema::default();
        schema.nodes.push(ComponentNode::new(
            nid("box"),
            ComponentType::Section,
            Position::new(200.0, 100.0),
        ));
        SchemaStore::new(schema, Box::new(SequentialIdGenerator::new()))
    }

    fn x_of(store: &SchemaStore, id: &str) -> f64 {
        store.schema().node(nid(id)).unwrap().position.x
    }

    fn nudge(dx: f64) -> GraphMutation {
        GraphMutation::MoveNode { id: nid("box"), dx, dy: 0.0 }
    }

    #[test]
    fn undo_redo_move() {
        let mut store = store();
        let mut stack = CommandStack::new(100);

        assert!(stack.execute(&mut store, nudge(50.0), "Move box"));
        assert_eq!(x_of(&store, "box"), 250.0);

        assert_eq!(stack.undo(&mut store).as_deref(), Some("Move box"));
        assert_eq!(x_of(&store, "box"), 200.0);

        assert_eq!(stack.redo(&mut store).as_deref(), Some("Move box"));
        assert_eq!(x_of(&store, "box"), 250.0);
    }

    #[test]
    fn redo_clears_on_new_action() {
        let mut store = store();
        let mut stack = CommandStack::new(100);
        stack.execute(&mut store, nudge(10.0), "a");
        stack.undo(&mut store);
        assert!(stack.can_redo());

        stack.execute(&mut store, nudge(20.0), "b");
        assert!(!stack.can_redo());
    }

    #[test]
    fn rejected_mutations_are_not_recorded() {
        let mut store = store();
        let mut stack = CommandStack::new(100);
        let applied = stack.execute(
            &mut store,
            GraphMutation::RemoveNode { id: nid("ghost") },
            "Remove ghost",
        );
        assert!(!applied);
        assert!(!stack.can_undo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut store = store();
        let mut stack = CommandStack::new(3);
        for i in 0..5 {
            stack.execute(&mut store, nudge(1.0), &format!("step {i}"));
        }
        assert_eq!(stack.undo_depth(), 3);
        while stack.undo(&mut store).is_some() {}
        // The two oldest steps fell off the stack.
        assert_eq!(x_of(&store, "box"), 202.0);
    }

    #[test]
    fn batch_undoes_in_one_step() {
        let mut store = store();
        let mut stack = CommandStack::new(100);

        stack.begin_batch(&store);
        for _ in 0..10 {
            stack.execute(&mut store, nudge(5.0), "drag frame");
        }
        stack.end_batch(&store, "Drag box");
        assert!(!stack.is_batching());
        assert_eq!(x_of(&store, "box"), 250.0);
        assert_eq!(stack.undo_depth(), 1);

        assert_eq!(stack.undo(&mut store).as_deref(), Some("Drag box"));
        assert_eq!(x_of(&store, "box"), 200.0);
    }

    #[test]
    fn nested_batches_record_once() {
        let mut store = store();
        let mut stack = CommandStack::new(100);
        stack.begin_batch(&store);
        stack.begin_batch(&store);
        stack.execute(&mut store, nudge(5.0), "inner");
        stack.end_batch(&store, "inner");
        assert!(stack.is_batching());
        stack.end_batch(&store, "outer");
        assert_eq!(stack.undo_depth(), 1);
        assert_eq!(stack.undo(&mut store).as_deref(), Some("outer"));
    }

    #[test]
    fn net_zero_batch_is_dropped() {
        let mut store = store();
        let mut stack = CommandStack::new(100);
        stack.begin_batch(&store);
        stack.execute(&mut store, nudge(5.0), "out");
        stack.execute(&mut store, nudge(-5.0), "back");
        stack.end_batch(&store, "Drag box");
        assert!(!stack.can_undo());
    }
}
