//! Integration tests: a canvas editing session across pb-core, pb-render and
//! pb-editor. Store mutations, undo/redo and the live preview must agree
//! with a fresh render of the same schema.

use pb_core::id::SequentialIdGenerator;
use pb_core::{ComponentNode, ComponentType, NodeId, PageSchema, Position, generate};
use pb_editor::{CommandStack, GraphMutation, LivePreview, SchemaEvent, SchemaStore};
use pb_render::{RenderOptions, render_schema_html};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn nid(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn session() -> (SchemaStore, CommandStack) {
    let schema = generate("pricing page", &mut SequentialIdGenerator::new());
    let store = SchemaStore::new(schema, Box::new(SequentialIdGenerator::new()));
    (store, CommandStack::new(50))
}

fn column_of(store: &SchemaStore) -> NodeId {
    store
        .schema()
        .nodes
        .iter()
        .find(|n| n.component == ComponentType::Column)
        .map(|n| n.id)
        .unwrap()
}

// ─── Preview consistency ─────────────────────────────────────────────────

#[test]
fn live_preview_matches_fresh_render() {
    let (mut store, mut stack) = session();
    let mut preview = LivePreview::new(RenderOptions::default());
    let column = column_of(&store);

    let alert = ComponentNode::new(nid("notice"), ComponentType::Alert, Position::new(-100.0, 0.0))
        .with_prop("title", "Prices include tax");
    stack.execute(
        &mut store,
        GraphMutation::AddNode { node: Box::new(alert), parent: Some(column) },
        "Add alert",
    );

    let fresh = render_schema_html(store.schema(), &RenderOptions::default());
    assert_eq!(preview.html(&mut store), fresh);
    assert!(fresh.contains("Prices include tax"));

    // Leftmost x renders first among the column's children.
    let alert_at = fresh.find("data-node-id=\"notice\"").unwrap();
    let title_at = fresh.find("<h2").unwrap();
    assert!(alert_at < title_at);
}

// ─── Undo/redo ───────────────────────────────────────────────────────────

#[test]
fn drag_gesture_undoes_to_original_document() {
    let (mut store, mut stack) = session();
    let original: PageSchema = store.schema().clone();
    let column = column_of(&store);

    stack.begin_batch(&store);
    for _ in 0..20 {
        stack.execute(
            &mut store,
            GraphMutation::MoveNode { id: column, dx: 3.0, dy: -1.0 },
            "drag",
        );
    }
    stack.end_batch(&store, "Move column");
    assert_ne!(store.schema(), &original);

    assert_eq!(stack.undo(&mut store).as_deref(), Some("Move column"));
    assert_eq!(store.schema(), &original);
    assert_eq!(stack.redo(&mut store).as_deref(), Some("Move column"));
    assert_eq!(store.schema().node(column).unwrap().position.x, original.node(column).unwrap().position.x + 60.0);
}

#[test]
fn remove_then_undo_restores_edges() {
    let (mut store, mut stack) = session();
    let original = store.schema().clone();
    let column = column_of(&store);

    stack.execute(&mut store, GraphMutation::RemoveNode { id: column }, "Delete column");
    assert!(store.schema().edges.iter().all(|e| e.child_of() != column && e.parent_of() != column));

    stack.undo(&mut store);
    assert_eq!(store.schema(), &original);
    assert_eq!(store.child_index().children(column).len(), original.edges.iter().filter(|e| e.parent_of() == column).count());
}

// ─── Events ──────────────────────────────────────────────────────────────

#[test]
fn undo_and_redo_publish_structural_changes() {
    let (mut store, mut stack) = session();
    let revisions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&revisions);
    store.bus_mut().subscribe(Box::new(move |event: &SchemaEvent| {
        if let SchemaEvent::Changed { revision, structural, .. } = event {
            sink.borrow_mut().push((*revision, *structural));
        }
    }));

    let column = column_of(&store);
    stack.execute(
        &mut store,
        GraphMutation::SetLabel { id: column, label: "Body".into() },
        "Rename",
    );
    stack.undo(&mut store);
    stack.redo(&mut store);

    assert_eq!(*revisions.borrow(), [(1, false), (2, true), (3, true)]);
    assert_eq!(store.schema().node(column).unwrap().label, "Body");
}
