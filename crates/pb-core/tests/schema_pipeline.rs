//! Integration tests: payload → normalize → resolve → order.
//!
//! Exercises the full `pb-core` pipeline on fixture schemas the way the
//! canvas preview and the render page consume it.

use pb_core::id::SequentialIdGenerator;
use pb_core::lint::lint_schema;
use pb_core::{
    ChildIndex, ComponentType, NodeId, PageSchema, Resolution, generate, normalize, normalize_str,
    resolve_roots,
};
use pretty_assertions::assert_eq;

fn ids(list: &[NodeId]) -> Vec<&str> {
    list.iter().map(NodeId::as_str).collect()
}

fn nid(s: &str) -> NodeId {
    NodeId::intern(s)
}

// ─── Canonical schemas ───────────────────────────────────────────────────

#[test]
fn landing_resolves_two_roots_in_x_order() {
    let schema = PageSchema::from_json(include_str!("fixtures/landing.json")).unwrap();
    schema.validate().unwrap();
    let resolution = Resolution::new(&schema);
    assert_eq!(ids(resolution.roots()), ["hero", "footer"]);
    assert_eq!(ids(&resolution.ordered_children(nid("hero"))), ["stack"]);
    assert_eq!(
        ids(&resolution.ordered_children(nid("stack"))),
        ["headline", "lede", "cta"]
    );
}

#[test]
fn landing_survives_normalization_unchanged() {
    let raw = include_str!("fixtures/landing.json");
    let strict = PageSchema::from_json(raw).unwrap();
    let normalized = normalize_str(raw, &mut SequentialIdGenerator::new());
    assert_eq!(normalized, strict);
}

#[test]
fn landing_lints_only_the_bad_style() {
    let schema = PageSchema::from_json(include_str!("fixtures/landing.json")).unwrap();
    let diags = lint_schema(&schema);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule, "invalid-style-json");
    assert_eq!(diags[0].node_id, nid("lede"));
}

#[test]
fn child_index_covers_every_edge() {
    let schema = PageSchema::from_json(include_str!("fixtures/landing.json")).unwrap();
    let index = ChildIndex::build(&schema.edges);
    assert_eq!(index.pairs().count(), schema.edges.len());
    assert_eq!(index.children(NodeId::preview()).len(), 2);
}

// ─── Untrusted payloads ──────────────────────────────────────────────────

#[test]
fn ai_payload_is_repaired() {
    let schema = normalize_str(include_str!("fixtures/ai_payload.json"), &mut SequentialIdGenerator::new());
    schema.validate().unwrap();
    assert_eq!(schema.title.as_deref(), Some("Tentang Saya"));

    let node_ids: Vec<&str> = schema.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids, ["sec", "col", "node-0", "name", "node-1"]);
    assert_eq!(schema.nodes[1].component, ComponentType::Column);
    assert_eq!(schema.nodes[1].label, "column");
    assert_eq!(schema.nodes[2].component, ComponentType::Avatar);
    assert_eq!(schema.nodes[4].component, ComponentType::Badge);

    let edges: Vec<(&str, &str)> = schema
        .edges
        .iter()
        .map(|e| (e.child_of().as_str(), e.parent_of().as_str()))
        .collect();
    assert_eq!(edges, [("col", "sec"), ("name", "col"), ("sec", "preview")]);

    let resolution = Resolution::new(&schema);
    assert_eq!(ids(resolution.roots()), ["sec"]);
    assert_eq!(ids(&resolution.ordered_children(nid("col"))), ["name"]);
}

#[test]
fn ai_payload_leftovers_show_up_in_lint() {
    let schema = normalize_str(include_str!("fixtures/ai_payload.json"), &mut SequentialIdGenerator::new());
    let unreachable: Vec<&str> = lint_schema(&schema)
        .into_iter()
        .filter(|d| d.rule == "unreachable-node")
        .map(|d| d.node_id.as_str())
        .collect();
    assert_eq!(unreachable, ["node-0", "node-1"]);
}

#[test]
fn cyclic_graph_still_resolves() {
    let schema = PageSchema::from_json(include_str!("fixtures/cyclic.json")).unwrap();
    assert_eq!(ids(&resolve_roots(&schema.nodes, &schema.edges)), ["c"]);
    assert!(lint_schema(&schema).iter().any(|d| d.rule == "cycle"));

    // Normalizing cannot find an unparented node to wire, and keeps the rest.
    let normalized = normalize(
        &serde_json::from_str(include_str!("fixtures/cyclic.json")).unwrap(),
        &mut SequentialIdGenerator::new(),
    );
    assert_eq!(normalized, schema);
}

// ─── Fallback ────────────────────────────────────────────────────────────

#[test]
fn fallback_output_is_canonical() {
    let generated = generate("Landing page with hero, features and a signup button", &mut SequentialIdGenerator::new());
    let reparsed = PageSchema::from_json(&generated.to_json()).unwrap();
    assert_eq!(reparsed, generated);
    let renormalized = normalize_str(&generated.to_json(), &mut SequentialIdGenerator::new());
    assert_eq!(renormalized, generated);
    assert!(lint_schema(&generated).is_empty());
}
