//! Schema normalizer: the tolerant parse between untrusted payloads (AI tool
//! calls, pasted JSON, decoded render links) and the canonical schema.
//!
//! Every repair is logged at `debug`. The infallible entry points never
//! fail: if a payload cannot be repaired into a valid schema, a one-node
//! degenerate schema is substituted and a `warn` is logged.

use crate::error::SchemaError;
use crate::id::{IdGenerator, NodeId};
use crate::model::{ComponentNode, ComponentType, Edge, PageSchema, Position, Props};
use crate::roots::unparented;
use serde_json::{Map, Value};
use std::collections::HashSet;

// ─── Grid layout ─────────────────────────────────────────────────────────

/// Positions synthesized for nodes that arrive without a usable one.
pub struct GridLayout;

impl GridLayout {
    pub const ORIGIN_X: f64 = 200.0;
    pub const ORIGIN_Y: f64 = 100.0;
    pub const STEP: f64 = 80.0;
    pub const COLUMNS: usize = 4;

    /// Grid cell for the `index`-th node: four per row, 80px apart.
    pub fn position(index: usize) -> Position {
        let col = (index % Self::COLUMNS) as f64;
        let row = (index / Self::COLUMNS) as f64;
        Position::new(
            Self::ORIGIN_X + col * Self::STEP,
            Self::ORIGIN_Y + row * Self::STEP,
        )
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Normalize a candidate payload, degrading to [`degenerate_schema`] when
/// the repaired result still fails validation.
pub fn normalize(candidate: &Value, ids: &mut dyn IdGenerator) -> PageSchema {
    match try_normalize(candidate, ids) {
        Ok(schema) => schema,
        Err(err) => {
            log::warn!("schema could not be repaired ({err}), using one-node fallback");
            let mut schema = degenerate_schema(ids);
            schema.title = title_of(candidate);
            schema
        }
    }
}

/// Normalize a JSON string. Text that is not JSON at all is treated like an
/// empty payload.
pub fn normalize_str(raw: &str, ids: &mut dyn IdGenerator) -> PageSchema {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|err| {
        log::debug!("payload is not JSON ({err}), treating as empty");
        Value::Null
    });
    normalize(&value, ids)
}

/// Run every repair step and validate the result.
///
/// # Errors
/// Returns the validation failure left after repair, which in practice is
/// only [`SchemaError::NoNodes`].
pub fn try_normalize(
    candidate: &Value,
    ids: &mut dyn IdGenerator,
) -> Result<PageSchema, SchemaError> {
    let empty = Map::new();
    let root = candidate.as_object().unwrap_or_else(|| {
        log::debug!("payload is not an object");
        &empty
    });

    let (node_candidates, misplaced_edges) = partition_nodes(array_field(root, "nodes"));
    let nodes = coerce_nodes(&node_candidates, ids);

    let edge_candidates: Vec<&Map<String, Value>> = array_field(root, "edges")
        .iter()
        .filter_map(Value::as_object)
        .chain(misplaced_edges)
        .collect();
    let mut edges = coerce_edges(&edge_candidates, &nodes, ids);

    wire_preview(&nodes, &mut edges, ids);

    let schema = PageSchema {
        title: title_of(candidate),
        nodes,
        edges,
    };
    schema.validate()?;
    Ok(schema)
}

/// A single section wired to `preview`.
pub fn degenerate_schema(ids: &mut dyn IdGenerator) -> PageSchema {
    let node = ComponentNode::new(
        ids.next_id("node"),
        ComponentType::Section,
        GridLayout::position(0),
    );
    let edge = Edge::to_preview(ids.next_id("edge"), node.id);
    PageSchema {
        title: None,
        nodes: vec![node],
        edges: vec![edge],
    }
}

// ─── Steps ───────────────────────────────────────────────────────────────

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => {
            log::debug!("`{key}` is not an array, ignoring");
            &[]
        }
    }
}

fn title_of(candidate: &Value) -> Option<String> {
    candidate
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Split the claimed node list into true nodes and edge-shaped entries
/// (`source` + `target`, no `data`). Non-objects are dropped.
fn partition_nodes(
    entries: &[Value],
) -> (Vec<&Map<String, Value>>, Vec<&Map<String, Value>>) {
    let mut nodes = Vec::with_capacity(entries.len());
    let mut edges = Vec::new();
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            log::debug!("dropping non-object node entry");
            continue;
        };
        if obj.contains_key("source") && obj.contains_key("target") && !obj.contains_key("data") {
            log::debug!("reclassifying edge-shaped node entry as an edge");
            edges.push(obj);
        } else {
            nodes.push(obj);
        }
    }
    (nodes, edges)
}

/// Next id from `ids` that is not in `taken`, which then reserves it.
fn fresh_id(ids: &mut dyn IdGenerator, prefix: &str, taken: &mut HashSet<NodeId>) -> NodeId {
    loop {
        let id = ids.next_id(prefix);
        if taken.insert(id) {
            return id;
        }
        log::trace!("synthesized id `{id}` is already taken, drawing another");
    }
}

fn coerce_nodes(candidates: &[&Map<String, Value>], ids: &mut dyn IdGenerator) -> Vec<ComponentNode> {
    // Explicit ids are reserved up front so a synthesized id never collides
    // with one that appears later in the payload.
    let mut taken: HashSet<NodeId> = candidates.iter().filter_map(|obj| id_field(obj)).collect();
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut nodes = Vec::with_capacity(candidates.len());

    for (index, obj) in candidates.iter().enumerate() {
        let id = match id_field(obj) {
            Some(id) if seen.contains(&id) => {
                let fresh = fresh_id(ids, "node", &mut taken);
                log::debug!("duplicate node id `{id}` renamed to `{fresh}`");
                fresh
            }
            Some(id) => id,
            None => {
                let fresh = fresh_id(ids, "node", &mut taken);
                log::debug!("node #{index} has no id, assigned `{fresh}`");
                fresh
            }
        };
        seen.insert(id);

        let position = position_field(obj).unwrap_or_else(|| {
            log::debug!("node `{id}` has no usable position, placing on grid");
            GridLayout::position(index)
        });

        let data = obj.get("data").and_then(Value::as_object);
        let component = component_field(obj, data).unwrap_or_else(|| {
            log::debug!("node `{id}` has no component type, using section");
            ComponentType::Section
        });
        let label = data
            .and_then(|d| d.get("label"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| component.as_str().to_string());
        let props: Props = data
            .and_then(|d| d.get("props"))
            .or_else(|| obj.get("props"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        nodes.push(ComponentNode {
            id,
            position,
            component,
            label,
            props,
        });
    }
    nodes
}

fn coerce_edges(
    candidates: &[&Map<String, Value>],
    nodes: &[ComponentNode],
    ids: &mut dyn IdGenerator,
) -> Vec<Edge> {
    let node_ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
    let mut taken: HashSet<NodeId> = candidates.iter().filter_map(|obj| id_field(obj)).collect();
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut edges = Vec::with_capacity(candidates.len());

    for obj in candidates {
        let (Some(child), Some(parent)) = (endpoint(obj, "source"), endpoint(obj, "target")) else {
            log::debug!("dropping edge without source or target");
            continue;
        };
        if !node_ids.contains(&child) {
            log::debug!("dropping edge from unknown node `{child}`");
            continue;
        }
        let id = match id_field(obj) {
            Some(id) if !seen.contains(&id) => id,
            existing => {
                let fresh = fresh_id(ids, "edge", &mut taken);
                match existing {
                    Some(dup) => log::debug!("duplicate edge id `{dup}` renamed to `{fresh}`"),
                    None => log::debug!("edge {child} -> {parent} has no id, assigned `{fresh}`"),
                }
                fresh
            }
        };
        seen.insert(id);
        edges.push(Edge::new(id, child, parent));
    }
    edges
}

/// Make sure something reaches the sink: wire the first unparented node to
/// `preview` when no edge targets it yet.
fn wire_preview(nodes: &[ComponentNode], edges: &mut Vec<Edge>, ids: &mut dyn IdGenerator) {
    if nodes.is_empty() || edges.iter().any(Edge::targets_preview) {
        return;
    }
    match unparented(nodes, edges).first() {
        Some(&root) => {
            let mut taken: HashSet<NodeId> = edges.iter().map(|e| e.id).collect();
            let edge = Edge::to_preview(fresh_id(ids, "edge", &mut taken), root);
            log::debug!("wiring root `{root}` to preview via `{}`", edge.id);
            edges.push(edge);
        }
        None => log::debug!("no unparented node to wire to preview"),
    }
}

// ─── Field coercion ──────────────────────────────────────────────────────

fn id_field(obj: &Map<String, Value>) -> Option<NodeId> {
    match obj.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(NodeId::intern(s)),
        Value::Number(n) => Some(NodeId::intern(&n.to_string())),
        _ => None,
    }
}

fn endpoint(obj: &Map<String, Value>, key: &str) -> Option<NodeId> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(NodeId::intern)
}

fn position_field(obj: &Map<String, Value>) -> Option<Position> {
    let pos = obj.get("position")?.as_object()?;
    let x = pos.get("x")?.as_f64().filter(|v| v.is_finite())?;
    let y = pos.get("y")?.as_f64().filter(|v| v.is_finite())?;
    Some(Position::new(x, y))
}

/// `data.type` when present, otherwise a top-level `type` naming a built-in
/// component (models sometimes flatten `data`).
fn component_field(obj: &Map<String, Value>, data: Option<&Map<String, Value>>) -> Option<ComponentType> {
    if let Some(kind) = data
        .and_then(|d| d.get("type"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(ComponentType::parse(kind));
    }
    obj.get("type")
        .and_then(Value::as_str)
        .map(ComponentType::parse)
        .filter(ComponentType::is_builtin)
}
