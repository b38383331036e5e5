//! Lint diagnostics for page schemas.
//!
//! Reports structural issues without modifying the schema. This pass is
//! optional and never runs on the render path; everything it reports is
//! something the renderer already tolerates.

use crate::id::NodeId;
use crate::index::ChildIndex;
use crate::links::{UrlUse, is_safe_url};
use crate::model::{ComponentType, PageSchema};
use crate::roots::{resolve_roots, sink_ids};
use crate::style::is_valid_style_json;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed; likely a mistake.
    Warning,
    /// Informational: renders fine, but probably not what was meant.
    Info,
}

impl LintSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A single lint diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The node (or, for edge rules, the edge) this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge-source", "cycle").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the schema and return diagnostics, warnings
/// grouped before infos in rule order.
#[must_use]
pub fn lint_schema(schema: &PageSchema) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(schema, &mut diags);
    lint_dangling_edges(schema, &mut diags);
    lint_missing_preview(schema, &mut diags);
    lint_cycles(schema, &mut diags);
    lint_unknown_components(schema, &mut diags);
    lint_unsafe_urls(schema, &mut diags);
    lint_style_json(schema, &mut diags);
    lint_unreachable(schema, &mut diags);
    diags
}

fn warn(diags: &mut Vec<LintDiagnostic>, node_id: NodeId, rule: &'static str, message: String) {
    diags.push(LintDiagnostic {
        node_id,
        message,
        severity: LintSeverity::Warning,
        rule,
    });
}

fn info(diags: &mut Vec<LintDiagnostic>, node_id: NodeId, rule: &'static str, message: String) {
    diags.push(LintDiagnostic {
        node_id,
        message,
        severity: LintSeverity::Info,
        rule,
    });
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Warn on node or edge ids used more than once.
fn lint_duplicate_ids(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for node in &schema.nodes {
        if !seen.insert(node.id) {
            warn(
                diags,
                node.id,
                "duplicate-node-id",
                format!("Node id `{}` is used more than once; only the first is rendered.", node.id),
            );
        }
    }
    let mut seen = HashSet::new();
    for edge in &schema.edges {
        if !seen.insert(edge.id) {
            warn(
                diags,
                edge.id,
                "duplicate-edge-id",
                format!("Edge id `{}` is used more than once.", edge.id),
            );
        }
    }
}

/// Warn on edges whose child or parent does not exist.
fn lint_dangling_edges(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    let nodes: HashSet<NodeId> = schema.nodes.iter().map(|n| n.id).collect();
    let sinks = sink_ids(&schema.nodes);
    for edge in &schema.edges {
        let (child, parent) = (edge.child_of(), edge.parent_of());
        if !nodes.contains(&child) {
            warn(
                diags,
                edge.id,
                "dangling-edge-source",
                format!("Edge `{}` starts at missing node `{child}`.", edge.id),
            );
        }
        if !nodes.contains(&parent) && !sinks.contains(&parent) {
            warn(
                diags,
                edge.id,
                "dangling-edge-target",
                format!("Edge `{}` points at missing parent `{parent}`.", edge.id),
            );
        }
    }
}

/// Warn when nodes exist but no edge reaches the `preview` sink.
fn lint_missing_preview(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    if schema.nodes.is_empty() {
        return;
    }
    let sinks = sink_ids(&schema.nodes);
    if schema.edges.iter().any(|e| sinks.contains(&e.parent_of())) {
        return;
    }
    // A sink node with no children still switches root resolution to the
    // sink rule, which then yields nothing.
    let message = match schema.nodes.iter().find(|n| n.is_sink()) {
        Some(sink) => format!("Sink node `{}` has no children; nothing is rendered.", sink.id),
        None => "No node is connected to `preview`; unparented nodes are shown instead.".to_string(),
    };
    warn(diags, NodeId::preview(), "missing-preview", message);
}

/// Warn once per strongly connected component of the child→parent graph.
fn lint_cycles(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
    for node in &schema.nodes {
        index.entry(node.id).or_insert_with(|| graph.add_node(node.id));
    }
    let mut self_loops = HashSet::new();
    for edge in &schema.edges {
        let (Some(&child), Some(&parent)) = (index.get(&edge.child_of()), index.get(&edge.parent_of()))
        else {
            continue;
        };
        if child == parent {
            self_loops.insert(child);
        }
        graph.add_edge(child, parent, ());
    }

    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.first().is_some_and(|n| self_loops.contains(n)))
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    components.sort();

    for scc in components {
        let members: Vec<&str> = scc.iter().map(|&ix| graph[ix].as_str()).collect();
        warn(
            diags,
            graph[scc[0]],
            "cycle",
            format!(
                "Nodes form a parent cycle ({}); each is rendered at most once per tree.",
                members.join(" → ")
            ),
        );
    }
}

/// Info on component types with no built-in renderer.
fn lint_unknown_components(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    for node in &schema.nodes {
        if let ComponentType::Other(kind) = &node.component {
            info(
                diags,
                node.id,
                "unknown-component",
                format!("`{}` has unknown type `{kind}` and renders nothing.", node.id),
            );
        }
    }
}

/// Warn on `href`/`src` values the renderer refuses to emit.
fn lint_unsafe_urls(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    for node in &schema.nodes {
        let (key, usage) = match node.component {
            ComponentType::Button => ("href", UrlUse::Link),
            ComponentType::Image | ComponentType::Avatar => ("src", UrlUse::Media),
            _ => continue,
        };
        let Some(Value::String(raw)) = node.props.get(key) else {
            continue;
        };
        if !raw.trim().is_empty() && !is_safe_url(raw, usage) {
            warn(
                diags,
                node.id,
                "unsafe-url",
                format!("`{key}` on `{}` is not an allowed {} URL and is dropped.", node.id, usage.as_str()),
            );
        }
    }
}

/// Info on `styleJson` that will be ignored.
fn lint_style_json(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    for node in &schema.nodes {
        let valid = match node.props.get("styleJson") {
            None | Some(Value::Null) => true,
            Some(Value::String(raw)) => is_valid_style_json(raw),
            Some(_) => false,
        };
        if !valid {
            info(
                diags,
                node.id,
                "invalid-style-json",
                format!("`styleJson` on `{}` is not a JSON object and is ignored.", node.id),
            );
        }
    }
}

/// Info on nodes no root reaches.
fn lint_unreachable(schema: &PageSchema, diags: &mut Vec<LintDiagnostic>) {
    let children = ChildIndex::build(&schema.edges);
    let mut reached: HashSet<NodeId> = HashSet::new();
    let mut stack = resolve_roots(&schema.nodes, &schema.edges);
    while let Some(id) = stack.pop() {
        if reached.insert(id) {
            stack.extend_from_slice(children.children(id));
        }
    }

    let mut reported = HashSet::new();
    for node in &schema.nodes {
        if node.is_sink() || reached.contains(&node.id) || !reported.insert(node.id) {
            continue;
        }
        info(
            diags,
            node.id,
            "unreachable-node",
            format!("`{}` is not reachable from any root and is not rendered.", node.id),
        );
    }
}

/// Number of warnings in a diagnostic list.
pub fn warning_count(diags: &[LintDiagnostic]) -> usize {
    diags
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count()
}

// ─── Tests ────────────────────────────────────────────────────────────────
