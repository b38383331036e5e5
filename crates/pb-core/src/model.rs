//! Core page-schema data model.
//!
//! A page is an unordered bag of component nodes plus child→parent edges.
//! Edges point from the CHILD (`source`) to the PARENT (`target`); the
//! reserved target `preview` marks a subtree as visible output. Node
//! positions only drive sibling ordering and initial canvas layout, never
//! containment.

use crate::error::SchemaError;
use crate::id::{NodeId, PREVIEW_ID};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Open, component-specific parameter bag as it travels on the wire.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Lookup from node id to node. First occurrence wins on duplicate ids.
pub type NodeMap<'a> = HashMap<NodeId, &'a ComponentNode>;

// ─── Position ────────────────────────────────────────────────────────────

/// Canvas position. Used for sibling ordering and layout only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The `x` used for ordering: non-finite values sort as 0.
    pub fn order_x(&self) -> f64 {
        if self.x.is_finite() { self.x } else { 0.0 }
    }
}

// ─── Component types ─────────────────────────────────────────────────────

/// The tag selecting which renderer handles a node.
///
/// The built-in set is closed; anything else is kept verbatim in `Other`
/// and renders as nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Section,
    Row,
    Column,
    Text,
    Image,
    Button,
    Card,
    Badge,
    Avatar,
    Alert,
    Separator,
    /// The canvas sink node. Never rendered itself.
    Preview,
    Other(String),
}

impl ComponentType {
    /// All built-in renderable types, in palette order.
    pub const BUILTIN: [ComponentType; 11] = [
        ComponentType::Section,
        ComponentType::Row,
        ComponentType::Column,
        ComponentType::Text,
        ComponentType::Image,
        ComponentType::Button,
        ComponentType::Card,
        ComponentType::Badge,
        ComponentType::Avatar,
        ComponentType::Alert,
        ComponentType::Separator,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "section" => Self::Section,
            "row" => Self::Row,
            "column" => Self::Column,
            "text" => Self::Text,
            "image" => Self::Image,
            "button" => Self::Button,
            "card" => Self::Card,
            "badge" => Self::Badge,
            "avatar" => Self::Avatar,
            "alert" => Self::Alert,
            "separator" => Self::Separator,
            PREVIEW_ID => Self::Preview,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Section => "section",
            Self::Row => "row",
            Self::Column => "column",
            Self::Text => "text",
            Self::Image => "image",
            Self::Button => "button",
            Self::Card => "card",
            Self::Badge => "badge",
            Self::Avatar => "avatar",
            Self::Alert => "alert",
            Self::Separator => "separator",
            Self::Preview => PREVIEW_ID,
            Self::Other(s) => s,
        }
    }

    /// Whether a built-in renderer exists for this type.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Preview | Self::Other(_))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ComponentType::parse(&s))
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A visual component instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireNode", into = "WireNode")]
pub struct ComponentNode {
    pub id: NodeId,
    pub position: Position,
    pub component: ComponentType,
    /// Display label, independent of the component type.
    pub label: String,
    pub props: Props,
}

impl ComponentNode {
    /// A node labelled with its own type name and no props.
    pub fn new(id: NodeId, component: ComponentType, position: Position) -> Self {
        let label = component.as_str().to_string();
        Self {
            id,
            position,
            component,
            label,
            props: Props::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// A node acting as the `preview` sink, by id or by type.
    pub fn is_sink(&self) -> bool {
        self.id.is_preview() || self.component == ComponentType::Preview
    }

    /// Explicit child ordering from `props.childOrder`, if present.
    pub fn child_order(&self) -> Option<Vec<NodeId>> {
        let order = self.props.get("childOrder")?.as_array()?;
        Some(
            order
                .iter()
                .filter_map(|v| v.as_str())
                .map(NodeId::intern)
                .collect(),
        )
    }
}

/// Wire shape: `{id, type?|rfType?, position, data: {type, label, props}}`.
/// The canvas tag is always written as `type`; an incoming `rfType` is
/// skipped like any other unknown key.
#[derive(Serialize, Deserialize)]
struct WireNode {
    id: NodeId,
    #[serde(rename = "type", default)]
    rf_type: Option<String>,
    position: Position,
    data: WireData,
}

#[derive(Serialize, Deserialize)]
struct WireData {
    #[serde(rename = "type")]
    component: ComponentType,
    label: String,
    #[serde(default)]
    props: Props,
}

impl From<WireNode> for ComponentNode {
    fn from(wire: WireNode) -> Self {
        Self {
            id: wire.id,
            position: wire.position,
            component: wire.data.component,
            label: wire.data.label,
            props: wire.data.props,
        }
    }
}

impl From<ComponentNode> for WireNode {
    fn from(node: ComponentNode) -> Self {
        Self {
            id: node.id,
            rf_type: Some("component".to_string()),
            position: node.position,
            data: WireData {
                component: node.component,
                label: node.label,
                props: node.props,
            },
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A child→parent relation: `source` is the child, `target` the parent
/// (or the `preview` sink). Read it through `child_of`/`parent_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: NodeId,
    source: NodeId,
    target: NodeId,
}

impl Edge {
    /// Connect `child` under `parent`.
    pub fn new(id: NodeId, child: NodeId, parent: NodeId) -> Self {
        Self {
            id,
            source: child,
            target: parent,
        }
    }

    /// Wire `root` to the `preview` sink.
    pub fn to_preview(id: NodeId, root: NodeId) -> Self {
        Self::new(id, root, NodeId::preview())
    }

    /// The child end (`source` on the wire).
    pub fn child_of(&self) -> NodeId {
        self.source
    }

    /// The parent end (`target` on the wire).
    pub fn parent_of(&self) -> NodeId {
        self.target
    }

    pub fn targets_preview(&self) -> bool {
        self.target.is_preview()
    }
}

// ─── Schema ──────────────────────────────────────────────────────────────

/// The canonical `{title?, nodes, edges}` document for one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub nodes: Vec<ComponentNode>,
    pub edges: Vec<Edge>,
}

impl PageSchema {
    /// Strict parse of the canonical wire format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"nodes":[],"edges":[]}"#.to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }

    pub fn node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ComponentNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Build an id → node lookup (first occurrence wins).
    pub fn node_map(&self) -> NodeMap<'_> {
        let mut map = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            map.entry(node.id).or_insert(node);
        }
        map
    }

    /// Check the closed set of structural requirements of a canonical schema.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.nodes.is_empty() {
            return Err(SchemaError::NoNodes);
        }

        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let id = node.id.as_str();
            if id.is_empty() {
                return Err(SchemaError::EmptyNodeId { index });
            }
            if !node_ids.insert(node.id) {
                return Err(SchemaError::DuplicateNodeId { id: id.to_string() });
            }
            if !node.position.x.is_finite() || !node.position.y.is_finite() {
                return Err(SchemaError::NonFinitePosition { id: id.to_string() });
            }
            if node.component.as_str().is_empty() {
                return Err(SchemaError::EmptyComponentType { id: id.to_string() });
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                return Err(SchemaError::DuplicateEdgeId {
                    id: edge.id.as_str().to_string(),
                });
            }
            if edge.child_of().as_str().is_empty() || edge.parent_of().as_str().is_empty() {
                return Err(SchemaError::EmptyEdgeEndpoint {
                    id: edge.id.as_str().to_string(),
                });
            }
        }

        Ok(())
    }
}
