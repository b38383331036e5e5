//! Schema → visual tree.
//!
//! A depth-first walk from each root through the child index. Each node's
//! children are ordered and rendered first, then a per-type renderer builds
//! the element around them, and finally the universal `className` and
//! `styleJson` hooks are layered on top. The walk is a pure function of its
//! inputs; its only state is the per-tree set of cyclic nodes already
//! expanded.

use pb_core::index::ChildIndex;
use pb_core::order::order_children;
use pb_core::props::{
    AlertProps, AvatarProps, BadgeProps, ButtonProps, CardProps, ComponentProps, CrossAlign,
    FlexProps, ImageProps, Justify, Orientation, SectionProps, SeparatorProps, TextProps,
};
use pb_core::style::Presentation;
use pb_core::units::Length;
use pb_core::{ComponentNode, NodeId, NodeMap, PageSchema, Resolution};
use std::collections::HashSet;

use crate::tree::VisualNode;

/// Render every root of `schema`, in root order.
#[must_use]
pub fn render_schema(schema: &PageSchema) -> Vec<VisualNode> {
    let resolution = Resolution::new(schema);
    render_resolution(&resolution)
}

/// Render every root of an already-resolved schema.
#[must_use]
pub fn render_resolution(resolution: &Resolution<'_>) -> Vec<VisualNode> {
    let cyclic = resolution.index.cyclic_nodes();
    render_roots(resolution.roots(), &resolution.nodes, &resolution.index, &cyclic)
}

/// Render `roots` in order, given the index's precomputed
/// [`ChildIndex::cyclic_nodes`].
#[must_use]
pub fn render_roots(
    roots: &[NodeId],
    nodes: &NodeMap<'_>,
    index: &ChildIndex,
    cyclic: &HashSet<NodeId>,
) -> Vec<VisualNode> {
    roots
        .iter()
        .filter_map(|&root| Walk::new(nodes, index, cyclic).node(root))
        .collect()
}

/// Render the tree under `root`.
///
/// Returns `None` when the root is missing or has a type without a
/// renderer. Nodes on a parent cycle are expanded at most once per tree,
/// so cyclic input renders in time linear in its edges. Acyclic nodes
/// reached through several edges render once per edge.
#[must_use]
pub fn render_tree(root: NodeId, nodes: &NodeMap<'_>, index: &ChildIndex) -> Option<VisualNode> {
    let cyclic = index.cyclic_nodes();
    Walk::new(nodes, index, &cyclic).node(root)
}

struct Walk<'a, 's> {
    nodes: &'a NodeMap<'s>,
    index: &'a ChildIndex,
    cyclic: &'a HashSet<NodeId>,
    expanded: HashSet<NodeId>,
}

impl<'a, 's> Walk<'a, 's> {
    fn new(nodes: &'a NodeMap<'s>, index: &'a ChildIndex, cyclic: &'a HashSet<NodeId>) -> Self {
        Self {
            nodes,
            index,
            cyclic,
            expanded: HashSet::new(),
        }
    }

    fn node(&mut self, id: NodeId) -> Option<VisualNode> {
        let Some(node) = self.nodes.get(&id).copied() else {
            log::trace!("skipping missing node `{id}`");
            return None;
        };
        if !node.component.is_builtin() {
            log::trace!("`{id}` has type `{}` without a renderer", node.component);
            return None;
        }
        if self.cyclic.contains(&id) && !self.expanded.insert(id) {
            log::debug!("cycle guard: `{id}` was already rendered in this tree, skipping");
            return None;
        }

        let children: Vec<VisualNode> =
            order_children(Some(node), self.index.children(id), self.nodes)
                .into_iter()
                .filter_map(|child| self.node(child))
                .collect();

        log::trace!("render `{id}` as {} with {} child(ren)", node.component, children.len());
        let element = render_component(node, children)?;
        Some(apply_presentation(element.keyed(id), node))
    }
}

/// Dispatch on component type.
fn render_component(node: &ComponentNode, children: Vec<VisualNode>) -> Option<VisualNode> {
    let element = match ComponentProps::parse(&node.component, &node.props) {
        ComponentProps::Section(p) => section(&p, children),
        ComponentProps::Row(p) => flex(&p, "row", children),
        ComponentProps::Column(p) => flex(&p, "column", children),
        ComponentProps::Text(p) => text(node, &p, children),
        ComponentProps::Image(p) => image(node, &p),
        ComponentProps::Button(p) => button(node, &p, children),
        ComponentProps::Card(p) => card(node, &p, children),
        ComponentProps::Badge(p) => badge(node, &p),
        ComponentProps::Avatar(p) => avatar(node, &p),
        ComponentProps::Alert(p) => alert(node, &p, children),
        ComponentProps::Separator(p) => separator(&p),
        ComponentProps::Unknown(_) => return None,
    };
    Some(element)
}

/// `className` tokens and `styleJson` entries; user style wins.
fn apply_presentation(mut element: VisualNode, node: &ComponentNode) -> VisualNode {
    let Presentation { class_name, style } = Presentation::from_props(&node.props);
    if let Some(class_name) = class_name {
        element
            .user_classes
            .extend(class_name.split_whitespace().map(str::to_string));
    }
    element.style.extend(style);
    element
}

// ─── Component renderers ─────────────────────────────────────────────────

fn css(length: &Option<Length>) -> Option<String> {
    length.as_ref().map(Length::to_css)
}

fn section(p: &SectionProps, children: Vec<VisualNode>) -> VisualNode {
    let centered = p.max_width.is_some().then(|| "0 auto".to_string());
    VisualNode::element("section")
        .class("section")
        .class(format!("align-{}", p.align.as_str()))
        .style("background", p.background.clone())
        .style("padding", css(&p.padding))
        .style("max-width", css(&p.max_width))
        .style("margin", centered)
        .style("text-align", Some(p.align.as_str().to_string()))
        .children(children)
}

fn flex(p: &FlexProps, direction: &'static str, children: Vec<VisualNode>) -> VisualNode {
    let justify = match p.justify {
        Justify::Start => "flex-start",
        Justify::Center => "center",
        Justify::Between => "space-between",
        Justify::End => "flex-end",
    };
    let align = match p.align {
        CrossAlign::Start => "flex-start",
        CrossAlign::Center => "center",
        CrossAlign::End => "flex-end",
    };
    VisualNode::element("div")
        .class(direction)
        .class(format!("justify-{}", p.justify.as_str()))
        .class(format!("align-{}", p.align.as_str()))
        .style("display", Some("flex".into()))
        .style("flex-direction", Some(direction.into()))
        .style("gap", css(&p.gap))
        .style("padding", css(&p.padding))
        .style("justify-content", Some(justify.into()))
        .style("align-items", Some(align.into()))
        .children(children)
}

fn text(node: &ComponentNode, p: &TextProps, children: Vec<VisualNode>) -> VisualNode {
    let content = p.content.clone().unwrap_or_else(|| node.label.clone());
    VisualNode::element(p.tag.as_str())
        .class("text")
        .style("font-size", css(&p.font_size))
        .style("color", p.color.clone())
        .style("font-weight", p.weight.clone())
        .style("text-align", Some(p.align.as_str().to_string()))
        .text(content)
        .children(children)
}

/// Images are void elements; schema children of an image are dropped.
fn image(node: &ComponentNode, p: &ImageProps) -> VisualNode {
    let alt = p.alt.clone().unwrap_or_else(|| node.label.clone());
    let rounded = p.rounded.then(|| "8px".to_string());
    let element = match &p.src {
        Some(src) => VisualNode::element("img")
            .class("image")
            .attr("src", src.clone())
            .attr("alt", alt)
            .attr("loading", "lazy"),
        None => VisualNode::element("div")
            .class("image")
            .class("image-empty")
            .attr("role", "img")
            .attr("aria-label", alt.clone())
            .text(alt),
    };
    element
        .style("width", css(&p.width))
        .style("height", css(&p.height))
        .style("border-radius", rounded)
}

fn button(node: &ComponentNode, p: &ButtonProps, children: Vec<VisualNode>) -> VisualNode {
    let label = p.label.clone().unwrap_or_else(|| node.label.clone());
    let element = match &p.href {
        Some(href) => VisualNode::element("a")
            .attr("href", href.clone())
            .attr("role", "button"),
        None => VisualNode::element("button").attr("type", "button"),
    };
    let element = element
        .class("button")
        .class(format!("size-{}", p.size.as_str()))
        .style("border-radius", p.rounded.then(|| "9999px".to_string()));
    let element = if p.rounded { element.class("rounded") } else { element };
    element.text(label).children(children)
}

fn card(node: &ComponentNode, p: &CardProps, children: Vec<VisualNode>) -> VisualNode {
    let title = p.title.clone().unwrap_or_else(|| node.label.clone());
    let mut element = VisualNode::element("div")
        .class("card")
        .style("padding", css(&p.padding))
        .child(VisualNode::element("h3").class("card-title").text(title));
    if let Some(description) = &p.description {
        element = element.child(
            VisualNode::element("p")
                .class("card-description")
                .text(description.clone()),
        );
    }
    element.children(children)
}

fn badge(node: &ComponentNode, p: &BadgeProps) -> VisualNode {
    VisualNode::element("span")
        .class("badge")
        .class(format!("badge-{}", p.variant.as_str()))
        .text(p.text.clone().unwrap_or_else(|| node.label.clone()))
}

fn avatar(node: &ComponentNode, p: &AvatarProps) -> VisualNode {
    let alt = p.alt.clone().unwrap_or_else(|| node.label.clone());
    let size = css(&p.size);
    let element = match &p.src {
        Some(src) => VisualNode::element("img")
            .attr("src", src.clone())
            .attr("alt", alt),
        None => VisualNode::element("span")
            .attr("role", "img")
            .attr("aria-label", alt.clone())
            .text(initials(&alt)),
    };
    element
        .class("avatar")
        .style("width", size.clone())
        .style("height", size)
        .style("border-radius", p.rounded.then(|| "50%".to_string()))
}

/// Up to two initials, upper-cased.
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

fn alert(node: &ComponentNode, p: &AlertProps, children: Vec<VisualNode>) -> VisualNode {
    let title = p.title.clone().unwrap_or_else(|| node.label.clone());
    let mut element = VisualNode::element("div")
        .class("alert")
        .class(format!("alert-{}", p.variant.as_str()))
        .attr("role", "alert")
        .child(VisualNode::element("strong").class("alert-title").text(title));
    if let Some(description) = &p.description {
        element = element.child(
            VisualNode::element("p")
                .class("alert-description")
                .text(description.clone()),
        );
    }
    element.children(children)
}

/// Separators are void elements; schema children are dropped.
fn separator(p: &SeparatorProps) -> VisualNode {
    let thickness = css(&p.thickness).unwrap_or_else(|| "1px".to_string());
    let color = p.color.clone().unwrap_or_else(|| "currentColor".to_string());
    let rule = Some(format!("{thickness} solid {color}"));
    match p.orientation {
        Orientation::Horizontal => VisualNode::element("hr")
            .class("separator")
            .class("separator-horizontal")
            .style("border", Some("0".into()))
            .style("border-top", rule),
        Orientation::Vertical => VisualNode::element("div")
            .class("separator")
            .class("separator-vertical")
            .attr("role", "separator")
            .attr("aria-orientation", "vertical")
            .style("align-self", Some("stretch".into()))
            .style("border-left", rule),
    }
}
