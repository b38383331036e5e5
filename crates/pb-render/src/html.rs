//! Visual tree → HTML markup.
//!
//! Serialises a forest of [`VisualNode`]s. Output is deterministic: classes
//! in render order, attributes in insertion order, style properties sorted.

use crate::render::render_schema;
use crate::tree::VisualNode;
use pb_core::PageSchema;
use pb_core::style::StyleMap;

/// Elements written without a closing tag.
const VOID_ELEMENTS: [&str; 4] = ["img", "hr", "br", "input"];

/// Knobs for HTML emission.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Prefix for semantic class tokens: `section` → `pb-section`. Empty
    /// means no prefix.
    pub class_prefix: String,
    /// Emit `data-node-id` on keyed elements (the canvas uses it to map
    /// clicks in the preview back to nodes).
    pub node_id_attrs: bool,
    /// Indent nested elements, one per line.
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            class_prefix: "pb".to_string(),
            node_id_attrs: true,
            pretty: true,
        }
    }
}

impl RenderOptions {
    /// Single-line output without node ids, for embedding.
    pub fn compact() -> Self {
        Self {
            node_id_attrs: false,
            pretty: false,
            ..Self::default()
        }
    }

    /// `pb-<token>`, or the bare token with an empty prefix.
    pub fn class_name(&self, token: &str) -> String {
        if self.class_prefix.is_empty() {
            token.to_string()
        } else {
            format!("{}-{token}", self.class_prefix)
        }
    }
}

/// Render `schema` straight to HTML: index, roots, tree, emit.
#[must_use]
pub fn render_schema_html(schema: &PageSchema, options: &RenderOptions) -> String {
    to_html(&render_schema(schema), options)
}

/// Serialise a forest.
#[must_use]
pub fn to_html(forest: &[VisualNode], options: &RenderOptions) -> String {
    let mut out = String::new();
    for node in forest {
        write_node(&mut out, node, options, 0);
    }
    out
}

fn write_node(out: &mut String, node: &VisualNode, options: &RenderOptions, depth: usize) {
    indent(out, options, depth);
    out.push('<');
    out.push_str(node.tag);
    write_attributes(out, node, options);
    out.push('>');

    if VOID_ELEMENTS.contains(&node.tag) {
        newline(out, options);
        return;
    }

    if node.children.is_empty() {
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        }
    } else {
        newline(out, options);
        if let Some(text) = &node.text {
            indent(out, options, depth + 1);
            out.push_str(&escape_text(text));
            newline(out, options);
        }
        for child in &node.children {
            write_node(out, child, options, depth + 1);
        }
        indent(out, options, depth);
    }

    out.push_str("</");
    out.push_str(node.tag);
    out.push('>');
    newline(out, options);
}

fn write_attributes(out: &mut String, node: &VisualNode, options: &RenderOptions) {
    if options.node_id_attrs {
        if let Some(key) = node.key {
            push_attr(out, "data-node-id", key.as_str());
        }
    }

    let classes: Vec<String> = node
        .classes
        .iter()
        .map(|token| options.class_name(token))
        .chain(node.user_classes.iter().cloned())
        .collect();
    if !classes.is_empty() {
        push_attr(out, "class", &classes.join(" "));
    }

    for (name, value) in &node.attrs {
        push_attr(out, name, value);
    }

    if !node.style.is_empty() {
        push_attr(out, "style", &style_attr(&node.style));
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

/// `a: b; c: d` in key order.
pub fn style_attr(style: &StyleMap) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn indent(out: &mut String, options: &RenderOptions, depth: usize) {
    if options.pretty {
        out.extend(std::iter::repeat_n("  ", depth));
    }
}

fn newline(out: &mut String, options: &RenderOptions) {
    if options.pretty {
        out.push('\n');
    }
}

// ─── Escaping ────────────────────────────────────────────────────────────

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
