//! The renderer's output: a small, framework-neutral element tree.

use pb_core::NodeId;
use pb_core::style::StyleMap;
use serde::Serialize;

/// One rendered element.
///
/// `classes` are semantic tokens (`"section"`, `"size-lg"`) that emitters
/// prefix; `user_classes` come verbatim from the node's `className`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    /// Id of the schema node this element renders. Decorations the renderer
    /// adds itself (a card's heading, an alert's title) carry no key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<NodeId>,
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(&'static str, String)>,
    #[serde(skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    pub fn element(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn keyed(mut self, id: NodeId) -> Self {
        self.key = Some(id);
        self
    }

    #[must_use]
    pub fn class(mut self, token: impl Into<String>) -> Self {
        self.classes.push(token.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Set a style entry; `None` leaves the map untouched.
    #[must_use]
    pub fn style(mut self, property: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.style.insert(property.to_string(), value);
        }
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: VisualNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = VisualNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Value of attribute `name`, if set.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the element rendered from `id`.
    pub fn find(&self, id: NodeId) -> Option<&VisualNode> {
        if self.key == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Keys of every keyed element in document order.
    pub fn keys(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys(&self, out: &mut Vec<NodeId>) {
        out.extend(self.key);
        for child in &self.children {
            child.collect_keys(out);
        }
    }
}
