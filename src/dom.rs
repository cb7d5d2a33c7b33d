//! DOM mutation capability and an in-memory document.
//!
//! Rendering decisions never touch a host DOM directly. They go through the
//! [`Renderer`] trait, which mirrors the handful of primitives a UI framework
//! exposes: create an element, set attributes, set inner HTML, insert before a
//! sibling, remove. [`Document`] is the arena-backed implementation used by the
//! CLI and the tests; it serializes to HTML with maud's escaping.
//!
//! Removed nodes stay in the arena but are detached, so stale [`NodeId`]s never
//! dangle. Slots are never reused: a [`Document`] grows with every render pass
//! made into it and is meant to be short-lived (one document per render, as
//! [`render_once`](crate::directive::render_once) does). Long-lived hosts
//! bring their own [`Renderer`] over a real DOM.

use maud::html;
use tracing::warn;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// DOM primitives the render engine needs from its host.
pub trait Renderer {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached comment node (used for host anchors).
    fn create_comment(&mut self, text: &str) -> NodeId;

    /// Set (or replace) an attribute. Non-element nodes and invalid attribute
    /// names are ignored.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Attributes of an element in insertion order.
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    /// Replace all children with raw, already-serialized HTML.
    fn set_inner_html(&mut self, node: NodeId, html: &str);

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    fn parent_node(&self, node: NodeId) -> Option<NodeId>;

    /// Insert `node` before `reference` under `parent`; `None` appends.
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);

    /// Detach `node` from its parent.
    fn remove(&mut self, node: NodeId);
}

#[derive(Debug, Clone)]
enum NodeKind {
    Fragment,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Comment(String),
    Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document rooted at a fragment node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root fragment.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Nodes ever created in this document, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[node.0].children {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize everything attached to the root.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let n = &self.nodes[node.0];
        match &n.kind {
            NodeKind::Fragment => {
                for &child in &n.children {
                    self.write_node(child, out);
                }
            }
            NodeKind::Element { tag, attrs } => {
                write_start_tag(tag, attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())), out);
                if is_void(tag) {
                    return;
                }
                for &child in &n.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Raw(raw) => out.push_str(raw),
        }
    }
}

impl Renderer for Document {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.replace("--", "- -")))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if !is_valid_attr_name(name) {
            warn!(name, "skipping invalid attribute name");
            return;
        }
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.0].kind {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs.clone(),
            _ => Vec::new(),
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let raw = self.push(NodeKind::Raw(html.to_string()));
        self.append_child(node, raw);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        self.detach(node);
        let siblings = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// HTML attribute names: no whitespace, quotes, `>`, `/`, `=` or control characters.
pub fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '='))
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

fn write_start_tag<'a>(tag: &str, attrs: impl Iterator<Item = (&'a str, &'a str)>, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        if !is_valid_attr_name(name) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push('>');
}

/// Serialize a detached element with the given attributes and no children,
/// the way `outerHTML` of a freshly created element reads.
pub fn element_html<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let tag = tag.to_ascii_lowercase();
    let mut out = String::new();
    write_start_tag(&tag, attrs.into_iter(), &mut out);
    if !is_void(&tag) {
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
    out
}
