//! Templates and the view container they are stamped into.
//!
//! A [`Template`] knows how to build a fresh set of detached root nodes
//! through a [`Renderer`]. The [`ViewContainer`] inserts those roots before
//! its anchor (the directive's host node) and can tear all of them down again.
//!
//! Three templates ship with the crate:
//!
//! - [`ElementTemplate`]: a single element with static attributes, the usual
//!   caller template (`<img class="hero" loading="lazy">`).
//! - [`MetadataMarker`]: open/close boundary markers for editing tooling.
//! - [`EmptyImagePlaceholder`]: what edit mode shows for an empty field when
//!   the caller supplies no template of its own.

use crate::dom::{NodeId, Renderer};
use maud::html;
use serde::{Deserialize, Serialize};

pub trait Template {
    /// Build detached root nodes.
    fn instantiate(&self, renderer: &mut dyn Renderer) -> Vec<NodeId>;
}

/// One element with static attributes and optional raw inner HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementTemplate {
    pub tag: String,
    /// Attributes in the order they are applied.
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
}

impl Default for ElementTemplate {
    fn default() -> Self {
        Self::new("img")
    }
}

impl ElementTemplate {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            inner_html: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = Some(html.into());
        self
    }
}

impl Template for ElementTemplate {
    fn instantiate(&self, renderer: &mut dyn Renderer) -> Vec<NodeId> {
        let el = renderer.create_element(&self.tag);
        for (name, value) in &self.attrs {
            renderer.set_attribute(el, name, value);
        }
        if let Some(inner) = &self.inner_html {
            renderer.set_inner_html(el, inner);
        }
        vec![el]
    }
}

/// Which side of a rendered field a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Open,
    Close,
}

impl MetadataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKind::Open => "open",
            MetadataKind::Close => "close",
        }
    }
}

/// Boundary marker consumed by editing tooling.
///
/// ```text
/// <code type="text/sitecore" chrometype="field" class="scpm" kind="open">{...}</code>
/// <code type="text/sitecore" chrometype="field" class="scpm" kind="close"></code>
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MetadataMarker<'a> {
    pub kind: MetadataKind,
    pub metadata: &'a serde_json::Value,
}

impl Template for MetadataMarker<'_> {
    fn instantiate(&self, renderer: &mut dyn Renderer) -> Vec<NodeId> {
        let code = renderer.create_element("code");
        renderer.set_attribute(code, "type", "text/sitecore");
        renderer.set_attribute(code, "chrometype", "field");
        renderer.set_attribute(code, "class", "scpm");
        renderer.set_attribute(code, "kind", self.kind.as_str());
        if self.kind == MetadataKind::Open {
            let json = self.metadata.to_string();
            renderer.set_inner_html(code, &html! { (json) }.into_string());
        }
        vec![code]
    }
}

/// Default edit-mode placeholder for an image field with no value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyImagePlaceholder;

/// Light grey picture glyph, inlined so the placeholder needs no asset.
const EMPTY_IMAGE_SRC: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 48 48'%3E%3Crect width='48' height='48' fill='%23f0f0f0'/%3E%3Cpath d='M10 36l9-12 7 9 5-6 7 9z' fill='%23bbb'/%3E%3C/svg%3E";

impl Template for EmptyImagePlaceholder {
    fn instantiate(&self, renderer: &mut dyn Renderer) -> Vec<NodeId> {
        let img = renderer.create_element("img");
        renderer.set_attribute(img, "src", EMPTY_IMAGE_SRC);
        renderer.set_attribute(img, "alt", "");
        renderer.set_attribute(img, "class", "scEmptyImage");
        renderer.set_attribute(
            img,
            "style",
            "min-width: 48px; min-height: 48px; max-width: 400px; max-height: 400px; cursor: pointer",
        );
        vec![img]
    }
}

/// Ordered views inserted before an anchor node.
#[derive(Debug)]
pub struct ViewContainer {
    anchor: NodeId,
    views: Vec<Vec<NodeId>>,
}

impl ViewContainer {
    pub fn new(anchor: NodeId) -> Self {
        Self {
            anchor,
            views: Vec::new(),
        }
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Instantiate `template` and insert its roots before the anchor.
    ///
    /// Returns the root nodes of the new view. If the anchor is detached the
    /// roots stay detached.
    pub fn create_embedded_view(
        &mut self,
        template: &dyn Template,
        renderer: &mut dyn Renderer,
    ) -> Vec<NodeId> {
        let roots = template.instantiate(renderer);
        if let Some(parent) = renderer.parent_node(self.anchor) {
            for &root in &roots {
                renderer.insert_before(parent, root, Some(self.anchor));
            }
        }
        self.views.push(roots.clone());
        roots
    }

    /// Remove every view's roots from the document.
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        for roots in self.views.drain(..) {
            for root in roots {
                renderer.remove(root);
            }
        }
    }
}
