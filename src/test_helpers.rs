//! Shared test utilities for the sc-image test suite.
//!
//! Provides attribute-map builders, a document with an attached host node,
//! and a [`RecordingMedia`] double that logs every collaborator call.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (mut doc, host) = hosted_document();
//! let attrs = field_attrs(&[("src", json!("a.jpg"))]);
//! ```

use std::cell::RefCell;

use regex::Regex;

use crate::dom::{Document, NodeId, Renderer};
use crate::field::{FieldAttrs, SourceSetSpec, UrlParams};
use crate::media::{FoundImageTag, MediaApi};

// =========================================================================
// Builders
// =========================================================================

/// Loose attribute map from `(name, value)` pairs.
pub fn field_attrs(pairs: &[(&str, serde_json::Value)]) -> FieldAttrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// `<div><!--host--></div>`: a document whose host comment sits inside a
/// parent element, the way a framework anchors a structural directive.
pub fn hosted_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let container = doc.create_element("div");
    doc.append_child(root, container);
    let host = doc.create_comment("host");
    doc.append_child(container, host);
    (doc, host)
}

// =========================================================================
// Media double
// =========================================================================

/// Media collaborator that records calls and returns recognizable values.
///
/// - `update_image_url(src)` → `"rewritten(<src>)"`
/// - `get_src_set(src)` → `"<src> 1w"`
/// - `find_editor_image_tag` always finds nothing
#[derive(Default)]
pub struct RecordingMedia {
    calls: RefCell<Vec<String>>,
}

impl RecordingMedia {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl MediaApi for RecordingMedia {
    fn find_editor_image_tag(&self, markup: &str) -> Option<FoundImageTag> {
        self.calls.borrow_mut().push(format!("find:{markup}"));
        None
    }

    fn update_image_url(&self, src: &str, _params: &UrlParams, _prefix: Option<&Regex>) -> String {
        self.calls.borrow_mut().push(format!("update:{src}"));
        format!("rewritten({src})")
    }

    fn get_src_set(
        &self,
        resolved_src: &str,
        _spec: &SourceSetSpec,
        _params: &UrlParams,
        _prefix: Option<&Regex>,
    ) -> String {
        self.calls.borrow_mut().push(format!("srcset:{resolved_src}"));
        format!("{resolved_src} 1w")
    }
}
