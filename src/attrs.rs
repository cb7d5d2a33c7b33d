//! Attribute collection and merge helpers.
//!
//! Field attributes arrive loosely typed ([`FieldAttrs`]); what reaches the
//! DOM is always a flat string map ([`AttrMap`]). Merging is a plain overlay:
//! the right-hand side wins on identical keys.

use crate::dom::Renderer;
use crate::field::FieldAttrs;
use crate::template::Template;
use std::collections::BTreeMap;

/// Render-ready attributes: name → value.
pub type AttrMap = BTreeMap<String, String>;

/// Overlay `overlay` on top of `base`; overlay wins on key collision.
pub fn merge_attrs(base: &FieldAttrs, overlay: &FieldAttrs) -> FieldAttrs {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Build the caller's override set: static template attributes first, the
/// explicit `attrs` input on top.
pub fn override_attrs(element_attrs: &AttrMap, explicit: &FieldAttrs) -> FieldAttrs {
    let base: FieldAttrs = element_attrs
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    merge_attrs(&base, explicit)
}

/// String form of a loose attribute value, or `None` when it should not be
/// emitted at all.
///
/// - strings pass through
/// - numbers and booleans use their display form
/// - `null` is dropped
/// - arrays and objects become compact JSON
pub fn attr_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// JavaScript-style truthiness, used for `src` presence checks.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Attributes of the first root element the template produces.
///
/// The template is instantiated detached and its nodes are destroyed again
/// before returning. Templates with no root node yield an empty map.
pub fn collect_element_attrs(template: &dyn Template, renderer: &mut dyn Renderer) -> AttrMap {
    let roots = template.instantiate(renderer);
    let attrs = roots
        .first()
        .map(|&root| renderer.attributes(root).into_iter().collect())
        .unwrap_or_default();
    for root in roots {
        renderer.remove(root);
    }
    attrs
}
