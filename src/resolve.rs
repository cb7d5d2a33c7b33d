//! Attribute resolution: field attributes + overrides → render-ready attributes.
//!
//! ```text
//! field attrs ──┐
//!               ├─ merge (override wins) ─ split src / srcSet / rest
//! overrides ────┘                               │
//!        src ── update_image_url ── srcSet? ── get_src_set(rewritten src) → srcSet
//!                                        └──── no srcSet ──────────────────→ src
//! ```
//!
//! The rewritten `src` is always the base of the source-set, so both reflect
//! the same URL policy. When a source-set is produced no `src` is emitted.

use crate::attrs::{AttrMap, attr_text, is_truthy, merge_attrs};
use crate::field::{FieldAttrs, SourceSetSpec, UrlParams};
use crate::media::MediaApi;
use regex::Regex;
use tracing::{debug, warn};

/// Resolution context: everything besides the two attribute sets.
#[derive(Clone, Copy)]
pub struct AttributeResolver<'a> {
    pub url_params: &'a UrlParams,
    pub media_url_prefix: Option<&'a Regex>,
    pub media: &'a dyn MediaApi,
}

/// How the merged `srcSet` value was read.
enum SrcSet {
    Spec(SourceSetSpec),
    Formatted(String),
}

impl<'a> AttributeResolver<'a> {
    pub fn new(
        url_params: &'a UrlParams,
        media_url_prefix: Option<&'a Regex>,
        media: &'a dyn MediaApi,
    ) -> Self {
        Self {
            url_params,
            media_url_prefix,
            media,
        }
    }

    /// Resolve the final attribute map, or `None` when there is no usable `src`.
    pub fn resolve(&self, field_attrs: &FieldAttrs, override_attrs: &FieldAttrs) -> Option<AttrMap> {
        let mut merged = merge_attrs(field_attrs, override_attrs);
        let src = merged.remove("src");
        let src_set = merged.remove("srcSet");

        let src = match src.as_ref() {
            Some(value) if is_truthy(value) => attr_text(value)?,
            _ => {
                debug!("no src after merge, nothing to render");
                return None;
            }
        };

        let mut resolved: AttrMap = merged
            .iter()
            .filter_map(|(k, v)| attr_text(v).map(|text| (k.clone(), text)))
            .collect();

        let src = self
            .media
            .update_image_url(&src, self.url_params, self.media_url_prefix);

        match src_set.as_ref().and_then(read_src_set) {
            Some(SrcSet::Spec(spec)) => {
                let set = self
                    .media
                    .get_src_set(&src, &spec, self.url_params, self.media_url_prefix);
                resolved.insert("srcSet".into(), set);
            }
            Some(SrcSet::Formatted(set)) => {
                resolved.insert("srcSet".into(), set);
            }
            None => {
                resolved.insert("src".into(), src);
            }
        }
        Some(resolved)
    }
}

fn read_src_set(value: &serde_json::Value) -> Option<SrcSet> {
    if !is_truthy(value) {
        return None;
    }
    if let serde_json::Value::String(set) = value {
        return Some(SrcSet::Formatted(set.clone()));
    }
    match serde_json::from_value::<SourceSetSpec>(value.clone()) {
        Ok(spec) => Some(SrcSet::Spec(spec)),
        Err(err) => {
            warn!(%err, "ignoring unreadable srcSet, falling back to src");
            None
        }
    }
}
