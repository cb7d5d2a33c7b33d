//! Image field data model.
//!
//! A CMS delivers an image field in one of several overlapping JSON shapes:
//!
//! ```text
//! { "src": "/-/media/hero.jpg", "alt": "Hero" }                  bare value
//! { "value": { "src": "/-/media/hero.jpg", "alt": "Hero" } }     value holder
//! { "value": { ... }, "editable": "<span ...><img ... /></span>" } editing markup
//! ```
//!
//! [`ImageField`] is the wire shape that accepts all of them at once.
//! [`ImageField::shape`] classifies it into a [`FieldShape`] before any
//! rendering decision is made, so the rest of the crate never probes members
//! ad hoc.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rendering parameter or loosely-typed field value: string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Truthiness as the CMS media handler sees it: `0`, `0.0` and `""` are not set.
    pub fn is_set(&self) -> bool {
        match self {
            ParamValue::Int(n) => *n != 0,
            ParamValue::Float(n) => *n != 0.0 && !n.is_nan(),
            ParamValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{n}"),
            // 100.0 prints as "100" so integral floats from JSON don't grow a suffix
            ParamValue::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            ParamValue::Float(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

/// Rendering parameters forwarded to the media URL rewriter.
pub type UrlParams = BTreeMap<String, ParamValue>;

/// One responsive size: rendering parameters such as `w` or `mw`.
pub type SourceSetEntry = BTreeMap<String, ParamValue>;

/// Responsive-image descriptor. Interpreted only by
/// [`MediaApi::get_src_set`](crate::media::MediaApi::get_src_set).
pub type SourceSetSpec = Vec<SourceSetEntry>;

/// Loosely-typed attribute map, as produced by field values, parsed editor
/// markup, and caller overrides.
pub type FieldAttrs = BTreeMap<String, serde_json::Value>;

/// The canonical shape of a resolved image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Kept as sent: a [`SourceSetSpec`] list, a formatted string, or
    /// anything else the resolver will ignore.
    #[serde(default, rename = "srcSet", skip_serializing_if = "Option::is_none")]
    pub src_set: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<ParamValue>,
    /// Everything else the CMS sent along (`class`, `title`, `data-*`, ...).
    #[serde(flatten)]
    pub other: FieldAttrs,
}

impl ImageFieldValue {
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Whether this value carries a usable image URL.
    pub fn has_src(&self) -> bool {
        self.src.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Flatten into a loose attribute map for merging with overrides.
    ///
    /// Explicit members win over same-named keys in `other`.
    pub fn to_attrs(&self) -> FieldAttrs {
        let mut attrs = self.other.clone();
        if let Some(src) = &self.src {
            attrs.insert("src".into(), src.clone().into());
        }
        if let Some(src_set) = &self.src_set {
            attrs.insert("srcSet".into(), src_set.clone());
        }
        if let Some(alt) = &self.alt {
            attrs.insert("alt".into(), alt.clone().into());
        }
        for (key, dim) in [("width", &self.width), ("height", &self.height)] {
            if let Some(dim) = dim {
                if let Ok(value) = serde_json::to_value(dim) {
                    attrs.insert(key.into(), value);
                }
            }
        }
        attrs
    }
}

/// Image field as delivered by the CMS.
///
/// Any combination of members may be present; see [`ImageField::shape`] for
/// how they are prioritized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageField {
    /// Value holder (`{ "value": { "src": ... } }`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ImageFieldValue>,
    /// HTML produced by CMS editing tooling, possibly embedding an `<img>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<String>,
    /// Opaque editing metadata; when present, edit mode wraps output in markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Bare value members at the top level (`{ "src": ... }`).
    #[serde(flatten)]
    pub direct: ImageFieldValue,
}

/// Normalized field shape, decided once before dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape<'a> {
    /// Edit mode is on and the field carries editing markup.
    Editable(&'a str),
    /// A plain value object, either bare or from the `.value` member.
    Value(&'a ImageFieldValue),
    /// Neither a direct value nor a `.value` member.
    Missing,
}

impl ImageField {
    pub fn from_value(value: ImageFieldValue) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn from_editable(markup: impl Into<String>) -> Self {
        Self {
            editable: Some(markup.into()),
            ..Self::default()
        }
    }

    /// Non-empty editing markup, if any.
    pub fn editable_markup(&self) -> Option<&str> {
        self.editable.as_deref().filter(|m| !m.is_empty())
    }

    /// True when neither the bare value nor the `.value` member has a `src`.
    pub fn is_value_empty(&self) -> bool {
        !self.direct.has_src() && !self.value.as_ref().is_some_and(ImageFieldValue::has_src)
    }

    /// Classify the field for the given edit-mode flag.
    ///
    /// A bare `src` wins over the `.value` member; a `.value` member is
    /// returned even when its own `src` is empty.
    pub fn shape(&self, editable: bool) -> FieldShape<'_> {
        if editable {
            if let Some(markup) = self.editable_markup() {
                return FieldShape::Editable(markup);
            }
        }
        if self.direct.has_src() {
            return FieldShape::Value(&self.direct);
        }
        match &self.value {
            Some(value) => FieldShape::Value(value),
            None => FieldShape::Missing,
        }
    }
}

/// Parse a field from JSON text.
pub fn parse_field(json: &str) -> Result<ImageField, FieldError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a field from a JSON file.
pub fn load_field(path: &Path) -> Result<ImageField, FieldError> {
    let content = fs::read_to_string(path)?;
    parse_field(&content)
}
