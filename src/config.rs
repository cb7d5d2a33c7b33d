//! Render configuration module.
//!
//! Handles loading, validating, and merging render config files. Files are
//! layered: stock defaults are overridden by each file in the order given,
//! so a site-wide file can be refined by a per-page one.
//!
//! ```text
//! sc-image render field.json --config site.toml --config hero.toml
//!                                     ^ base         ^ overrides site.toml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! editable = true                    # honour editing markup and metadata
//! # media_url_prefix = "/([-~]{1})assets/"   # custom media prefix (regex)
//! wrapper_class = "sc-image-wrapper" # class of the inline wrapper span
//!
//! [url_params]                       # rendering params for every URL
//! # mw = 1200
//!
//! [attrs]                            # attributes overriding field values
//! # loading = "lazy"
//!
//! [template]                         # element the image is stamped into
//! tag = "img"
//! attrs = []                         # e.g. [["class", "hero"]]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::directive::{DEFAULT_WRAPPER_CLASS, ImageInputs};
use crate::field::{FieldAttrs, ImageField, UrlParams};
use crate::template::ElementTemplate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Render configuration loaded from TOML.
///
/// All fields have defaults; files only specify what they override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Honour editing markup and metadata.
    pub editable: bool,
    /// Custom media URL prefix pattern; its first capture group is the separator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url_prefix: Option<String>,
    /// Class of the span that wraps inline editing markup.
    pub wrapper_class: String,
    /// Rendering parameters applied to every image URL.
    pub url_params: UrlParams,
    /// Attributes that override field attributes.
    pub attrs: FieldAttrs,
    /// The element each image is rendered into.
    pub template: ElementTemplate,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            editable: true,
            media_url_prefix: None,
            wrapper_class: DEFAULT_WRAPPER_CLASS.to_string(),
            url_params: UrlParams::new(),
            attrs: FieldAttrs::new(),
            template: ElementTemplate::default(),
        }
    }
}

impl RenderConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.media_url_prefix_regex()?;
        if !is_valid_tag_name(&self.template.tag) {
            return Err(ConfigError::Validation(format!(
                "template.tag must be an element name, got {:?}",
                self.template.tag
            )));
        }
        if self.wrapper_class.trim().is_empty() {
            return Err(ConfigError::Validation(
                "wrapper_class must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Compile `media_url_prefix`, if set.
    pub fn media_url_prefix_regex(&self) -> Result<Option<Regex>, ConfigError> {
        self.media_url_prefix
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("media_url_prefix is not a valid regex: {e}"))
                })
            })
            .transpose()
    }

    /// The caller template every image is stamped into.
    pub fn template(&self) -> ElementTemplate {
        self.template.clone()
    }

    /// Build directive inputs for one field.
    pub fn image_inputs(&self, field: ImageField) -> Result<ImageInputs, ConfigError> {
        Ok(ImageInputs {
            field: Some(field),
            editable: self.editable,
            media_url_prefix: self.media_url_prefix_regex()?,
            url_params: self.url_params.clone(),
            attrs: self.attrs.clone(),
            empty_field_editing_template: None,
        })
    }
}

fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RenderConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RenderConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RenderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given files, later files overriding earlier ones.
///
/// Missing files are an error here: they were named explicitly.
pub fn load_config<P: AsRef<Path>>(paths: &[P]) -> Result<RenderConfig, ConfigError> {
    let mut layered: Option<toml::Value> = None;
    for path in paths {
        let path = path.as_ref();
        let value = load_raw_config(path)?.ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", path.display()),
            ))
        })?;
        layered = Some(match layered {
            Some(acc) => merge_toml(acc, value),
            None => value,
        });
    }
    resolve_config(stock_defaults_value(), layered)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sc-image Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Several files can be layered with repeated --config flags; each file only
# needs the keys it wants to override. Unknown keys will cause an error.

# Honour editing markup (field.editable) and editing metadata markers.
editable = true

# Custom regex that finds the media URL prefix to replace with /-/jssmedia/
# or /~/jssmedia/. The first capture group is the separator.
#   /([-~]{1})assets/  ->  /-assets/website becomes /-/jssmedia/website
# media_url_prefix = "/([-~]{1})assets/"

# Class of the span that wraps editable markup.
wrapper_class = "sc-image-wrapper"

# ---------------------------------------------------------------------------
# Rendering parameters added to every image URL (and each srcSet candidate)
# ---------------------------------------------------------------------------
[url_params]
# mw = 1200
# q = 80

# ---------------------------------------------------------------------------
# Attributes that override what the field carries
# ---------------------------------------------------------------------------
[attrs]
# loading = "lazy"
# class = "hero"

# ---------------------------------------------------------------------------
# Template element the resolved attributes are applied to
# ---------------------------------------------------------------------------
[template]
tag = "img"
# Static attributes of the element. Both these and [attrs] win over the
# field's own attributes; [attrs] wins over these.
attrs = []
"##
}
