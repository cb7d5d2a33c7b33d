//! Media collaborators: editor image-tag scanning, media URL rewriting and
//! source-set expansion.
//!
//! The render engine only sees the [`MediaApi`] trait. [`JssMedia`] is the
//! stock implementation for the CMS media handler:
//!
//! - Media URLs like `/-/media/hero.jpg` are rewritten to `/-/jssmedia/hero.jpg`
//!   when rendering parameters are present, so the handler can honour them.
//!   A custom pattern can replace the default prefix detection; its first
//!   capture group becomes the separator (`/([-~]{1})assets/` turns
//!   `/-assets/website` into `/-/jssmedia/website`).
//! - Rendering parameters are merged into the query string, overriding
//!   same-named keys already there.
//! - A source-set is a list of parameter sets; each set with a width (`w` or
//!   `mw`) yields one `"<url> <width>w"` candidate.

use crate::field::{FieldAttrs, ParamValue, SourceSetSpec, UrlParams};
use html_escape::decode_html_entities;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;
use url::form_urlencoded;

/// `/-/media/` or `/~/media/`, case-insensitive.
pub static MEDIA_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/([-~]{1})/media/").unwrap());

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)>").unwrap());

/// `name="v"`, `name='v'`, `name=v` or a bare `name`.
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#).unwrap()
});

/// An `<img>` tag located inside editing markup.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundImageTag {
    /// The tag's exact source text, used for substitution.
    pub img_tag: String,
    /// Its attributes: names lowercased, values entity-decoded.
    pub attrs: FieldAttrs,
}

pub trait MediaApi {
    /// Locate the first image tag in editing markup.
    fn find_editor_image_tag(&self, markup: &str) -> Option<FoundImageTag>;

    /// Rewrite a raw media URL into its delivery URL.
    fn update_image_url(&self, src: &str, params: &UrlParams, prefix: Option<&Regex>) -> String;

    /// Expand a source-set specification into an attribute string.
    fn get_src_set(
        &self,
        resolved_src: &str,
        spec: &SourceSetSpec,
        params: &UrlParams,
        prefix: Option<&Regex>,
    ) -> String;
}

/// Stock media handler behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct JssMedia;

impl MediaApi for JssMedia {
    fn find_editor_image_tag(&self, markup: &str) -> Option<FoundImageTag> {
        let caps = IMG_TAG.captures(markup)?;
        let img_tag = caps.get(0)?.as_str().to_string();
        let body = caps.get(1).map_or("", |m| m.as_str());
        let attrs = ATTR
            .captures_iter(body)
            .map(|c| {
                let value = c
                    .get(2)
                    .or_else(|| c.get(3))
                    .or_else(|| c.get(4))
                    .map_or("", |m| m.as_str());
                (
                    c[1].to_ascii_lowercase(),
                    serde_json::Value::String(decode_html_entities(value).into_owned()),
                )
            })
            .collect();
        Some(FoundImageTag { img_tag, attrs })
    }

    fn update_image_url(&self, src: &str, params: &UrlParams, prefix: Option<&Regex>) -> String {
        if params.is_empty() {
            return src.to_string();
        }
        let parts = UrlParts::split(src);
        let path = replace_media_url_prefix(parts.path, prefix.unwrap_or(&*MEDIA_URL_PREFIX));

        let mut pairs: Vec<(String, String)> = form_urlencoded::parse(parts.query.as_bytes())
            .into_owned()
            .collect();
        for (key, value) in params {
            let value = value.to_string();
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some((_, v)) => *v = value,
                None => pairs.push((key.clone(), value)),
            }
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        let mut out = path;
        if !query.is_empty() {
            out.push('?');
            out.push_str(&query);
        }
        if let Some(fragment) = parts.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    fn get_src_set(
        &self,
        resolved_src: &str,
        spec: &SourceSetSpec,
        params: &UrlParams,
        prefix: Option<&Regex>,
    ) -> String {
        spec.iter()
            .filter_map(|entry| {
                let mut merged = params.clone();
                merged.extend(entry.iter().map(|(k, v)| (k.clone(), v.clone())));
                let width = width_of(&merged)?;
                Some(format!(
                    "{} {}w",
                    self.update_image_url(resolved_src, &merged, prefix),
                    width
                ))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Candidate width: `w`, falling back to `mw`.
fn width_of(params: &UrlParams) -> Option<&ParamValue> {
    ["w", "mw"]
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|v| v.is_set())
}

/// Replace the first media prefix match in `path`.
///
/// Patterns without a capture group leave the path unchanged.
pub fn replace_media_url_prefix(path: &str, prefix: &Regex) -> String {
    let Some(separator) = prefix
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
    else {
        return path.to_string();
    };
    let replacement = format!("/{separator}/jssmedia/");
    prefix.replacen(path, 1, NoExpand(&replacement)).into_owned()
}

/// `path?query#fragment`, split without requiring an absolute URL.
struct UrlParts<'a> {
    path: &'a str,
    query: &'a str,
    fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (before_fragment, fragment) = match url.split_once('#') {
            Some((b, f)) => (b, Some(f)),
            None => (url, None),
        };
        let (path, query) = before_fragment
            .split_once('?')
            .unwrap_or((before_fragment, ""));
        Self {
            path,
            query,
            fragment,
        }
    }
}
