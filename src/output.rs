//! CLI output formatting for render passes.
//!
//! # Information-First Display
//!
//! The `--explain` view describes *which* render mode was taken and *why*,
//! before any markup. The mode is the header line; the details that led to it
//! follow as indented context lines.
//!
//! ```text
//! Templated image <img>
//!     alt: Dawn
//!     src: /-/jssmedia/dawn.jpg?w=640
//!
//! Inline markup (42 bytes) in span.sc-image-wrapper
//!
//! Empty field
//!     placeholder shown: editing metadata present
//!
//! Nothing rendered
//!     no usable src after merging attributes
//! ```
//!
//! Format functions return `Vec<String>` for testability and are pure; the
//! `print_*` wrappers write to stderr so stdout stays the rendered HTML.

use crate::directive::RenderOutcome;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Attributes that identify the image come first; the rest follow by name.
fn ordered_attrs(attrs: &crate::attrs::AttrMap) -> Vec<(&str, &str)> {
    const LEAD: [&str; 2] = ["src", "srcSet"];
    let mut lines: Vec<(&str, &str)> = LEAD
        .iter()
        .filter_map(|key| attrs.get_key_value(*key))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    lines.extend(
        attrs
            .iter()
            .filter(|(k, _)| !LEAD.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    lines
}

/// Describe a render pass.
///
/// `tag` is the element tag of the caller template, `wrapper_class` the class
/// of the inline wrapper, and `with_metadata` whether editing markers applied.
pub fn format_outcome(
    outcome: Option<&RenderOutcome>,
    tag: &str,
    wrapper_class: &str,
    with_metadata: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome {
        Some(RenderOutcome::TemplatedImage(attrs)) => {
            lines.push(format!("Templated image <{tag}>"));
            for (name, value) in ordered_attrs(attrs) {
                lines.push(format!("{}{name}: {value}", indent(1)));
            }
        }
        Some(RenderOutcome::InlineMarkup(markup)) => {
            lines.push(format!(
                "Inline markup ({} bytes) in span.{wrapper_class}",
                markup.len()
            ));
        }
        Some(RenderOutcome::Empty) => {
            lines.push("Empty field".to_string());
            if with_metadata {
                lines.push(format!(
                    "{}placeholder shown: editing metadata present",
                    indent(1)
                ));
            } else {
                lines.push(format!("{}nothing shown: no editing metadata", indent(1)));
            }
        }
        None => {
            lines.push("Nothing rendered".to_string());
            lines.push(format!(
                "{}no usable src after merging attributes",
                indent(1)
            ));
        }
    }
    if with_metadata && !matches!(outcome, None | Some(RenderOutcome::InlineMarkup(_))) {
        lines.push(format!("{}wrapped in editing metadata markers", indent(1)));
    }
    lines
}

pub fn print_outcome(
    outcome: Option<&RenderOutcome>,
    tag: &str,
    wrapper_class: &str,
    with_metadata: bool,
) {
    for line in format_outcome(outcome, tag, wrapper_class, with_metadata) {
        eprintln!("{}", line);
    }
}
