//! # sc-image
//!
//! Resolution and rendering of CMS image fields. A field describes an image
//! (source URL, dimensions, alt text, responsive source-set) and may carry
//! markup produced by the CMS editing tooling. This crate decides *what* to
//! render for it and computes the final attribute set.
//!
//! # Architecture: Decide, Then Materialize
//!
//! ```text
//! ImageInputs ─┬─ select_outcome ──► RenderOutcome ──► ImageDirective ──► Renderer
//!              │   (pure)            Empty             (view container,   (DOM)
//!              │                     InlineMarkup      inline wrapper,
//!              └─ AttributeResolver  TemplatedImage    metadata markers)
//! ```
//!
//! The decision is a pure function of the inputs; materialization is the only
//! stateful part, and it always tears the previous render down before building
//! the next one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`field`] | Field data model: value, editable markup, metadata, shape normalization |
//! | [`attrs`] | Attribute maps: merge precedence, override sets, value stringification |
//! | [`resolve`] | `AttributeResolver`: merge, rewrite `src`, expand `srcSet` |
//! | [`media`] | `MediaApi` collaborator and the default `JssMedia` URL rewriting |
//! | [`template`] | `Template` trait, element template, metadata markers, view container |
//! | [`dom`] | `Renderer` trait and the in-memory `Document` used by the CLI and tests |
//! | [`directive`] | Render-mode selection and the stateful `ImageDirective` |
//! | [`config`] | Layered TOML render config, validation, stock config |
//! | [`output`] | CLI output formatting for `--explain` |
//!
//! # Design Decisions
//!
//! ## Collaborators Behind Traits
//!
//! The host framework owns the DOM, the editing tooling owns the marker
//! protocol, and the media service owns URL policy. Each sits behind a trait
//! ([`dom::Renderer`], [`template::Template`], [`media::MediaApi`]) with a small
//! default implementation, so the decision logic can be exercised without any
//! of them.
//!
//! ## Two Kinds of "Nothing"
//!
//! An absent field, or an edit-mode field with nothing to show, renders the
//! empty state (a placeholder when editing metadata is present). A value
//! without a usable `src` outside that guard renders nothing at all and
//! records no outcome. The two cases stay distinct.
//!
//! ## Source-Sets Follow `src`
//!
//! The rewritten `src` is always the base URL of the source-set, so both
//! attributes reflect one URL policy. When a source-set is emitted the plain
//! `src` is not.

pub mod attrs;
pub mod config;
pub mod directive;
pub mod dom;
pub mod field;
pub mod media;
pub mod output;
pub mod resolve;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
