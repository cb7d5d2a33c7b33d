//! Render-mode selection and materialization for an image field.
//!
//! [`select_outcome`] is the pure decision: given the inputs and the caller's
//! override attributes it picks one of
//!
//! | Outcome | When |
//! |---------|------|
//! | [`RenderOutcome::Empty`] | no field, or edit mode on and nothing to show |
//! | [`RenderOutcome::InlineMarkup`] | edit mode on and the field carries editing markup |
//! | [`RenderOutcome::TemplatedImage`] | a plain value resolved to attributes |
//! | `None` | value missing or unresolvable outside the guard (silent) |
//!
//! [`ImageDirective`] owns the rendered state next to a host node and
//! rebuilds it from scratch on every qualifying input change. It never patches
//! a previous render; at most one live representation exists at a time.

use crate::attrs::{AttrMap, collect_element_attrs, override_attrs};
use crate::dom::{Document, NodeId, Renderer, element_html};
use crate::field::{FieldAttrs, FieldShape, ImageField, UrlParams};
use crate::media::MediaApi;
use crate::resolve::AttributeResolver;
use crate::template::{EmptyImagePlaceholder, MetadataKind, MetadataMarker, Template, ViewContainer};
use bitflags::bitflags;
use regex::Regex;
use tracing::{debug, instrument};

/// Class given to the inline wrapper span in editable mode.
pub const DEFAULT_WRAPPER_CLASS: &str = "sc-image-wrapper";

bitflags! {
    /// Which inputs changed since the last notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InputChanges: u8 {
        const FIELD = 1;
        const EDITABLE = 1 << 1;
        const URL_PARAMS = 1 << 2;
        const ATTRS = 1 << 3;
        const MEDIA_URL_PREFIX = 1 << 4;
        const EMPTY_FIELD_TEMPLATE = 1 << 5;
    }
}

impl InputChanges {
    /// Changes that trigger a full re-render.
    pub const RERENDER: InputChanges = InputChanges::FIELD
        .union(InputChanges::EDITABLE)
        .union(InputChanges::URL_PARAMS)
        .union(InputChanges::ATTRS);
}

/// Public inputs of the image directive.
pub struct ImageInputs {
    pub field: Option<ImageField>,
    /// Honour editing markup and metadata. Defaults to `true`.
    pub editable: bool,
    /// Replaces the default media prefix detection, e.g. `/([-~]{1})assets/`.
    pub media_url_prefix: Option<Regex>,
    pub url_params: UrlParams,
    pub attrs: FieldAttrs,
    /// Shown in edit mode for an empty field with metadata.
    pub empty_field_editing_template: Option<Box<dyn Template>>,
}

impl Default for ImageInputs {
    fn default() -> Self {
        Self {
            field: None,
            editable: true,
            media_url_prefix: None,
            url_params: UrlParams::new(),
            attrs: FieldAttrs::new(),
            empty_field_editing_template: None,
        }
    }
}

impl ImageInputs {
    pub fn with_field(field: ImageField) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }

    /// Guard: does anything deserve a render pass beyond the empty state?
    pub fn should_render(&self) -> bool {
        match &self.field {
            None => false,
            Some(field) => {
                !self.editable || !field.is_value_empty() || field.editable_markup().is_some()
            }
        }
    }

    /// Whether editing metadata markers apply to this pass.
    fn metadata(&self) -> Option<&serde_json::Value> {
        if !self.editable {
            return None;
        }
        self.field.as_ref()?.metadata.as_ref()
    }
}

/// What a render pass produces.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Empty,
    InlineMarkup(String),
    TemplatedImage(AttrMap),
}

/// Decide what to render. Pure: no DOM access, no state.
pub fn select_outcome(
    inputs: &ImageInputs,
    override_attrs: &FieldAttrs,
    media: &dyn MediaApi,
) -> Option<RenderOutcome> {
    if !inputs.should_render() {
        return Some(RenderOutcome::Empty);
    }
    let field = inputs.field.as_ref()?;
    let resolver = AttributeResolver::new(
        &inputs.url_params,
        inputs.media_url_prefix.as_ref(),
        media,
    );

    match field.shape(inputs.editable) {
        FieldShape::Editable(markup) => Some(RenderOutcome::InlineMarkup(
            editable_markup(markup, override_attrs, &resolver),
        )),
        FieldShape::Value(value) => {
            let attrs = resolver.resolve(&value.to_attrs(), override_attrs);
            if attrs.is_none() {
                debug!("field value has no usable src, rendering nothing");
            }
            attrs.map(RenderOutcome::TemplatedImage)
        }
        FieldShape::Missing => {
            debug!("field has neither a value nor a src, rendering nothing");
            None
        }
    }
}

/// Splice resolved attributes into the image tag embedded in editing markup.
///
/// Falls back to the markup verbatim when no tag is found or it does not
/// resolve.
fn editable_markup(markup: &str, override_attrs: &FieldAttrs, resolver: &AttributeResolver<'_>) -> String {
    let Some(found) = resolver.media.find_editor_image_tag(markup) else {
        debug!("no image tag in editing markup");
        return markup.to_string();
    };
    let Some(attrs) = resolver.resolve(&found.attrs, override_attrs) else {
        debug!("editor image tag has no usable src");
        return markup.to_string();
    };
    let img = element_html("img", attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    markup.replacen(&found.img_tag, &img, 1)
}

/// Stateful host glue around [`select_outcome`].
pub struct ImageDirective<'m> {
    pub inputs: ImageInputs,
    template: Box<dyn Template>,
    media: &'m dyn MediaApi,
    host: NodeId,
    views: ViewContainer,
    inline_ref: Option<NodeId>,
    wrapper_class: String,
}

impl<'m> ImageDirective<'m> {
    /// `host` is the node output is rendered next to; it must be attached for
    /// anything to become visible.
    pub fn new(
        inputs: ImageInputs,
        template: Box<dyn Template>,
        media: &'m dyn MediaApi,
        host: NodeId,
    ) -> Self {
        Self {
            inputs,
            template,
            media,
            host,
            views: ViewContainer::new(host),
            inline_ref: None,
            wrapper_class: DEFAULT_WRAPPER_CLASS.to_string(),
        }
    }

    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = class.into();
        self
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    /// The inline wrapper currently in the document, if any.
    pub fn inline_wrapper(&self) -> Option<NodeId> {
        self.inline_ref
    }

    /// Change hook. Qualifying changes tear down the previous render and
    /// recompute; others are ignored and return `None`.
    #[instrument(level = "debug", skip(self, renderer))]
    pub fn on_changes(
        &mut self,
        changes: InputChanges,
        renderer: &mut dyn Renderer,
    ) -> Option<RenderOutcome> {
        if !changes.intersects(InputChanges::RERENDER) {
            return None;
        }
        self.teardown(renderer);
        self.update_view(renderer)
    }

    fn teardown(&mut self, renderer: &mut dyn Renderer) {
        self.views.clear(renderer);
        if let Some(wrapper) = self.inline_ref.take() {
            // put the host back where the wrapper stood so the next pass has an anchor
            if let Some(parent) = renderer.parent_node(wrapper) {
                renderer.insert_before(parent, self.host, Some(wrapper));
            }
            renderer.remove(wrapper);
        }
    }

    fn update_view(&mut self, renderer: &mut dyn Renderer) -> Option<RenderOutcome> {
        if renderer.parent_node(self.host).is_none() {
            debug!("host is detached, nothing can be rendered");
            return None;
        }
        let element_attrs = collect_element_attrs(self.template.as_ref(), renderer);
        let overrides = override_attrs(&element_attrs, &self.inputs.attrs);

        let outcome = select_outcome(&self.inputs, &overrides, self.media)?;
        match &outcome {
            RenderOutcome::Empty => self.render_empty(renderer),
            RenderOutcome::InlineMarkup(markup) => self.render_inline_wrapper(markup, renderer),
            RenderOutcome::TemplatedImage(attrs) => {
                self.render_metadata(MetadataKind::Open, renderer);
                self.render_template(attrs, renderer);
                self.render_metadata(MetadataKind::Close, renderer);
            }
        }
        Some(outcome)
    }

    /// Edit-mode placeholder for an empty field; nothing outside edit mode.
    fn render_empty(&mut self, renderer: &mut dyn Renderer) {
        if self.inputs.metadata().is_none() {
            return;
        }
        self.render_metadata(MetadataKind::Open, renderer);
        match &self.inputs.empty_field_editing_template {
            Some(template) => {
                self.views.create_embedded_view(template.as_ref(), renderer);
            }
            None => {
                self.views.create_embedded_view(&EmptyImagePlaceholder, renderer);
            }
        }
        self.render_metadata(MetadataKind::Close, renderer);
    }

    fn render_metadata(&mut self, kind: MetadataKind, renderer: &mut dyn Renderer) {
        let Some(metadata) = self.inputs.metadata() else {
            return;
        };
        let marker = MetadataMarker { kind, metadata };
        self.views.create_embedded_view(&marker, renderer);
    }

    fn render_template(&mut self, attrs: &AttrMap, renderer: &mut dyn Renderer) {
        let roots = self.views.create_embedded_view(self.template.as_ref(), renderer);
        for root in roots {
            for (name, value) in attrs {
                renderer.set_attribute(root, name, value);
            }
        }
    }

    fn render_inline_wrapper(&mut self, markup: &str, renderer: &mut dyn Renderer) {
        // update_view only gets here with an attached host
        let Some(parent) = renderer.parent_node(self.host) else {
            return;
        };
        let span = renderer.create_element("span");
        renderer.set_attribute(span, "class", &self.wrapper_class);
        renderer.set_inner_html(span, markup);
        renderer.insert_before(parent, span, Some(self.host));
        renderer.remove(self.host);
        self.inline_ref = Some(span);
    }
}

/// Render one field into a fresh document and return the outcome with the
/// resulting HTML.
pub fn render_once(
    inputs: ImageInputs,
    template: Box<dyn Template>,
    media: &dyn MediaApi,
    wrapper_class: &str,
) -> (Option<RenderOutcome>, String) {
    let mut doc = Document::new();
    let host = doc.create_comment("sc-image");
    let root = doc.root();
    doc.append_child(root, host);

    let mut directive =
        ImageDirective::new(inputs, template, media, host).with_wrapper_class(wrapper_class);
    let outcome = directive.on_changes(InputChanges::all(), &mut doc);
    (outcome, doc.to_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ImageFieldValue, ParamValue};
    use crate::media::JssMedia;
    use crate::template::ElementTemplate;
    use crate::test_helpers::{field_attrs, hosted_document};
    use serde_json::json;

    fn img_template() -> Box<dyn Template> {
        Box::new(ElementTemplate::new("img"))
    }

    // =========================================================================
    // select_outcome
    // =========================================================================

    #[test]
    fn no_field_is_empty() {
        let inputs = ImageInputs::default();
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::Empty)
        );
    }

    #[test]
    fn empty_value_in_edit_mode_is_empty() {
        let inputs = ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("")));
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::Empty)
        );
    }

    #[test]
    fn empty_value_outside_edit_mode_is_silent() {
        let mut inputs =
            ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("")));
        inputs.editable = false;
        assert_eq!(select_outcome(&inputs, &FieldAttrs::new(), &JssMedia), None);
    }

    #[test]
    fn missing_value_outside_edit_mode_is_silent() {
        let mut inputs = ImageInputs::with_field(ImageField::default());
        inputs.editable = false;
        assert_eq!(select_outcome(&inputs, &FieldAttrs::new(), &JssMedia), None);
    }

    #[test]
    fn src_set_value_is_templated_without_src() {
        let field: ImageField =
            serde_json::from_value(json!({ "src": "pic.jpg", "srcSet": [{ "w": 100, "url": "pic-100.jpg" }] }))
                .unwrap();
        let inputs = ImageInputs::with_field(field);

        let Some(RenderOutcome::TemplatedImage(attrs)) =
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia)
        else {
            panic!("expected a templated image");
        };
        assert!(attrs.contains_key("srcSet"));
        assert!(!attrs.contains_key("src"));
    }

    #[test]
    fn editable_markup_without_image_is_verbatim() {
        let markup = "<div>no image here</div>";
        let inputs = ImageInputs::with_field(ImageField::from_editable(markup));
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::InlineMarkup(markup.to_string()))
        );
    }

    #[test]
    fn editable_markup_gets_resolved_image_spliced_in() {
        let inputs =
            ImageInputs::with_field(ImageField::from_editable(r#"<span>pre<img src="a.jpg">post</span>"#));
        let overrides = field_attrs(&[("src", json!("b.jpg"))]);
        assert_eq!(
            select_outcome(&inputs, &overrides, &JssMedia),
            Some(RenderOutcome::InlineMarkup(
                r#"<span>pre<img src="b.jpg">post</span>"#.to_string()
            ))
        );
    }

    #[test]
    fn editable_markup_image_gets_url_params() {
        let mut inputs = ImageInputs::with_field(ImageField::from_editable(
            r#"<span class="chrome"><img src="/-/media/a.jpg" alt="A" /></span>"#,
        ));
        inputs.url_params.insert("w".into(), ParamValue::Int(200));
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::InlineMarkup(
                r#"<span class="chrome"><img alt="A" src="/-/jssmedia/a.jpg?w=200"></span>"#.to_string()
            ))
        );
    }

    #[test]
    fn editable_markup_keeps_entities_and_bare_attributes() {
        let inputs = ImageInputs::with_field(ImageField::from_editable(
            r#"<span><img src="a.jpg" alt="Caf&#233; &#x27;Le Monde&#x27;" hidden /></span>"#,
        ));
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::InlineMarkup(
                r#"<span><img alt="Café 'Le Monde'" hidden="" src="a.jpg"></span>"#.to_string()
            ))
        );
    }

    #[test]
    fn editable_markup_image_takes_src_set_override() {
        let inputs = ImageInputs::with_field(ImageField::from_editable(
            r#"<span><img src="/-/media/a.jpg" alt="A" /></span>"#,
        ));
        let overrides = field_attrs(&[("srcSet", json!([{ "w": 320 }, { "mw": 640 }]))]);

        let Some(RenderOutcome::InlineMarkup(markup)) = select_outcome(&inputs, &overrides, &JssMedia)
        else {
            panic!("expected inline markup");
        };
        assert_eq!(
            markup,
            r#"<span><img alt="A" srcSet="/-/jssmedia/a.jpg?w=320 320w, /-/jssmedia/a.jpg?mw=640 640w"></span>"#
        );
        assert!(!markup.contains(" src="));
    }

    #[test]
    fn editable_image_without_src_falls_back_to_markup() {
        let markup = r#"<span><img alt="no src" /></span>"#;
        let inputs = ImageInputs::with_field(ImageField::from_editable(markup));
        assert_eq!(
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia),
            Some(RenderOutcome::InlineMarkup(markup.to_string()))
        );
    }

    #[test]
    fn editable_markup_ignored_outside_edit_mode() {
        let mut field = ImageField::from_editable(r#"<img src="edit.jpg">"#);
        field.value = Some(ImageFieldValue::with_src("live.jpg"));
        let mut inputs = ImageInputs::with_field(field);
        inputs.editable = false;

        let Some(RenderOutcome::TemplatedImage(attrs)) =
            select_outcome(&inputs, &FieldAttrs::new(), &JssMedia)
        else {
            panic!("expected a templated image");
        };
        assert_eq!(attrs["src"], "live.jpg");
    }

    #[test]
    fn selection_is_idempotent() {
        let inputs = ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("a.jpg")));
        let overrides = field_attrs(&[("class", json!("c"))]);
        assert_eq!(
            select_outcome(&inputs, &overrides, &JssMedia),
            select_outcome(&inputs, &overrides, &JssMedia)
        );
    }

    // =========================================================================
    // ImageDirective
    // =========================================================================

    #[test]
    fn templated_image_applies_attrs_to_template_root() {
        let (mut doc, host) = hosted_document();
        let mut value = ImageFieldValue::with_src("a.jpg");
        value.alt = Some("A".into());
        let template = ElementTemplate::new("img").with_attr("class", "hero");
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_value(value)),
            Box::new(template),
            &JssMedia,
            host,
        );

        let outcome = directive.on_changes(InputChanges::FIELD, &mut doc);
        assert!(matches!(outcome, Some(RenderOutcome::TemplatedImage(_))));
        assert_eq!(
            doc.to_html(),
            r#"<div><img class="hero" alt="A" src="a.jpg"><!--host--></div>"#
        );
    }

    #[test]
    fn explicit_attrs_override_template_attrs() {
        let (mut doc, host) = hosted_document();
        let mut inputs = ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("a.jpg")));
        inputs.attrs.insert("class".into(), json!("explicit"));
        let template = ElementTemplate::new("img").with_attr("class", "hero");
        let mut directive = ImageDirective::new(inputs, Box::new(template), &JssMedia, host);

        directive.on_changes(InputChanges::ATTRS, &mut doc);
        assert!(doc.to_html().contains(r#"class="explicit""#));
    }

    #[test]
    fn metadata_markers_wrap_templated_image() {
        let (mut doc, host) = hosted_document();
        let mut field = ImageField::from_value(ImageFieldValue::with_src("a.jpg"));
        field.metadata = Some(json!({ "fieldId": "1" }));
        let mut directive =
            ImageDirective::new(ImageInputs::with_field(field), img_template(), &JssMedia, host);

        directive.on_changes(InputChanges::FIELD, &mut doc);
        let html = doc.to_html();
        let open = html.find(r#"kind="open""#).unwrap();
        let img = html.find("<img").unwrap();
        let close = html.find(r#"kind="close""#).unwrap();
        assert!(open < img && img < close);
    }

    #[test]
    fn metadata_markers_skipped_outside_edit_mode() {
        let (mut doc, host) = hosted_document();
        let mut field = ImageField::from_value(ImageFieldValue::with_src("a.jpg"));
        field.metadata = Some(json!({ "fieldId": "1" }));
        let mut inputs = ImageInputs::with_field(field);
        inputs.editable = false;
        let mut directive = ImageDirective::new(inputs, img_template(), &JssMedia, host);

        directive.on_changes(InputChanges::FIELD, &mut doc);
        assert!(!doc.to_html().contains("<code"));
    }

    #[test]
    fn empty_field_with_metadata_renders_placeholder() {
        let (mut doc, host) = hosted_document();
        let mut field = ImageField::from_value(ImageFieldValue::with_src(""));
        field.metadata = Some(json!({ "fieldId": "1" }));
        let mut directive =
            ImageDirective::new(ImageInputs::with_field(field), img_template(), &JssMedia, host);

        let outcome = directive.on_changes(InputChanges::FIELD, &mut doc);
        assert_eq!(outcome, Some(RenderOutcome::Empty));
        let html = doc.to_html();
        assert!(html.contains("scEmptyImage"));
        assert!(html.contains(r#"kind="open""#));
    }

    #[test]
    fn empty_field_uses_caller_template() {
        let (mut doc, host) = hosted_document();
        let mut field = ImageField::default();
        field.metadata = Some(json!({}));
        let mut inputs = ImageInputs::with_field(field);
        inputs.empty_field_editing_template =
            Some(Box::new(ElementTemplate::new("p").with_inner_html("Add an image")));
        let mut directive = ImageDirective::new(inputs, img_template(), &JssMedia, host);

        directive.on_changes(InputChanges::FIELD, &mut doc);
        let html = doc.to_html();
        assert!(html.contains("<p>Add an image</p>"));
        assert!(!html.contains("scEmptyImage"));
    }

    #[test]
    fn empty_field_without_metadata_renders_nothing() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::default()),
            img_template(),
            &JssMedia,
            host,
        );
        let outcome = directive.on_changes(InputChanges::FIELD, &mut doc);
        assert_eq!(outcome, Some(RenderOutcome::Empty));
        assert_eq!(doc.to_html(), "<div><!--host--></div>");
    }

    #[test]
    fn inline_wrapper_replaces_host() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_editable("<b>editable</b>")),
            img_template(),
            &JssMedia,
            host,
        );

        directive.on_changes(InputChanges::FIELD, &mut doc);
        assert_eq!(
            doc.to_html(),
            r#"<div><span class="sc-image-wrapper"><b>editable</b></span></div>"#
        );
        assert!(!doc.is_attached(host));
        assert!(directive.inline_wrapper().is_some());
    }

    #[test]
    fn rerender_removes_previous_wrapper_first() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_editable("<b>one</b>")),
            img_template(),
            &JssMedia,
            host,
        );

        directive.on_changes(InputChanges::FIELD, &mut doc);
        let w1 = directive.inline_wrapper().unwrap();

        directive.inputs.field = Some(ImageField::from_editable("<b>two</b>"));
        directive.on_changes(InputChanges::FIELD, &mut doc);
        let w2 = directive.inline_wrapper().unwrap();

        assert_ne!(w1, w2);
        assert!(!doc.is_attached(w1));
        assert!(doc.is_attached(w2));
        assert_eq!(
            doc.to_html(),
            r#"<div><span class="sc-image-wrapper"><b>two</b></span></div>"#
        );
    }

    #[test]
    fn switching_from_inline_to_templated_restores_host() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_editable("<b>edit</b>")),
            img_template(),
            &JssMedia,
            host,
        );
        directive.on_changes(InputChanges::FIELD, &mut doc);

        directive.inputs.editable = false;
        directive.inputs.field = Some(ImageField::from_value(ImageFieldValue::with_src("a.jpg")));
        directive.on_changes(InputChanges::EDITABLE | InputChanges::FIELD, &mut doc);

        assert!(doc.is_attached(host));
        assert!(directive.inline_wrapper().is_none());
        assert_eq!(doc.to_html(), r#"<div><img src="a.jpg"><!--host--></div>"#);
    }

    #[test]
    fn rerender_clears_templated_view() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("a.jpg"))),
            img_template(),
            &JssMedia,
            host,
        );
        directive.on_changes(InputChanges::FIELD, &mut doc);
        directive.inputs.url_params.insert("w".into(), ParamValue::Int(50));
        directive.on_changes(InputChanges::URL_PARAMS, &mut doc);

        assert_eq!(doc.to_html(), r#"<div><img src="a.jpg?w=50"><!--host--></div>"#);
    }

    #[test]
    fn non_qualifying_change_is_ignored() {
        let (mut doc, host) = hosted_document();
        let mut directive = ImageDirective::new(
            ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("a.jpg"))),
            img_template(),
            &JssMedia,
            host,
        );
        directive.on_changes(InputChanges::FIELD, &mut doc);
        let before = doc.to_html();

        directive.inputs.field = None;
        let outcome = directive.on_changes(InputChanges::MEDIA_URL_PREFIX, &mut doc);
        assert_eq!(outcome, None);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn silent_outcome_clears_previous_render() {
        let (mut doc, host) = hosted_document();
        let mut inputs = ImageInputs::with_field(ImageField::from_value(ImageFieldValue::with_src("a.jpg")));
        inputs.editable = false;
        let mut directive = ImageDirective::new(inputs, img_template(), &JssMedia, host);
        directive.on_changes(InputChanges::FIELD, &mut doc);

        directive.inputs.field = Some(ImageField::from_value(ImageFieldValue::with_src("")));
        let outcome = directive.on_changes(InputChanges::FIELD, &mut doc);
        assert_eq!(outcome, None);
        assert_eq!(doc.to_html(), "<div><!--host--></div>");
    }

    #[test]
    fn each_rerender_grows_document_by_the_same_amount() {
        let (mut doc, host) = hosted_document();
        let field = ImageField::from_value(ImageFieldValue::with_src("a.jpg"));
        let mut directive =
            ImageDirective::new(ImageInputs::with_field(field), img_template(), &JssMedia, host);

        let mut counts = vec![doc.node_count()];
        for _ in 0..3 {
            directive.on_changes(InputChanges::ATTRS, &mut doc);
            counts.push(doc.node_count());
        }
        let growth: Vec<usize> = counts.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(growth.iter().all(|&g| g == growth[0]), "growth per pass: {growth:?}");
        assert_eq!(doc.to_html(), r#"<div><img src="a.jpg"><!--host--></div>"#);
    }

    #[test]
    fn detached_host_renders_nothing_and_reports_no_outcome() {
        let mut doc = Document::new();
        let host = doc.create_comment("loose");
        for field in [
            ImageField::from_editable("<b>chrome</b>"),
            ImageField::from_value(ImageFieldValue::with_src("a.jpg")),
        ] {
            let mut directive =
                ImageDirective::new(ImageInputs::with_field(field), img_template(), &JssMedia, host);
            assert_eq!(directive.on_changes(InputChanges::FIELD, &mut doc), None);
            assert!(directive.inline_wrapper().is_none());
        }
        assert_eq!(doc.to_html(), "");
    }

    #[test]
    fn render_once_uses_wrapper_class() {
        let (outcome, html) = render_once(
            ImageInputs::with_field(ImageField::from_editable("<i>x</i>")),
            img_template(),
            &JssMedia,
            "custom-wrapper",
        );
        assert!(matches!(outcome, Some(RenderOutcome::InlineMarkup(_))));
        assert_eq!(html, r#"<span class="custom-wrapper"><i>x</i></span>"#);
    }
}
