//! Editor facade tying the components together.
//!
//! [`EditorEngine`] owns the current document, the gesture recognizer, the caching layout engine
//! and the view state. Every read query is safe before a document is loaded: it returns an empty
//! or default value instead of failing.

use tracing::debug;

use crate::config::EditorConfig;
use crate::decorations::{DecorationSet, StyleRegistry, indent_guides};
use crate::document::Document;
use crate::error::{ConfigError, DocumentError};
use crate::gesture::{GestureEvent, GestureRecognizer, GestureResult, GestureState};
use crate::layout::{Layout, LayoutEngine, LayoutOptions};
use crate::measure::TextMeasurer;
use crate::position::{PointF, TextPosition, ViewState, Viewport};
use crate::render::{EditorRenderModel, GuideLine, RenderModelAssembler};

/// Smallest view scale reachable by pinching.
pub const MIN_SCALE: f32 = 0.25;
/// Largest view scale reachable by pinching.
pub const MAX_SCALE: f32 = 8.0;

/// Headless editor: document, gestures, layout and view state.
#[derive(Debug)]
pub struct EditorEngine {
    config: EditorConfig,
    recognizer: GestureRecognizer,
    layout: LayoutEngine,
    document: Option<Document>,
    decorations: DecorationSet,
    styles: StyleRegistry,
    viewport: Viewport,
    view: ViewState,
    cursor: TextPosition,
    show_dragger: bool,
    show_indent_guides: bool,
    /// View scale when the current pinch started.
    pinch_base_scale: Option<f32>,
}

impl EditorEngine {
    /// Create an engine without a document.
    pub fn new(config: EditorConfig, measurer: Box<dyn TextMeasurer>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            recognizer: GestureRecognizer::new(config.touch),
            layout: LayoutEngine::new(measurer, config.layout),
            document: None,
            decorations: DecorationSet::new(),
            styles: StyleRegistry::new(),
            viewport: Viewport::default(),
            view: ViewState::default(),
            cursor: TextPosition::new(0, 0),
            show_dragger: false,
            show_indent_guides: false,
            pinch_base_scale: None,
        })
    }

    /// Configuration the engine was built with, with the current layout options.
    pub fn config(&self) -> EditorConfig {
        EditorConfig {
            layout: self.layout.options(),
            ..self.config
        }
    }

    /// Replace the document, returning the previous one.
    ///
    /// The caret moves to the start, scrolling resets and the decorations of the old document
    /// are dropped.
    pub fn load_document(&mut self, document: Document) -> Option<Document> {
        debug!(id = document.id().get(), lines = document.line_count(), "document loaded");
        let previous = self.document.replace(document);
        self.reset_document_state();
        previous
    }

    /// Detach the document, leaving the engine empty.
    pub fn release_document(&mut self) -> Option<Document> {
        let previous = self.document.take();
        if let Some(document) = &previous {
            debug!(id = document.id().get(), "document released");
        }
        self.reset_document_state();
        previous
    }

    fn reset_document_state(&mut self) {
        self.cursor = TextPosition::new(0, 0);
        self.show_dragger = false;
        self.view.scroll_x = 0.0;
        self.view.scroll_y = 0.0;
        self.decorations.clear();
        self.recognizer.reset();
        self.pinch_base_scale = None;
        self.layout.invalidate();
    }

    /// Current document.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Full text, empty without a document.
    pub fn text(&self) -> &str {
        self.document.as_ref().map_or("", Document::text)
    }

    /// Number of lines, zero without a document.
    pub fn line_count(&self) -> usize {
        self.document.as_ref().map_or(0, Document::line_count)
    }

    /// Text of `line`. Without a document every line reads as empty.
    pub fn line_text(&self, line: usize) -> Result<&str, DocumentError> {
        match &self.document {
            Some(document) => document.line_text(line),
            None => Ok(""),
        }
    }

    /// Position of a flat character index, [`TextPosition::NONE`] without a document.
    pub fn position_from_index(&self, char_index: i64) -> TextPosition {
        self.document
            .as_ref()
            .map_or(TextPosition::NONE, |d| d.position_from_index(char_index))
    }

    /// Flat character index of a position, zero without a document.
    pub fn index_from_position(&self, position: TextPosition) -> usize {
        self.document
            .as_ref()
            .map_or(0, |d| d.index_from_position(position))
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change layout options.
    pub fn set_layout_options(&mut self, options: LayoutOptions) {
        self.layout.set_options(options);
        self.clamp_scroll();
    }

    /// Replace the host measurer.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.layout.set_measurer(measurer);
    }

    /// Report that the measurer's answers changed (font, size or scale).
    pub fn reset_measurer(&mut self) {
        self.layout.reset_measurer();
    }

    /// Decorations of the current document.
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Mutable decorations. Changes are picked up by the next layout.
    pub fn decorations_mut(&mut self) -> &mut DecorationSet {
        &mut self.decorations
    }

    /// Registered styles.
    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Mutable style registry.
    pub fn styles_mut(&mut self) -> &mut StyleRegistry {
        &mut self.styles
    }

    /// Include indentation guides in render models.
    pub fn set_show_indent_guides(&mut self, show: bool) {
        self.show_indent_guides = show;
    }

    /// Classify a pointer frame.
    ///
    /// The result is not applied; pass it to [`EditorEngine::apply_gesture`] for the default
    /// navigation behavior.
    pub fn handle_gesture_event(&mut self, event: &GestureEvent) -> GestureResult {
        let result = self.recognizer.handle_event(event);
        if self.recognizer.state() != GestureState::TrackingMulti {
            self.pinch_base_scale = None;
        }
        result
    }

    /// Fire a due long press while the pointer is held still.
    pub fn poll_long_press(&mut self, now_ms: i64) -> GestureResult {
        self.recognizer.poll(now_ms)
    }

    /// Recognizer state.
    pub fn gesture_state(&self) -> GestureState {
        self.recognizer.state()
    }

    /// Apply the default effect of a gesture. Returns `true` if the cursor or view changed.
    ///
    /// Taps place the caret at the hit-tested position; a long press also shows the dragger.
    /// Scrolls move the clamped scroll offset. A pinch sets the scale to the scale at pinch start
    /// times the reported ratio.
    pub fn apply_gesture(&mut self, result: &GestureResult) -> bool {
        match *result {
            GestureResult::Undefined => false,
            GestureResult::Tap(point) | GestureResult::DoubleTap(point) => {
                self.place_cursor_at(point, false)
            }
            GestureResult::LongPress(point) => self.place_cursor_at(point, true),
            GestureResult::Scroll { dx, dy } | GestureResult::FastScroll { dx, dy } => {
                let before = self.view;
                self.scroll_to(self.view.scroll_x + dx, self.view.scroll_y + dy);
                self.view != before
            }
            GestureResult::Scale(ratio) => {
                let base = *self.pinch_base_scale.get_or_insert(self.view.scale);
                let scale = (base * ratio).clamp(MIN_SCALE, MAX_SCALE);
                let changed = scale != self.view.scale;
                self.view.scale = scale;
                changed
            }
        }
    }

    fn place_cursor_at(&mut self, point: PointF, show_dragger: bool) -> bool {
        let content = PointF::new(point.x + self.view.scroll_x, point.y + self.view.scroll_y);
        let Some(position) = self.hit_test(content) else {
            return false;
        };
        let changed = position != self.cursor || show_dragger != self.show_dragger;
        self.cursor = position;
        self.show_dragger = show_dragger;
        changed
    }

    /// Logical position under a point in content coordinates.
    pub fn hit_test(&mut self, content_point: PointF) -> Option<TextPosition> {
        let document = self.document.as_ref()?;
        let (layout, measurer) =
            self.layout
                .layout_with_measurer(document, &self.decorations, self.viewport);
        Some(layout.position_at(content_point, measurer))
    }

    /// Move the caret, clamped into the document.
    pub fn set_cursor(&mut self, position: TextPosition) {
        self.cursor = match &self.document {
            Some(document) => {
                document.position_from_index(document.index_from_position(position) as i64)
            }
            None => TextPosition::new(0, 0),
        };
    }

    /// Caret position, [`TextPosition::NONE`] without a document.
    pub fn cursor(&self) -> TextPosition {
        if self.document.is_none() {
            return TextPosition::NONE;
        }
        self.cursor
    }

    /// Show or hide the dragger under the caret.
    pub fn set_show_dragger(&mut self, show: bool) {
        self.show_dragger = show;
    }

    /// Scale and scroll offsets.
    pub fn view_state(&self) -> ViewState {
        self.view
    }

    /// Scroll to an absolute offset, clamped to the content.
    pub fn scroll_to(&mut self, scroll_x: f32, scroll_y: f32) {
        self.view.scroll_x = scroll_x;
        self.view.scroll_y = scroll_y;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let (max_x, max_y) = match self.document.as_ref() {
            Some(document) => {
                let layout = self.layout.layout(document, &self.decorations, self.viewport);
                (
                    (layout.content_width() - self.viewport.width).max(0.0),
                    (layout.content_height() - self.viewport.height).max(0.0),
                )
            }
            None => (0.0, 0.0),
        };
        self.view.scroll_x = finite_or_zero(self.view.scroll_x).clamp(0.0, max_x);
        self.view.scroll_y = finite_or_zero(self.view.scroll_y).clamp(0.0, max_y);
    }

    /// Current layout, computed on demand.
    pub fn layout(&mut self) -> Option<&Layout> {
        let document = self.document.as_ref()?;
        Some(self.layout.layout(document, &self.decorations, self.viewport))
    }

    /// Snapshot of the visible part of the document in view coordinates.
    pub fn build_render_model(&mut self) -> EditorRenderModel {
        let Some(document) = self.document.as_ref() else {
            return EditorRenderModel::default();
        };
        let tab_size = self.layout.options().tab_size;
        let (layout, measurer) =
            self.layout
                .layout_with_measurer(document, &self.decorations, self.viewport);

        let top = self.view.scroll_y;
        let bottom = top + self.viewport.height;
        let visible = layout.visible_lines(top, self.viewport.height);
        let guides: Vec<GuideLine> = if self.show_indent_guides {
            indent_guides(layout, document, tab_size, measurer)
                .into_iter()
                .filter(|guide| guide.end.y > top && guide.start.y < bottom)
                .collect()
        } else {
            Vec::new()
        };

        let mut model = RenderModelAssembler::new(measurer).assemble(
            layout,
            visible,
            self.cursor,
            self.show_dragger,
            guides,
        );
        model.offset_by(self.view.scroll_x, self.view.scroll_y);
        model
    }

    /// Text of a run in the most recent layout.
    pub fn visual_run_text(&self, text_id: i64) -> Option<&str> {
        self.layout.cached()?.text(text_id)
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
