//! Visual layout: run segmentation, measurement and soft wrapping.
//!
//! Each logical line is cut into runs at Unicode word boundaries, style span boundaries and
//! around tabs. A tab advances to the next tab stop, counted in UAX #11 cells from the start of
//! the logical line. Runs are measured through the host [`TextMeasurer`] and placed left to right;
//! depending on [`WrapMode`] a run that does not fit starts a new visual line.
//!
//! [`layout_document`] is the pure entry point. [`LayoutEngine`] owns the measurer, caches run
//! widths and keeps the last layout until its inputs change.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::decorations::{DecorationSet, VirtualText, VirtualTextKind};
use crate::document::{Document, DocumentId, column_to_byte};
use crate::measure::TextMeasurer;
use crate::position::{PointF, TextPosition, Viewport};

/// Default distance between tab stops, in cells.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// One visual line per logical line.
    None,
    /// Fill each visual line grapheme by grapheme, splitting runs at the edge.
    Char,
    /// Break between runs; split a run only when it alone is wider than the viewport.
    #[default]
    Word,
}

/// Options that change the produced layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Wrapping mode.
    pub wrap_mode: WrapMode,
    /// Distance between tab stops, in cells. A tab advances to the next stop.
    pub tab_size: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            wrap_mode: WrapMode::default(),
            tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

/// Classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualRunType {
    /// Printable text.
    Text,
    /// Spaces and other non-tab whitespace.
    Whitespace,
    /// A single tab.
    Tab,
    /// Inlay hint virtual text (zero document length).
    InlayHint,
    /// Phantom virtual text (zero document length).
    PhantomText,
}

impl VisualRunType {
    /// Returns `true` for runs that do not occupy document columns.
    pub fn is_virtual(self) -> bool {
        matches!(self, Self::InlayHint | Self::PhantomText)
    }
}

/// A horizontally contiguous piece of one visual line with a single classification and style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualRun {
    /// Classification.
    pub kind: VisualRunType,
    /// Left edge, in device units from the start of the line.
    pub x: f32,
    /// Top of the visual line holding the run.
    pub y: f32,
    /// Key into the text fragment table of the owning [`Layout`].
    pub text_id: i64,
    /// Style used to measure and paint the run.
    pub style_id: u32,
    /// First column of the run in its logical line.
    pub column: usize,
    /// Number of document characters covered. Zero for virtual runs.
    pub length: usize,
    /// Measured advance width.
    pub width: f32,
}

impl VisualRun {
    /// Column one past the run.
    pub fn end_column(&self) -> usize {
        self.column + self.length
    }
}

/// One row of the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    /// Logical line this row belongs to.
    pub logical_line: usize,
    /// Runs in visual order.
    pub runs: Vec<VisualRun>,
    /// Top edge.
    pub y: f32,
    /// Row height.
    pub height: f32,
    /// First logical column on this row.
    pub start_column: usize,
    /// Column one past the last character on this row.
    pub end_column: usize,
    /// `true` for every row of a logical line except its first.
    pub is_wrapped_part: bool,
}

impl VisualLine {
    /// Right edge of the last run.
    pub fn width(&self) -> f32 {
        self.runs.last().map_or(0.0, |run| run.x + run.width)
    }
}

/// Result of laying out a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    lines: Vec<VisualLine>,
    texts: Vec<String>,
    line_height: f32,
    content_width: f32,
}

impl Layout {
    /// All visual lines, ordered by logical line then column.
    pub fn lines(&self) -> &[VisualLine] {
        &self.lines
    }

    /// Text of the fragment `text_id`.
    pub fn text(&self, text_id: i64) -> Option<&str> {
        usize::try_from(text_id)
            .ok()
            .and_then(|id| self.texts.get(id))
            .map(String::as_str)
    }

    /// Text of a run produced by this layout.
    pub fn run_text(&self, run: &VisualRun) -> &str {
        self.text(run.text_id).unwrap_or_default()
    }

    /// Height of one visual line at the time of layout.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Total height of all visual lines.
    pub fn content_height(&self) -> f32 {
        self.lines.last().map_or(0.0, |line| line.y + line.height)
    }

    /// Width of the widest visual line.
    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    /// Visual lines intersecting the band `scroll_y .. scroll_y + height`.
    pub fn visible_lines(&self, scroll_y: f32, height: f32) -> &[VisualLine] {
        let first = self
            .lines
            .partition_point(|line| line.y + line.height <= scroll_y);
        let end = self.lines.partition_point(|line| line.y < scroll_y + height);
        &self.lines[first..end.max(first)]
    }

    /// Index of the visual line showing `position`, after clamping it into the layout.
    ///
    /// A column on a wrap boundary belongs to the continuation row.
    pub fn visual_line_index(&self, position: TextPosition) -> Option<usize> {
        let position = self.clamp(position)?;
        let after = self.lines.partition_point(|line| {
            (line.logical_line, line.start_column) <= (position.line, position.column)
        });
        Some(after.saturating_sub(1))
    }

    /// Clamp a position to the nearest one present in this layout.
    pub fn clamp(&self, position: TextPosition) -> Option<TextPosition> {
        let last = self.lines.last()?;
        let line = position.line.min(last.logical_line);
        let after = self.lines.partition_point(|visual| visual.logical_line <= line);
        let line_end = after
            .checked_sub(1)
            .map_or(0, |index| self.lines[index].end_column);
        Some(TextPosition::new(line, position.column.min(line_end)))
    }

    /// Logical position nearest to a point in content coordinates.
    ///
    /// Points above the content map to the first row, points below to the last. Within a run the
    /// nearest grapheme boundary wins. The result always projects back onto the hit row: on a row
    /// continued by a wrap, the boundary shared with the next row is not reachable.
    pub fn position_at(&self, point: PointF, measurer: &dyn TextMeasurer) -> TextPosition {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return TextPosition::new(0, 0);
        };
        let index = self
            .lines
            .partition_point(|line| line.y + line.height <= point.y)
            .min(last);
        let line = &self.lines[index];

        let column = line
            .runs
            .iter()
            .find(|run| point.x < run.x + run.width)
            .map_or(line.end_column, |run| {
                if run.kind.is_virtual() {
                    run.column
                } else {
                    self.column_in_run(run, point.x - run.x, measurer)
                }
            });
        TextPosition::new(line.logical_line, column.min(self.last_column_on_row(index)))
    }

    /// Largest column whose caret is drawn on row `index`.
    fn last_column_on_row(&self, index: usize) -> usize {
        let line = &self.lines[index];
        let continued = self
            .lines
            .get(index + 1)
            .is_some_and(|next| next.logical_line == line.logical_line);
        if !continued {
            return line.end_column;
        }
        line.runs
            .iter()
            .rev()
            .find(|run| !run.kind.is_virtual() && run.length > 0)
            .map_or(line.start_column, |run| {
                let last_grapheme = self
                    .run_text(run)
                    .graphemes(true)
                    .next_back()
                    .map_or(0, |grapheme| grapheme.chars().count());
                run.end_column() - last_grapheme.min(run.length)
            })
    }

    /// Top-left corner of the caret at `position`, after clamping it into the layout.
    pub fn caret_point(&self, position: TextPosition, measurer: &dyn TextMeasurer) -> PointF {
        let (Some(index), Some(position)) = (self.visual_line_index(position), self.clamp(position))
        else {
            return PointF::default();
        };
        let line = &self.lines[index];
        let x = line
            .runs
            .iter()
            .find(|run| !run.kind.is_virtual() && position.column < run.end_column())
            .map_or_else(
                || line.width(),
                |run| run.x + self.prefix_width(run, position.column - run.column, measurer),
            );
        PointF::new(x, line.y)
    }

    /// Width of the first `chars` characters of `run`.
    pub(crate) fn prefix_width(
        &self,
        run: &VisualRun,
        chars: usize,
        measurer: &dyn TextMeasurer,
    ) -> f32 {
        if chars == 0 {
            return 0.0;
        }
        if chars >= run.length || run.kind == VisualRunType::Tab {
            return run.width;
        }
        let text = self.run_text(run);
        measurer.measure_width(&text[..column_to_byte(text, chars)], run.style_id)
    }

    fn column_in_run(&self, run: &VisualRun, x: f32, measurer: &dyn TextMeasurer) -> usize {
        if run.kind == VisualRunType::Tab {
            return if x < run.width / 2.0 {
                run.column
            } else {
                run.end_column()
            };
        }
        let text = self.run_text(run);
        let mut column = run.column;
        let mut left = 0.0;
        for (byte, grapheme) in text.grapheme_indices(true) {
            let end = byte + grapheme.len();
            let right = measurer.measure_width(&text[..end], run.style_id);
            if x < (left + right) / 2.0 {
                return column;
            }
            column += grapheme.chars().count();
            left = right;
        }
        column
    }
}

/// Lay out `document` without decorations.
pub fn layout_document(
    document: &Document,
    viewport: Viewport,
    options: LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> Layout {
    let mut widths = WidthCache::default();
    compose(
        document,
        &DecorationSet::default(),
        viewport,
        options,
        measurer,
        &mut widths,
    )
}

/// Lay out `document` with style spans and virtual texts applied.
pub fn layout_decorated(
    document: &Document,
    decorations: &DecorationSet,
    viewport: Viewport,
    options: LayoutOptions,
    measurer: &dyn TextMeasurer,
) -> Layout {
    let mut widths = WidthCache::default();
    compose(document, decorations, viewport, options, measurer, &mut widths)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutKey {
    document: DocumentId,
    viewport: Viewport,
    generation: u64,
    decorations: u64,
    options: LayoutOptions,
}

/// Caching layout front-end owning the host measurer.
pub struct LayoutEngine {
    measurer: Box<dyn TextMeasurer>,
    options: LayoutOptions,
    generation: u64,
    widths: WidthCache,
    cached: Option<(LayoutKey, Layout)>,
}

impl LayoutEngine {
    /// Create an engine with an empty cache.
    pub fn new(measurer: Box<dyn TextMeasurer>, options: LayoutOptions) -> Self {
        Self {
            measurer,
            options,
            generation: 0,
            widths: WidthCache::default(),
            cached: None,
        }
    }

    /// Measurer in use.
    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    /// Options in use.
    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    /// Change options. The next layout recomputes if they differ.
    pub fn set_options(&mut self, options: LayoutOptions) {
        self.options = options;
    }

    /// Measurer generation, bumped by every measurer change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the measurer and drop every cached width and layout.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.reset_measurer();
    }

    /// Report that the current measurer now answers differently (font or scale change).
    pub fn reset_measurer(&mut self) {
        self.generation += 1;
        self.widths.clear();
        self.cached = None;
        debug!(generation = self.generation, "text measurer reset");
    }

    /// Drop the cached layout, keeping measured widths.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Cached layout, if one is held.
    pub fn cached(&self) -> Option<&Layout> {
        self.cached.as_ref().map(|(_, layout)| layout)
    }

    /// Layout for the given inputs, recomputed only when any of them changed.
    pub fn layout(
        &mut self,
        document: &Document,
        decorations: &DecorationSet,
        viewport: Viewport,
    ) -> &Layout {
        self.layout_with_measurer(document, decorations, viewport).0
    }

    /// Like [`LayoutEngine::layout`], also lending the measurer for caret and hit-test queries.
    pub fn layout_with_measurer(
        &mut self,
        document: &Document,
        decorations: &DecorationSet,
        viewport: Viewport,
    ) -> (&Layout, &dyn TextMeasurer) {
        let key = LayoutKey {
            document: document.id(),
            viewport,
            generation: self.generation,
            decorations: decorations.revision(),
            options: self.options,
        };
        let entry = match self.cached.take() {
            Some((cached, layout)) if cached == key => (cached, layout),
            _ => {
                debug!(
                    document = key.document.get(),
                    width = viewport.width,
                    height = viewport.height,
                    generation = key.generation,
                    "layout cache miss"
                );
                let layout = compose(
                    document,
                    decorations,
                    viewport,
                    self.options,
                    self.measurer.as_ref(),
                    &mut self.widths,
                );
                (key, layout)
            }
        };
        (&self.cached.insert(entry).1, self.measurer.as_ref())
    }
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("options", &self.options)
            .field("generation", &self.generation)
            .field("cached", &self.cached.is_some())
            .finish_non_exhaustive()
    }
}

/// Widths keyed by style id then text.
#[derive(Debug, Default)]
pub(crate) struct WidthCache {
    widths: HashMap<u32, HashMap<String, f32>>,
}

impl WidthCache {
    fn measure(&mut self, measurer: &dyn TextMeasurer, text: &str, style_id: u32) -> f32 {
        let per_style = self.widths.entry(style_id).or_default();
        if let Some(&width) = per_style.get(text) {
            return width;
        }
        let width = measurer.measure_width(text, style_id);
        per_style.insert(text.to_owned(), width);
        width
    }

    fn clear(&mut self) {
        self.widths.clear();
    }
}

struct Piece<'t> {
    text: &'t str,
    kind: VisualRunType,
    style_id: u32,
    column: usize,
    length: usize,
}

struct Composer<'a> {
    measurer: &'a dyn TextMeasurer,
    widths: &'a mut WidthCache,
    wrap_mode: WrapMode,
    tab_size: usize,
    max_width: f32,
    line_height: f32,
    lines: Vec<VisualLine>,
    texts: Vec<String>,
    content_width: f32,
    y: f32,
    // Row being filled.
    logical_line: usize,
    runs: Vec<VisualRun>,
    x: f32,
    start_column: usize,
    column: usize,
    /// Terminal cells of document text placed so far on the logical line; tab stops count these.
    cell: usize,
    is_wrapped_part: bool,
}

fn compose(
    document: &Document,
    decorations: &DecorationSet,
    viewport: Viewport,
    options: LayoutOptions,
    measurer: &dyn TextMeasurer,
    widths: &mut WidthCache,
) -> Layout {
    // Without a usable width there is nothing to wrap against.
    let max_width = if viewport.width.is_finite() && viewport.width > 0.0 {
        viewport.width
    } else {
        f32::INFINITY
    };
    let mut composer = Composer {
        measurer,
        widths,
        wrap_mode: options.wrap_mode,
        tab_size: options.tab_size.max(1),
        max_width,
        line_height: measurer.line_height(),
        lines: Vec::with_capacity(document.line_count()),
        texts: Vec::new(),
        content_width: 0.0,
        y: 0.0,
        logical_line: 0,
        runs: Vec::new(),
        x: 0.0,
        start_column: 0,
        column: 0,
        cell: 0,
        is_wrapped_part: false,
    };

    for (line, text) in document.lines().enumerate() {
        composer.begin_line(line);
        for piece in segment_line(text, line, decorations) {
            composer.place(piece);
        }
        composer.finish_row();
    }

    debug!(
        document = document.id().get(),
        visual_lines = composer.lines.len(),
        "layout computed"
    );
    Layout {
        lines: composer.lines,
        texts: composer.texts,
        line_height: composer.line_height,
        content_width: composer.content_width,
    }
}

impl Composer<'_> {
    fn begin_line(&mut self, line: usize) {
        self.logical_line = line;
        self.start_column = 0;
        self.column = 0;
        self.cell = 0;
        self.is_wrapped_part = false;
    }

    /// Cells from the current position to the next tab stop.
    fn tab_cells(&self) -> usize {
        self.tab_size - self.cell % self.tab_size
    }

    fn measure(&mut self, piece: &Piece<'_>) -> f32 {
        if piece.kind == VisualRunType::Tab {
            let space = self.widths.measure(self.measurer, " ", piece.style_id);
            return space * self.tab_cells() as f32;
        }
        self.widths.measure(self.measurer, piece.text, piece.style_id)
    }

    fn place(&mut self, piece: Piece<'_>) {
        let width = self.measure(&piece);
        let fits = self.x + width <= self.max_width;
        match self.wrap_mode {
            WrapMode::None => self.push_run(&piece, width),
            _ if fits => self.push_run(&piece, width),
            WrapMode::Word if width <= self.max_width || !self.splittable(&piece) => {
                self.break_row();
                self.push_run(&piece, width);
            }
            WrapMode::Word => {
                self.break_row();
                self.fill_graphemes(&piece);
            }
            WrapMode::Char if self.splittable(&piece) => self.fill_graphemes(&piece),
            WrapMode::Char => {
                self.break_row();
                self.push_run(&piece, width);
            }
        }
    }

    fn splittable(&self, piece: &Piece<'_>) -> bool {
        piece.kind != VisualRunType::Tab && piece.text.graphemes(true).nth(1).is_some()
    }

    fn fill_graphemes(&mut self, piece: &Piece<'_>) {
        // Virtual fragments all stay anchored at the piece column with zero length.
        let advances = !piece.kind.is_virtual();
        let mut start_byte = 0;
        let mut start_column = piece.column;
        let mut column = piece.column;
        let mut fragment_width = 0.0;

        for (byte, grapheme) in piece.text.grapheme_indices(true) {
            let width = self.widths.measure(self.measurer, grapheme, piece.style_id);
            let occupied = self.x + fragment_width;
            if occupied + width > self.max_width && occupied > 0.0 {
                if byte > start_byte {
                    let columns = start_column..column;
                    self.push_fragment(piece, start_byte..byte, columns, fragment_width);
                }
                self.break_row();
                start_byte = byte;
                start_column = column;
                fragment_width = 0.0;
            }
            fragment_width += width;
            if advances {
                column += grapheme.chars().count();
            }
        }
        if start_byte < piece.text.len() {
            let bytes = start_byte..piece.text.len();
            self.push_fragment(piece, bytes, start_column..column, fragment_width);
        }
    }

    fn push_fragment(
        &mut self,
        piece: &Piece<'_>,
        bytes: Range<usize>,
        columns: Range<usize>,
        width: f32,
    ) {
        let fragment = Piece {
            text: &piece.text[bytes],
            kind: piece.kind,
            style_id: piece.style_id,
            column: columns.start,
            length: columns.len(),
        };
        self.push_run(&fragment, width);
    }

    fn push_run(&mut self, piece: &Piece<'_>, width: f32) {
        let text_id = self.texts.len() as i64;
        self.texts.push(piece.text.to_owned());
        self.runs.push(VisualRun {
            kind: piece.kind,
            x: self.x,
            y: self.y,
            text_id,
            style_id: piece.style_id,
            column: piece.column,
            length: piece.length,
            width,
        });
        self.x += width;
        if piece.kind.is_virtual() {
            return;
        }
        self.cell += match piece.kind {
            VisualRunType::Tab => self.tab_cells(),
            _ => UnicodeWidthStr::width(piece.text),
        };
        self.column = piece.column + piece.length;
    }

    fn break_row(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        self.finish_row();
        self.start_column = self.column;
        self.is_wrapped_part = true;
    }

    fn finish_row(&mut self) {
        self.content_width = self.content_width.max(self.x);
        self.lines.push(VisualLine {
            logical_line: self.logical_line,
            runs: std::mem::take(&mut self.runs),
            y: self.y,
            height: self.line_height,
            start_column: self.start_column,
            end_column: self.column,
            is_wrapped_part: self.is_wrapped_part,
        });
        self.y += self.line_height;
        self.x = 0.0;
    }
}

fn classify(text: &str) -> VisualRunType {
    if text == "\t" {
        VisualRunType::Tab
    } else if text.chars().all(char::is_whitespace) {
        VisualRunType::Whitespace
    } else {
        VisualRunType::Text
    }
}

/// Cut a line into pieces at word boundaries, tabs, style span edges and virtual text anchors.
fn segment_line<'t>(
    text: &'t str,
    line: usize,
    decorations: &'t DecorationSet,
) -> Vec<Piece<'t>> {
    let spans = decorations.line_spans(line);
    let virtual_texts = decorations.line_virtual_texts(line);

    // Byte offsets where a new piece must start.
    let mut cuts: Vec<usize> = Vec::new();
    for (byte, word) in text.split_word_bound_indices() {
        cuts.push(byte);
        cuts.extend(
            word.match_indices('\t')
                .flat_map(|(offset, _)| [byte + offset, byte + offset + 1]),
        );
    }
    if !spans.is_empty() || !virtual_texts.is_empty() {
        let columns = spans
            .iter()
            .flat_map(|span| [span.column, span.end()])
            .chain(virtual_texts.iter().map(|v| v.column));
        cuts.extend(columns.map(|column| column_to_byte(text, column)));
    }
    cuts.push(text.len());
    cuts.sort_unstable();
    cuts.dedup();

    let mut pieces = Vec::with_capacity(cuts.len());
    let mut pending_virtual = virtual_texts.iter().peekable();
    let mut column = 0;
    for window in cuts.windows(2) {
        let slice = &text[window[0]..window[1]];
        while let Some(virtual_text) = pending_virtual.next_if(|v| v.column <= column) {
            pieces.push(virtual_piece(virtual_text, column));
        }
        let length = slice.chars().count();
        pieces.push(Piece {
            text: slice,
            kind: classify(slice),
            style_id: decorations.style_at(line, column),
            column,
            length,
        });
        column += length;
    }
    // Virtual texts anchored at or past the end of the line.
    for virtual_text in pending_virtual {
        pieces.push(virtual_piece(virtual_text, column));
    }
    pieces
}

fn virtual_piece(virtual_text: &VirtualText, column: usize) -> Piece<'_> {
    Piece {
        text: &virtual_text.text,
        kind: match virtual_text.kind {
            VirtualTextKind::InlayHint => VisualRunType::InlayHint,
            VirtualTextKind::PhantomText => VisualRunType::PhantomText,
        },
        style_id: virtual_text.style_id,
        column,
        length: 0,
    }
}
