//! Styles and per-line decorations consumed by layout.
//!
//! Decorations never modify document text. Style spans assign a style id to ranges of columns
//! (and force run boundaries there); virtual texts insert zero-length inlay hint or phantom text
//! runs at a column. Indentation guides are derived from a finished [`Layout`].

use std::collections::{BTreeMap, HashMap};

use crate::document::Document;
use crate::layout::Layout;
use crate::measure::TextMeasurer;
use crate::position::PointF;
use crate::render::{GuideLine, GuideLineDirection};

/// Style id of text not covered by any span.
pub const DEFAULT_STYLE_ID: u32 = 0;

/// Visual attributes the host associates with a style id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    /// Id referenced by spans and emitted on runs.
    pub style_id: u32,
    /// ARGB color.
    pub color: u32,
    /// Bold weight.
    pub bold: bool,
    /// Italic slant.
    pub italic: bool,
}

impl Style {
    /// Create a regular-weight, upright style.
    pub fn new(style_id: u32, color: u32) -> Self {
        Self {
            style_id,
            color,
            bold: false,
            italic: false,
        }
    }
}

/// Lookup table from style id to [`Style`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRegistry {
    styles: HashMap<u32, Style>,
}

impl StyleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a style, returning the previous entry for the same id.
    pub fn register(&mut self, style: Style) -> Option<Style> {
        self.styles.insert(style.style_id, style)
    }

    /// Look up a style.
    pub fn get(&self, style_id: u32) -> Option<&Style> {
        self.styles.get(&style_id)
    }

    /// Remove a style.
    pub fn remove(&mut self, style_id: u32) -> Option<Style> {
        self.styles.remove(&style_id)
    }

    /// Number of registered styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Style applied to `length` characters starting at `column` of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleSpan {
    /// First styled column.
    pub column: usize,
    /// Number of styled characters.
    pub length: usize,
    /// Style id.
    pub style_id: u32,
}

impl StyleSpan {
    /// Create a span.
    pub fn new(column: usize, length: usize, style_id: u32) -> Self {
        Self {
            column,
            length,
            style_id,
        }
    }

    /// Column one past the last styled character.
    pub fn end(&self) -> usize {
        self.column + self.length
    }
}

/// Kind of virtual text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualTextKind {
    /// Inline annotation such as a parameter name or type hint.
    InlayHint,
    /// Ghost text previewing a completion.
    PhantomText,
}

/// Text rendered at a column without being part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualText {
    /// Column the text is inserted before.
    pub column: usize,
    /// Text to render.
    pub text: String,
    /// Kind of virtual text.
    pub kind: VirtualTextKind,
    /// Style id used to measure and paint it.
    pub style_id: u32,
}

/// Per-line decorations of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorationSet {
    spans: BTreeMap<usize, Vec<StyleSpan>>,
    virtual_texts: BTreeMap<usize, Vec<VirtualText>>,
    revision: u64,
}

impl DecorationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter bumped by every mutation. Layout caches compare it to detect changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if no line carries any decoration.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty() && self.virtual_texts.is_empty()
    }

    /// Replace the style spans of `line`.
    ///
    /// Spans are sorted by column, empty spans are dropped and overlaps are resolved in favor of
    /// the span that starts first.
    pub fn set_line_spans(&mut self, line: usize, spans: impl IntoIterator<Item = StyleSpan>) {
        let mut spans: Vec<StyleSpan> = spans.into_iter().filter(|s| s.length > 0).collect();
        spans.sort_by_key(|s| s.column);

        let mut normalized: Vec<StyleSpan> = Vec::with_capacity(spans.len());
        for mut span in spans {
            if let Some(previous) = normalized.last() {
                let end = span.end();
                span.column = span.column.max(previous.end());
                if span.column >= end {
                    continue;
                }
                span.length = end - span.column;
            }
            normalized.push(span);
        }

        if normalized.is_empty() {
            self.spans.remove(&line);
        } else {
            self.spans.insert(line, normalized);
        }
        self.revision += 1;
    }

    /// Style spans of `line`, sorted and non-overlapping.
    pub fn line_spans(&self, line: usize) -> &[StyleSpan] {
        self.spans.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the virtual texts of `line`. Texts at the same column keep their given order.
    pub fn set_line_virtual_texts(
        &mut self,
        line: usize,
        texts: impl IntoIterator<Item = VirtualText>,
    ) {
        let mut texts: Vec<VirtualText> =
            texts.into_iter().filter(|t| !t.text.is_empty()).collect();
        texts.sort_by_key(|t| t.column);
        if texts.is_empty() {
            self.virtual_texts.remove(&line);
        } else {
            self.virtual_texts.insert(line, texts);
        }
        self.revision += 1;
    }

    /// Virtual texts of `line`, sorted by column.
    pub fn line_virtual_texts(&self, line: usize) -> &[VirtualText] {
        self.virtual_texts
            .get(&line)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Style id covering `column` of `line`.
    pub fn style_at(&self, line: usize, column: usize) -> u32 {
        self.line_spans(line)
            .iter()
            .find(|s| s.column <= column && column < s.end())
            .map_or(DEFAULT_STYLE_ID, |s| s.style_id)
    }

    /// Remove every decoration of `line`.
    pub fn clear_line(&mut self, line: usize) {
        self.spans.remove(&line);
        self.virtual_texts.remove(&line);
        self.revision += 1;
    }

    /// Remove every decoration.
    pub fn clear(&mut self) {
        self.spans.clear();
        self.virtual_texts.clear();
        self.revision += 1;
    }
}

/// Vertical indentation guides for every line with leading whitespace.
///
/// A line indented by `n` full levels gets guides at levels `0..n`, where one level is `tab_size`
/// columns wide and a tab advances to the next level. Guides of consecutive visual lines at the
/// same level are merged into one segment. `tab_size` of zero yields no guides.
pub fn indent_guides(
    layout: &Layout,
    document: &Document,
    tab_size: usize,
    measurer: &dyn TextMeasurer,
) -> Vec<GuideLine> {
    if tab_size == 0 {
        return Vec::new();
    }
    let level_width = measurer.measure_width(" ", DEFAULT_STYLE_ID) * tab_size as f32;

    let mut guides: Vec<GuideLine> = Vec::new();
    // Index into `guides` of the segment still open at each level.
    let mut open: Vec<usize> = Vec::new();

    for visual in layout.lines() {
        let levels = document
            .line_text(visual.logical_line)
            .map(|text| indent_columns(text, tab_size) / tab_size)
            .unwrap_or(0);
        let top = visual.y;
        let bottom = visual.y + visual.height;

        open.truncate(levels);
        for level in 0..levels {
            if let Some(&index) = open.get(level)
                && guides[index].end.y == top
            {
                guides[index].end.y = bottom;
                continue;
            }
            let x = level as f32 * level_width;
            guides.push(GuideLine {
                direction: GuideLineDirection::Vertical,
                start: PointF::new(x, top),
                end: PointF::new(x, bottom),
            });
            let index = guides.len() - 1;
            if level < open.len() {
                open[level] = index;
            } else {
                open.push(index);
            }
        }
    }

    guides
}

fn indent_columns(text: &str, tab_size: usize) -> usize {
    let mut columns = 0;
    for ch in text.chars() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += tab_size - columns % tab_size,
            _ => break,
        }
    }
    columns
}
