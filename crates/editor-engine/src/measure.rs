//! Text measurement interface implemented by the host.
//!
//! The engine never shapes glyphs or loads fonts. It asks a [`TextMeasurer`] for run widths and
//! the line height, and caches the answers until the host reports a measurer change.

use unicode_width::UnicodeWidthStr;

/// Glyph metrics provider, owned by the host and injected into the engine.
pub trait TextMeasurer {
    /// Advance width of `text` rendered with the style registered under `style_id`.
    fn measure_width(&self, text: &str, style_id: u32) -> f32;

    /// Height of one visual line.
    fn line_height(&self) -> f32;
}

/// Measurer for fixed-pitch fonts: every terminal cell has the same advance.
///
/// Cell widths follow UAX #11, so CJK and most emoji take two cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Advance of a single narrow cell.
    pub advance: f32,
    /// Height of one line.
    pub line_height: f32,
}

impl MonospaceMeasurer {
    /// Create a measurer with the given cell advance and line height.
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_width(&self, text: &str, _style_id: u32) -> f32 {
        UnicodeWidthStr::width(text) as f32 * self.advance
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}
