//! Coordinate types shared by every layer of the engine.
//!
//! Logical coordinates ([`TextPosition`], [`TextRange`]) count lines and `char` columns.
//! Device coordinates ([`PointF`], [`Viewport`]) are in the host's pointer/canvas space.

use std::cmp::Ordering;

/// A logical position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    /// Zero-based logical line.
    pub line: usize,
    /// Zero-based column, counted in Unicode scalar values (`char`).
    pub column: usize,
}

impl TextPosition {
    /// Sentinel for "no document" or "no valid position".
    pub const NONE: Self = Self {
        line: usize::MAX,
        column: usize::MAX,
    };

    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns `true` for the [`TextPosition::NONE`] sentinel.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl Ord for TextPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for TextPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A pair of positions. `start` is not required to precede `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    /// Anchor end of the range.
    pub start: TextPosition,
    /// Active end of the range.
    pub end: TextPosition,
}

impl TextRange {
    /// Create a range from two positions, preserving their order.
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }

    /// Return the same range with `start <= end`.
    pub fn normalized(&self) -> Self {
        if self.start <= self.end {
            *self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Returns `true` if both ends are equal.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Half-open containment test on the normalized range.
    pub fn contains(&self, position: TextPosition) -> bool {
        let range = self.normalized();
        range.start <= position && position < range.end
    }
}

/// A point in device space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl PointF {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &PointF) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the host view, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// View width.
    pub width: f32,
    /// View height.
    pub height: f32,
}

impl Viewport {
    /// Create a viewport.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport is usable for layout when both sides are positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Scroll and zoom state of the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Zoom factor accumulated from pinch gestures.
    pub scale: f32,
    /// Horizontal scroll offset.
    pub scroll_x: f32,
    /// Vertical scroll offset.
    pub scroll_y: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}
