//! Render model assembly.
//!
//! The render model is the read-only snapshot a host paints: the visual lines in view, the caret
//! projected into device space, the highlighted current line and any guide lines.

use crate::layout::{Layout, VisualLine};
use crate::measure::TextMeasurer;
use crate::position::{PointF, TextPosition};

/// Caret as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    /// Top-left corner of the caret.
    pub position: PointF,
    /// Whether the selection handle is shown under the caret.
    pub show_dragger: bool,
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideLineDirection {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// A straight decoration line, such as an indentation guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    /// Orientation.
    pub direction: GuideLineDirection,
    /// First end point.
    pub start: PointF,
    /// Second end point.
    pub end: PointF,
}

/// Everything a host needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorRenderModel {
    /// Origin of the row holding the caret, for current-line highlighting.
    pub current_line: PointF,
    /// Visual lines to paint.
    pub lines: Vec<VisualLine>,
    /// Projected caret.
    pub cursor: Cursor,
    /// Guide lines to paint.
    pub guide_lines: Vec<GuideLine>,
}

impl EditorRenderModel {
    /// Move every device-space coordinate from content space into a view scrolled by
    /// `(scroll_x, scroll_y)`. The current line keeps `x = 0` so its highlight spans the view.
    pub fn offset_by(&mut self, scroll_x: f32, scroll_y: f32) {
        let shift = |p: &mut PointF| {
            p.x -= scroll_x;
            p.y -= scroll_y;
        };
        self.current_line.y -= scroll_y;
        shift(&mut self.cursor.position);
        for line in &mut self.lines {
            line.y -= scroll_y;
            for run in &mut line.runs {
                run.x -= scroll_x;
                run.y -= scroll_y;
            }
        }
        for guide in &mut self.guide_lines {
            shift(&mut guide.start);
            shift(&mut guide.end);
        }
    }
}

/// Builds [`EditorRenderModel`]s from a layout.
pub struct RenderModelAssembler<'m> {
    measurer: &'m dyn TextMeasurer,
}

impl<'m> RenderModelAssembler<'m> {
    /// Create an assembler measuring caret offsets with `measurer`.
    pub fn new(measurer: &'m dyn TextMeasurer) -> Self {
        Self { measurer }
    }

    /// Assemble a model showing `lines`, a slice of `layout` (usually its visible part).
    ///
    /// The caret is projected against the whole layout, so it is placed correctly even when its
    /// row is not among `lines`. Out-of-document positions clamp to the nearest row and column.
    pub fn assemble(
        &self,
        layout: &Layout,
        lines: &[VisualLine],
        cursor: TextPosition,
        show_dragger: bool,
        guide_lines: Vec<GuideLine>,
    ) -> EditorRenderModel {
        let caret = layout.caret_point(cursor, self.measurer);
        EditorRenderModel {
            current_line: PointF::new(0.0, caret.y),
            lines: lines.to_vec(),
            cursor: Cursor {
                position: caret,
                show_dragger,
            },
            guide_lines,
        }
    }
}
