//! Serialized forms of the render model.
//!
//! The in-memory types stay free of serialization concerns; each schema version defines its own
//! plain structs with stable field names and conversions from the in-memory model.

/// Version 1 of the render model JSON.
///
/// ```json
/// {
///   "current_line": { "x": 0.0, "y": 20.0 },
///   "lines": [
///     { "logical_line": 0, "runs": [
///       { "type": "TEXT", "x": 0.0, "y": 0.0, "text_id": 0, "style_id": 0 }
///     ] }
///   ],
///   "cursor": { "position": { "x": 30.0, "y": 20.0 }, "show_dragger": false },
///   "guide_lines": [
///     { "direction": "VERTICAL", "start": { "x": 0.0, "y": 20.0 }, "end": { "x": 0.0, "y": 60.0 } }
///   ]
/// }
/// ```
pub mod v1 {
    use serde::{Deserialize, Serialize};

    use crate::layout::{self, VisualRunType};
    use crate::position::PointF;
    use crate::render::{self, EditorRenderModel, GuideLineDirection};

    /// Schema version implemented by this module.
    pub const SCHEMA_VERSION: u32 = 1;

    /// A point.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point {
        /// Horizontal coordinate.
        pub x: f32,
        /// Vertical coordinate.
        pub y: f32,
    }

    impl From<PointF> for Point {
        fn from(p: PointF) -> Self {
            Self { x: p.x, y: p.y }
        }
    }

    /// Run classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RunType {
        /// Printable text.
        Text,
        /// Whitespace.
        Whitespace,
        /// Tab.
        Tab,
        /// Inlay hint.
        InlayHint,
        /// Phantom text.
        PhantomText,
    }

    impl From<VisualRunType> for RunType {
        fn from(kind: VisualRunType) -> Self {
            match kind {
                VisualRunType::Text => Self::Text,
                VisualRunType::Whitespace => Self::Whitespace,
                VisualRunType::Tab => Self::Tab,
                VisualRunType::InlayHint => Self::InlayHint,
                VisualRunType::PhantomText => Self::PhantomText,
            }
        }
    }

    /// A run.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct VisualRun {
        /// Classification.
        #[serde(rename = "type")]
        pub kind: RunType,
        /// Left edge.
        pub x: f32,
        /// Top edge.
        pub y: f32,
        /// Fragment key, resolved through the engine.
        pub text_id: i64,
        /// Style id.
        pub style_id: u32,
    }

    impl From<&layout::VisualRun> for VisualRun {
        fn from(run: &layout::VisualRun) -> Self {
            Self {
                kind: run.kind.into(),
                x: run.x,
                y: run.y,
                text_id: run.text_id,
                style_id: run.style_id,
            }
        }
    }

    /// A visual line.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct VisualLine {
        /// Logical line index.
        pub logical_line: usize,
        /// Runs in visual order.
        pub runs: Vec<VisualRun>,
    }

    impl From<&layout::VisualLine> for VisualLine {
        fn from(line: &layout::VisualLine) -> Self {
            Self {
                logical_line: line.logical_line,
                runs: line.runs.iter().map(VisualRun::from).collect(),
            }
        }
    }

    /// The caret.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Cursor {
        /// Top-left corner.
        pub position: Point,
        /// Whether to show the selection handle.
        pub show_dragger: bool,
    }

    impl From<render::Cursor> for Cursor {
        fn from(cursor: render::Cursor) -> Self {
            Self {
                position: cursor.position.into(),
                show_dragger: cursor.show_dragger,
            }
        }
    }

    /// Guide line orientation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum Direction {
        /// Left to right.
        Horizontal,
        /// Top to bottom.
        Vertical,
    }

    /// A guide line.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct GuideLine {
        /// Orientation.
        pub direction: Direction,
        /// First end point.
        pub start: Point,
        /// Second end point.
        pub end: Point,
    }

    impl From<&render::GuideLine> for GuideLine {
        fn from(guide: &render::GuideLine) -> Self {
            Self {
                direction: match guide.direction {
                    GuideLineDirection::Horizontal => Direction::Horizontal,
                    GuideLineDirection::Vertical => Direction::Vertical,
                },
                start: guide.start.into(),
                end: guide.end.into(),
            }
        }
    }

    /// The render model.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RenderModel {
        /// Origin of the caret row.
        pub current_line: Point,
        /// Visual lines.
        pub lines: Vec<VisualLine>,
        /// Caret.
        pub cursor: Cursor,
        /// Guide lines.
        pub guide_lines: Vec<GuideLine>,
    }

    impl From<&EditorRenderModel> for RenderModel {
        fn from(model: &EditorRenderModel) -> Self {
            Self {
                current_line: model.current_line.into(),
                lines: model.lines.iter().map(VisualLine::from).collect(),
                cursor: model.cursor.into(),
                guide_lines: model.guide_lines.iter().map(GuideLine::from).collect(),
            }
        }
    }

    /// Serialize a render model to JSON.
    pub fn to_json(model: &EditorRenderModel) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RenderModel::from(model))
    }

}
