#![warn(missing_docs)]
//! Editor Engine - Headless Touch Editor Core
//!
//! # Overview
//!
//! `editor-engine` is the platform-independent half of a text editor that sits behind a thin
//! native UI shell. It owns document text, maps between flat character indices and
//! `(line, column)` positions, turns raw pointer frames into gestures and produces a render
//! model the shell paints. It never draws, shapes glyphs or loads fonts: text widths come from a
//! host-supplied [`TextMeasurer`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorEngine (document + view state)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Render Model + schema::v1 / wire           │  ← Host Output
//! ├─────────────────────────────────────────────┤
//! │  Layout Engine (runs, wrapping, hit test)   │  ← Text Layout
//! ├──────────────────────┬──────────────────────┤
//! │  Gesture Recognizer  │  Decorations         │  ← Input / Styling
//! ├──────────────────────┴──────────────────────┤
//! │  Document Store + Position Mapping          │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_engine::{
//!     Document, EditorConfig, EditorEngine, EventKind, GestureEvent, MonospaceMeasurer, PointF,
//!     TextPosition, Viewport,
//! };
//!
//! let mut engine = EditorEngine::new(
//!     EditorConfig::default(),
//!     Box::new(MonospaceMeasurer::new(10.0, 20.0)),
//! )
//! .unwrap();
//! engine.set_viewport(Viewport::new(320.0, 480.0));
//! engine.load_document(Document::from_text("AAAABBB\njhhuihii"));
//!
//! assert_eq!(engine.position_from_index(10), TextPosition::new(1, 2));
//!
//! // Tap on the second line.
//! let at = PointF::new(41.0, 25.0);
//! engine.handle_gesture_event(&GestureEvent::new(EventKind::Down, vec![at], 0));
//! let tap = engine.handle_gesture_event(&GestureEvent::new(EventKind::Up, vec![at], 60));
//! engine.apply_gesture(&tap);
//! assert_eq!(engine.cursor(), TextPosition::new(1, 4));
//!
//! let model = engine.build_render_model();
//! assert_eq!(model.lines.len(), 2);
//! let json = editor_engine::schema::v1::to_json(&model).unwrap();
//! assert!(json.contains("\"show_dragger\":false"));
//! ```
//!
//! # Module Description
//!
//! - [`document`] - immutable text with line tables and position mapping
//! - [`gesture`] - pointer frame classification
//! - [`layout`] - run segmentation, wrapping and hit testing
//! - [`render`] - render model assembly
//! - [`decorations`] - styles, style spans, virtual text and indentation guides
//! - [`engine`] - the editor facade
//! - [`wire`] / [`schema`] - binary and JSON forms for the host boundary
//! - [`handoff`] - delivering a document built on another thread
//!
//! # Unicode Support
//!
//! - Columns and indices count Unicode scalar values (`char`)
//! - Only `'\n'` ends a line; a `'\r'` before it stays part of the line text
//! - Runs split at word boundaries and wrap at grapheme cluster boundaries

pub mod config;
pub mod decorations;
pub mod document;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod handoff;
pub mod layout;
pub mod measure;
pub mod position;
pub mod render;
pub mod schema;
pub mod wire;

pub use config::{EditorConfig, TouchConfig};
pub use decorations::{
    DEFAULT_STYLE_ID, DecorationSet, Style, StyleRegistry, StyleSpan, VirtualText, VirtualTextKind,
    indent_guides,
};
pub use document::{Document, DocumentId};
pub use engine::EditorEngine;
pub use error::{ConfigError, DocumentError, WireError};
pub use gesture::{
    EventKind, GestureEvent, GestureRecognizer, GestureResult, GestureState, GestureType,
};
pub use handoff::{DocumentReceiver, DocumentSender};
pub use layout::{
    Layout, LayoutEngine, LayoutOptions, VisualLine, VisualRun, VisualRunType, WrapMode,
    layout_decorated, layout_document,
};
pub use measure::{MonospaceMeasurer, TextMeasurer};
pub use position::{PointF, TextPosition, TextRange, ViewState, Viewport};
pub use render::{Cursor, EditorRenderModel, GuideLine, GuideLineDirection, RenderModelAssembler};
