use std::io::Write;

use editor_engine::{
    Document, DocumentError, EditorConfig, EditorEngine, EventKind, GestureEvent, GestureResult,
    MonospaceMeasurer, PointF, TextPosition, Viewport, handoff,
};
use pretty_assertions::assert_eq;

const SAMPLE: &str = "AAAABBB\njhhuihii";

fn engine_with(text: &str) -> EditorEngine {
    let mut engine = EditorEngine::new(
        EditorConfig::default(),
        Box::new(MonospaceMeasurer::new(10.0, 20.0)),
    )
    .unwrap();
    engine.set_viewport(Viewport::new(400.0, 300.0));
    engine.load_document(Document::from_text(text));
    engine
}

#[test]
fn test_sample_document_queries() {
    let doc = Document::from_text(SAMPLE);
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.line_text(0).unwrap(), "AAAABBB");
    assert_eq!(doc.line_text(1).unwrap(), "jhhuihii");
    // Index 7 is the newline, index 8 the first character after it.
    assert_eq!(doc.position_from_index(7), TextPosition::new(0, 7));
    assert_eq!(doc.position_from_index(8), TextPosition::new(1, 0));
    assert_eq!(doc.index_from_position(TextPosition::new(1, 0)), 8);
}

#[test]
fn test_sample_document_clamping() {
    let doc = Document::from_text(SAMPLE);
    let length = doc.char_count() as i64;
    assert_eq!(doc.position_from_index(-1), TextPosition::new(0, 0));
    assert_eq!(doc.position_from_index(length + 100), TextPosition::new(1, 8));
    assert_eq!(doc.index_from_position(TextPosition::new(7, 0)), 8);
    assert!(matches!(
        doc.line_text(2),
        Err(DocumentError::OutOfRange { line: 2, line_count: 2 })
    ));
}

#[test]
fn test_tap_then_render() {
    let mut engine = engine_with(SAMPLE);
    let at = PointF::new(52.0, 30.0);

    assert_eq!(
        engine.handle_gesture_event(&GestureEvent::new(EventKind::Down, vec![at], 1_000)),
        GestureResult::Undefined
    );
    let tap = engine.handle_gesture_event(&GestureEvent::new(EventKind::Up, vec![at], 1_090));
    assert_eq!(tap, GestureResult::Tap(at));
    assert!(engine.apply_gesture(&tap));
    assert_eq!(engine.cursor(), TextPosition::new(1, 5));

    let model = engine.build_render_model();
    assert_eq!(model.lines.len(), 2);
    assert_eq!(model.cursor.position, PointF::new(50.0, 20.0));
    assert_eq!(model.current_line, PointF::new(0.0, 20.0));
    assert!(!model.cursor.show_dragger);

    let texts: Vec<&str> = model
        .lines
        .iter()
        .flat_map(|line| &line.runs)
        .map(|run| engine.visual_run_text(run.text_id).unwrap())
        .collect();
    assert_eq!(texts, vec!["AAAABBB", "jhhuihii"]);
}

#[test]
fn test_long_press_shows_dragger() {
    let mut engine = engine_with(SAMPLE);
    let at = PointF::new(12.0, 5.0);
    engine.handle_gesture_event(&GestureEvent::new(EventKind::Down, vec![at], 0));
    let result = engine.poll_long_press(600);
    assert_eq!(result, GestureResult::LongPress(at));
    engine.apply_gesture(&result);

    assert_eq!(engine.cursor(), TextPosition::new(0, 1));
    assert!(engine.build_render_model().cursor.show_dragger);
    // The release after a long press produces nothing further.
    assert_eq!(
        engine.handle_gesture_event(&GestureEvent::new(EventKind::Up, vec![at], 700)),
        GestureResult::Undefined
    );
}

#[test]
fn test_load_from_file_through_handoff() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // A UTF-8 byte order mark is not part of the text.
    file.write_all(b"\xef\xbb\xbffirst\r\nsecond\n").unwrap();
    let path = file.path().to_path_buf();

    let (sender, receiver) = handoff::channel();
    let worker = std::thread::spawn(move || sender.deliver(Document::from_path(path)));
    let document = receiver.wait().unwrap().unwrap();
    worker.join().unwrap();

    assert_eq!(document.line_count(), 3);
    assert_eq!(document.line_text(0).unwrap(), "first\r");
    assert_eq!(document.line_text(1).unwrap(), "second");
    assert_eq!(document.line_text(2).unwrap(), "");

    let mut engine = engine_with("");
    engine.load_document(document);
    assert_eq!(engine.line_count(), 3);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    match Document::from_path(&missing) {
        Err(DocumentError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_is_decode_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[b'a', 0xff, 0xfe, b'b']).unwrap();
    assert!(matches!(
        Document::from_path(file.path()),
        Err(DocumentError::Decode { .. })
    ));
}

#[test]
fn test_release_invalidates_layout() {
    let mut engine = engine_with(SAMPLE);
    engine.build_render_model();
    assert!(engine.visual_run_text(0).is_some());

    let released = engine.release_document().unwrap();
    assert_eq!(released.text(), SAMPLE);
    assert_eq!(engine.visual_run_text(0), None);
    assert_eq!(engine.text(), "");
    assert_eq!(engine.position_from_index(3), TextPosition::NONE);
}
