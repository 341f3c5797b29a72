use editor_engine::schema::v1;
use editor_engine::{
    Document, EditorConfig, EditorEngine, GuideLineDirection, LayoutOptions, MonospaceMeasurer,
    PointF, StyleSpan, TextPosition, Viewport, VirtualText, VirtualTextKind, WrapMode,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

const SOURCE: &str = "fn main() {\n    let x = 1;\n    if x > 0 {\n        run();\n    }\n}";

fn engine() -> EditorEngine {
    let config = EditorConfig {
        layout: LayoutOptions {
            wrap_mode: WrapMode::None,
            tab_size: 4,
        },
        ..EditorConfig::default()
    };
    let mut engine =
        EditorEngine::new(config, Box::new(MonospaceMeasurer::new(10.0, 20.0))).unwrap();
    engine.set_viewport(Viewport::new(200.0, 80.0));
    engine.load_document(Document::from_text(SOURCE));
    engine
}

#[test]
fn test_json_uses_stable_field_names() {
    let mut engine = engine();
    engine.set_cursor(TextPosition::new(1, 8));
    let json = v1::to_json(&engine.build_render_model()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["current_line", "cursor", "guide_lines", "lines"]);

    assert_eq!(value["cursor"]["position"]["x"], 80.0);
    assert_eq!(value["cursor"]["position"]["y"], 20.0);
    assert_eq!(value["cursor"]["show_dragger"], false);
    assert_eq!(value["current_line"]["y"], 20.0);

    let first_run = &value["lines"][1]["runs"][0];
    assert_eq!(value["lines"][1]["logical_line"], 1);
    assert_eq!(first_run["type"], "WHITESPACE");
    for key in ["x", "y", "text_id", "style_id"] {
        assert!(first_run.get(key).is_some(), "missing {key}");
    }
    // Layout internals stay out of the external form.
    assert!(first_run.get("width").is_none());
    assert!(value["lines"][1].get("is_wrapped_part").is_none());
}

#[test]
fn test_scrolled_model_contains_only_visible_lines() {
    let mut engine = engine();
    engine.scroll_to(0.0, 30.0);
    let model = engine.build_render_model();
    let logical: Vec<usize> = model.lines.iter().map(|l| l.logical_line).collect();
    // Rows 20..40 through 100..120 intersect the band 30..110.
    assert_eq!(logical, vec![1, 2, 3, 4, 5]);
    assert_eq!(model.lines[0].y, -10.0);
}

#[test]
fn test_indent_guides_in_model() {
    let mut engine = engine();
    engine.set_show_indent_guides(true);
    let model = engine.build_render_model();
    assert_eq!(model.guide_lines.len(), 2);
    assert!(model
        .guide_lines
        .iter()
        .all(|g| g.direction == GuideLineDirection::Vertical));
    assert_eq!(model.guide_lines[0].start, PointF::new(0.0, 20.0));
    assert_eq!(model.guide_lines[0].end, PointF::new(0.0, 100.0));
    assert_eq!(model.guide_lines[1].start, PointF::new(40.0, 60.0));

    let json = v1::to_json(&model).unwrap();
    assert!(json.contains(r#""direction":"VERTICAL""#));
}

#[test]
fn test_decorations_reach_the_model() {
    let mut engine = engine();
    engine.decorations_mut().set_line_spans(0, [StyleSpan::new(0, 2, 7)]);
    engine.decorations_mut().set_line_virtual_texts(
        1,
        [VirtualText {
            column: 8,
            text: ": i32".into(),
            kind: VirtualTextKind::InlayHint,
            style_id: 3,
        }],
    );
    let model = engine.build_render_model();
    assert_eq!(model.lines[0].runs[0].style_id, 7);

    let hint = model.lines[1]
        .runs
        .iter()
        .find(|run| run.style_id == 3)
        .unwrap();
    assert_eq!(engine.visual_run_text(hint.text_id), Some(": i32"));
    assert_eq!(hint.x, 80.0);

    let value: Value = serde_json::from_str(&v1::to_json(&model).unwrap()).unwrap();
    let types: Vec<&str> = value["lines"][1]["runs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|run| run["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"INLAY_HINT"));
}
