#![warn(missing_docs)]
//! C ABI surface over [`editor_engine`].
//!
//! Documents and editors cross the boundary as opaque heap handles created and freed through
//! this crate. Strings returned to the host are NUL-terminated UTF-8 and must be released with
//! [`editor_engine_string_free`]. Gesture results are written into caller-provided buffers using
//! the fixed layout from [`editor_engine::wire`].
//!
//! No function unwinds into the host: a null handle, a short buffer or an engine error is logged
//! with `tracing::warn!` and reported as a null pointer, zero or a default value.
//!
//! Positions are packed into a `u64` as `(line << 32) | column`; `u64::MAX` stands for
//! [`TextPosition::NONE`].

use std::ffi::{CStr, CString, c_char, c_void};
use std::path::PathBuf;
use std::ptr;
use std::slice;
use std::time::Instant;

use editor_engine::schema::v1;
use editor_engine::wire;
use editor_engine::{
    Document, EditorConfig, EditorEngine, EventKind, GestureEvent, GestureResult, TextMeasurer,
    TextPosition, TouchConfig, Viewport,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Host callback measuring `len` UTF-16 code units at `text` with the given style.
pub type MeasureTextFn =
    extern "C" fn(text: *const u16, len: usize, style_id: u32, user_data: *mut c_void) -> f32;

/// Host callback returning the height of one visual line.
pub type LineHeightFn = extern "C" fn(user_data: *mut c_void) -> f32;

/// Packed form of [`TextPosition::NONE`].
pub const POSITION_NONE: u64 = u64::MAX;

/// Install a `tracing` subscriber that honours `RUST_LOG`.
///
/// Calling it again, or after the host installed its own subscriber, has no effect.
#[unsafe(no_mangle)]
pub extern "C" fn editor_engine_init() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    if result.is_ok() {
        debug!("editor-engine-ffi logging initialised");
    }
}

/// Free a string returned by this library.
///
/// # Safety
///
/// `string` must be null or a pointer returned by one of this library's string functions that
/// has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_engine_string_free(string: *mut c_char) {
    if !string.is_null() {
        // SAFETY: the pointer came from `CString::into_raw` in `into_c_string`.
        drop(unsafe { CString::from_raw(string) });
    }
}

fn into_c_string(text: &str) -> *mut c_char {
    match CString::new(text) {
        Ok(string) => string.into_raw(),
        Err(err) => {
            warn!(position = err.nul_position(), "string contains an interior NUL");
            ptr::null_mut()
        }
    }
}

/// Pack a position for the host.
pub fn pack_position(position: TextPosition) -> u64 {
    if position.is_none() {
        return POSITION_NONE;
    }
    let line = position.line.min(u32::MAX as usize) as u64;
    let column = position.column.min(u32::MAX as usize) as u64;
    (line << 32) | column
}

/// Unpack a position received from the host.
pub fn unpack_position(packed: u64) -> TextPosition {
    if packed == POSITION_NONE {
        return TextPosition::NONE;
    }
    TextPosition::new((packed >> 32) as usize, (packed & 0xffff_ffff) as usize)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn into_document_handle(document: Document) -> *mut Document {
    Box::into_raw(Box::new(document))
}

/// Create a document from `len` bytes of UTF-8. Invalid sequences are replaced.
///
/// # Safety
///
/// `text` must be valid for reads of `len` bytes, or null when `len` is zero.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_from_utf8(text: *const u8, len: usize) -> *mut Document {
    if text.is_null() {
        return into_document_handle(Document::from_text(""));
    }
    // SAFETY: the caller guarantees `len` readable bytes.
    let bytes = unsafe { slice::from_raw_parts(text, len) };
    into_document_handle(Document::from_text(String::from_utf8_lossy(bytes)))
}

/// Create a document from `len` UTF-16 code units. Unpaired surrogates are replaced.
///
/// # Safety
///
/// `text` must be valid for reads of `len` code units, or null when `len` is zero.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_from_utf16(text: *const u16, len: usize) -> *mut Document {
    if text.is_null() {
        return into_document_handle(Document::from_text(""));
    }
    // SAFETY: the caller guarantees `len` readable code units.
    let units = unsafe { slice::from_raw_parts(text, len) };
    into_document_handle(Document::from_text(String::from_utf16_lossy(units)))
}

/// Load a document from a UTF-8 file. Returns null when the file cannot be read or decoded.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_from_file(path: *const c_char) -> *mut Document {
    if path.is_null() {
        warn!("editor_document_from_file called with a null path");
        return ptr::null_mut();
    }
    // SAFETY: the caller guarantees a NUL-terminated string.
    let path = unsafe { CStr::from_ptr(path) };
    let path = match path.to_str() {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            warn!("document path is not valid UTF-8");
            return ptr::null_mut();
        }
    };
    match Document::from_path(&path) {
        Ok(document) => into_document_handle(document),
        Err(err) => {
            warn!(%err, "failed to create document from file");
            ptr::null_mut()
        }
    }
}

/// Free a document handle that was not handed to an editor.
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_free(document: *mut Document) {
    if !document.is_null() {
        // SAFETY: the handle came from `Box::into_raw` and is freed exactly once.
        drop(unsafe { Box::from_raw(document) });
    }
}

unsafe fn document_ref<'a>(document: *const Document) -> Option<&'a Document> {
    // SAFETY: forwarded from the caller.
    let document = unsafe { document.as_ref() };
    if document.is_none() {
        warn!("null document handle");
    }
    document
}

/// Full text of the document. Free the result with [`editor_engine_string_free`].
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_text(document: *const Document) -> *mut c_char {
    // SAFETY: forwarded from the caller.
    match unsafe { document_ref(document) } {
        Some(document) => into_c_string(document.text()),
        None => ptr::null_mut(),
    }
}

/// Number of lines in the document, zero for a null handle.
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_line_count(document: *const Document) -> usize {
    // SAFETY: forwarded from the caller.
    unsafe { document_ref(document) }.map_or(0, Document::line_count)
}

/// Text of one line without its terminator, or null when the line does not exist.
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_line_text(
    document: *const Document,
    line: usize,
) -> *mut c_char {
    // SAFETY: forwarded from the caller.
    let Some(document) = (unsafe { document_ref(document) }) else {
        return ptr::null_mut();
    };
    match document.line_text(line) {
        Ok(text) => into_c_string(text),
        Err(err) => {
            warn!(%err, "line text query failed");
            ptr::null_mut()
        }
    }
}

/// Packed position of a character index, clamped to the document.
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_position_from_index(
    document: *const Document,
    char_index: i64,
) -> u64 {
    // SAFETY: forwarded from the caller.
    unsafe { document_ref(document) }
        .map_or(POSITION_NONE, |d| pack_position(d.position_from_index(char_index)))
}

/// Character index of a packed position, clamped to the document.
///
/// # Safety
///
/// `document` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_document_index_from_position(
    document: *const Document,
    position: u64,
) -> usize {
    // SAFETY: forwarded from the caller.
    unsafe { document_ref(document) }
        .map_or(0, |d| d.index_from_position(unpack_position(position)))
}

// ---------------------------------------------------------------------------
// Editors
// ---------------------------------------------------------------------------

/// Measurer forwarding to host callbacks.
struct CallbackMeasurer {
    measure: MeasureTextFn,
    line_height: LineHeightFn,
    user_data: *mut c_void,
}

impl TextMeasurer for CallbackMeasurer {
    fn measure_width(&self, text: &str, style_id: u32) -> f32 {
        let units: Vec<u16> = text.encode_utf16().collect();
        let width = (self.measure)(units.as_ptr(), units.len(), style_id, self.user_data);
        if width.is_finite() { width.max(0.0) } else { 0.0 }
    }

    fn line_height(&self) -> f32 {
        let height = (self.line_height)(self.user_data);
        if height.is_finite() { height.max(0.0) } else { 0.0 }
    }
}

/// Opaque editor handle.
pub struct EditorHandle {
    engine: EditorEngine,
    clock: Instant,
}

impl EditorHandle {
    fn now_ms(&self) -> i64 {
        self.clock.elapsed().as_millis().min(i64::MAX as u128) as i64
    }
}

fn into_editor_handle(engine: EditorEngine) -> *mut EditorHandle {
    Box::into_raw(Box::new(EditorHandle {
        engine,
        clock: Instant::now(),
    }))
}

/// Create an editor with the given touch thresholds and host measurer.
///
/// Returns null when the thresholds are invalid (negative or non-finite).
///
/// # Safety
///
/// `user_data` is passed back to the callbacks untouched and must stay valid for as long as
/// the editor lives. The callbacks are invoked on the thread calling into the editor.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_new(
    touch_slop: f32,
    double_tap_timeout_ms: i64,
    measure: MeasureTextFn,
    line_height: LineHeightFn,
    user_data: *mut c_void,
) -> *mut EditorHandle {
    let config = EditorConfig {
        touch: TouchConfig::new(touch_slop, double_tap_timeout_ms),
        ..EditorConfig::default()
    };
    new_editor(config, measure, line_height, user_data)
}

/// Create an editor from a JSON configuration (see [`EditorConfig::from_json`]).
///
/// Returns null when the configuration does not parse or validate.
///
/// # Safety
///
/// `config_json` must be null or a valid NUL-terminated string. `user_data` follows the
/// rules of [`editor_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_new_with_config(
    config_json: *const c_char,
    measure: MeasureTextFn,
    line_height: LineHeightFn,
    user_data: *mut c_void,
) -> *mut EditorHandle {
    let config = if config_json.is_null() {
        EditorConfig::default()
    } else {
        // SAFETY: the caller guarantees a NUL-terminated string.
        let text = unsafe { CStr::from_ptr(config_json) }.to_string_lossy();
        match EditorConfig::from_json(&text) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "rejected editor configuration");
                return ptr::null_mut();
            }
        }
    };
    new_editor(config, measure, line_height, user_data)
}

fn new_editor(
    config: EditorConfig,
    measure: MeasureTextFn,
    line_height: LineHeightFn,
    user_data: *mut c_void,
) -> *mut EditorHandle {
    let measurer = CallbackMeasurer {
        measure,
        line_height,
        user_data,
    };
    match EditorEngine::new(config, Box::new(measurer)) {
        Ok(engine) => into_editor_handle(engine),
        Err(err) => {
            warn!(%err, "failed to create editor");
            ptr::null_mut()
        }
    }
}

/// Free an editor and the document it holds.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_free(editor: *mut EditorHandle) {
    if !editor.is_null() {
        // SAFETY: the handle came from `Box::into_raw` and is freed exactly once.
        drop(unsafe { Box::from_raw(editor) });
    }
}

unsafe fn editor_mut<'a>(editor: *mut EditorHandle) -> Option<&'a mut EditorHandle> {
    // SAFETY: forwarded from the caller.
    let editor = unsafe { editor.as_mut() };
    if editor.is_none() {
        warn!("null editor handle");
    }
    editor
}

/// Update the viewport size.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_set_viewport(editor: *mut EditorHandle, width: f32, height: f32) {
    // SAFETY: forwarded from the caller.
    if let Some(editor) = unsafe { editor_mut(editor) } {
        editor.engine.set_viewport(Viewport::new(width, height));
    }
}

/// Hand a document to the editor, which takes ownership; the handle must not be used again.
/// The previously loaded document is freed. Passing null unloads the current document.
///
/// # Safety
///
/// `editor` must be null or a live editor handle. `document` must be null or a live document
/// handle not owned by any editor.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_set_document(editor: *mut EditorHandle, document: *mut Document) {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        // SAFETY: ownership was transferred to us; free it rather than leak.
        unsafe { editor_document_free(document) };
        return;
    };
    if document.is_null() {
        editor.engine.release_document();
        return;
    }
    // SAFETY: the handle came from `Box::into_raw`; ownership moves into the engine.
    let document = unsafe { Box::from_raw(document) };
    editor.engine.load_document(*document);
}

/// Take the loaded document back as a handle the caller owns, or null when none is loaded.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_release_document(editor: *mut EditorHandle) -> *mut Document {
    // SAFETY: forwarded from the caller.
    unsafe { editor_mut(editor) }
        .and_then(|editor| editor.engine.release_document())
        .map_or(ptr::null_mut(), into_document_handle)
}

/// Milliseconds on the editor's clock, the time base of [`editor_handle_gesture`].
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_now_ms(editor: *mut EditorHandle) -> i64 {
    // SAFETY: forwarded from the caller.
    unsafe { editor_mut(editor) }.map_or(0, |editor| editor.now_ms())
}

/// Reject output buffers that cannot hold every result, before any state changes.
fn result_buffer_ok(out: *mut u8, out_len: usize) -> bool {
    if out.is_null() || out_len < wire::MAX_RESULT_LEN {
        warn!(
            needed = wire::MAX_RESULT_LEN,
            available = out_len,
            "gesture result buffer too small"
        );
        return false;
    }
    true
}

/// Encode `result` into a buffer accepted by [`result_buffer_ok`], returning the bytes written.
unsafe fn write_result(result: &GestureResult, out: *mut u8) -> usize {
    let encoded = wire::encode_result(result);
    // SAFETY: `out` holds at least `MAX_RESULT_LEN >= encoded.len()` bytes.
    unsafe { ptr::copy_nonoverlapping(encoded.as_ptr(), out, encoded.len()) };
    encoded.len()
}

fn dispatch(editor: &mut EditorHandle, event: &GestureEvent) -> GestureResult {
    let result = editor.engine.handle_gesture_event(event);
    editor.engine.apply_gesture(&result);
    result
}

/// Feed one raw gesture frame, stamped with the editor clock, and apply the result.
///
/// `points` holds `point_count` `(x, y)` pairs. The encoded result is written into `out`,
/// which must hold at least [`wire::MAX_RESULT_LEN`] bytes; the return value is its length. A
/// zero return means the call was rejected and the editor is unchanged.
///
/// # Safety
///
/// `editor` must be null or a live handle. `points` must be valid for `2 * point_count`
/// floats (or null with a zero count). `out` must be valid for writes of `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_handle_gesture(
    editor: *mut EditorHandle,
    kind: u32,
    points: *const f32,
    point_count: usize,
    out: *mut u8,
    out_len: usize,
) -> usize {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        return 0;
    };
    if !result_buffer_ok(out, out_len) {
        return 0;
    }
    let coords: &[f32] = if points.is_null() {
        &[]
    } else {
        // SAFETY: the caller guarantees `2 * point_count` readable floats.
        unsafe { slice::from_raw_parts(points, point_count.saturating_mul(2)) }
    };
    let event = GestureEvent::from_coords(EventKind::from_code(kind), coords, editor.now_ms());
    let result = dispatch(editor, &event);
    // SAFETY: forwarded from the caller.
    unsafe { write_result(&result, out) }
}

/// Feed one gesture frame in the binary layout of [`wire::decode_event`], host-stamped with
/// `time_ms`, and apply the result. Returns the encoded result length. Zero means a malformed
/// frame or an output buffer shorter than [`wire::MAX_RESULT_LEN`]; the editor is unchanged.
///
/// # Safety
///
/// `editor` must be null or a live handle. `frame` must be valid for `frame_len` bytes and
/// `out` for writes of `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_handle_gesture_frame(
    editor: *mut EditorHandle,
    frame: *const u8,
    frame_len: usize,
    time_ms: i64,
    out: *mut u8,
    out_len: usize,
) -> usize {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        return 0;
    };
    if !result_buffer_ok(out, out_len) {
        return 0;
    }
    if frame.is_null() {
        warn!("null gesture frame");
        return 0;
    }
    // SAFETY: the caller guarantees `frame_len` readable bytes.
    let bytes = unsafe { slice::from_raw_parts(frame, frame_len) };
    let event = match wire::decode_event(bytes, time_ms) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, "malformed gesture frame");
            return 0;
        }
    };
    let result = dispatch(editor, &event);
    // SAFETY: forwarded from the caller.
    unsafe { write_result(&result, out) }
}

/// Fire a pending long press once its delay has elapsed at `time_ms`, and apply it.
///
/// Pass a negative `time_ms` to use the editor clock. Returns the encoded result length, or zero
/// with the editor unchanged when `out` is shorter than [`wire::MAX_RESULT_LEN`].
///
/// # Safety
///
/// `editor` must be null or a live handle. `out` must be valid for writes of `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_poll_long_press(
    editor: *mut EditorHandle,
    time_ms: i64,
    out: *mut u8,
    out_len: usize,
) -> usize {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        return 0;
    };
    if !result_buffer_ok(out, out_len) {
        return 0;
    }
    let now = if time_ms < 0 { editor.now_ms() } else { time_ms };
    let result = editor.engine.poll_long_press(now);
    editor.engine.apply_gesture(&result);
    // SAFETY: forwarded from the caller.
    unsafe { write_result(&result, out) }
}

/// Drop every cached measurement; call after the host changes fonts.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_reset_measurer(editor: *mut EditorHandle) {
    // SAFETY: forwarded from the caller.
    if let Some(editor) = unsafe { editor_mut(editor) } {
        editor.engine.reset_measurer();
    }
}

/// Move the caret to a packed position, clamped to the document.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_set_cursor(editor: *mut EditorHandle, position: u64) {
    // SAFETY: forwarded from the caller.
    if let Some(editor) = unsafe { editor_mut(editor) } {
        editor.engine.set_cursor(unpack_position(position));
    }
}

/// Packed caret position, [`POSITION_NONE`] without a document.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_cursor(editor: *mut EditorHandle) -> u64 {
    // SAFETY: forwarded from the caller.
    unsafe { editor_mut(editor) }
        .map_or(POSITION_NONE, |editor| pack_position(editor.engine.cursor()))
}

/// Render model of the current frame as JSON. Free the result with
/// [`editor_engine_string_free`].
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_build_render_model(editor: *mut EditorHandle) -> *mut c_char {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        return ptr::null_mut();
    };
    let model = editor.engine.build_render_model();
    match v1::to_json(&model) {
        Ok(json) => into_c_string(&json),
        Err(err) => {
            warn!(%err, "failed to serialize render model");
            ptr::null_mut()
        }
    }
}

/// Text of a run from the latest render model, or null for an unknown id.
///
/// # Safety
///
/// `editor` must be null or a live handle from this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn editor_visual_run_text(
    editor: *mut EditorHandle,
    text_id: i64,
) -> *mut c_char {
    // SAFETY: forwarded from the caller.
    let Some(editor) = (unsafe { editor_mut(editor) }) else {
        return ptr::null_mut();
    };
    match editor.engine.visual_run_text(text_id) {
        Some(text) => into_c_string(text),
        None => {
            warn!(text_id, "unknown visual run text id");
            ptr::null_mut()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use editor_engine::PointF;
    use serde_json::Value;

    extern "C" fn measure_ten(_text: *const u16, len: usize, _: u32, _: *mut c_void) -> f32 {
        len as f32 * 10.0
    }

    extern "C" fn height_twenty(_data: *mut c_void) -> f32 {
        20.0
    }

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
        unsafe { editor_engine_string_free(ptr) };
        text
    }

    fn frame(kind: EventKind, at: (f32, f32)) -> Vec<u8> {
        let event = GestureEvent::new(kind, vec![PointF::new(at.0, at.1)], 0);
        wire::encode_event(&event).to_vec()
    }

    fn new_test_editor() -> *mut EditorHandle {
        let editor = unsafe { editor_new(10.0, 300, measure_ten, height_twenty, ptr::null_mut()) };
        assert!(!editor.is_null());
        unsafe { editor_set_viewport(editor, 400.0, 300.0) };
        editor
    }

    #[test]
    fn test_position_packing() {
        let position = TextPosition::new(3, 17);
        assert_eq!(pack_position(position), (3 << 32) | 17);
        assert_eq!(unpack_position(pack_position(position)), position);
        assert_eq!(pack_position(TextPosition::NONE), POSITION_NONE);
        assert!(unpack_position(POSITION_NONE).is_none());
    }

    #[test]
    fn test_document_queries() {
        let units: Vec<u16> = "AAAABBB\njhhuihii".encode_utf16().collect();
        let doc = unsafe { editor_document_from_utf16(units.as_ptr(), units.len()) };
        unsafe {
            assert_eq!(editor_document_line_count(doc), 2);
            assert_eq!(take_string(editor_document_line_text(doc, 1)), "jhhuihii");
            assert!(editor_document_line_text(doc, 2).is_null());
            assert_eq!(take_string(editor_document_text(doc)), "AAAABBB\njhhuihii");
            assert_eq!(
                unpack_position(editor_document_position_from_index(doc, 8)),
                TextPosition::new(1, 0)
            );
            assert_eq!(editor_document_index_from_position(doc, (1 << 32) | 3), 11);
            editor_document_free(doc);
        }
    }

    #[test]
    fn test_null_handles_are_harmless() {
        unsafe {
            assert_eq!(editor_document_line_count(ptr::null()), 0);
            assert!(editor_document_text(ptr::null()).is_null());
            assert!(editor_document_from_file(ptr::null()).is_null());
            assert!(editor_build_render_model(ptr::null_mut()).is_null());
            assert_eq!(editor_cursor(ptr::null_mut()), POSITION_NONE);
            editor_set_viewport(ptr::null_mut(), 1.0, 1.0);
            editor_free(ptr::null_mut());
            editor_engine_string_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_invalid_thresholds_yield_null_editor() {
        let editor = unsafe { editor_new(-1.0, 300, measure_ten, height_twenty, ptr::null_mut()) };
        assert!(editor.is_null());

        let json = CString::new(r#"{"layout":{"tab_size":0}}"#).unwrap();
        let editor = unsafe {
            editor_new_with_config(json.as_ptr(), measure_ten, height_twenty, ptr::null_mut())
        };
        assert!(editor.is_null());
    }

    #[test]
    fn test_tap_frames_move_cursor() {
        let editor = new_test_editor();
        let text = "AAAABBB\njhhuihii";
        unsafe {
            let doc = editor_document_from_utf8(text.as_ptr(), text.len());
            editor_set_document(editor, doc);

            let mut out = [0u8; wire::MAX_RESULT_LEN];
            let down = frame(EventKind::Down, (52.0, 30.0));
            let written = editor_handle_gesture_frame(
                editor,
                down.as_ptr(),
                down.len(),
                0,
                out.as_mut_ptr(),
                out.len(),
            );
            assert_eq!(
                wire::decode_result(&out[..written]).unwrap(),
                GestureResult::Undefined
            );

            let up = frame(EventKind::Up, (52.0, 30.0));
            let written = editor_handle_gesture_frame(
                editor,
                up.as_ptr(),
                up.len(),
                80,
                out.as_mut_ptr(),
                out.len(),
            );
            assert_eq!(
                wire::decode_result(&out[..written]).unwrap(),
                GestureResult::Tap(PointF::new(52.0, 30.0))
            );
            assert_eq!(unpack_position(editor_cursor(editor)), TextPosition::new(1, 5));

            let json = take_string(editor_build_render_model(editor));
            let model: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(model["cursor"]["position"]["x"], 50.0);
            let id = model["lines"][0]["runs"][0]["text_id"].as_i64().unwrap();
            assert_eq!(take_string(editor_visual_run_text(editor, id)), "AAAABBB");

            editor_free(editor);
        }
    }

    #[test]
    fn test_malformed_frame_writes_nothing() {
        let editor = new_test_editor();
        unsafe {
            let mut out = [0u8; wire::MAX_RESULT_LEN];
            let down = frame(EventKind::Down, (1.0, 1.0));
            let len = out.len();
            let written =
                editor_handle_gesture_frame(editor, down.as_ptr(), 3, 0, out.as_mut_ptr(), len);
            assert_eq!(written, 0);
            editor_free(editor);
        }
    }

    #[test]
    fn test_short_buffer_leaves_editor_unchanged() {
        let editor = new_test_editor();
        let text = "hello\nworld";
        unsafe {
            editor_set_document(editor, editor_document_from_utf8(text.as_ptr(), text.len()));
            let points = [31.0f32, 22.0];
            let down = EventKind::Down.code();
            let up = EventKind::Up.code();

            // Even an Undefined result is refused when the buffer could not hold a Tap.
            let mut short = [0u8; 4];
            for kind in [down, up] {
                let written =
                    editor_handle_gesture(editor, kind, points.as_ptr(), 1, short.as_mut_ptr(), 4);
                assert_eq!(written, 0);
            }
            let frame_up = frame(EventKind::Up, (31.0, 22.0));
            let len = frame_up.len();
            let buf = short.as_mut_ptr();
            let written = editor_handle_gesture_frame(editor, frame_up.as_ptr(), len, 50, buf, 4);
            assert_eq!(written, 0);
            assert_eq!(editor_poll_long_press(editor, 10_000, short.as_mut_ptr(), 4), 0);
            assert_eq!(unpack_position(editor_cursor(editor)), TextPosition::new(0, 0));

            // Nothing reached the recognizer, so a full-size buffer starts a fresh tap.
            let mut out = [0u8; wire::MAX_RESULT_LEN];
            let len = out.len();
            editor_handle_gesture(editor, down, points.as_ptr(), 1, out.as_mut_ptr(), len);
            let written =
                editor_handle_gesture(editor, up, points.as_ptr(), 1, out.as_mut_ptr(), len);
            assert_eq!(
                wire::decode_result(&out[..written]).unwrap(),
                GestureResult::Tap(PointF::new(31.0, 22.0))
            );
            assert_eq!(unpack_position(editor_cursor(editor)), TextPosition::new(1, 3));
            editor_free(editor);
        }
    }

    #[test]
    fn test_long_press_poll_and_document_release() {
        let editor = new_test_editor();
        let text = "hello";
        unsafe {
            editor_set_document(editor, editor_document_from_utf8(text.as_ptr(), text.len()));
            let mut out = [0u8; wire::MAX_RESULT_LEN];
            let down = frame(EventKind::Down, (21.0, 5.0));
            editor_handle_gesture_frame(editor, down.as_ptr(), down.len(), 0, out.as_mut_ptr(), 12);
            let written = editor_poll_long_press(editor, 600, out.as_mut_ptr(), out.len());
            assert_eq!(
                wire::decode_result(&out[..written]).unwrap(),
                GestureResult::LongPress(PointF::new(21.0, 5.0))
            );
            assert_eq!(unpack_position(editor_cursor(editor)), TextPosition::new(0, 2));

            let doc = editor_release_document(editor);
            assert!(!doc.is_null());
            assert_eq!(take_string(editor_document_text(doc)), "hello");
            assert!(editor_release_document(editor).is_null());
            assert_eq!(editor_cursor(editor), POSITION_NONE);
            editor_document_free(doc);
            editor_free(editor);
        }
    }
}
