//! Fixed binary layouts for crossing a language boundary.
//!
//! Every field is 4 bytes in native byte order.
//!
//! Gesture frame: `[kind: u32][pointer_count: u32]` followed by `pointer_count` pairs of
//! `[x: f32][y: f32]`.
//!
//! Gesture result: `[tag: u32]` followed by the payload. Tap, double tap, long press, scroll and
//! fast scroll carry two `f32` (point or delta), scale carries one, undefined carries none.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;
use crate::gesture::{EventKind, GestureEvent, GestureResult, GestureType};
use crate::position::PointF;

/// Largest encoded gesture result, in bytes.
pub const MAX_RESULT_LEN: usize = 12;

const FIELD: usize = 4;

fn ensure(buf: &[u8], needed: usize) -> Result<(), WireError> {
    if buf.len() < needed {
        return Err(WireError::Truncated {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Decode a gesture frame. The host clock reading is attached as `time_ms`.
///
/// Bytes after the declared pointers are ignored.
pub fn decode_event(mut buf: &[u8], time_ms: i64) -> Result<GestureEvent, WireError> {
    ensure(buf, 2 * FIELD)?;
    let kind = EventKind::from_code(buf.get_u32_ne());
    let count = buf.get_u32_ne() as usize;
    ensure(buf, count.saturating_mul(2 * FIELD))?;

    let points = (0..count)
        .map(|_| {
            let x = buf.get_f32_ne();
            let y = buf.get_f32_ne();
            PointF::new(x, y)
        })
        .collect();
    Ok(GestureEvent::new(kind, points, time_ms))
}

/// Encode a gesture frame. The timestamp is not part of the layout.
pub fn encode_event(event: &GestureEvent) -> Bytes {
    let mut buf = BytesMut::with_capacity(2 * FIELD + event.points.len() * 2 * FIELD);
    buf.put_u32_ne(event.kind.code());
    buf.put_u32_ne(event.points.len() as u32);
    for point in &event.points {
        buf.put_f32_ne(point.x);
        buf.put_f32_ne(point.y);
    }
    buf.freeze()
}

/// Append an encoded gesture result to `buf`.
pub fn put_result(buf: &mut impl BufMut, result: &GestureResult) {
    buf.put_u32_ne(result.gesture_type().code());
    match *result {
        GestureResult::Undefined => {}
        GestureResult::Tap(p) | GestureResult::DoubleTap(p) | GestureResult::LongPress(p) => {
            buf.put_f32_ne(p.x);
            buf.put_f32_ne(p.y);
        }
        GestureResult::Scale(factor) => buf.put_f32_ne(factor),
        GestureResult::Scroll { dx, dy } | GestureResult::FastScroll { dx, dy } => {
            buf.put_f32_ne(dx);
            buf.put_f32_ne(dy);
        }
    }
}

/// Encode a gesture result.
pub fn encode_result(result: &GestureResult) -> Bytes {
    let mut buf = BytesMut::with_capacity(MAX_RESULT_LEN);
    put_result(&mut buf, result);
    buf.freeze()
}

/// Decode a gesture result.
pub fn decode_result(mut buf: &[u8]) -> Result<GestureResult, WireError> {
    ensure(buf, FIELD)?;
    let tag = buf.get_u32_ne();
    let kind = GestureType::from_code(tag).ok_or(WireError::UnknownTag(tag))?;

    let pair = |buf: &mut &[u8]| -> Result<(f32, f32), WireError> {
        ensure(buf, 2 * FIELD)?;
        Ok((buf.get_f32_ne(), buf.get_f32_ne()))
    };
    Ok(match kind {
        GestureType::Undefined => GestureResult::Undefined,
        GestureType::Tap => {
            let (x, y) = pair(&mut buf)?;
            GestureResult::Tap(PointF::new(x, y))
        }
        GestureType::DoubleTap => {
            let (x, y) = pair(&mut buf)?;
            GestureResult::DoubleTap(PointF::new(x, y))
        }
        GestureType::LongPress => {
            let (x, y) = pair(&mut buf)?;
            GestureResult::LongPress(PointF::new(x, y))
        }
        GestureType::Scale => {
            ensure(buf, FIELD)?;
            GestureResult::Scale(buf.get_f32_ne())
        }
        GestureType::Scroll => {
            let (dx, dy) = pair(&mut buf)?;
            GestureResult::Scroll { dx, dy }
        }
        GestureType::FastScroll => {
            let (dx, dy) = pair(&mut buf)?;
            GestureResult::FastScroll { dx, dy }
        }
    })
}
