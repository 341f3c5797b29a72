//! Pointer gesture recognition.
//!
//! [`GestureRecognizer`] consumes pointer frames and classifies each one into exactly one
//! [`GestureResult`]. Frames carry their own timestamp, so the recognizer is a pure function of
//! its stored state and the incoming frame: replaying the same frames yields the same results.
//!
//! # Example
//!
//! ```rust
//! use editor_engine::{
//!     EventKind, GestureEvent, GestureRecognizer, GestureResult, PointF, TouchConfig,
//! };
//!
//! let mut recognizer = GestureRecognizer::new(TouchConfig::default());
//! let at = PointF::new(40.0, 12.0);
//!
//! recognizer.handle_event(&GestureEvent::new(EventKind::Down, vec![at], 0));
//! let result = recognizer.handle_event(&GestureEvent::new(EventKind::Up, vec![at], 80));
//! assert_eq!(result, GestureResult::Tap(at));
//! ```

use tracing::trace;

use crate::config::TouchConfig;
use crate::position::PointF;

/// Kind of a pointer frame, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Anything the host could not map.
    Undefined,
    /// First pointer pressed.
    Down,
    /// An additional pointer pressed.
    PointerDown,
    /// One or more pointers moved.
    Move,
    /// A non-final pointer lifted.
    PointerUp,
    /// Final pointer lifted.
    Up,
    /// The host aborted the pointer sequence.
    Cancel,
    /// A mouse button press, classified immediately as a click.
    MouseDown,
}

impl EventKind {
    /// Decode the numeric code used at the FFI boundary. Unknown codes map to `Undefined`.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Down,
            2 => Self::PointerDown,
            3 => Self::Move,
            4 => Self::PointerUp,
            5 => Self::Up,
            6 => Self::Cancel,
            7 => Self::MouseDown,
            _ => Self::Undefined,
        }
    }

    /// Numeric code used at the FFI boundary.
    pub fn code(self) -> u32 {
        match self {
            Self::Undefined => 0,
            Self::Down => 1,
            Self::PointerDown => 2,
            Self::Move => 3,
            Self::PointerUp => 4,
            Self::Up => 5,
            Self::Cancel => 6,
            Self::MouseDown => 7,
        }
    }
}

/// One pointer frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    /// Frame kind.
    pub kind: EventKind,
    /// Every pointer present when the frame fired, in host order. For `PointerUp` this still
    /// includes the pointer being lifted.
    pub points: Vec<PointF>,
    /// Host timestamp in milliseconds, from a monotonic clock.
    pub time_ms: i64,
}

impl GestureEvent {
    /// Create a frame.
    pub fn new(kind: EventKind, points: Vec<PointF>, time_ms: i64) -> Self {
        Self {
            kind,
            points,
            time_ms,
        }
    }

    /// Create a frame from interleaved `x0, y0, x1, y1, ...` coordinates.
    ///
    /// A trailing odd coordinate is ignored.
    pub fn from_coords(kind: EventKind, coords: &[f32], time_ms: i64) -> Self {
        let points = coords
            .chunks_exact(2)
            .map(|pair| PointF::new(pair[0], pair[1]))
            .collect();
        Self::new(kind, points, time_ms)
    }
}

/// Result type tag, as used in the fixed binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureType {
    /// No gesture.
    Undefined,
    /// Single tap.
    Tap,
    /// Second tap of a pair.
    DoubleTap,
    /// Stationary hold.
    LongPress,
    /// Pinch zoom.
    Scale,
    /// Incremental scroll.
    Scroll,
    /// Flick-speed scroll.
    FastScroll,
}

impl GestureType {
    /// Numeric tag.
    pub fn code(self) -> u32 {
        match self {
            Self::Undefined => 0,
            Self::Tap => 1,
            Self::DoubleTap => 2,
            Self::LongPress => 3,
            Self::Scale => 4,
            Self::Scroll => 5,
            Self::FastScroll => 6,
        }
    }

    /// Decode a numeric tag.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Undefined,
            1 => Self::Tap,
            2 => Self::DoubleTap,
            3 => Self::LongPress,
            4 => Self::Scale,
            5 => Self::Scroll,
            6 => Self::FastScroll,
            _ => return None,
        })
    }
}

/// Classified gesture for one frame.
///
/// Scroll deltas are in viewport-offset space: adding them to the current scroll offset moves the
/// content with the finger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureResult {
    /// No gesture, or a frame that only updated internal state.
    #[default]
    Undefined,
    /// Single tap at a point.
    Tap(PointF),
    /// Second tap of a pair at a point.
    DoubleTap(PointF),
    /// Long press at a point.
    LongPress(PointF),
    /// Pinch with the given ratio to the initial pointer distance.
    Scale(f32),
    /// Incremental scroll since the previous frame.
    Scroll {
        /// Horizontal offset delta.
        dx: f32,
        /// Vertical offset delta.
        dy: f32,
    },
    /// Incremental scroll above the fast-scroll velocity.
    FastScroll {
        /// Horizontal offset delta.
        dx: f32,
        /// Vertical offset delta.
        dy: f32,
    },
}

impl GestureResult {
    /// Type tag of this result.
    pub fn gesture_type(&self) -> GestureType {
        match self {
            Self::Undefined => GestureType::Undefined,
            Self::Tap(_) => GestureType::Tap,
            Self::DoubleTap(_) => GestureType::DoubleTap,
            Self::LongPress(_) => GestureType::LongPress,
            Self::Scale(_) => GestureType::Scale,
            Self::Scroll { .. } => GestureType::Scroll,
            Self::FastScroll { .. } => GestureType::FastScroll,
        }
    }

    /// Returns `true` for [`GestureResult::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Scale factor, `1.0` unless this is a `Scale` result.
    pub fn scale(&self) -> f32 {
        match self {
            Self::Scale(factor) => *factor,
            _ => 1.0,
        }
    }

    /// Scroll delta, `(0.0, 0.0)` unless this is a scroll result.
    pub fn scroll_delta(&self) -> (f32, f32) {
        match self {
            Self::Scroll { dx, dy } | Self::FastScroll { dx, dy } => (*dx, *dy),
            _ => (0.0, 0.0),
        }
    }

    /// Point of a tap-like result.
    pub fn point(&self) -> Option<PointF> {
        match self {
            Self::Tap(p) | Self::DoubleTap(p) | Self::LongPress(p) => Some(*p),
            _ => None,
        }
    }
}

/// Observable recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Nothing tracked.
    Idle,
    /// One pointer down.
    Tracking1,
    /// Two or more pointers down.
    TrackingMulti,
    /// The long-press deadline elapsed; classification is frozen until release.
    PossibleLongPress,
    /// A tap was emitted and may become the first half of a double tap.
    PossibleDoubleTap,
}

#[derive(Debug, Clone, Copy)]
struct TapRecord {
    point: PointF,
    time_ms: i64,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    anchor: PointF,
    last: PointF,
    last_time_ms: i64,
    long_press_deadline: Option<i64>,
    scrolling: bool,
    tap_eligible: bool,
    /// Set after a pinch ends: the next move re-anchors instead of scrolling.
    needs_anchor: bool,
}

impl Press {
    fn new(point: PointF, time_ms: i64, long_press_timeout_ms: i64) -> Self {
        Self {
            anchor: point,
            last: point,
            last_time_ms: time_ms,
            long_press_deadline: Some(time_ms.saturating_add(long_press_timeout_ms)),
            scrolling: false,
            tap_eligible: true,
            needs_anchor: false,
        }
    }

    fn after_pinch(time_ms: i64) -> Self {
        Self {
            anchor: PointF::default(),
            last: PointF::default(),
            last_time_ms: time_ms,
            long_press_deadline: None,
            scrolling: true,
            tap_eligible: false,
            needs_anchor: true,
        }
    }

    fn long_press_due(&self, now_ms: i64) -> bool {
        !self.scrolling
            && self.tap_eligible
            && self
                .long_press_deadline
                .is_some_and(|deadline| now_ms >= deadline)
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    PossibleDoubleTap(TapRecord),
    Tracking1 {
        press: Press,
        candidate: Option<TapRecord>,
    },
    TrackingMulti {
        /// `None` until a usable distance between pointers 0 and 1 is known.
        base_distance: Option<f32>,
    },
    PossibleLongPress,
}

/// Pointer gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: TouchConfig,
    phase: Phase,
}

impl GestureRecognizer {
    /// Create a recognizer in the `Idle` state.
    pub fn new(config: TouchConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> GestureState {
        match self.phase {
            Phase::Idle => GestureState::Idle,
            Phase::PossibleDoubleTap(_) => GestureState::PossibleDoubleTap,
            Phase::Tracking1 { .. } => GestureState::Tracking1,
            Phase::TrackingMulti { .. } => GestureState::TrackingMulti,
            Phase::PossibleLongPress => GestureState::PossibleLongPress,
        }
    }

    /// Drop all tracking state and any pending tap.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Classify one frame.
    pub fn handle_event(&mut self, event: &GestureEvent) -> GestureResult {
        let result = match event.kind {
            EventKind::Cancel => {
                self.phase = Phase::Idle;
                GestureResult::Undefined
            }
            EventKind::Undefined => GestureResult::Undefined,
            _ if event.points.is_empty() => GestureResult::Undefined,
            EventKind::Down => self.on_down(event),
            EventKind::PointerDown => self.on_pointer_down(event),
            EventKind::Move => self.on_move(event),
            EventKind::PointerUp => self.on_pointer_up(event),
            EventKind::Up => self.on_up(event),
            EventKind::MouseDown => self.on_mouse_down(event),
        };
        trace!(kind = ?event.kind, state = ?self.state(), ?result, "gesture frame");
        result
    }

    /// Advance timers without a frame.
    ///
    /// Hosts call this from a timer while a pointer is held so a long press fires even when no
    /// move frames arrive. It also expires a stale double-tap candidate.
    pub fn poll(&mut self, now_ms: i64) -> GestureResult {
        let long_press_due = matches!(
            &self.phase,
            Phase::Tracking1 { press, .. } if press.long_press_due(now_ms)
        );
        if long_press_due {
            return self.fire_long_press();
        }
        if let Phase::PossibleDoubleTap(tap) = self.phase
            && now_ms.saturating_sub(tap.time_ms) > self.config.double_tap_timeout_ms
        {
            self.phase = Phase::Idle;
        }
        GestureResult::Undefined
    }

    fn on_down(&mut self, event: &GestureEvent) -> GestureResult {
        let candidate = match self.phase {
            Phase::PossibleDoubleTap(tap) => Some(tap),
            Phase::Tracking1 { candidate, .. } => candidate,
            _ => None,
        };
        self.phase = Phase::Tracking1 {
            press: Press::new(
                event.points[0],
                event.time_ms,
                self.config.long_press_timeout_ms,
            ),
            candidate,
        };
        GestureResult::Undefined
    }

    fn on_pointer_down(&mut self, event: &GestureEvent) -> GestureResult {
        match self.phase {
            // Frozen until release; extra pointers never restart scaling.
            Phase::PossibleLongPress | Phase::TrackingMulti { .. } => {}
            _ if event.points.len() >= 2 => {
                let distance = event.points[0].distance(&event.points[1]);
                self.phase = Phase::TrackingMulti {
                    base_distance: (distance > 0.0).then_some(distance),
                };
            }
            _ => {}
        }
        GestureResult::Undefined
    }

    fn on_move(&mut self, event: &GestureEvent) -> GestureResult {
        let now = event.time_ms;
        let long_press_due = matches!(
            &self.phase,
            Phase::Tracking1 { press, .. } if press.long_press_due(now)
        );
        if long_press_due {
            return self.fire_long_press();
        }

        let slop = self.config.touch_slop;
        let fast_velocity = self.config.fast_scroll_velocity;
        match &mut self.phase {
            Phase::Tracking1 { press, .. } => {
                let current = event.points[0];
                if press.needs_anchor {
                    press.anchor = current;
                    press.last = current;
                    press.last_time_ms = now;
                    press.needs_anchor = false;
                    return GestureResult::Undefined;
                }
                if !press.scrolling {
                    if press.anchor.distance(&current) <= slop {
                        press.last = current;
                        press.last_time_ms = now;
                        return GestureResult::Undefined;
                    }
                    press.scrolling = true;
                    press.tap_eligible = false;
                    press.long_press_deadline = None;
                }

                let dx = press.last.x - current.x;
                let dy = press.last.y - current.y;
                let elapsed = now.saturating_sub(press.last_time_ms).max(1) as f32;
                let velocity = dx.hypot(dy) / elapsed;
                press.last = current;
                press.last_time_ms = now;

                if velocity > fast_velocity {
                    GestureResult::FastScroll { dx, dy }
                } else {
                    GestureResult::Scroll { dx, dy }
                }
            }
            Phase::TrackingMulti { base_distance } if event.points.len() >= 2 => {
                let distance = event.points[0].distance(&event.points[1]);
                match *base_distance {
                    Some(base) => GestureResult::Scale(distance / base),
                    None => {
                        *base_distance = (distance > 0.0).then_some(distance);
                        GestureResult::Undefined
                    }
                }
            }
            _ => GestureResult::Undefined,
        }
    }

    fn on_pointer_up(&mut self, event: &GestureEvent) -> GestureResult {
        if let Phase::TrackingMulti { base_distance } = &mut self.phase {
            let remaining = event.points.len().saturating_sub(1);
            if remaining < 2 {
                self.phase = Phase::Tracking1 {
                    press: Press::after_pinch(event.time_ms),
                    candidate: None,
                };
            } else {
                *base_distance = None;
            }
        }
        GestureResult::Undefined
    }

    fn on_up(&mut self, event: &GestureEvent) -> GestureResult {
        let now = event.time_ms;
        match self.phase {
            Phase::Tracking1 { press, candidate } => {
                self.phase = Phase::Idle;
                if press.scrolling || !press.tap_eligible {
                    return GestureResult::Undefined;
                }
                if press.long_press_due(now) {
                    return GestureResult::LongPress(press.anchor);
                }
                if press.anchor.distance(&event.points[0]) > self.config.touch_slop {
                    return GestureResult::Undefined;
                }
                self.classify_tap(press.anchor, now, candidate)
            }
            // A release without a tracked press leaves a pending tap untouched.
            Phase::PossibleDoubleTap(_) | Phase::Idle => GestureResult::Undefined,
            Phase::TrackingMulti { .. } | Phase::PossibleLongPress => {
                self.phase = Phase::Idle;
                GestureResult::Undefined
            }
        }
    }

    fn on_mouse_down(&mut self, event: &GestureEvent) -> GestureResult {
        let candidate = match self.phase {
            Phase::PossibleDoubleTap(tap) => Some(tap),
            _ => None,
        };
        self.classify_tap(event.points[0], event.time_ms, candidate)
    }

    fn classify_tap(
        &mut self,
        point: PointF,
        now_ms: i64,
        candidate: Option<TapRecord>,
    ) -> GestureResult {
        if let Some(previous) = candidate
            && now_ms.saturating_sub(previous.time_ms) <= self.config.double_tap_timeout_ms
            && point.distance(&previous.point) < self.config.touch_slop
        {
            self.phase = Phase::Idle;
            return GestureResult::DoubleTap(point);
        }
        self.phase = Phase::PossibleDoubleTap(TapRecord {
            point,
            time_ms: now_ms,
        });
        GestureResult::Tap(point)
    }

    fn fire_long_press(&mut self) -> GestureResult {
        let anchor = match self.phase {
            Phase::Tracking1 { press, .. } => press.anchor,
            _ => return GestureResult::Undefined,
        };
        self.phase = Phase::PossibleLongPress;
        GestureResult::LongPress(anchor)
    }
}
