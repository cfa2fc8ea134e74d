//! Gesture classification: taps, long presses, and pinches.
//!
//! Every timer here is a deadline rather than a host callback. The
//! controller asks for [`GestureClassifier::next_deadline`] and fires due
//! timers before it handles the event or frame that reveals them, so
//! classification only depends on event timestamps.
//!
//! A press starts as a *candidate*. It stays a tap as long as the pointer
//! has not moved past the movement threshold; a stationary touch that
//! outlives the long-press delay is promoted to a selection press instead.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::config::EngineConfig;
use crate::geom::Point;
use crate::input::Target;

// =============================================================================
// TAPS
// =============================================================================

/// Result of registering a completed tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LastTap {
    target: Target,
    time_ms: f64,
}

/// Remembers the previous tap long enough to recognise a double tap.
#[derive(Debug, Clone)]
pub struct TapTracker {
    delay_ms: f64,
    last: Option<LastTap>,
}

impl TapTracker {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, last: None }
    }

    /// Record a tap. A second tap on the same target inside the window is a
    /// double tap and clears the tracker, so a third tap starts over.
    pub fn register(&mut self, target: Target, now_ms: f64) -> TapKind {
        if let Some(last) = self.last {
            if last.target == target && now_ms - last.time_ms < self.delay_ms {
                self.last = None;
                return TapKind::Double;
            }
        }
        self.last = Some(LastTap { target, time_ms: now_ms });
        TapKind::Single
    }

    /// Forget the pending tap once its window has passed.
    pub fn expire(&mut self, now_ms: f64) -> bool {
        match self.deadline() {
            Some(deadline) if now_ms >= deadline => {
                self.last = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.last.map(|last| last.time_ms + self.delay_ms)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last.is_some()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// =============================================================================
// LONG PRESS
// =============================================================================

/// Single pending deadline for the touch long press.
#[derive(Debug, Clone)]
pub struct LongPressTimer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl LongPressTimer {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, deadline: None }
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn arm(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Consume the deadline if it has passed.
    pub fn fire_due(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// =============================================================================
// TOUCH POINTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub position: Point,
}

/// Active touch contacts in the order they went down.
///
/// The first two contacts define a pinch; any further contacts are tracked
/// so their up events are recognised, but otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct TouchPoints {
    points: Vec<TouchPoint>,
}

impl TouchPoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact, or move it if the id is already known.
    pub fn insert(&mut self, id: i32, position: Point) {
        if !self.update(id, position) {
            self.points.push(TouchPoint { id, position });
        }
    }

    /// Returns whether the id was known.
    pub fn update(&mut self, id: i32, position: Point) -> bool {
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(point) => {
                point.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i32) -> Option<TouchPoint> {
        let index = self.points.iter().position(|p| p.id == id)?;
        Some(self.points.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<TouchPoint> {
        self.points.iter().copied().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        self.points.iter().any(|p| p.id == id)
    }

    /// Whether this id is one of the two contacts that define a pinch.
    #[must_use]
    pub fn is_pinch_member(&self, id: i32) -> bool {
        self.points.iter().take(2).any(|p| p.id == id)
    }

    /// The two contacts that define a pinch.
    #[must_use]
    pub fn pair(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [a, b, ..] => Some((a.position, b.position)),
            _ => None,
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<TouchPoint> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

// =============================================================================
// PINCH
// =============================================================================

/// Outcome of one pinch distance sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinchSample {
    /// No pinch in progress.
    Inactive,
    /// Arrived inside the rate-limit interval.
    Skipped,
    /// Change smaller than the noise floor.
    BelowNoise { change: f64 },
    /// Change larger than the noise ceiling; discarded.
    Spike { change: f64 },
    /// Geometry produced a non-finite or non-positive factor.
    Degenerate,
    /// Multiply the scale by `factor`, anchored at `center` (screen space).
    Zoom { factor: f64, center: Point },
}

#[derive(Debug, Clone)]
pub struct PinchTracker {
    noise_floor: f64,
    noise_ceiling: f64,
    interval_ms: f64,
    last_distance: Option<f64>,
    last_sample_ms: f64,
}

impl PinchTracker {
    #[must_use]
    pub fn new(noise_floor: f64, noise_ceiling: f64, interval_ms: f64) -> Self {
        Self { noise_floor, noise_ceiling, interval_ms, last_distance: None, last_sample_ms: 0.0 }
    }

    /// Start a pinch with the initial finger distance.
    pub fn begin(&mut self, a: Point, b: Point, now_ms: f64) {
        let distance = a.distance(b);
        tracing::debug!(distance, "pinch started");
        self.last_distance = Some(distance);
        self.last_sample_ms = now_ms;
    }

    /// Returns whether a pinch was in progress.
    pub fn end(&mut self) -> bool {
        let was_active = self.last_distance.take().is_some();
        if was_active {
            tracing::debug!("pinch ended");
        }
        was_active
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.last_distance.is_some()
    }

    pub fn sample(&mut self, a: Point, b: Point, now_ms: f64) -> PinchSample {
        let Some(last) = self.last_distance else {
            return PinchSample::Inactive;
        };
        if now_ms - self.last_sample_ms < self.interval_ms {
            return PinchSample::Skipped;
        }
        self.last_sample_ms = now_ms;

        let distance = a.distance(b);
        let change = (distance - last).abs();
        if !change.is_finite() {
            tracing::warn!(distance, last, "dropping non-finite pinch distance");
            return PinchSample::Degenerate;
        }
        if change < self.noise_floor {
            return PinchSample::BelowNoise { change };
        }
        if change > self.noise_ceiling {
            tracing::debug!(distance, last, change, "discarding pinch spike");
            return PinchSample::Spike { change };
        }

        let factor = distance / last;
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(distance, last, "dropping degenerate pinch factor");
            return PinchSample::Degenerate;
        }
        self.last_distance = Some(distance);
        PinchSample::Zoom { factor, center: a.midpoint(b) }
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// How a press was routed when it went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    /// Primary mouse or pen button; owned by the selection engine.
    Primary,
    /// Secondary mouse button; pans, or opens a context menu if it never moves.
    Secondary,
    /// Single-finger touch; pans optimistically.
    Touch,
    /// A touch the long-press timer handed to the selection engine.
    LongPress,
}

/// A press that may still resolve to a tap or context request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Press {
    pub pointer_id: i32,
    /// Screen position at pointer-down.
    pub origin: Point,
    pub kind: PressKind,
    /// What was under the pointer at pointer-down.
    pub target: Target,
    /// Set once the pointer travels past the movement threshold.
    pub moved: bool,
}

/// Owns every per-surface gesture timer and the current press candidate.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    move_threshold: f64,
    pub taps: TapTracker,
    pub long_press: LongPressTimer,
    pub touches: TouchPoints,
    pub pinch: PinchTracker,
    press: Option<Press>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl GestureClassifier {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            move_threshold: config.touch_move_threshold_px,
            taps: TapTracker::new(config.double_tap_delay_ms),
            long_press: LongPressTimer::new(config.long_press_delay_ms),
            touches: TouchPoints::new(),
            pinch: PinchTracker::new(
                config.pinch_noise_floor_px,
                config.pinch_noise_ceiling_px,
                config.pinch_sample_interval_ms,
            ),
            press: None,
        }
    }

    /// Begin a press candidate. Touch presses arm the long-press timer.
    pub fn press(&mut self, pointer_id: i32, origin: Point, kind: PressKind, target: Target, now_ms: f64) {
        if kind == PressKind::Touch {
            self.long_press.arm(now_ms);
        }
        self.press = Some(Press { pointer_id, origin, kind, target, moved: false });
    }

    /// Track pointer travel. Returns true on the move that first crosses the
    /// threshold; that move also cancels a pending long press.
    pub fn track_move(&mut self, pointer_id: i32, position: Point) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        if press.pointer_id != pointer_id || press.moved {
            return false;
        }
        if press.origin.distance(position) <= self.move_threshold {
            return false;
        }
        press.moved = true;
        if self.long_press.cancel() {
            tracing::debug!(pointer_id, "touch moved, committed to pan");
        }
        true
    }

    /// Hand the current touch press to the selection engine.
    pub fn promote_long_press(&mut self) -> Option<Press> {
        let press = self.press.as_mut()?;
        if press.kind != PressKind::Touch || press.moved {
            return None;
        }
        press.kind = PressKind::LongPress;
        tracing::debug!(pointer_id = press.pointer_id, "long press");
        Some(*press)
    }

    /// Take the press candidate if it belongs to this pointer.
    pub fn release(&mut self, pointer_id: i32) -> Option<Press> {
        if self.press.is_some_and(|p| p.pointer_id == pointer_id) {
            self.long_press.cancel();
            return self.press.take();
        }
        None
    }

    /// Abandon the press candidate and its long-press timer, as when a
    /// second finger turns the gesture into a pinch.
    pub fn abandon_press(&mut self) {
        self.long_press.cancel();
        self.press = None;
    }

    #[must_use]
    pub fn current_press(&self) -> Option<Press> {
        self.press
    }

    /// The earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        match (self.long_press.deadline(), self.taps.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
