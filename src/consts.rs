//! Default tuning constants for the interaction engine.
//!
//! Every value here is the default for the matching [`crate::config::EngineConfig`]
//! field unless noted otherwise.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed scale factor.
pub const MIN_SCALE: f64 = 0.25;

/// Largest allowed scale factor.
pub const MAX_SCALE: f64 = 2.5;

/// Scale change per wheel-delta unit for a physical mouse wheel.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0012;

/// Scale change per wheel-delta unit for a trackpad pinch (ctrl + small deltas).
pub const TRACKPAD_ZOOM_SENSITIVITY: f64 = 0.028;

/// A ctrl-wheel event with `|dy|` below this is treated as a trackpad pinch.
pub const TRACKPAD_PINCH_MAX_DELTA: f64 = 10.0;

// ── Gestures ────────────────────────────────────────────────────

/// Window in which a second tap on the same target is a double tap.
pub const DOUBLE_TAP_DELAY_MS: f64 = 200.0;

/// Hold time after which a stationary touch turns into a selection press.
pub const LONG_PRESS_DELAY_MS: f64 = 250.0;

/// Movement in screen pixels beyond which a press is no longer a tap.
pub const TOUCH_MOVE_THRESHOLD_PX: f64 = 5.0;

/// Pinch distance changes smaller than this are jitter.
pub const PINCH_NOISE_FLOOR_PX: f64 = 5.0;

/// Pinch distance changes larger than this are sensor spikes.
pub const PINCH_NOISE_CEILING_PX: f64 = 50.0;

/// Minimum time between two accepted pinch samples.
pub const PINCH_SAMPLE_INTERVAL_MS: f64 = 5.0;

// ── Inertia ─────────────────────────────────────────────────────

/// Velocity multiplier applied once per animation frame.
pub const INERTIA_FRICTION: f64 = 0.96;

/// Animation stops once both velocity components fall below this (px/ms).
pub const INERTIA_VELOCITY_THRESHOLD: f64 = 0.01;

/// A release whose last move sample is older than this carries no velocity.
pub const INERTIA_STALE_MS: f64 = 100.0;

/// Frame duration assumed for the first animation tick.
pub const NOMINAL_FRAME_MS: f64 = 16.0;

/// Upper bound on a single frame's duration, so a stalled host does not
/// produce one huge jump when it resumes.
pub const MAX_FRAME_MS: f64 = 64.0;

// ── Selection ───────────────────────────────────────────────────

/// Padding in scene units around the selection outline.
pub const OVERLAY_PADDING: f64 = 8.0;
