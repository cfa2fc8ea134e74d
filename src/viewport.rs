//! Pan/zoom transform between screen and scene space.
//!
//! A screen point `s` and scene point `p` are related by
//! `s = p * scale + pan`. The transform owns that mapping, keeps `scale`
//! inside its limits on every write, and bumps a revision counter whenever
//! the mapping actually changes so callers can detect "transformed" without
//! comparing floats.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::consts;
use crate::geom::{Point, Rect, Vec2};

/// Raw pan/zoom values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Horizontal pan offset in screen pixels.
    pub pan_x: f64,
    /// Vertical pan offset in screen pixels.
    pub pan_y: f64,
    /// Scale factor (1.0 = no zoom).
    pub scale: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0 }
    }
}

/// How a zoom request expresses the new scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomStep {
    /// Multiply the current scale.
    Factor(f64),
    /// Set an absolute scale.
    To(f64),
    /// A raw wheel delta. `coarse` selects the trackpad-pinch sensitivity.
    Wheel { delta_y: f64, coarse: bool },
}

/// Owns the [`ViewportState`] for one surface.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    state: ViewportState,
    min_scale: f64,
    max_scale: f64,
    wheel_sensitivity: f64,
    trackpad_sensitivity: f64,
    revision: u64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            state: ViewportState::default(),
            min_scale: consts::MIN_SCALE,
            max_scale: consts::MAX_SCALE,
            wheel_sensitivity: consts::WHEEL_ZOOM_SENSITIVITY,
            trackpad_sensitivity: consts::TRACKPAD_ZOOM_SENSITIVITY,
            revision: 0,
        }
    }
}

impl ViewportTransform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut viewport = Self {
            wheel_sensitivity: config.wheel_zoom_sensitivity,
            trackpad_sensitivity: config.trackpad_zoom_sensitivity,
            ..Self::default()
        };
        viewport.set_scale_limits(config.min_scale, config.max_scale);
        viewport
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    #[must_use]
    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.state.pan_x, self.state.pan_y)
    }

    #[must_use]
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Incremented on every write that changed the mapping.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Conversions ---

    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.state.pan_x) / self.state.scale,
            (screen.y - self.state.pan_y) / self.state.scale,
        )
    }

    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.state.scale + self.state.pan_x,
            scene.y * self.state.scale + self.state.pan_y,
        )
    }

    #[must_use]
    pub fn scene_rect_to_screen(&self, rect: &Rect) -> Rect {
        let min = self.scene_to_screen(Point::new(rect.min_x, rect.min_y));
        let max = self.scene_to_screen(Point::new(rect.max_x, rect.max_y));
        Rect { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y }
    }

    #[must_use]
    pub fn screen_rect_to_scene(&self, rect: &Rect) -> Rect {
        let min = self.screen_to_scene(Point::new(rect.min_x, rect.min_y));
        let max = self.screen_to_scene(Point::new(rect.max_x, rect.max_y));
        Rect { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y }
    }

    /// Convert a screen-space displacement to scene units.
    #[must_use]
    pub fn screen_delta_to_scene(&self, delta: Vec2) -> Vec2 {
        delta.scale(1.0 / self.state.scale)
    }

    // --- Mutations ---

    /// Translate by a screen-space delta. Returns whether the pan changed.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            tracing::warn!(dx, dy, "dropping non-finite pan delta");
            return false;
        }
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        self.state.pan_x += dx;
        self.state.pan_y += dy;
        self.revision += 1;
        true
    }

    /// Set the pan offset directly. Returns whether it changed.
    #[allow(clippy::float_cmp)]
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) -> bool {
        if !pan_x.is_finite() || !pan_y.is_finite() {
            tracing::warn!(pan_x, pan_y, "dropping non-finite pan");
            return false;
        }
        if pan_x == self.state.pan_x && pan_y == self.state.pan_y {
            return false;
        }
        self.state.pan_x = pan_x;
        self.state.pan_y = pan_y;
        self.revision += 1;
        true
    }

    /// Zoom so the scene point under `screen` stays under `screen`.
    ///
    /// The new scale is clamped to the limits. Any non-finite intermediate
    /// leaves the previous state untouched. Returns whether anything changed.
    #[allow(clippy::float_cmp)]
    pub fn zoom_at(&mut self, screen: Point, step: ZoomStep) -> bool {
        let current = self.state.scale;
        let requested = match step {
            ZoomStep::Factor(factor) => current * factor,
            ZoomStep::To(scale) => scale,
            ZoomStep::Wheel { delta_y, coarse } => {
                let sensitivity = if coarse { self.trackpad_sensitivity } else { self.wheel_sensitivity };
                current * (1.0 - delta_y * sensitivity)
            }
        };

        if !screen.is_finite() || !requested.is_finite() || requested <= 0.0 {
            tracing::warn!(?step, x = screen.x, y = screen.y, "dropping non-finite zoom");
            return false;
        }

        let scale = requested.clamp(self.min_scale, self.max_scale);
        let anchor = self.screen_to_scene(screen);
        let pan_x = screen.x - anchor.x * scale;
        let pan_y = screen.y - anchor.y * scale;
        if !anchor.is_finite() || !pan_x.is_finite() || !pan_y.is_finite() {
            tracing::warn!(?step, scale, "dropping zoom with non-finite anchor");
            return false;
        }

        if scale == current && pan_x == self.state.pan_x && pan_y == self.state.pan_y {
            return false;
        }

        self.state = ViewportState { pan_x, pan_y, scale };
        self.revision += 1;
        true
    }

    /// Replace the scale limits. Swapped arguments are reordered, and the
    /// current scale is clamped into the new range. Non-finite or
    /// non-positive limits are ignored. Returns whether the limits were applied.
    #[allow(clippy::float_cmp)]
    pub fn set_scale_limits(&mut self, min: f64, max: f64) -> bool {
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= 0.0 {
            tracing::warn!(min, max, "ignoring unusable scale limits");
            return false;
        }
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_scale = min;
        self.max_scale = max;
        let clamped = self.state.scale.clamp(min, max);
        if clamped != self.state.scale {
            self.state.scale = clamped;
            self.revision += 1;
        }
        true
    }
}
