//! Momentum panning after a drag release.
//!
//! While a pan is live the scroller tracks the velocity of the most recent
//! move sample. On release it either settles immediately or enters
//! `Animating`, where each host frame decays the velocity by a friction
//! factor and applies it to the viewport until both components drop below
//! the threshold.

#[cfg(test)]
#[path = "inertia_test.rs"]
mod inertia_test;

use crate::config::EngineConfig;
use crate::consts;
use crate::geom::Vec2;
use crate::viewport::ViewportTransform;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    /// A pan is live; samples feed the velocity estimate.
    Tracking { last_sample_ms: f64 },
    /// Decaying after release.
    Animating { last_frame_ms: Option<f64> },
}

#[derive(Debug, Clone)]
pub struct InertialScroller {
    friction: f64,
    threshold: f64,
    stale_ms: f64,
    velocity: Vec2,
    phase: Phase,
}

impl Default for InertialScroller {
    fn default() -> Self {
        Self {
            friction: consts::INERTIA_FRICTION,
            threshold: consts::INERTIA_VELOCITY_THRESHOLD,
            stale_ms: consts::INERTIA_STALE_MS,
            velocity: Vec2::ZERO,
            phase: Phase::Idle,
        }
    }
}

impl InertialScroller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            friction: config.inertia_friction,
            threshold: config.inertia_velocity_threshold,
            stale_ms: config.inertia_stale_ms,
            ..Self::default()
        }
    }

    /// Start tracking a fresh pan. Any running animation is dropped.
    pub fn begin_tracking(&mut self, now_ms: f64) {
        self.velocity = Vec2::ZERO;
        self.phase = Phase::Tracking { last_sample_ms: now_ms };
    }

    /// Feed one move sample. The velocity becomes `delta / dt` of this sample
    /// alone. Samples with no elapsed time keep the previous estimate.
    pub fn record_sample(&mut self, delta: Vec2, now_ms: f64) {
        let Phase::Tracking { last_sample_ms } = self.phase else {
            return;
        };
        let dt = now_ms - last_sample_ms;
        if dt > 0.0 && delta.is_finite() {
            self.velocity = delta.scale(1.0 / dt);
        }
        self.phase = Phase::Tracking { last_sample_ms: now_ms };
    }

    /// End the live pan. Returns true when momentum animation starts.
    pub fn release(&mut self, now_ms: f64) -> bool {
        let Phase::Tracking { last_sample_ms } = self.phase else {
            return false;
        };
        if now_ms - last_sample_ms > self.stale_ms {
            tracing::debug!(idle_ms = now_ms - last_sample_ms, "pointer at rest on release, no inertia");
            self.stop();
            return false;
        }
        if !self.above_threshold() {
            self.stop();
            return false;
        }
        tracing::debug!(vx = self.velocity.x, vy = self.velocity.y, "inertia started");
        self.phase = Phase::Animating { last_frame_ms: None };
        true
    }

    /// Stop tracking or animating. Returns whether an animation was running.
    pub fn cancel(&mut self) -> bool {
        let was_animating = self.is_animating();
        if was_animating {
            tracing::debug!("inertia cancelled");
        }
        self.stop();
        was_animating
    }

    /// Advance one animation frame. Returns whether the viewport moved.
    pub fn tick(&mut self, viewport: &mut ViewportTransform, now_ms: f64) -> bool {
        let Phase::Animating { last_frame_ms } = self.phase else {
            return false;
        };
        let frame_ms = match last_frame_ms {
            None => consts::NOMINAL_FRAME_MS,
            Some(last) => (now_ms - last).clamp(0.0, consts::MAX_FRAME_MS),
        };

        self.velocity = self.velocity.scale(self.friction);
        let step = self.velocity.scale(frame_ms);
        let moved = viewport.pan_by(step.x, step.y);
        tracing::trace!(vx = self.velocity.x, vy = self.velocity.y, frame_ms, "inertia frame");

        if self.above_threshold() {
            self.phase = Phase::Animating { last_frame_ms: Some(now_ms) };
        } else {
            tracing::debug!("inertia settled");
            self.stop();
        }
        moved
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. })
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Tracking { .. })
    }

    /// Current velocity estimate in pixels per millisecond.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn above_threshold(&self) -> bool {
        self.velocity.x.abs() > self.threshold || self.velocity.y.abs() > self.threshold
    }

    fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.phase = Phase::Idle;
    }
}
