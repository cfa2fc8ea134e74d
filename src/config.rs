//! Engine tuning, loaded from JSON or environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scale bounds invalid: min {min} max {max}")]
    ScaleBounds { min: f64, max: f64 },
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("inertia friction must be in (0, 1), got {0}")]
    Friction(f64),
    #[error("pinch noise floor {floor} exceeds ceiling {ceiling}")]
    PinchNoise { floor: f64, ceiling: f64 },
}

/// Tuning knobs for one interaction surface. Missing JSON fields take their
/// defaults from [`crate::consts`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub double_tap_delay_ms: f64,
    pub long_press_delay_ms: f64,
    /// Movement in screen pixels that turns a press into a drag.
    pub touch_move_threshold_px: f64,
    pub pinch_noise_floor_px: f64,
    pub pinch_noise_ceiling_px: f64,
    pub pinch_sample_interval_ms: f64,
    pub wheel_zoom_sensitivity: f64,
    pub trackpad_zoom_sensitivity: f64,
    /// Ctrl-wheel events with `|dy|` below this use the trackpad sensitivity.
    pub trackpad_pinch_max_delta: f64,
    pub inertia_friction: f64,
    /// Pixels per millisecond.
    pub inertia_velocity_threshold: f64,
    pub inertia_stale_ms: f64,
    /// Scene units around the selection outline.
    pub overlay_padding: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: consts::MIN_SCALE,
            max_scale: consts::MAX_SCALE,
            double_tap_delay_ms: consts::DOUBLE_TAP_DELAY_MS,
            long_press_delay_ms: consts::LONG_PRESS_DELAY_MS,
            touch_move_threshold_px: consts::TOUCH_MOVE_THRESHOLD_PX,
            pinch_noise_floor_px: consts::PINCH_NOISE_FLOOR_PX,
            pinch_noise_ceiling_px: consts::PINCH_NOISE_CEILING_PX,
            pinch_sample_interval_ms: consts::PINCH_SAMPLE_INTERVAL_MS,
            wheel_zoom_sensitivity: consts::WHEEL_ZOOM_SENSITIVITY,
            trackpad_zoom_sensitivity: consts::TRACKPAD_ZOOM_SENSITIVITY,
            trackpad_pinch_max_delta: consts::TRACKPAD_PINCH_MAX_DELTA,
            inertia_friction: consts::INERTIA_FRICTION,
            inertia_velocity_threshold: consts::INERTIA_VELOCITY_THRESHOLD,
            inertia_stale_ms: consts::INERTIA_STALE_MS,
            overlay_padding: consts::OVERLAY_PADDING,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON object and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first
    /// validation failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `BOARD_INPUT_<FIELD>` environment variables.
    /// Unparseable values keep the default.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of the combined values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            min_scale: env_parse("BOARD_INPUT_MIN_SCALE", d.min_scale),
            max_scale: env_parse("BOARD_INPUT_MAX_SCALE", d.max_scale),
            double_tap_delay_ms: env_parse("BOARD_INPUT_DOUBLE_TAP_DELAY_MS", d.double_tap_delay_ms),
            long_press_delay_ms: env_parse("BOARD_INPUT_LONG_PRESS_DELAY_MS", d.long_press_delay_ms),
            touch_move_threshold_px: env_parse("BOARD_INPUT_TOUCH_MOVE_THRESHOLD_PX", d.touch_move_threshold_px),
            pinch_noise_floor_px: env_parse("BOARD_INPUT_PINCH_NOISE_FLOOR_PX", d.pinch_noise_floor_px),
            pinch_noise_ceiling_px: env_parse("BOARD_INPUT_PINCH_NOISE_CEILING_PX", d.pinch_noise_ceiling_px),
            pinch_sample_interval_ms: env_parse("BOARD_INPUT_PINCH_SAMPLE_INTERVAL_MS", d.pinch_sample_interval_ms),
            wheel_zoom_sensitivity: env_parse("BOARD_INPUT_WHEEL_ZOOM_SENSITIVITY", d.wheel_zoom_sensitivity),
            trackpad_zoom_sensitivity: env_parse("BOARD_INPUT_TRACKPAD_ZOOM_SENSITIVITY", d.trackpad_zoom_sensitivity),
            trackpad_pinch_max_delta: env_parse("BOARD_INPUT_TRACKPAD_PINCH_MAX_DELTA", d.trackpad_pinch_max_delta),
            inertia_friction: env_parse("BOARD_INPUT_INERTIA_FRICTION", d.inertia_friction),
            inertia_velocity_threshold: env_parse(
                "BOARD_INPUT_INERTIA_VELOCITY_THRESHOLD",
                d.inertia_velocity_threshold,
            ),
            inertia_stale_ms: env_parse("BOARD_INPUT_INERTIA_STALE_MS", d.inertia_stale_ms),
            overlay_padding: env_parse("BOARD_INPUT_OVERLAY_PADDING", d.overlay_padding),
        };
        config.validate()?;
        tracing::debug!(?config, "engine config loaded from environment");
        Ok(config)
    }

    /// Check every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("double_tap_delay_ms", self.double_tap_delay_ms),
            ("long_press_delay_ms", self.long_press_delay_ms),
            ("touch_move_threshold_px", self.touch_move_threshold_px),
            ("pinch_noise_ceiling_px", self.pinch_noise_ceiling_px),
            ("wheel_zoom_sensitivity", self.wheel_zoom_sensitivity),
            ("trackpad_zoom_sensitivity", self.trackpad_zoom_sensitivity),
            ("trackpad_pinch_max_delta", self.trackpad_pinch_max_delta),
            ("inertia_velocity_threshold", self.inertia_velocity_threshold),
            ("inertia_stale_ms", self.inertia_stale_ms),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        // Zero is a valid floor, interval, or padding.
        let non_negative = [
            ("pinch_noise_floor_px", self.pinch_noise_floor_px),
            ("pinch_sample_interval_ms", self.pinch_sample_interval_ms),
            ("overlay_padding", self.overlay_padding),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.min_scale > self.max_scale {
            return Err(ConfigError::ScaleBounds { min: self.min_scale, max: self.max_scale });
        }
        if !(self.inertia_friction > 0.0 && self.inertia_friction < 1.0) {
            return Err(ConfigError::Friction(self.inertia_friction));
        }
        if self.pinch_noise_floor_px > self.pinch_noise_ceiling_px {
            return Err(ConfigError::PinchNoise { floor: self.pinch_noise_floor_px, ceiling: self.pinch_noise_ceiling_px });
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, raw = %raw, "ignoring unparseable config value");
                default
            }
        },
        Err(_) => default,
    }
}
