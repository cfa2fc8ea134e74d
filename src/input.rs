//! Input model: pointer and wheel events, modifier keys, hit targets, and the
//! controller's pan state machine.
//!
//! Hosts translate their platform events into [`PointerEvent`] and
//! [`WheelEvent`] values with screen-space positions and a monotonic
//! millisecond timestamp. [`PanMode`] is the controller's record of which
//! device currently owns the optimistic pan, carrying the context needed to
//! compute incremental deltas on the next move.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Vec2};
use crate::scene::ElementId;

/// Which kind of device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    /// Routed exactly like a mouse.
    Pen,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button, pen tip, or a touch contact.
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click). No gesture claims it.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer-down, move, up, or cancel event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Platform-assigned id, stable for the lifetime of one contact.
    pub pointer_id: i32,
    pub kind: PointerKind,
    pub button: Button,
    /// Screen-space position in pixels.
    pub position: Point,
    pub modifiers: Modifiers,
    /// The first contact of a multi-touch sequence, or any mouse event.
    pub is_primary: bool,
    /// Monotonic timestamp in milliseconds.
    pub time_ms: f64,
}

impl PointerEvent {
    /// A primary-button mouse event.
    #[must_use]
    pub fn mouse(position: Point, time_ms: f64) -> Self {
        Self {
            pointer_id: 1,
            kind: PointerKind::Mouse,
            button: Button::Primary,
            position,
            modifiers: Modifiers::default(),
            is_primary: true,
            time_ms,
        }
    }

    /// A touch contact with the given pointer id.
    #[must_use]
    pub fn touch(pointer_id: i32, position: Point, time_ms: f64) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Touch,
            button: Button::Primary,
            position,
            modifiers: Modifiers::default(),
            is_primary: false,
            time_ms,
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn is_touch(&self) -> bool {
        self.kind == PointerKind::Touch
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// A wheel or trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Screen-space cursor position.
    pub position: Point,
    pub delta: WheelDelta,
    pub modifiers: Modifiers,
    pub time_ms: f64,
}

impl WheelEvent {
    #[must_use]
    pub fn new(position: Point, dx: f64, dy: f64, time_ms: f64) -> Self {
        Self { position, delta: WheelDelta { dx, dy }, modifiers: Modifiers::default(), time_ms }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Target {
    /// Empty surface.
    Background,
    /// A selectable scene element.
    Element(ElementId),
    /// The outline drawn around the current selection.
    Overlay,
}

/// Which device currently owns the canvas pan.
///
/// At most one variant is active, so mouse and touch panning can never run
/// at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanMode {
    /// Nothing is panning.
    #[default]
    Idle,
    /// Secondary-button mouse drag.
    Mouse {
        pointer_id: i32,
        /// Screen position of the previous move, used to compute the delta.
        last_screen: Point,
        /// Pan offset at button-down, restored if the press ends as a click.
        origin_pan: Vec2,
    },
    /// Single-finger optimistic pan.
    Touch {
        pointer_id: i32,
        last_screen: Point,
        /// Pan offset at touch-down, restored if a long press or tap takes over.
        origin_pan: Vec2,
    },
}

impl PanMode {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The pointer driving the pan, if any.
    #[must_use]
    pub fn pointer_id(&self) -> Option<i32> {
        match self {
            Self::Idle => None,
            Self::Mouse { pointer_id, .. } | Self::Touch { pointer_id, .. } => Some(*pointer_id),
        }
    }

    /// Pan offset when the active pan started.
    #[must_use]
    pub fn origin_pan(&self) -> Option<Vec2> {
        match self {
            Self::Idle => None,
            Self::Mouse { origin_pan, .. } | Self::Touch { origin_pan, .. } => Some(*origin_pan),
        }
    }
}
