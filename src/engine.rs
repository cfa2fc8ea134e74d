use serde::Serialize;

use crate::config::{ConfigError, EngineConfig};
use crate::geom::{Point, Vec2};
use crate::gesture::{GestureClassifier, PinchSample, Press, PressKind, TapKind};
use crate::inertia::InertialScroller;
use crate::input::{Button, Key, Modifiers, PanMode, PointerEvent, Target, WheelEvent};
use crate::scene::{ElementId, Scene};
use crate::selection::BoxSelectionEngine;
use crate::shortcuts::ShortcutRegistry;
use crate::viewport::{ViewportTransform, ZoomStep};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Intents returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// The viewport changed; re-query transform and screen bounds.
    Transformed,
    /// Selection membership changed. Ids are sorted.
    SelectionChanged { selected: Vec<ElementId> },
    Tap { point: Point, target: Target },
    DoubleTap { point: Point, target: Target },
    /// Right click, or a touch long press that was lifted without moving.
    ContextRequested { point: Point, target: Target },
    /// A registered keyboard shortcut fired.
    Shortcut { command: String },
}

/// Push-side consumer of intents, registered for the controller's lifetime.
pub trait IntentObserver {
    fn on_intent(&mut self, intent: &Intent);
}

impl<F: FnMut(&Intent)> IntentObserver for F {
    fn on_intent(&mut self, intent: &Intent) {
        self(intent);
    }
}

#[derive(Debug, Clone, Copy)]
struct Revisions {
    viewport: u64,
    selection: u64,
}

/// Composition root for one interaction surface.
///
/// Routes raw pointer, wheel, and key events into the gesture classifier,
/// viewport, inertial scroller, and selection engine. Every entry point
/// takes the host's [`Scene`], fires timers that fell due before the event,
/// handles the event, and returns the resulting [`Intent`]s (also pushed to
/// every subscribed [`IntentObserver`]).
///
/// On pointer-move, routing precedence is: the pointer that owns a selection
/// gesture, then the pinch, then the active pan.
pub struct InteractionController {
    config: EngineConfig,
    viewport: ViewportTransform,
    inertia: InertialScroller,
    gestures: GestureClassifier,
    selection: BoxSelectionEngine,
    shortcuts: ShortcutRegistry,
    pan: PanMode,
    /// Pointer currently driving a marquee or selection drag.
    selection_pointer: Option<i32>,
    observers: Vec<Box<dyn IntentObserver>>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl InteractionController {
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            viewport: ViewportTransform::from_config(&config),
            inertia: InertialScroller::from_config(&config),
            gestures: GestureClassifier::from_config(&config),
            selection: BoxSelectionEngine::new(config.overlay_padding),
            shortcuts: ShortcutRegistry::new(),
            pan: PanMode::Idle,
            selection_pointer: None,
            observers: Vec::new(),
            config,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn IntentObserver>) {
        self.observers.push(observer);
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    #[must_use]
    pub fn selection(&self) -> &BoxSelectionEngine {
        &self.selection
    }

    #[must_use]
    pub fn gestures(&self) -> &GestureClassifier {
        &self.gestures
    }

    #[must_use]
    pub fn pan_mode(&self) -> PanMode {
        self.pan
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.gestures.pinch.is_active()
    }

    #[must_use]
    pub fn is_inertia_running(&self) -> bool {
        self.inertia.is_animating()
    }

    #[must_use]
    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.shortcuts
    }

    /// Whether the host should keep calling [`Self::tick`].
    #[must_use]
    pub fn needs_tick(&self) -> bool {
        self.inertia.is_animating() || self.gestures.next_deadline().is_some()
    }

    /// Earliest pending timer deadline, for hosts that schedule a wake-up
    /// instead of ticking every frame.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.gestures.next_deadline()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, event.time_ms);
        if event.button != Button::Middle && self.inertia.cancel() {
            tracing::debug!(pointer_id = event.pointer_id, "momentum caught by pointer down");
        }
        if event.is_touch() {
            self.touch_down(scene, &event);
        } else {
            self.mouse_down(scene, &event);
        }
        self.finish(scene, before, Vec::new())
    }

    pub fn on_pointer_move(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, event.time_ms);
        self.pointer_move(scene, &event);
        self.finish(scene, before, Vec::new())
    }

    pub fn on_pointer_up(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, event.time_ms);
        let mut events = Vec::new();
        self.release_pointer(scene, &event, false, &mut events);
        self.finish(scene, before, events)
    }

    /// Tear the pointer's gesture down like pointer-up, without producing a
    /// tap, context request, or momentum.
    pub fn on_pointer_cancel(&mut self, scene: &mut dyn Scene, event: PointerEvent) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, event.time_ms);
        let mut events = Vec::new();
        self.release_pointer(scene, &event, true, &mut events);
        self.finish(scene, before, events)
    }

    /// Ctrl/Meta + wheel zooms at the cursor; a plain wheel pans.
    pub fn on_wheel(&mut self, scene: &mut dyn Scene, event: WheelEvent) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, event.time_ms);
        if self.inertia.is_animating() {
            self.inertia.cancel();
        }
        let WheelEvent { position, delta, modifiers, .. } = event;
        if modifiers.command() {
            let coarse = delta.dy.abs() < self.config.trackpad_pinch_max_delta;
            self.viewport.zoom_at(position, ZoomStep::Wheel { delta_y: delta.dy, coarse });
        } else {
            self.viewport.pan_by(-delta.dx, -delta.dy);
        }
        self.finish(scene, before, Vec::new())
    }

    /// Registered shortcuts win; an unbound Escape clears the selection.
    pub fn on_key_down(&mut self, scene: &mut dyn Scene, key: &Key, modifiers: Modifiers, time_ms: f64) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, time_ms);
        let mut events = Vec::new();
        if let Some(shortcut) = self.shortcuts.resolve(key, modifiers) {
            tracing::debug!(key = %key.0, command = %shortcut.command, "shortcut");
            events.push(Intent::Shortcut { command: shortcut.command.clone() });
        } else if key.matches("Escape") {
            self.selection.clear(scene);
        }
        self.finish(scene, before, events)
    }

    /// One animation frame: fire due timers and advance momentum.
    pub fn tick(&mut self, scene: &mut dyn Scene, now_ms: f64) -> Vec<Intent> {
        let before = self.revisions();
        self.fire_due_timers(scene, now_ms);
        self.inertia.tick(&mut self.viewport, now_ms);
        self.finish(scene, before, Vec::new())
    }

    // --- Programmatic control ---

    pub fn pan_by(&mut self, scene: &mut dyn Scene, dx: f64, dy: f64) -> Vec<Intent> {
        let before = self.revisions();
        self.inertia.cancel();
        self.viewport.pan_by(dx, dy);
        self.finish(scene, before, Vec::new())
    }

    pub fn zoom_at(&mut self, scene: &mut dyn Scene, screen_point: Point, step: ZoomStep) -> Vec<Intent> {
        let before = self.revisions();
        self.inertia.cancel();
        self.viewport.zoom_at(screen_point, step);
        self.finish(scene, before, Vec::new())
    }

    pub fn select_elements(&mut self, scene: &mut dyn Scene, ids: &[ElementId]) -> Vec<Intent> {
        let before = self.revisions();
        self.selection_pointer = None;
        self.selection.select_elements(scene, ids);
        self.finish(scene, before, Vec::new())
    }

    pub fn select_element(&mut self, scene: &mut dyn Scene, id: Option<ElementId>) -> Vec<Intent> {
        let before = self.revisions();
        self.selection_pointer = None;
        self.selection.select_element(scene, id);
        self.finish(scene, before, Vec::new())
    }

    pub fn select_all(&mut self, scene: &mut dyn Scene) -> Vec<Intent> {
        let before = self.revisions();
        self.selection_pointer = None;
        self.selection.select_all(scene);
        self.finish(scene, before, Vec::new())
    }

    pub fn clear_selection(&mut self, scene: &mut dyn Scene) -> Vec<Intent> {
        let before = self.revisions();
        self.selection_pointer = None;
        self.selection.clear(scene);
        self.finish(scene, before, Vec::new())
    }

    /// Recompute the selection outline after the host moved or removed elements.
    pub fn refresh_selection(&mut self, scene: &mut dyn Scene) -> Vec<Intent> {
        let before = self.revisions();
        self.selection.refresh_overlay(scene);
        self.finish(scene, before, Vec::new())
    }

    // --- Routing ---

    fn mouse_down(&mut self, scene: &mut dyn Scene, event: &PointerEvent) {
        match event.button {
            Button::Primary => {
                if self.selection_pointer.is_some() {
                    return;
                }
                let target = self.target_at(scene, event.position);
                self.selection.on_pointer_down(scene, &self.viewport, event.position, target);
                self.selection_pointer = Some(event.pointer_id);
                self.gestures.press(event.pointer_id, event.position, PressKind::Primary, target, event.time_ms);
            }
            Button::Secondary => {
                if self.pan.is_active() {
                    return;
                }
                let target = self.target_at(scene, event.position);
                self.pan = PanMode::Mouse {
                    pointer_id: event.pointer_id,
                    last_screen: event.position,
                    origin_pan: self.viewport.pan(),
                };
                self.inertia.begin_tracking(event.time_ms);
                self.gestures.press(event.pointer_id, event.position, PressKind::Secondary, target, event.time_ms);
                tracing::debug!(pointer_id = event.pointer_id, "mouse pan started");
            }
            Button::Middle => {}
        }
    }

    fn touch_down(&mut self, scene: &mut dyn Scene, event: &PointerEvent) {
        let id = event.pointer_id;
        if self.gestures.touches.contains(id) {
            self.gestures.touches.update(id, event.position);
            return;
        }
        self.gestures.touches.insert(id, event.position);

        match self.gestures.touches.len() {
            1 => {
                if self.pan.is_active() {
                    return;
                }
                let target = self.target_at(scene, event.position);
                self.pan = PanMode::Touch { pointer_id: id, last_screen: event.position, origin_pan: self.viewport.pan() };
                self.inertia.begin_tracking(event.time_ms);
                self.gestures.press(id, event.position, PressKind::Touch, target, event.time_ms);
                tracing::debug!(pointer_id = id, "touch pan started");
            }
            2 => self.start_pinch(scene, event.time_ms),
            count => tracing::debug!(pointer_id = id, count, "extra touch ignored"),
        }
    }

    fn start_pinch(&mut self, scene: &mut dyn Scene, now_ms: f64) {
        if self.selection_pointer.is_some_and(|p| self.gestures.touches.contains(p)) {
            self.selection.on_pointer_up(scene, &self.viewport);
            self.selection_pointer = None;
        }
        self.gestures.abandon_press();
        if matches!(self.pan, PanMode::Touch { .. }) {
            self.pan = PanMode::Idle;
        }
        self.inertia.cancel();
        if let Some((a, b)) = self.gestures.touches.pair() {
            self.gestures.pinch.begin(a, b, now_ms);
        }
    }

    fn pointer_move(&mut self, scene: &mut dyn Scene, event: &PointerEvent) {
        let id = event.pointer_id;
        if event.is_touch() && !self.gestures.touches.update(id, event.position) {
            return;
        }
        self.gestures.track_move(id, event.position);

        if self.selection_pointer == Some(id) {
            self.selection.on_pointer_move(scene, &self.viewport, event.position);
            return;
        }

        if self.gestures.pinch.is_active() {
            if self.gestures.touches.is_pinch_member(id) {
                self.pinch_step(event.time_ms);
            }
            return;
        }

        let last = match self.pan {
            PanMode::Mouse { pointer_id, last_screen, .. } if pointer_id == id && !event.is_touch() => last_screen,
            PanMode::Touch { pointer_id, last_screen, .. } if pointer_id == id && event.is_touch() => last_screen,
            _ => return,
        };
        let delta = event.position - last;
        self.viewport.pan_by(delta.x, delta.y);
        self.inertia.record_sample(delta, event.time_ms);
        if let PanMode::Mouse { last_screen, .. } | PanMode::Touch { last_screen, .. } = &mut self.pan {
            *last_screen = event.position;
        }
    }

    fn pinch_step(&mut self, now_ms: f64) {
        let Some((a, b)) = self.gestures.touches.pair() else {
            return;
        };
        if let PinchSample::Zoom { factor, center } = self.gestures.pinch.sample(a, b, now_ms) {
            self.viewport.zoom_at(center, ZoomStep::Factor(factor));
        }
    }

    fn release_pointer(&mut self, scene: &mut dyn Scene, event: &PointerEvent, cancelled: bool, events: &mut Vec<Intent>) {
        let id = event.pointer_id;
        if event.is_touch() {
            self.gestures.touches.update(id, event.position);
        }
        let press = self.gestures.release(id).filter(|p| !p.moved && !cancelled);

        // A cancel carries no reliable button, so it tears down whatever
        // this pointer owns.
        if self.owns_selection(event, cancelled) {
            self.selection.on_pointer_up(scene, &self.viewport);
            self.selection_pointer = None;
            match press {
                Some(p @ Press { kind: PressKind::Primary, .. }) => self.classify_tap(p, event, events),
                Some(p @ Press { kind: PressKind::LongPress, .. }) => {
                    events.push(Intent::ContextRequested { point: event.position, target: p.target });
                }
                _ => {}
            }
        }
        if self.owns_pan(event, cancelled) {
            let origin_pan = self.pan.origin_pan();
            self.pan = PanMode::Idle;
            match press {
                Some(p @ Press { kind: PressKind::Secondary, .. }) => {
                    self.inertia.cancel();
                    self.undo_click_nudge(origin_pan);
                    events.push(Intent::ContextRequested { point: event.position, target: p.target });
                }
                Some(p @ Press { kind: PressKind::Touch, .. }) => {
                    self.inertia.cancel();
                    self.undo_click_nudge(origin_pan);
                    self.classify_tap(p, event, events);
                }
                _ if cancelled => {
                    self.inertia.cancel();
                }
                _ => {
                    self.inertia.release(event.time_ms);
                }
            }
        }

        if event.is_touch() {
            self.lift_touch(id, event.time_ms);
        }
    }

    fn lift_touch(&mut self, id: i32, now_ms: f64) {
        let was_pinch_member = self.gestures.touches.is_pinch_member(id);
        self.gestures.touches.remove(id);
        if self.gestures.touches.is_empty() {
            self.gestures.long_press.cancel();
            self.gestures.pinch.end();
            return;
        }
        if !was_pinch_member || !self.gestures.pinch.end() {
            return;
        }
        if let Some((a, b)) = self.gestures.touches.pair() {
            self.gestures.pinch.begin(a, b, now_ms);
        } else if let Some(rest) = self.gestures.touches.first() {
            self.pan = PanMode::Touch { pointer_id: rest.id, last_screen: rest.position, origin_pan: self.viewport.pan() };
            self.inertia.begin_tracking(now_ms);
            tracing::debug!(pointer_id = rest.id, "pinch ended, panning with remaining finger");
        }
    }

    fn owns_selection(&self, event: &PointerEvent, cancelled: bool) -> bool {
        self.selection_pointer == Some(event.pointer_id)
            && (cancelled || event.is_touch() || event.button == Button::Primary)
    }

    fn owns_pan(&self, event: &PointerEvent, cancelled: bool) -> bool {
        match self.pan {
            PanMode::Mouse { pointer_id, .. } => {
                pointer_id == event.pointer_id && !event.is_touch() && (cancelled || event.button == Button::Secondary)
            }
            PanMode::Touch { pointer_id, .. } => pointer_id == event.pointer_id && event.is_touch(),
            PanMode::Idle => false,
        }
    }

    /// A press that stayed under the movement threshold is a click, so the
    /// sub-threshold pan it applied is rolled back.
    fn undo_click_nudge(&mut self, origin_pan: Option<Vec2>) {
        if let Some(origin) = origin_pan {
            self.viewport.set_pan(origin.x, origin.y);
        }
    }

    fn classify_tap(&mut self, press: Press, event: &PointerEvent, events: &mut Vec<Intent>) {
        let point = event.position;
        let target = press.target;
        match self.gestures.taps.register(target, event.time_ms) {
            TapKind::Single => events.push(Intent::Tap { point, target }),
            TapKind::Double => events.push(Intent::DoubleTap { point, target }),
        }
    }

    /// Element under the point wins over the selection outline.
    fn target_at(&self, scene: &dyn Scene, screen_point: Point) -> Target {
        let scene_point = self.viewport.screen_to_scene(screen_point);
        if let Some(id) = scene.element_at(scene_point) {
            Target::Element(id)
        } else if self.selection.overlay_contains(scene_point) {
            Target::Overlay
        } else {
            Target::Background
        }
    }

    // --- Timers ---

    fn fire_due_timers(&mut self, scene: &mut dyn Scene, now_ms: f64) {
        self.gestures.taps.expire(now_ms);
        if self.gestures.long_press.fire_due(now_ms) {
            self.on_long_press(scene);
        }
    }

    /// Undo the optimistic pan and hand the touch to the selection engine.
    fn on_long_press(&mut self, scene: &mut dyn Scene) {
        let Some(press) = self.gestures.promote_long_press() else {
            return;
        };
        if let PanMode::Touch { pointer_id, origin_pan, .. } = self.pan {
            if pointer_id == press.pointer_id {
                self.viewport.set_pan(origin_pan.x, origin_pan.y);
                self.pan = PanMode::Idle;
                self.inertia.cancel();
            }
        }
        self.selection.on_pointer_down(scene, &self.viewport, press.origin, press.target);
        self.selection_pointer = Some(press.pointer_id);
    }

    // --- Intent assembly ---

    fn revisions(&self) -> Revisions {
        Revisions { viewport: self.viewport.revision(), selection: self.selection.revision() }
    }

    fn finish(&mut self, scene: &mut dyn Scene, before: Revisions, events: Vec<Intent>) -> Vec<Intent> {
        let transformed = self.viewport.revision() != before.viewport;
        if transformed {
            self.selection.resync_marquee(scene, &self.viewport);
        }

        let mut intents = Vec::with_capacity(events.len() + 2);
        if transformed {
            intents.push(Intent::Transformed);
        }
        if self.selection.revision() != before.selection {
            intents.push(Intent::SelectionChanged { selected: self.selection.selected() });
        }
        intents.extend(events);

        for observer in &mut self.observers {
            for intent in &intents {
                observer.on_intent(intent);
            }
        }
        intents
    }
}
