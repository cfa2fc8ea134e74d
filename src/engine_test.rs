#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::input::{Modifiers, PointerKind};
use crate::scene::{Card, SceneStore};
use crate::shortcuts::Shortcut;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Two 100x100 cards, one at the origin and one at x = 300.
fn board() -> (InteractionController, SceneStore, ElementId, ElementId) {
    let mut scene = SceneStore::new();
    let a = scene.insert(Card::new(0.0, 0.0, 100.0, 100.0));
    let b = scene.insert(Card::new(300.0, 0.0, 100.0, 100.0));
    (InteractionController::default(), scene, a, b)
}

fn right(position: Point, time_ms: f64) -> PointerEvent {
    PointerEvent::mouse(position, time_ms).with_button(Button::Secondary)
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn has_transformed(intents: &[Intent]) -> bool {
    intents.iter().any(|i| matches!(i, Intent::Transformed))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_rejects_invalid_config() {
    let config = EngineConfig { min_scale: 5.0, max_scale: 1.0, ..EngineConfig::default() };
    assert!(matches!(InteractionController::new(config), Err(ConfigError::ScaleBounds { .. })));
}

#[test]
fn new_applies_config_limits() {
    let config = EngineConfig { min_scale: 0.5, max_scale: 4.0, ..EngineConfig::default() };
    let Ok(ctl) = InteractionController::new(config) else {
        panic!("valid config rejected");
    };
    assert_eq!(ctl.viewport().scale_limits(), (0.5, 4.0));
    assert_eq!(ctl.config().max_scale, 4.0);
}

#[test]
fn idle_controller_needs_no_tick() {
    let (ctl, ..) = board();
    assert!(!ctl.needs_tick());
    assert_eq!(ctl.next_deadline(), None);
    assert_eq!(ctl.pan_mode(), PanMode::Idle);
}

// =============================================================
// Mouse: taps and selection
// =============================================================

#[test]
fn click_on_background_is_single_tap() {
    let (mut ctl, mut scene, ..) = board();
    assert!(ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 0.0)).is_empty());
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 10.0));
    assert_eq!(up, vec![Intent::Tap { point: pt(500.0, 500.0), target: Target::Background }]);
}

#[test]
fn click_on_element_selects_then_taps() {
    let (mut ctl, mut scene, a, _) = board();
    let down = ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 0.0));
    assert_eq!(down, vec![Intent::SelectionChanged { selected: vec![a] }]);
    assert_eq!(scene.flagged(), vec![a]);

    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 10.0));
    assert_eq!(up, vec![Intent::Tap { point: pt(50.0, 50.0), target: Target::Element(a) }]);
}

#[test]
fn double_click_emits_one_double_tap() {
    let (mut ctl, mut scene, ..) = board();
    let p = pt(600.0, 600.0);
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(p, 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::mouse(p, 10.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(p, 50.0));
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(p, 60.0));
    assert_eq!(up, vec![Intent::DoubleTap { point: p, target: Target::Background }]);

    // A third click starts a fresh sequence.
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(p, 90.0));
    let third = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(p, 100.0));
    assert_eq!(third, vec![Intent::Tap { point: p, target: Target::Background }]);
}

#[test]
fn slow_second_click_is_another_single_tap() {
    let (mut ctl, mut scene, ..) = board();
    let p = pt(600.0, 600.0);
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(p, 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::mouse(p, 10.0));
    assert!(ctl.needs_tick());
    ctl.tick(&mut scene, 300.0);
    assert!(!ctl.needs_tick());

    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(p, 400.0));
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(p, 410.0));
    assert_eq!(up, vec![Intent::Tap { point: p, target: Target::Background }]);
}

#[test]
fn clicks_on_different_targets_are_not_a_double_tap() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(600.0, 600.0), 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(600.0, 600.0), 10.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 50.0));
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 60.0));
    assert_eq!(up, vec![Intent::Tap { point: pt(50.0, 50.0), target: Target::Element(a) }]);
}

#[test]
fn drag_moves_element_without_tap() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 0.0));
    ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(80.0, 90.0), 16.0));
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(80.0, 90.0), 32.0));
    assert!(up.is_empty());
    let card = scene.get(a).map(|c| (c.x, c.y));
    assert_eq!(card, Some((30.0, 40.0)));
}

#[test]
fn marquee_selects_overlapping_cards() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(-10.0, -10.0), 0.0));
    let moved = ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(150.0, 150.0), 16.0));
    assert_eq!(moved, vec![Intent::SelectionChanged { selected: vec![a] }]);
    assert!(ctl.selection().is_drawing());

    let up = ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(150.0, 150.0), 32.0));
    assert!(up.is_empty());
    assert!(!ctl.selection().is_active());
    assert_eq!(scene.flagged(), vec![a]);
}

#[test]
fn press_on_overlay_drags_whole_selection() {
    let (mut ctl, mut scene, a, b) = board();
    ctl.select_elements(&mut scene, &[a, b]);
    // Inside the outline but between the two cards.
    let down = ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(200.0, 50.0), 0.0));
    assert!(down.is_empty());
    assert!(ctl.selection().is_dragging());

    ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(210.0, 50.0), 16.0));
    assert_eq!(scene.get(a).map(|c| c.x), Some(10.0));
    assert_eq!(scene.get(b).map(|c| c.x), Some(310.0));
}

#[test]
fn cancel_produces_no_tap() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 0.0));
    let out = ctl.on_pointer_cancel(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 10.0));
    assert!(out.is_empty());
    assert!(!ctl.selection().is_active());
}

#[test]
fn cancel_ends_right_drag_whatever_the_button() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(500.0, 500.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(540.0, 500.0), 16.0));
    // Cancel events report the primary button.
    let out = ctl.on_pointer_cancel(&mut scene, PointerEvent::mouse(pt(540.0, 500.0), 32.0));
    assert!(out.is_empty());
    assert_eq!(ctl.pan_mode(), PanMode::Idle);
    assert!(!ctl.is_inertia_running());

    let hover = ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(600.0, 500.0), 48.0));
    assert!(hover.is_empty());
    assert_eq!(ctl.viewport().state().pan_x, 40.0);
}

#[test]
fn cancel_ends_marquee_whatever_the_button() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 0.0));
    ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(520.0, 520.0), 16.0));
    assert!(ctl.selection().is_drawing());
    ctl.on_pointer_cancel(&mut scene, right(pt(520.0, 520.0), 32.0));
    assert!(!ctl.selection().is_active());
    assert!(ctl.on_pointer_move(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 48.0)).is_empty());
}

#[test]
fn middle_button_is_ignored() {
    let (mut ctl, mut scene, ..) = board();
    let e = PointerEvent::mouse(pt(50.0, 50.0), 0.0).with_button(Button::Middle);
    assert!(ctl.on_pointer_down(&mut scene, e).is_empty());
    assert!(ctl.on_pointer_up(&mut scene, e).is_empty());
    assert!(ctl.selection().is_empty());
}

#[test]
fn pen_routes_like_mouse() {
    let (mut ctl, mut scene, a, _) = board();
    let e = PointerEvent::mouse(pt(50.0, 50.0), 0.0).with_kind(PointerKind::Pen);
    let down = ctl.on_pointer_down(&mut scene, e);
    assert_eq!(down, vec![Intent::SelectionChanged { selected: vec![a] }]);
}

// =============================================================
// Mouse: right-button pan and context
// =============================================================

#[test]
fn right_click_requests_context_menu() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, right(pt(50.0, 50.0), 0.0));
    assert!(ctl.pan_mode().is_active());
    let up = ctl.on_pointer_up(&mut scene, right(pt(51.0, 50.0), 100.0));
    assert_eq!(up, vec![Intent::ContextRequested { point: pt(51.0, 50.0), target: Target::Element(a) }]);
    assert_eq!(ctl.pan_mode(), PanMode::Idle);
    assert!(ctl.selection().is_empty());
}

#[test]
fn right_click_rolls_back_sub_threshold_pan() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, right(pt(50.0, 50.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(53.0, 50.0), 16.0));
    assert_eq!(ctl.viewport().state().pan_x, 3.0);

    let up = ctl.on_pointer_up(&mut scene, right(pt(53.0, 50.0), 80.0));
    assert_eq!(
        up,
        vec![Intent::Transformed, Intent::ContextRequested { point: pt(53.0, 50.0), target: Target::Element(a) }]
    );
    assert_eq!(ctl.viewport().state().pan_x, 0.0);
}

#[test]
fn right_drag_pans_viewport() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(0.0, 0.0), 0.0));
    let moved = ctl.on_pointer_move(&mut scene, right(pt(30.0, 10.0), 16.0));
    assert_eq!(moved, vec![Intent::Transformed]);
    let state = ctl.viewport().state();
    assert_eq!((state.pan_x, state.pan_y), (30.0, 10.0));

    let up = ctl.on_pointer_up(&mut scene, right(pt(30.0, 10.0), 300.0));
    assert!(up.is_empty());
}

#[test]
fn fast_release_starts_inertia() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(0.0, 0.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(20.0, 0.0), 10.0));
    ctl.on_pointer_move(&mut scene, right(pt(40.0, 0.0), 20.0));
    ctl.on_pointer_up(&mut scene, right(pt(40.0, 0.0), 25.0));
    assert!(ctl.is_inertia_running());
    assert!(ctl.needs_tick());

    let frame = ctl.tick(&mut scene, 41.0);
    assert_eq!(frame, vec![Intent::Transformed]);
    assert!(ctl.viewport().state().pan_x > 40.0);
}

#[test]
fn release_after_rest_has_no_inertia() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(0.0, 0.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(20.0, 0.0), 10.0));
    ctl.on_pointer_up(&mut scene, right(pt(20.0, 0.0), 400.0));
    assert!(!ctl.is_inertia_running());
}

#[test]
fn pointer_down_catches_inertia() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(0.0, 0.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(20.0, 0.0), 10.0));
    ctl.on_pointer_up(&mut scene, right(pt(20.0, 0.0), 15.0));
    assert!(ctl.is_inertia_running());

    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(600.0, 600.0), 30.0));
    assert!(!ctl.is_inertia_running());
    let pan_x = ctl.viewport().state().pan_x;
    assert!(ctl.tick(&mut scene, 46.0).is_empty());
    assert_eq!(ctl.viewport().state().pan_x, pan_x);
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn plain_wheel_pans() {
    let (mut ctl, mut scene, ..) = board();
    let out = ctl.on_wheel(&mut scene, WheelEvent::new(pt(0.0, 0.0), 10.0, 20.0, 0.0));
    assert_eq!(out, vec![Intent::Transformed]);
    let state = ctl.viewport().state();
    assert_eq!((state.pan_x, state.pan_y), (-10.0, -20.0));
}

#[test]
fn ctrl_wheel_zooms_at_cursor() {
    let (mut ctl, mut scene, ..) = board();
    let cursor = pt(200.0, 100.0);
    let before = ctl.viewport().screen_to_scene(cursor);
    let out = ctl.on_wheel(&mut scene, WheelEvent::new(cursor, 0.0, -100.0, 0.0).with_modifiers(ctrl()));
    assert_eq!(out, vec![Intent::Transformed]);
    assert!((ctl.viewport().scale() - 1.12).abs() < 1e-9);
    let after = ctl.viewport().screen_to_scene(cursor);
    assert!(before.distance(after) < 1e-9);
}

#[test]
fn small_ctrl_wheel_uses_trackpad_sensitivity() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_wheel(&mut scene, WheelEvent::new(pt(0.0, 0.0), 0.0, -5.0, 0.0).with_modifiers(ctrl()));
    assert!((ctl.viewport().scale() - 1.14).abs() < 1e-9);
}

#[test]
fn zoom_at_limit_emits_nothing() {
    let (mut ctl, mut scene, ..) = board();
    ctl.zoom_at(&mut scene, pt(0.0, 0.0), ZoomStep::To(2.5));
    let out = ctl.zoom_at(&mut scene, pt(0.0, 0.0), ZoomStep::Factor(2.0));
    assert!(out.is_empty());
}

// =============================================================
// Touch
// =============================================================

#[test]
fn quick_touch_is_a_tap() {
    let (mut ctl, mut scene, ..) = board();
    assert!(ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(600.0, 600.0), 0.0)).is_empty());
    assert!(ctl.needs_tick());
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::touch(5, pt(601.0, 600.0), 80.0));
    assert_eq!(up, vec![Intent::Tap { point: pt(601.0, 600.0), target: Target::Background }]);
}

#[test]
fn touch_tap_rolls_back_sub_threshold_pan() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(600.0, 600.0), 0.0));
    ctl.on_pointer_move(&mut scene, PointerEvent::touch(5, pt(603.0, 600.0), 16.0));
    let up = ctl.on_pointer_up(&mut scene, PointerEvent::touch(5, pt(603.0, 600.0), 80.0));
    assert_eq!(up, vec![Intent::Transformed, Intent::Tap { point: pt(603.0, 600.0), target: Target::Background }]);
    assert_eq!(ctl.viewport().state().pan_x, 0.0);
}

#[test]
fn touch_drag_pans_and_skips_long_press() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(0.0, 0.0), 0.0));
    let moved = ctl.on_pointer_move(&mut scene, PointerEvent::touch(5, pt(20.0, 0.0), 16.0));
    assert_eq!(moved, vec![Intent::Transformed]);
    assert!(ctl.tick(&mut scene, 300.0).is_empty());
    assert!(ctl.selection().is_empty());
    assert_eq!(ctl.viewport().state().pan_x, 20.0);
}

#[test]
fn long_press_selects_and_lift_requests_context() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(50.0, 50.0), 0.0));
    assert_eq!(ctl.next_deadline(), Some(250.0));

    let fired = ctl.tick(&mut scene, 250.0);
    assert_eq!(fired, vec![Intent::SelectionChanged { selected: vec![a] }]);
    assert_eq!(ctl.pan_mode(), PanMode::Idle);

    let up = ctl.on_pointer_up(&mut scene, PointerEvent::touch(5, pt(50.0, 50.0), 300.0));
    assert_eq!(up, vec![Intent::ContextRequested { point: pt(50.0, 50.0), target: Target::Element(a) }]);
}

#[test]
fn long_press_restores_optimistic_pan() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(600.0, 600.0), 0.0));
    ctl.on_pointer_move(&mut scene, PointerEvent::touch(5, pt(603.0, 600.0), 16.0));
    assert_eq!(ctl.viewport().state().pan_x, 3.0);

    let fired = ctl.tick(&mut scene, 260.0);
    assert_eq!(fired, vec![Intent::Transformed]);
    assert_eq!(ctl.viewport().state().pan_x, 0.0);
    assert!(ctl.selection().is_drawing());
}

#[test]
fn long_press_fires_before_late_move() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(5, pt(50.0, 50.0), 0.0));
    // No tick arrives; the overdue timer fires ahead of the move, which
    // then drags the freshly selected card.
    let out = ctl.on_pointer_move(&mut scene, PointerEvent::touch(5, pt(70.0, 50.0), 400.0));
    assert_eq!(out, vec![Intent::SelectionChanged { selected: vec![a] }]);
    assert_eq!(scene.get(a).map(|c| c.x), Some(20.0));
    assert_eq!(ctl.viewport().state().pan_x, 0.0);
}

#[test]
fn pinch_zooms_by_distance_ratio() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(1, pt(0.0, 0.0), 0.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(2, pt(100.0, 0.0), 10.0));
    assert!(ctl.is_pinching());
    assert_eq!(ctl.pan_mode(), PanMode::Idle);
    assert!(!ctl.needs_tick());

    let out = ctl.on_pointer_move(&mut scene, PointerEvent::touch(2, pt(150.0, 0.0), 30.0));
    assert_eq!(out, vec![Intent::Transformed]);
    assert!((ctl.viewport().scale() - 1.5).abs() < 1e-9);
}

#[test]
fn pinch_ignores_spikes_and_jitter() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(1, pt(0.0, 0.0), 0.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(2, pt(100.0, 0.0), 0.0));
    for (x, t) in [(102.0, 10.0), (180.0, 20.0), (103.0, 30.0)] {
        let out = ctl.on_pointer_move(&mut scene, PointerEvent::touch(2, pt(x, 0.0), t));
        assert!(!has_transformed(&out), "distance {x}");
    }
    assert_eq!(ctl.viewport().scale(), 1.0);
}

#[test]
fn lifting_pinch_finger_resumes_pan() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(1, pt(0.0, 0.0), 0.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(2, pt(100.0, 0.0), 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::touch(2, pt(100.0, 0.0), 50.0));
    assert!(!ctl.is_pinching());
    assert_eq!(ctl.pan_mode().pointer_id(), Some(1));

    let out = ctl.on_pointer_move(&mut scene, PointerEvent::touch(1, pt(10.0, 0.0), 66.0));
    assert_eq!(out, vec![Intent::Transformed]);
    assert_eq!(ctl.viewport().state().pan_x, 10.0);
}

#[test]
fn third_touch_is_ignored() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(1, pt(0.0, 0.0), 0.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(2, pt(100.0, 0.0), 0.0));
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(3, pt(50.0, 50.0), 0.0));
    let out = ctl.on_pointer_move(&mut scene, PointerEvent::touch(3, pt(90.0, 90.0), 20.0));
    assert!(out.is_empty());
    assert!(ctl.is_pinching());
}

#[test]
fn second_touch_ends_long_press_selection() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::touch(1, pt(600.0, 600.0), 0.0));
    ctl.tick(&mut scene, 250.0);
    assert!(ctl.selection().is_drawing());

    ctl.on_pointer_down(&mut scene, PointerEvent::touch(2, pt(700.0, 600.0), 300.0));
    assert!(!ctl.selection().is_active());
    assert!(ctl.is_pinching());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn registered_shortcut_fires() {
    let (mut ctl, mut scene, ..) = board();
    ctl.shortcuts_mut().register(Shortcut::new("z", "undo").ctrl());
    let out = ctl.on_key_down(&mut scene, &Key::new("Z"), ctrl(), 0.0);
    assert_eq!(out, vec![Intent::Shortcut { command: "undo".into() }]);
    assert!(ctl.on_key_down(&mut scene, &Key::new("z"), Modifiers::default(), 10.0).is_empty());
}

#[test]
fn escape_clears_selection_once() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.select_element(&mut scene, Some(a));
    let first = ctl.on_key_down(&mut scene, &Key::new("Escape"), Modifiers::default(), 0.0);
    assert_eq!(first, vec![Intent::SelectionChanged { selected: vec![] }]);
    assert!(scene.flagged().is_empty());
    assert!(ctl.on_key_down(&mut scene, &Key::new("Escape"), Modifiers::default(), 10.0).is_empty());
}

#[test]
fn key_down_fires_overdue_tap_timer() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(500.0, 500.0), 10.0));
    assert!(ctl.needs_tick());

    let out = ctl.on_key_down(&mut scene, &Key::new("q"), Modifiers::default(), 400.0);
    assert!(out.is_empty());
    assert!(!ctl.needs_tick());
    assert_eq!(ctl.next_deadline(), None);
}

#[test]
fn shortcut_bound_to_escape_wins() {
    let (mut ctl, mut scene, a, _) = board();
    ctl.select_element(&mut scene, Some(a));
    ctl.shortcuts_mut().register(Shortcut::new("Escape", "close-panel"));
    let out = ctl.on_key_down(&mut scene, &Key::new("Escape"), Modifiers::default(), 0.0);
    assert_eq!(out, vec![Intent::Shortcut { command: "close-panel".into() }]);
    assert!(ctl.selection().contains(a));
}

// =============================================================
// Programmatic control
// =============================================================

#[test]
fn select_all_reports_sorted_ids() {
    let (mut ctl, mut scene, a, b) = board();
    let mut expected = vec![a, b];
    expected.sort();
    let out = ctl.select_all(&mut scene);
    assert_eq!(out, vec![Intent::SelectionChanged { selected: expected }]);
    assert!(ctl.select_all(&mut scene).is_empty());
}

#[test]
fn refresh_prunes_removed_element() {
    let (mut ctl, mut scene, a, b) = board();
    ctl.select_elements(&mut scene, &[a, b]);
    scene.remove(b);
    let out = ctl.refresh_selection(&mut scene);
    assert_eq!(out, vec![Intent::SelectionChanged { selected: vec![a] }]);
}

#[test]
fn programmatic_pan_cancels_inertia() {
    let (mut ctl, mut scene, ..) = board();
    ctl.on_pointer_down(&mut scene, right(pt(0.0, 0.0), 0.0));
    ctl.on_pointer_move(&mut scene, right(pt(20.0, 0.0), 10.0));
    ctl.on_pointer_up(&mut scene, right(pt(20.0, 0.0), 15.0));
    let out = ctl.pan_by(&mut scene, 5.0, 5.0);
    assert_eq!(out, vec![Intent::Transformed]);
    assert!(!ctl.is_inertia_running());
}

// =============================================================
// Observers
// =============================================================

#[test]
fn observers_see_every_intent_in_order() {
    let (mut ctl, mut scene, a, _) = board();
    let seen: Rc<RefCell<Vec<Intent>>> = Rc::default();
    let sink = Rc::clone(&seen);
    ctl.subscribe(Box::new(move |intent: &Intent| sink.borrow_mut().push(intent.clone())));

    ctl.on_pointer_down(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 0.0));
    ctl.on_pointer_up(&mut scene, PointerEvent::mouse(pt(50.0, 50.0), 10.0));
    assert_eq!(
        *seen.borrow(),
        vec![
            Intent::SelectionChanged { selected: vec![a] },
            Intent::Tap { point: pt(50.0, 50.0), target: Target::Element(a) },
        ]
    );
}

#[test]
fn intent_serializes_with_type_tag() {
    let json = serde_json::to_value(Intent::Shortcut { command: "undo".into() }).unwrap_or_default();
    assert_eq!(json["type"], "shortcut");
    assert_eq!(json["command"], "undo");
    let json = serde_json::to_value(Intent::Transformed).unwrap_or_default();
    assert_eq!(json["type"], "transformed");
}
