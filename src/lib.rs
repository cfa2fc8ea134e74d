//! Input interaction engine for an infinite-canvas whiteboard.
//!
//! The host forwards raw pointer, wheel, and key events (screen-space
//! positions plus a monotonic millisecond timestamp) to an
//! [`engine::InteractionController`] and calls its `tick` once per animation
//! frame while [`engine::InteractionController::needs_tick`] reports pending
//! work. The controller owns the pan/zoom transform, momentum scrolling,
//! gesture classification, and box selection, and answers every call with
//! the [`engine::Intent`]s the host should act on. Scene elements stay with
//! the host and are reached through the [`scene::Scene`] trait.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction controller, intents, and observers |
//! | [`viewport`] | Pan/zoom transform and coordinate conversions |
//! | [`inertia`] | Momentum scrolling after a pan is released |
//! | [`gesture`] | Tap, double-tap, long-press, and pinch classification |
//! | [`selection`] | Selection set, marquee, outline overlay, group drag |
//! | [`scene`] | Scene capability trait and an in-memory card store |
//! | [`hit`] | Rectangle overlap and point hit-testing |
//! | [`input`] | Pointer, wheel, and key event types; pan state |
//! | [`shortcuts`] | Keyboard shortcut registry |
//! | [`geom`] | Points, vectors, and rectangles |
//! | [`config`] | Tunable engine settings |
//! | [`consts`] | Default tuning constants |

pub mod config;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod gesture;
pub mod hit;
pub mod inertia;
pub mod input;
pub mod scene;
pub mod selection;
pub mod shortcuts;
pub mod viewport;
