//! Agora - a crowd of animated sprite characters wandering a shared plaza.
//!
//! The simulation tracks each character in world coordinates (origin at the
//! top-left of the bounds, y growing downward) and renders them through a
//! pannable, zoomable 2D camera. Characters wander, bounce off the world
//! edges, nudge each other apart, sit down on request, and show transient
//! speech bubbles when asked a question.
//!
//! The binary in `main.rs` assembles the Bevy app; this library root exists
//! so benches and tests can reach the simulation internals directly.

pub mod camera;
pub mod interaction;
pub mod render;
pub mod roster;
pub mod simulation;
pub mod ui;
pub mod world;
