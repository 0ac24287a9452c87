//! Roadwork Zone - traffic merging around a lane closure, watched by a
//! directed camera.
//!
//! Traffic is stepped every frame, then the camera director, then the
//! free-camera visibility metrics, then rendering and the HUD.

pub mod camera;
pub mod game_state;
pub mod render;
pub mod simulation;
pub mod ui;
pub mod world;
