//! Simulation run state and per-frame system ordering.
//!
//! Every frame runs traffic first, then the camera director, then the
//! visibility metrics, then presentation. Pausing only stops traffic; the
//! camera keeps moving.

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationControl>().configure_sets(
            Update,
            (
                FrameSet::Traffic,
                FrameSet::Camera,
                FrameSet::Metrics,
                FrameSet::Present,
            )
                .chain(),
        );
    }
}

/// Ordered stages of a frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Traffic stepping and vehicle registry upkeep.
    Traffic,
    /// Camera mode state machine and cinematic playback.
    Camera,
    /// Visibility sampling against the camera view.
    Metrics,
    /// Transforms and HUD.
    Present,
}

/// Controls how simulated time advances.
#[derive(Resource, Debug)]
pub struct SimulationControl {
    /// True if traffic is frozen.
    pub paused: bool,
    /// Speed multiplier: 1.0 = normal, 2.0 = fast, 0.5 = slow.
    pub speed: f32,
}

impl Default for SimulationControl {
    fn default() -> Self {
        Self {
            paused: false,
            speed: 1.0,
        }
    }
}

impl SimulationControl {
    pub fn label(&self) -> &'static str {
        if self.paused {
            "Paused"
        } else {
            "Active"
        }
    }
}

/// Run condition: traffic advances only while not paused.
pub fn simulation_running(control: Res<SimulationControl>) -> bool {
    !control.paused
}
