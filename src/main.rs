//! Roadwork Zone - lane-closure traffic scene with a directed camera.

use bevy::prelude::*;

use roadwork_zone::{camera, game_state, render, simulation, ui, world};

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Roadwork Zone".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Frame ordering and pause state
        .add_plugins(game_state::GameStatePlugin)
        // Scene geometry
        .add_plugins(world::WorldPlugin)
        // Traffic
        .add_plugins(simulation::SimulationPlugin)
        // Camera director and controls
        .add_plugins(camera::CameraPlugin)
        .add_plugins(render::RenderPlugin)
        // HUD
        .add_plugins(ui::UiPlugin)
        .run();
}
