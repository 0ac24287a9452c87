//! Bevy systems driving the traffic simulation.
//!
//! Keeps the vehicle registry at the desired density, steps traffic once
//! per frame while the simulation runs, and publishes the step's outputs.

use bevy::prelude::*;

use crate::game_state::{simulation_running, FrameSet, SimulationControl};
use crate::simulation::traffic::{step_traffic, TrafficConfig};
use crate::simulation::vehicles::VehicleRegistry;
use crate::simulation::{HazardEntered, TrafficDensity, TrafficReport};
use crate::world::SceneLayout;

pub struct TrafficPlugin;

impl Plugin for TrafficPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrafficConfig>()
            .init_resource::<VehicleRegistry>()
            .init_resource::<TrafficDensity>()
            .init_resource::<TrafficReport>()
            .add_systems(
                Update,
                (
                    traffic_controls,
                    sync_traffic_density,
                    advance_traffic.run_if(simulation_running),
                )
                    .chain()
                    .in_set(FrameSet::Traffic),
            );
    }
}

/// Spawn or drop vehicles until the registry matches the desired density.
fn sync_traffic_density(
    density: Res<TrafficDensity>,
    layout: Res<SceneLayout>,
    config: Res<TrafficConfig>,
    mut registry: ResMut<VehicleRegistry>,
    mut report: ResMut<TrafficReport>,
) {
    if registry.len() != density.desired {
        let (added, removed) = registry.resize(density.desired, &layout, &config);
        info!(
            "Traffic density: {} vehicles (+{} / -{})",
            registry.len(),
            added,
            removed
        );
    }
    report.vehicle_count = registry.len();
}

/// Step every vehicle and forward hazard crossings to the camera director.
fn advance_traffic(
    time: Res<Time>,
    control: Res<SimulationControl>,
    layout: Res<SceneLayout>,
    config: Res<TrafficConfig>,
    mut registry: ResMut<VehicleRegistry>,
    mut report: ResMut<TrafficReport>,
    mut crossings: EventWriter<HazardEntered>,
) {
    let step = step_traffic(
        &mut registry,
        &layout,
        &config,
        time.delta_secs(),
        control.speed,
    );

    if step.merge_lock != report.merge_lock {
        debug!("Merge lock holder: {:?}", step.merge_lock);
    }

    for &vehicle in &step.crossings {
        let Some(entered) = registry.get(vehicle) else {
            continue;
        };
        crossings.send(HazardEntered {
            vehicle,
            position: entered.position,
        });
    }

    report.risk = step.risk;
    report.hazard_active = step.hazard_active;
    report.merge_lock = step.merge_lock;
    report.vehicle_count = registry.len();
}

/// Keyboard controls for pause, speed and traffic density.
fn traffic_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut control: ResMut<SimulationControl>,
    mut density: ResMut<TrafficDensity>,
) {
    // Space: Toggle pause
    if keyboard.just_pressed(KeyCode::Space) {
        control.paused = !control.paused;
        if control.paused {
            info!("Traffic PAUSED");
        } else {
            info!("Traffic RESUMED ({}x speed)", control.speed);
        }
    }

    // Number keys for speed presets
    for (key, speed) in [
        (KeyCode::Digit1, 1.0),
        (KeyCode::Digit2, 2.0),
        (KeyCode::Digit3, 3.0),
        (KeyCode::Digit4, 4.0),
    ] {
        if keyboard.just_pressed(key) {
            control.speed = speed;
            info!("Traffic speed: {}x", speed);
        }
    }

    // +/- for traffic density
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        let desired = density.desired + 1;
        density.set(desired);
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        let desired = density.desired.saturating_sub(1);
        density.set(desired);
    }
}
