//! Traffic simulation around the roadworks.
//!
//! Vehicles live in the [`vehicles::VehicleRegistry`] arena and are advanced
//! once per frame by [`traffic::step_traffic`]. The merge coordinator in
//! [`merge`] serializes merges out of the closed lane.

use bevy::prelude::*;

use crate::simulation::vehicles::VehicleId;

pub mod merge;
pub mod traffic;
pub mod vehicle_traffic;
pub mod vehicles;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(vehicle_traffic::TrafficPlugin)
            .add_event::<HazardEntered>();
    }
}

/// A closed-lane vehicle crossed the hazard entry this frame.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HazardEntered {
    pub vehicle: VehicleId,
    /// Road-space position after the crossing.
    pub position: Vec2,
}

/// Latest traffic outputs for the HUD and the signal.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct TrafficReport {
    /// Risk percentage, 0..=100.
    pub risk: u8,
    /// The detection mat currently slows a vehicle.
    pub hazard_active: bool,
    pub merge_lock: Option<VehicleId>,
    pub vehicle_count: usize,
}

/// Desired number of live vehicles.
#[derive(Resource, Debug)]
pub struct TrafficDensity {
    pub desired: usize,
    pub max: usize,
}

impl Default for TrafficDensity {
    fn default() -> Self {
        Self {
            desired: 14,
            max: 40,
        }
    }
}

impl TrafficDensity {
    /// Set the desired count, clamped to `max`.
    pub fn set(&mut self, desired: usize) {
        if desired > self.max {
            warn!(
                "Requested {} vehicles, clamping to maximum of {}",
                desired, self.max
            );
        }
        self.desired = desired.min(self.max);
    }
}
