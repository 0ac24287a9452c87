//! Vehicle records and the registry that owns them.
//!
//! Vehicles are stored in an arena; a [`VehicleId`] is the index into it.
//! Ids stay stable while the vehicle lives because only the tail of the arena
//! is ever removed.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::traffic::TrafficConfig;
use crate::world::lanes::LaneIndex;
use crate::world::SceneLayout;

/// Arena index of a vehicle.
pub type VehicleId = usize;

/// Height of a vehicle body center above the road.
pub const BODY_HEIGHT: f32 = 0.30;

/// Number of body colors the renderer knows about.
pub const PALETTE_SIZE: usize = 8;

/// Kinematic and presentation state of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Road-space position: x along travel, y lateral.
    pub position: Vec2,
    /// Cruise speed in road units per reference frame.
    pub speed_base: f32,
    /// Speed applied during the last step.
    pub speed: f32,
    /// Lane the vehicle is settled in.
    pub lane: LaneIndex,
    /// Lane the vehicle is steering toward; `lane` or `lane + 1`.
    pub lane_target: LaneIndex,
    /// Visual yaw proportional to the remaining lateral error.
    pub heading_skew: f32,
    /// Whether the last Free-mode visibility sample saw this vehicle.
    pub in_general_view: bool,
    /// Body color index.
    pub color: usize,
}

impl Vehicle {
    /// A vehicle settled at the center of `lane`.
    pub fn new(layout: &SceneLayout, lane: LaneIndex, x: f32, speed_base: f32) -> Self {
        Self {
            position: Vec2::new(x, layout.lanes.center(lane)),
            speed_base,
            speed: speed_base,
            lane,
            lane_target: lane,
            heading_skew: 0.0,
            in_general_view: false,
            color: 0,
        }
    }

    pub fn is_changing_lane(&self) -> bool {
        self.lane != self.lane_target
    }

    /// Body center in world space.
    pub fn world_position(&self, layout: &SceneLayout) -> Vec3 {
        layout.to_world(self.position.extend(BODY_HEIGHT))
    }

    /// Body orientation in world space.
    pub fn world_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading_skew)
    }
}

/// All live vehicles.
#[derive(Resource)]
pub struct VehicleRegistry {
    vehicles: Vec<Vehicle>,
    rng: StdRng,
}

impl FromWorld for VehicleRegistry {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<TrafficConfig>()
            .map_or_else(|| TrafficConfig::default().seed, |config| config.seed);
        Self::with_seed(seed)
    }
}

impl VehicleRegistry {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            vehicles: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleId, &Vehicle)> {
        self.vehicles.iter().enumerate()
    }

    pub fn as_slice(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    /// Add a fully specified vehicle.
    pub fn insert(&mut self, vehicle: Vehicle) -> VehicleId {
        self.vehicles.push(vehicle);
        self.vehicles.len() - 1
    }

    /// Spawn a vehicle in a random lane, queued up behind the road start.
    pub fn spawn(&mut self, layout: &SceneLayout, config: &TrafficConfig) -> VehicleId {
        let slot = self.vehicles.len() as f32;
        let lane = self.rng.gen_range(0..layout.lanes.lane_count);
        let speed_base = self.rng.gen_range(config.speed_base_range.clone());
        let x = layout.road_start()
            - slot * config.spawn_spacing
            - jitter(&mut self.rng, config.spawn_jitter);

        let mut vehicle = Vehicle::new(layout, lane, x, speed_base);
        vehicle.color = self.rng.gen_range(0..PALETTE_SIZE);
        self.insert(vehicle)
    }

    /// Grow or shrink the arena to `target` vehicles.
    ///
    /// Shrinking drops the most recently added vehicles. Returns the number
    /// of vehicles added and removed.
    pub fn resize(
        &mut self,
        target: usize,
        layout: &SceneLayout,
        config: &TrafficConfig,
    ) -> (usize, usize) {
        let before = self.vehicles.len();
        while self.vehicles.len() < target {
            self.spawn(layout, config);
        }
        self.vehicles.truncate(target);
        let after = self.vehicles.len();
        (after.saturating_sub(before), before.saturating_sub(after))
    }

    /// Send a vehicle that left the far end back behind the road start,
    /// settled in a freshly drawn lane.
    pub fn recycle(&mut self, id: VehicleId, layout: &SceneLayout, config: &TrafficConfig) {
        let offset = jitter(&mut self.rng, config.recycle_jitter);
        let lane = self.rng.gen_range(0..layout.lanes.lane_count);
        if let Some(vehicle) = self.vehicles.get_mut(id) {
            vehicle.position = Vec2::new(
                layout.road_start() - config.recycle_margin - offset,
                layout.lanes.center(lane),
            );
            vehicle.lane = lane;
            vehicle.lane_target = lane;
            vehicle.heading_skew = 0.0;
        }
    }
}

fn jitter(rng: &mut StdRng, max: f32) -> f32 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_vehicles_start_behind_the_road() {
        let layout = SceneLayout::default();
        let config = TrafficConfig::default();
        let mut registry = VehicleRegistry::with_seed(7);
        registry.resize(14, &layout, &config);

        assert_eq!(registry.len(), 14);
        for (_, vehicle) in registry.iter() {
            assert!(vehicle.position.x <= layout.road_start());
            assert!(layout.lanes.contains(vehicle.lane));
            assert_eq!(vehicle.lane, vehicle.lane_target);
            assert_eq!(vehicle.position.y, layout.lanes.center(vehicle.lane));
            assert!(config.speed_base_range.contains(&vehicle.speed_base));
            assert!(vehicle.color < PALETTE_SIZE);
        }
    }

    #[test]
    fn shrinking_removes_newest_vehicles() {
        let layout = SceneLayout::default();
        let config = TrafficConfig::default();
        let mut registry = VehicleRegistry::with_seed(7);
        registry.resize(5, &layout, &config);
        let first_three: Vec<Vehicle> = registry.as_slice()[..3].to_vec();

        let (added, removed) = registry.resize(3, &layout, &config);
        assert_eq!((added, removed), (0, 2));
        assert_eq!(registry.as_slice(), first_three.as_slice());

        let (added, removed) = registry.resize(6, &layout, &config);
        assert_eq!((added, removed), (3, 0));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn recycle_moves_vehicle_behind_start() {
        let layout = SceneLayout::default();
        let config = TrafficConfig::default();
        let mut registry = VehicleRegistry::with_seed(1);
        let id = registry.insert(Vehicle::new(&layout, 2, 200.0, 0.25));

        registry.recycle(id, &layout, &config);
        let x = registry.get(id).map(|v| v.position.x).unwrap_or_default();
        assert!(x <= layout.road_start() - config.recycle_margin);
        assert!(x > layout.road_start() - config.recycle_margin - config.recycle_jitter);

        let Some(vehicle) = registry.get(id) else {
            panic!("recycled vehicle vanished");
        };
        assert_eq!(vehicle.lane, vehicle.lane_target);
        assert_eq!(vehicle.position.y, layout.lanes.center(vehicle.lane));
        assert_eq!(vehicle.heading_skew, 0.0);
    }
}
