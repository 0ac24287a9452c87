//! Scene geometry shared by the traffic and camera systems.
//!
//! Road space is z-up: x runs along the direction of travel, y is the lateral
//! offset from the road axis and z is height. Bevy's world is y-up, so every
//! road-space point goes through [`SceneLayout::to_world`] before it reaches a
//! `Transform`.

use bevy::prelude::*;

pub mod lanes;

use lanes::{LaneGeometry, LaneIndex};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneLayout>();
    }
}

/// A camera position plus the point it looks at, both in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Linear blend between two poses, `t` in `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Static layout of the roadwork scene.
#[derive(Resource, Debug, Clone)]
pub struct SceneLayout {
    pub lanes: LaneGeometry,
    /// Lane closed by the roadworks.
    pub work_lane: LaneIndex,
    /// Road length along x.
    pub road_length: f32,
    /// Road center along x.
    pub road_center_x: f32,
    /// Start of the detection mat; crossing it is the hazard entry.
    pub mat_start: f32,
    pub mat_length: f32,
    /// Gap between the end of the mat and the buffer zone.
    pub buffer_gap: f32,
    pub buffer_length: f32,
    /// Work area start measured back from the end of the buffer zone.
    pub work_overlap: f32,
    pub work_length: f32,
    /// Signal truck position measured from the buffer start.
    pub truck_offset: f32,
    /// Signal emitter on the truck, road space.
    pub signal_origin: Vec3,
    /// Helmet of the first worker, road space.
    pub worker_helmet: Vec3,
    pub default_camera: CameraPose,
    pub top_camera: CameraPose,
}

impl Default for SceneLayout {
    fn default() -> Self {
        let lanes = LaneGeometry::new(16.0, 4);
        let work_lane = 0;
        let y_work = lanes.center(work_lane);

        let mat_start = -5.0;
        let mat_length = 10.0;
        let buffer_gap = 6.0;
        let buffer_length = 26.0;
        let work_overlap = 6.5;
        let truck_offset = 4.0;

        let buffer_start = mat_start + mat_length + buffer_gap;
        let work_start = buffer_start + buffer_length - work_overlap;
        let truck_x = buffer_start + truck_offset;

        Self {
            lanes,
            work_lane,
            road_length: 140.0,
            road_center_x: 40.0,
            mat_start,
            mat_length,
            buffer_gap,
            buffer_length,
            work_overlap,
            work_length: 20.0,
            truck_offset,
            signal_origin: Vec3::new(truck_x - 0.18, y_work + 0.10, 2.08),
            worker_helmet: Vec3::new(work_start + 6.0, y_work - 0.95, 1.07),
            default_camera: CameraPose::new(
                road_to_world(Vec3::new(-14.0, -24.0, 10.5)),
                road_to_world(Vec3::new(58.0, 2.0, 0.9)),
            ),
            top_camera: CameraPose::new(
                road_to_world(Vec3::new(40.0, -28.0, 28.0)),
                road_to_world(Vec3::new(40.0, 0.0, 0.0)),
            ),
        }
    }
}

impl SceneLayout {
    /// Convert a z-up road-space point to the y-up world.
    pub fn to_world(&self, road: Vec3) -> Vec3 {
        road_to_world(road)
    }

    /// First x where dashes and vehicles start.
    pub fn road_start(&self) -> f32 {
        self.road_center_x - self.road_length / 2.0 + 2.0
    }

    pub fn road_end(&self) -> f32 {
        self.road_center_x + self.road_length / 2.0 - 2.0
    }

    pub fn mat_end(&self) -> f32 {
        self.mat_start + self.mat_length
    }

    pub fn buffer_start(&self) -> f32 {
        self.mat_end() + self.buffer_gap
    }

    pub fn work_start(&self) -> f32 {
        self.buffer_start() + self.buffer_length - self.work_overlap
    }

    pub fn truck_x(&self) -> f32 {
        self.buffer_start() + self.truck_offset
    }

    /// Vehicles in the work lane at or beyond this x are treated as having
    /// reached the hazard.
    pub fn hazard_entry(&self) -> f32 {
        self.mat_start
    }

    /// Longitudinal span over which the work lane is slowed.
    pub fn hazard_span(&self) -> (f32, f32) {
        (self.mat_start, self.mat_end())
    }

    /// Lateral center of the closed lane.
    pub fn work_lane_center(&self) -> f32 {
        self.lanes.center(self.work_lane)
    }

    /// Lane vehicles merge into when leaving the closed lane.
    pub fn merge_lane(&self) -> LaneIndex {
        (self.work_lane + 1).min(self.lanes.lane_count - 1)
    }
}

fn road_to_world(road: Vec3) -> Vec3 {
    Vec3::new(road.x, road.z, -road.y)
}
