//! Camera mode state machine.
//!
//! The director owns the camera pose. Free mode leaves the pose to the user,
//! Follow and Top ease toward a computed pose every frame, and Cinematic
//! plays a [`CinematicSequence`] that nothing but `reset` may interrupt.

use bevy::prelude::*;

use crate::camera::cinematic::{
    CinematicFraming, CinematicFrame, CinematicSequence, CinematicTimings,
};
use crate::simulation::vehicles::Vehicle;
use crate::world::{CameraPose, SceneLayout};

/// Tunables for the camera director.
#[derive(Resource, Debug, Clone)]
pub struct DirectorConfig {
    /// Follow camera offset from the followed vehicle; z is absolute height.
    pub follow_offset: Vec3,
    /// How far ahead of the followed vehicle the camera looks.
    pub follow_look_ahead: f32,
    /// Fraction of the remaining distance closed per reference frame.
    pub ease_rate: f32,
    pub reference_fps: f32,
    /// Seconds after a cinematic ends before another may start.
    pub cooldown: f32,
    pub timings: CinematicTimings,
    pub framing: CinematicFraming,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            follow_offset: Vec3::new(-10.0, -10.0, 7.0),
            follow_look_ahead: 12.0,
            ease_rate: 0.06,
            reference_fps: 60.0,
            cooldown: 4.5,
            timings: CinematicTimings::default(),
            framing: CinematicFraming::default(),
        }
    }
}

impl DirectorConfig {
    /// Blend fraction for `dt` seconds, independent of frame rate.
    pub fn ease_factor(&self, dt: f32) -> f32 {
        let frames = dt.max(0.0) * self.reference_fps;
        1.0 - (1.0 - self.ease_rate.clamp(0.0, 1.0)).powf(frames)
    }

    /// Follow pose for a vehicle at road-space `subject`.
    pub fn follow_pose(&self, subject: Vec2, layout: &SceneLayout) -> CameraPose {
        let eye = Vec3::new(
            subject.x + self.follow_offset.x,
            subject.y + self.follow_offset.y,
            self.follow_offset.z,
        );
        let look = Vec3::new(subject.x + self.follow_look_ahead, 0.0, 0.0);
        CameraPose::new(layout.to_world(eye), layout.to_world(look))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraMode {
    Free,
    Follow,
    Top,
    Cinematic(CinematicSequence),
}

impl CameraMode {
    pub fn label(&self) -> String {
        match self {
            CameraMode::Free => "Free".to_string(),
            CameraMode::Follow => "Follow".to_string(),
            CameraMode::Top => "Top".to_string(),
            CameraMode::Cinematic(sequence) => {
                format!("Cinematic {}/3", sequence.segment().shot())
            }
        }
    }
}

/// Current camera mode and pose.
#[derive(Resource, Debug, Clone)]
pub struct CameraDirector {
    mode: CameraMode,
    pose: CameraPose,
    default_pose: CameraPose,
    /// Seconds the director has been updated for.
    clock: f32,
    /// Director clock value before which cinematics are refused.
    cooldown_until: f32,
}

impl FromWorld for CameraDirector {
    fn from_world(world: &mut World) -> Self {
        let default_pose = world
            .get_resource::<SceneLayout>()
            .map_or_else(|| SceneLayout::default().default_camera, |layout| {
                layout.default_camera
            });
        Self::new(default_pose)
    }
}

impl CameraDirector {
    pub fn new(default_pose: CameraPose) -> Self {
        Self {
            mode: CameraMode::Free,
            pose: default_pose,
            default_pose,
            clock: 0.0,
            cooldown_until: 0.0,
        }
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_free(&self) -> bool {
        matches!(self.mode, CameraMode::Free)
    }

    pub fn is_cinematic(&self) -> bool {
        matches!(self.mode, CameraMode::Cinematic(_))
    }

    pub fn label(&self) -> String {
        self.mode.label()
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Seconds until a cinematic may start again.
    pub fn cooldown_remaining(&self) -> f32 {
        (self.cooldown_until - self.clock).max(0.0)
    }

    /// Move the camera directly; only honored in Free mode.
    pub fn set_free_pose(&mut self, pose: CameraPose) -> bool {
        if !self.is_free() {
            return false;
        }
        self.pose = pose;
        true
    }

    /// Enter Follow, or return to Free if already following.
    /// Ignored while a cinematic plays.
    pub fn toggle_follow(&mut self) -> bool {
        self.toggle(CameraMode::Follow)
    }

    /// Enter Top, or return to Free if already there.
    /// Ignored while a cinematic plays.
    pub fn toggle_top(&mut self) -> bool {
        self.toggle(CameraMode::Top)
    }

    fn toggle(&mut self, mode: CameraMode) -> bool {
        if self.is_cinematic() {
            return false;
        }
        self.mode = if self.mode == mode {
            CameraMode::Free
        } else {
            mode
        };
        true
    }

    /// Return to Free at the default pose. Aborts a running cinematic
    /// without starting the cooldown.
    pub fn reset(&mut self) {
        self.mode = CameraMode::Free;
        self.pose = self.default_pose;
    }

    /// Start the cinematic for a vehicle that just reached the hazard.
    /// Refused outside Free mode and during the cooldown.
    pub fn try_start_cinematic(
        &mut self,
        vehicle_position: Vec2,
        layout: &SceneLayout,
        config: &DirectorConfig,
    ) -> bool {
        if !self.is_free() || self.clock < self.cooldown_until {
            return false;
        }

        let shots = config.framing.shots(vehicle_position.x, layout);
        self.mode = CameraMode::Cinematic(CinematicSequence::new(
            self.pose,
            shots,
            self.default_pose,
            config.timings,
        ));
        true
    }

    /// Advance the director by `dt` seconds. Returns true on the frame a
    /// cinematic finishes.
    pub fn update(
        &mut self,
        dt: f32,
        follow_subject: Option<Vec2>,
        layout: &SceneLayout,
        config: &DirectorConfig,
    ) -> bool {
        let dt = dt.max(0.0);
        self.clock += dt;

        match &mut self.mode {
            CameraMode::Free => false,
            CameraMode::Follow => {
                if let Some(subject) = follow_subject {
                    let goal = config.follow_pose(subject, layout);
                    self.pose = self.pose.lerp(goal, config.ease_factor(dt));
                }
                false
            }
            CameraMode::Top => {
                self.pose = self.pose.lerp(layout.top_camera, config.ease_factor(dt));
                false
            }
            CameraMode::Cinematic(sequence) => match sequence.advance(dt) {
                CinematicFrame::Playing(pose) => {
                    self.pose = pose;
                    false
                }
                CinematicFrame::Finished(pose) => {
                    self.pose = pose;
                    self.mode = CameraMode::Free;
                    self.cooldown_until = self.clock + config.cooldown;
                    true
                }
            },
        }
    }
}

/// The vehicle the follow camera tracks: the furthest-advanced one still
/// settled in the closed lane.
pub fn follow_subject(vehicles: &[Vehicle], layout: &SceneLayout) -> Option<Vec2> {
    vehicles
        .iter()
        .filter(|vehicle| vehicle.lane == layout.work_lane)
        .map(|vehicle| vehicle.position)
        .max_by(|a, b| a.x.total_cmp(&b.x))
}
