//! Camera direction: mode state machine, cinematic playback, user orbit
//! controls and free-camera visibility metrics.
//!
//! [`DirectorPlugin`] holds the logic and runs headless. [`CameraPlugin`]
//! adds the rendering camera, input handling and post-processing on top.

use bevy::{
    core_pipeline::{
        bloom::{Bloom, BloomCompositeMode, BloomPrefilter},
        tonemapping::Tonemapping,
    },
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::game_state::FrameSet;
use crate::simulation::vehicles::VehicleRegistry;
use crate::simulation::HazardEntered;
use crate::world::{CameraPose, SceneLayout};

pub mod cinematic;
pub mod director;
pub mod view_volume;
pub mod visibility;

use director::{follow_subject, CameraDirector, DirectorConfig};
use view_volume::ViewVolume;
use visibility::{VisibilityConfig, VisibilityMetrics};

/// Camera mode logic without any rendering.
pub struct DirectorPlugin;

impl Plugin for DirectorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DirectorConfig>()
            .init_resource::<CameraDirector>()
            .init_resource::<VisibilityConfig>()
            .init_resource::<VisibilityMetrics>()
            .add_event::<CameraCommand>()
            .add_systems(
                Update,
                (
                    apply_camera_commands,
                    start_cinematic_on_hazard,
                    update_director,
                )
                    .chain()
                    .in_set(FrameSet::Camera),
            )
            .add_systems(Update, sample_visibility.in_set(FrameSet::Metrics));
    }
}

/// Rendering camera with user controls.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DirectorPlugin)
            .init_resource::<BloomConfig>()
            .init_resource::<OrbitSettings>()
            .insert_resource(ClearColor(Color::srgb_u8(0x07, 0x08, 0x0a)))
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    (camera_mode_controls, orbit_camera).before(apply_camera_commands),
                    apply_camera_pose.after(update_director),
                )
                    .in_set(FrameSet::Camera),
            );
    }
}

/// Requests from the user to the camera director.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    ToggleFollow,
    ToggleTop,
    /// Back to Free at the default pose; aborts a cinematic.
    Reset,
}

/// Marker for the camera the director drives.
#[derive(Component)]
pub struct MainCamera;

/// Configuration for bloom effect.
#[derive(Resource)]
pub struct BloomConfig {
    pub intensity: f32,
    /// Luminance above this glows.
    pub threshold: f32,
    pub threshold_softness: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            intensity: 0.35,
            threshold: 0.95,
            threshold_softness: 0.35,
        }
    }
}

/// Sensitivity and limits for Free-mode orbit controls.
#[derive(Resource, Debug, Clone)]
pub struct OrbitSettings {
    /// Radians per pixel of mouse drag.
    pub rotate_speed: f32,
    /// Radians per second for Q/E.
    pub key_rotate_speed: f32,
    /// Pan distance per pixel, as a fraction of the orbit distance.
    pub pan_speed: f32,
    /// Units per second for WASD, as a fraction of the orbit distance.
    pub key_pan_speed: f32,
    /// Fractional distance change per scroll line.
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            key_rotate_speed: 1.0,
            pan_speed: 0.0015,
            key_pan_speed: 0.8,
            zoom_step: 0.1,
            min_distance: 4.0,
            max_distance: 180.0,
            min_pitch: 0.05,
            max_pitch: 1.5,
        }
    }
}

impl OrbitSettings {
    /// Rotate the camera around its target by `yaw` and `pitch` radians.
    pub fn orbit(&self, pose: CameraPose, yaw: f32, pitch: f32) -> CameraPose {
        let offset = pose.position - pose.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return pose;
        }

        let pitch = ((offset.y / distance).clamp(-1.0, 1.0).asin() + pitch)
            .clamp(self.min_pitch, self.max_pitch);
        let heading = offset.x.atan2(offset.z) + yaw;
        let horizontal = distance * pitch.cos();
        let offset = Vec3::new(
            horizontal * heading.sin(),
            distance * pitch.sin(),
            horizontal * heading.cos(),
        );
        CameraPose::new(pose.target + offset, pose.target)
    }

    /// Move toward (positive `scroll`) or away from the target.
    pub fn zoom(&self, pose: CameraPose, scroll: f32) -> CameraPose {
        let offset = pose.position - pose.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return pose;
        }

        let zoomed = (distance * (1.0 - scroll * self.zoom_step))
            .clamp(self.min_distance, self.max_distance);
        CameraPose::new(pose.target + offset * (zoomed / distance), pose.target)
    }

    /// Slide position and target together over the ground plane. `drag.x`
    /// moves sideways, `drag.y` moves along the view direction.
    pub fn pan(&self, pose: CameraPose, drag: Vec2, scale: f32) -> CameraPose {
        let offset = pose.position - pose.target;
        let forward = Vec3::new(-offset.x, 0.0, -offset.z).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let delta = (right * drag.x + forward * drag.y) * offset.length() * scale;
        CameraPose::new(pose.position + delta, pose.target + delta)
    }
}

fn setup_camera(
    mut commands: Commands,
    layout: Res<SceneLayout>,
    bloom_config: Res<BloomConfig>,
) {
    let pose = layout.default_camera;

    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true, // Required for bloom
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 70.0_f32.to_radians(),
            near: 0.1,
            ..default()
        }),
        Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y),
        Bloom {
            intensity: bloom_config.intensity,
            low_frequency_boost: 0.5,
            low_frequency_boost_curvature: 0.7,
            high_pass_frequency: 0.8,
            prefilter: BloomPrefilter {
                threshold: bloom_config.threshold,
                threshold_softness: bloom_config.threshold_softness,
            },
            composite_mode: BloomCompositeMode::Additive,
            ..default()
        },
        Tonemapping::AcesFitted,
        MainCamera,
    ));
}

/// F, T and R switch camera modes.
fn camera_mode_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<CameraCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        commands.send(CameraCommand::ToggleFollow);
    }
    if keyboard.just_pressed(KeyCode::KeyT) {
        commands.send(CameraCommand::ToggleTop);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        commands.send(CameraCommand::Reset);
    }
}

/// Mouse and keyboard orbit, pan and zoom. Input is consumed in every mode
/// but only moves the camera in Free mode.
fn orbit_camera(
    mut director: ResMut<CameraDirector>,
    settings: Res<OrbitSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let motion: Vec2 = mouse_motion.read().map(|e| e.delta).sum();
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if !director.is_free() {
        return;
    }

    let dt = time.delta_secs();
    let mut pose = director.pose();

    // Left drag orbits, right or middle drag pans
    if mouse_buttons.pressed(MouseButton::Left) && motion != Vec2::ZERO {
        pose = settings.orbit(
            pose,
            -motion.x * settings.rotate_speed,
            motion.y * settings.rotate_speed,
        );
    } else if (mouse_buttons.pressed(MouseButton::Right)
        || mouse_buttons.pressed(MouseButton::Middle))
        && motion != Vec2::ZERO
    {
        // Negative x for "grab and drag" feel
        pose = settings.pan(pose, Vec2::new(-motion.x, motion.y), settings.pan_speed);
    }

    if scroll != 0.0 {
        pose = settings.zoom(pose, scroll);
    }

    let mut rotation = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        rotation -= settings.key_rotate_speed * dt;
    }
    if keys.pressed(KeyCode::KeyE) {
        rotation += settings.key_rotate_speed * dt;
    }
    if rotation != 0.0 {
        pose = settings.orbit(pose, rotation, 0.0);
    }

    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        direction.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if direction != Vec2::ZERO {
        pose = settings.pan(pose, direction.normalize(), settings.key_pan_speed * dt);
    }

    if pose != director.pose() {
        director.set_free_pose(pose);
    }
}

fn apply_camera_commands(
    mut commands: EventReader<CameraCommand>,
    mut director: ResMut<CameraDirector>,
) {
    for command in commands.read() {
        let applied = match command {
            CameraCommand::ToggleFollow => director.toggle_follow(),
            CameraCommand::ToggleTop => director.toggle_top(),
            CameraCommand::Reset => {
                director.reset();
                true
            }
        };

        if applied {
            info!("Camera mode: {}", director.label());
        } else {
            debug!("Camera command {:?} ignored during cinematic", command);
        }
    }
}

fn start_cinematic_on_hazard(
    mut entered: EventReader<HazardEntered>,
    layout: Res<SceneLayout>,
    config: Res<DirectorConfig>,
    mut director: ResMut<CameraDirector>,
) {
    for event in entered.read() {
        if director.try_start_cinematic(event.position, &layout, &config) {
            info!("Cinematic started for vehicle {}", event.vehicle);
        } else {
            debug!(
                "Cinematic trigger from vehicle {} ignored (mode {}, cooldown {:.1}s)",
                event.vehicle,
                director.label(),
                director.cooldown_remaining()
            );
        }
    }
}

fn update_director(
    time: Res<Time>,
    layout: Res<SceneLayout>,
    config: Res<DirectorConfig>,
    registry: Res<VehicleRegistry>,
    mut director: ResMut<CameraDirector>,
) {
    let subject = follow_subject(registry.as_slice(), &layout);
    if director.update(time.delta_secs(), subject, &layout, &config) {
        info!(
            "Cinematic finished, next one available in {:.1}s",
            config.cooldown
        );
    }
}

fn apply_camera_pose(
    director: Res<CameraDirector>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let pose = director.pose();
    for mut transform in &mut cameras {
        *transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);
    }
}

/// Test vehicles against the camera's view volume while in Free mode.
fn sample_visibility(
    time: Res<Time>,
    director: Res<CameraDirector>,
    layout: Res<SceneLayout>,
    config: Res<VisibilityConfig>,
    cameras: Query<(&Camera, &Transform), With<MainCamera>>,
    mut registry: ResMut<VehicleRegistry>,
    mut metrics: ResMut<VisibilityMetrics>,
) {
    let Ok((camera, transform)) = cameras.get_single() else {
        return;
    };

    let volume = ViewVolume::from_camera(camera.clip_from_view(), transform.compute_matrix());
    metrics.sample(
        time.delta_secs(),
        director.is_free(),
        registry.as_mut_slice(),
        |vehicle| volume.contains_point(vehicle.world_position(&layout)),
        &config,
    );
}
