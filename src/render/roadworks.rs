//! Static roadworks scene: road, lane markings, detection mat, buffer and
//! work zones, signal truck, worker, cones and lighting.
//!
//! Everything is placed from [`SceneLayout`] so the geometry always agrees
//! with what the traffic simulation uses.

use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;

use crate::game_state::FrameSet;
use crate::simulation::TrafficReport;
use crate::world::SceneLayout;

pub struct RoadworksScenePlugin;

impl Plugin for RoadworksScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadMarkingConfig>()
            .add_systems(Startup, (setup_lighting, spawn_roadworks))
            .add_systems(Update, update_signal_beacon.in_set(FrameSet::Present));
    }
}

/// Lane marking dimensions.
#[derive(Resource, Debug, Clone)]
pub struct RoadMarkingConfig {
    pub dash_length: f32,
    /// Distance from one dash start to the next.
    pub dash_period: f32,
    pub line_width: f32,
    /// Spacing of cones along the closed lane edge.
    pub cone_spacing: f32,
}

impl Default for RoadMarkingConfig {
    fn default() -> Self {
        Self {
            dash_length: 1.8,
            dash_period: 4.0,
            line_width: 0.12,
            cone_spacing: 3.0,
        }
    }
}

/// Alert panel on the signal truck, shown while the hazard is active.
#[derive(Component)]
pub struct SignalBeacon;

/// Axis-aligned box given in road space (x along travel, y lateral, z up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadBox {
    pub center: Vec3,
    pub size: Vec3,
}

impl RoadBox {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Box resting on the road surface.
    pub fn on_ground(x: f32, y: f32, size: Vec3) -> Self {
        Self::new(Vec3::new(x, y, size.z / 2.0), size)
    }

    pub fn cuboid(&self) -> Cuboid {
        Cuboid::new(self.size.x, self.size.z, self.size.y)
    }

    pub fn transform(&self, layout: &SceneLayout) -> Transform {
        Transform::from_translation(layout.to_world(self.center))
    }
}

/// Road-space centers of the dashed lines between adjacent lanes.
pub fn dash_centers(layout: &SceneLayout, config: &RoadMarkingConfig) -> Vec<Vec2> {
    let mut centers = Vec::new();
    if config.dash_period <= 0.0 {
        return centers;
    }

    for lane in 0..layout.lanes.lane_count - 1 {
        let y = layout.lanes.boundary(lane);
        let mut x = layout.road_start();
        while x + config.dash_length <= layout.road_end() {
            centers.push(Vec2::new(x + config.dash_length / 2.0, y));
            x += config.dash_period;
        }
    }
    centers
}

/// Road-space cone positions along the open edge of the closed lane, from
/// the buffer start to the end of the work area.
pub fn cone_positions(layout: &SceneLayout, config: &RoadMarkingConfig) -> Vec<Vec2> {
    let mut cones = Vec::new();
    if config.cone_spacing <= 0.0 {
        return cones;
    }

    let y = layout.lanes.boundary(layout.work_lane) - 0.3;
    let end = layout.work_start() + layout.work_length;
    let mut x = layout.buffer_start();
    while x <= end {
        cones.push(Vec2::new(x, y));
        x += config.cone_spacing;
    }
    cones
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 250.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 12000.0,
            shadows_enabled: true,
            shadow_depth_bias: 0.3,
            shadow_normal_bias: 1.8,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
        CascadeShadowConfigBuilder {
            num_cascades: 3,
            minimum_distance: 0.1,
            maximum_distance: 200.0,
            first_cascade_far_bound: 30.0,
            overlap_proportion: 0.3,
        }
        .build(),
    ));
}

fn spawn_roadworks(
    mut commands: Commands,
    layout: Res<SceneLayout>,
    markings: Res<RoadMarkingConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let lane_width = layout.lanes.lane_width();
    let y_work = layout.work_lane_center();

    // Materials
    let asphalt = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x1a, 0x1c, 0x1e),
        perceptual_roughness: 0.95,
        ..default()
    });
    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xf2, 0xf2, 0xf2),
        emissive: LinearRgba::new(0.1, 0.1, 0.1, 1.0),
        perceptual_roughness: 0.35,
        ..default()
    });
    let rubber = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x0a, 0x0b, 0x0d),
        perceptual_roughness: 0.97,
        ..default()
    });
    let buffer_zone = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x2e, 0xa8, 0xff),
        perceptual_roughness: 0.7,
        ..default()
    });
    let work_zone = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xbf, 0x1f),
        perceptual_roughness: 0.7,
        ..default()
    });
    let truck_paint = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xc0, 0x00),
        perceptual_roughness: 0.35,
        ..default()
    });
    let alert = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        emissive: LinearRgba::new(6.0, 0.0, 0.0, 1.0),
        ..default()
    });
    let cone = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0x6b, 0x00),
        emissive: LinearRgba::new(0.3, 0.12, 0.0, 1.0),
        perceptual_roughness: 0.35,
        ..default()
    });
    let vest = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0x8c, 0x1a),
        perceptual_roughness: 0.7,
        ..default()
    });
    let helmet = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xb0, 0x00),
        perceptual_roughness: 0.35,
        ..default()
    });

    let mut spawn_box = |road_box: RoadBox, material: &Handle<StandardMaterial>| {
        commands
            .spawn((
                Mesh3d(meshes.add(road_box.cuboid())),
                MeshMaterial3d(material.clone()),
                road_box.transform(&layout),
            ))
            .id()
    };

    // Road surface, top at z = 0
    spawn_box(
        RoadBox::new(
            Vec3::new(layout.road_center_x, 0.0, -0.125),
            Vec3::new(layout.road_length, layout.lanes.road_width, 0.25),
        ),
        &asphalt,
    );

    // Dashed lane lines and solid edges
    for center in dash_centers(&layout, &markings) {
        spawn_box(
            RoadBox::on_ground(
                center.x,
                center.y,
                Vec3::new(markings.dash_length, markings.line_width, 0.02),
            ),
            &paint,
        );
    }
    let half_width = layout.lanes.road_width / 2.0;
    for edge in [-half_width, half_width] {
        spawn_box(
            RoadBox::on_ground(
                layout.road_center_x,
                edge,
                Vec3::new(layout.road_length, markings.line_width, 0.02),
            ),
            &paint,
        );
    }

    // Detection mat, buffer and work area on the closed lane
    spawn_box(
        RoadBox::on_ground(
            layout.mat_start + layout.mat_length / 2.0,
            y_work,
            Vec3::new(layout.mat_length, lane_width * 0.98, 0.11),
        ),
        &rubber,
    );
    spawn_box(
        RoadBox::on_ground(
            layout.buffer_start() + layout.buffer_length / 2.0,
            y_work,
            Vec3::new(layout.buffer_length, lane_width * 0.98, 0.02),
        ),
        &buffer_zone,
    );
    spawn_box(
        RoadBox::on_ground(
            layout.work_start() + layout.work_length / 2.0,
            y_work,
            Vec3::new(layout.work_length, lane_width * 0.98, 0.03),
        ),
        &work_zone,
    );

    // Signal truck: body, cab and the alert panel
    let truck_x = layout.truck_x();
    spawn_box(
        RoadBox::new(
            Vec3::new(truck_x, y_work, 0.9),
            Vec3::new(3.0, 1.2, 0.9),
        ),
        &truck_paint,
    );
    spawn_box(
        RoadBox::new(
            Vec3::new(truck_x + 1.9, y_work, 0.75),
            Vec3::new(1.0, 1.0, 0.8),
        ),
        &truck_paint,
    );
    let beacon = spawn_box(
        RoadBox::new(
            Vec3::new(truck_x, y_work, 1.8),
            Vec3::new(0.55, 0.10, 0.9),
        ),
        &alert,
    );

    // Worker under the signal
    let worker = layout.worker_helmet;
    spawn_box(
        RoadBox::new(
            Vec3::new(worker.x, worker.y, 0.6),
            Vec3::new(0.34, 0.28, 0.9),
        ),
        &vest,
    );
    spawn_box(
        RoadBox::new(worker, Vec3::new(0.3, 0.3, 0.16)),
        &helmet,
    );

    for position in cone_positions(&layout, &markings) {
        spawn_box(
            RoadBox::on_ground(position.x, position.y, Vec3::new(0.3, 0.3, 0.7)),
            &cone,
        );
    }

    commands
        .entity(beacon)
        .insert((SignalBeacon, Visibility::Hidden));

    info!(
        "Roadworks scene: mat at x={:.1}, buffer from {:.1}, work area from {:.1}",
        layout.mat_start,
        layout.buffer_start(),
        layout.work_start()
    );
}

/// Show the truck's alert panel while the detection mat is occupied.
fn update_signal_beacon(
    report: Res<TrafficReport>,
    mut beacons: Query<&mut Visibility, With<SignalBeacon>>,
) {
    let wanted = if report.hazard_active {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut beacons {
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}
