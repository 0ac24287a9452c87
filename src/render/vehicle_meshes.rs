//! Vehicle bodies: a box-built car mesh and the entities mirroring the
//! vehicle registry.
//!
//! The registry is the source of truth. Each frame the entity set is grown
//! or shrunk to match it and every body copies its vehicle's transform.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::game_state::FrameSet;
use crate::simulation::vehicles::{VehicleId, VehicleRegistry, PALETTE_SIZE};
use crate::world::SceneLayout;

pub struct VehicleMeshesPlugin;

impl Plugin for VehicleMeshesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VehicleMeshConfig>()
            .add_systems(Startup, setup_vehicle_assets)
            .add_systems(Update, sync_vehicle_bodies.in_set(FrameSet::Present));
    }
}

/// Body colors indexed by `Vehicle::color`.
pub const CAR_COLORS: [Color; PALETTE_SIZE] = [
    Color::srgb(0.78, 0.20, 0.22),
    Color::srgb(0.22, 0.45, 0.80),
    Color::srgb(0.85, 0.85, 0.82),
    Color::srgb(0.25, 0.62, 0.38),
    Color::srgb(0.86, 0.62, 0.22),
    Color::srgb(0.45, 0.30, 0.70),
    Color::srgb(0.35, 0.38, 0.42),
    Color::srgb(0.20, 0.70, 0.75),
];

/// Marks the entity drawing the vehicle with this registry id.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleBody(pub VehicleId);

/// Car dimensions in world units. Length runs along x, width along z.
#[derive(Resource, Clone, Debug)]
pub struct VehicleMeshConfig {
    pub length: f32,
    pub width: f32,
    pub body_height: f32,
    pub roof_length: f32,
    pub roof_width: f32,
    pub roof_height: f32,
    /// Roof center offset from the body center, along x and up.
    pub roof_offset: Vec2,
}

impl Default for VehicleMeshConfig {
    fn default() -> Self {
        Self {
            length: 2.0,
            width: 0.9,
            body_height: 0.55,
            roof_length: 1.1,
            roof_width: 0.8,
            roof_height: 0.30,
            roof_offset: Vec2::new(-0.1, 0.32),
        }
    }
}

#[derive(Resource)]
struct VehicleAssets {
    mesh: Handle<Mesh>,
    materials: Vec<Handle<StandardMaterial>>,
}

/// Body and roof as one mesh centered on the body.
pub fn generate_car_mesh(config: &VehicleMeshConfig) -> Mesh {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    let body_half = Vec3::new(config.length, config.body_height, config.width) / 2.0;
    add_box(&mut positions, &mut normals, &mut indices, -body_half, body_half);

    let roof_center = Vec3::new(config.roof_offset.x, config.roof_offset.y, 0.0);
    let roof_half = Vec3::new(config.roof_length, config.roof_height, config.roof_width) / 2.0;
    add_box(
        &mut positions,
        &mut normals,
        &mut indices,
        roof_center - roof_half,
        roof_center + roof_half,
    );

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Append an axis-aligned box with per-face normals.
fn add_box(
    positions: &mut Vec<[f32; 3]>,
    normals: &mut Vec<[f32; 3]>,
    indices: &mut Vec<u32>,
    min: Vec3,
    max: Vec3,
) {
    // Each face: outward normal and its corners counter-clockwise seen from outside
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, -1.0],
            [
                [max.x, min.y, min.z],
                [min.x, min.y, min.z],
                [min.x, max.y, min.z],
                [max.x, max.y, min.z],
            ],
        ),
        (
            [0.0, 0.0, 1.0],
            [
                [min.x, min.y, max.z],
                [max.x, min.y, max.z],
                [max.x, max.y, max.z],
                [min.x, max.y, max.z],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [min.x, min.y, min.z],
                [min.x, min.y, max.z],
                [min.x, max.y, max.z],
                [min.x, max.y, min.z],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [max.x, min.y, max.z],
                [max.x, min.y, min.z],
                [max.x, max.y, min.z],
                [max.x, max.y, max.z],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [min.x, max.y, max.z],
                [max.x, max.y, max.z],
                [max.x, max.y, min.z],
                [min.x, max.y, min.z],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [min.x, min.y, min.z],
                [max.x, min.y, min.z],
                [max.x, min.y, max.z],
                [min.x, min.y, max.z],
            ],
        ),
    ];

    for (normal, corners) in faces {
        let base = positions.len() as u32;
        positions.extend(corners);
        normals.extend([normal; 4]);
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

fn setup_vehicle_assets(
    mut commands: Commands,
    config: Res<VehicleMeshConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(generate_car_mesh(&config));
    let materials = CAR_COLORS
        .iter()
        .map(|color| {
            materials.add(StandardMaterial {
                base_color: *color,
                perceptual_roughness: 0.35,
                ..default()
            })
        })
        .collect();

    commands.insert_resource(VehicleAssets { mesh, materials });
}

/// Spawn, despawn and move bodies so they mirror the registry.
fn sync_vehicle_bodies(
    mut commands: Commands,
    registry: Res<VehicleRegistry>,
    layout: Res<SceneLayout>,
    assets: Option<Res<VehicleAssets>>,
    mut bodies: Query<(Entity, &VehicleBody, &mut Transform)>,
) {
    let Some(assets) = assets else {
        return;
    };

    let mut present = vec![false; registry.len()];
    for (entity, body, mut transform) in &mut bodies {
        let Some(vehicle) = registry.get(body.0) else {
            commands.entity(entity).despawn_recursive();
            continue;
        };
        present[body.0] = true;
        transform.translation = vehicle.world_position(&layout);
        transform.rotation = vehicle.world_rotation();
    }

    for (id, vehicle) in registry.iter() {
        if present[id] {
            continue;
        }
        let Some(material) = assets.materials.get(vehicle.color % assets.materials.len().max(1))
        else {
            continue;
        };
        commands.spawn((
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(vehicle.world_position(&layout))
                .with_rotation(vehicle.world_rotation()),
            VehicleBody(id),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn car_mesh_is_two_boxes() {
        let mesh = generate_car_mesh(&VehicleMeshConfig::default());
        assert_eq!(mesh.count_vertices(), 48);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 72);
    }

    #[test]
    fn roof_sits_on_the_body() {
        let config = VehicleMeshConfig::default();
        let mesh = generate_car_mesh(&config);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };

        let top = positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        let bottom = positions.iter().map(|p| p[1]).fold(f32::MAX, f32::min);
        assert!((top - (config.roof_offset.y + config.roof_height / 2.0)).abs() < 1e-6);
        assert!((bottom + config.body_height / 2.0).abs() < 1e-6);
    }

    #[test]
    fn face_normals_point_outward() {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();
        add_box(&mut positions, &mut normals, &mut indices, -Vec3::ONE, Vec3::ONE);

        for (position, normal) in positions.iter().zip(&normals) {
            let p = Vec3::from_array(*position);
            let n = Vec3::from_array(*normal);
            assert_eq!(p.dot(n), 1.0);
        }
    }

    #[test]
    fn palette_covers_every_color_index() {
        assert_eq!(CAR_COLORS.len(), PALETTE_SIZE);
    }
}
