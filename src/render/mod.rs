//! Rendering of the roadworks scene and the vehicles driving through it.

use bevy::prelude::*;

pub mod roadworks;
pub mod vehicle_meshes;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(roadworks::RoadworksScenePlugin)
            .add_plugins(vehicle_meshes::VehicleMeshesPlugin);
    }
}
