//! View volume planes for point-in-view tests.
//!
//! Extracts the 6 bounding planes of the camera's view from its combined
//! clip-from-world matrix.

use bevy::prelude::*;

/// A plane `normal . p + d = 0`. For view volume planes the normal points
/// inward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.truncate();
        let length = normal.length();
        if length > 0.0 {
            Self {
                normal: normal / length,
                d: coefficients.w / length,
            }
        } else {
            Self {
                normal,
                d: coefficients.w,
            }
        }
    }

    /// Positive on the visible side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// The camera's view volume: left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewVolume {
    planes: [Plane; 6],
}

impl ViewVolume {
    /// Gribb-Hartmann extraction for Bevy's clip space (depth in `[0, 1]`).
    pub fn from_clip_from_world(clip_from_world: Mat4) -> Self {
        let row0 = clip_from_world.row(0);
        let row1 = clip_from_world.row(1);
        let row2 = clip_from_world.row(2);
        let row3 = clip_from_world.row(3);

        Self {
            planes: [
                Plane::from_coefficients(row3 + row0),
                Plane::from_coefficients(row3 - row0),
                Plane::from_coefficients(row3 + row1),
                Plane::from_coefficients(row3 - row1),
                Plane::from_coefficients(row2),
                Plane::from_coefficients(row3 - row2),
            ],
        }
    }

    /// View volume of a camera from its projection and world transform.
    pub fn from_camera(clip_from_view: Mat4, world_from_view: Mat4) -> Self {
        Self::from_clip_from_world(clip_from_view * world_from_view.inverse())
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.contains_sphere(point, 0.0)
    }

    /// True if any part of the sphere is inside.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}
