//! Axis-aligned boxes in world space.

use glam::DVec3;

/// Axis-aligned bounding box with `f64` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Box from corners, `min <= max` per axis.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
        Self { min, max }
    }

    /// The unit cube of the voxel cell at integer coordinates.
    pub fn voxel(x: i32, y: i32, z: i32) -> Self {
        let min = DVec3::new(f64::from(x), f64::from(y), f64::from(z));
        Self {
            min,
            max: min + DVec3::ONE,
        }
    }

    /// Strict overlap test. Boxes sharing only a face, edge, or corner do
    /// not intersect, so a body resting exactly on a surface is free of it.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// The box moved by `offset`.
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
