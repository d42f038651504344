//! Fixed per-direction face geometry.
//!
//! Every block face is one of six axis-aligned unit quads. The corner
//! positions, normal, texture corners, and triangulation are a lookup
//! table indexed by [`FaceDir`]; the builder only translates the corners
//! by the voxel's position.

use voxelforge_core::FaceDir;

/// Geometry template for one face direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    /// Corner positions relative to the voxel's min corner.
    pub corners: [[f32; 3]; 4],
    /// Outward unit normal, shared by all four corners.
    pub normal: [f32; 3],
    /// Texture coordinates per corner.
    pub uv: [[f32; 2]; 4],
    /// Corner indices forming two triangles, wound so the front side
    /// faces along the normal.
    pub triangles: [u32; 6],
}

/// Templates in [`FaceDir::ALL`] order.
const FACE_TABLE: [FaceGeometry; 6] = [
    // Up (+y)
    FaceGeometry {
        corners: [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        normal: [0.0, 1.0, 0.0],
        uv: [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        triangles: [0, 2, 1, 1, 2, 3],
    },
    // Down (-y)
    FaceGeometry {
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
        normal: [0.0, -1.0, 0.0],
        uv: [[1.0, 1.0], [0.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        triangles: [0, 1, 2, 1, 3, 2],
    },
    // North (-z)
    FaceGeometry {
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        normal: [0.0, 0.0, -1.0],
        uv: [[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        triangles: [0, 2, 1, 1, 2, 3],
    },
    // East (+x)
    FaceGeometry {
        corners: [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
        normal: [1.0, 0.0, 0.0],
        uv: [[1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 1.0]],
        triangles: [0, 1, 2, 1, 3, 2],
    },
    // South (+z)
    FaceGeometry {
        corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        normal: [0.0, 0.0, 1.0],
        uv: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        triangles: [0, 1, 2, 1, 3, 2],
    },
    // West (-x)
    FaceGeometry {
        corners: [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
        normal: [-1.0, 0.0, 0.0],
        uv: [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        triangles: [0, 2, 1, 1, 2, 3],
    },
];

/// Geometry template for `face`.
pub fn face_geometry(face: FaceDir) -> &'static FaceGeometry {
    &FACE_TABLE[face.index()]
}
