#![warn(missing_docs)]
//! Player movement against the voxel field: the feet-anchored bounding box,
//! walk/jump/gravity kinematics, and the swept axis-separated collision
//! resolver.

mod aabb;
mod player;
mod sweep;

pub use aabb::*;
pub use player::*;
pub use sweep::*;
