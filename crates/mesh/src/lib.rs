#![warn(missing_docs)]

//! Chunk mesh construction: surface-culled face geometry batched into
//! per-material draw ranges, plus the cache that owns built meshes on
//! behalf of the scene.

mod builder;
mod cache;
mod face;

pub use builder::*;
pub use cache::*;
pub use face::*;
