#![warn(missing_docs)]
//! Deterministic voxel terrain: biome blending, cave carving, tree stamping,
//! chunk storage and streaming, and the save format.

mod biome;
mod caves;
mod chunk;
mod codec;
mod lifecycle;
mod noise;
mod save;
mod store;
mod terrain;
mod trees;

pub use biome::*;
pub use caves::*;
pub use chunk::*;
pub use codec::*;
pub use lifecycle::*;
pub use save::*;
pub use self::noise::*;
pub use store::*;
pub use terrain::*;
pub use trees::*;
