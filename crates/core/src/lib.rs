#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod block;
pub mod seed;

pub use block::{
    blocks, BlockConfig, BlockDef, BlockId, BlockRegistry, FaceDir, FaceTextureConfig, MaterialId,
    RegistryError, AIR, MAX_BLOCK_ID,
};
pub use seed::WorldSeed;
