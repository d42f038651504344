//! Block type registry.
//!
//! Block ids are dense indices into a fixed table resolved once at startup.
//! Human-readable names exist for config authoring only; runtime lookups go
//! through `BlockId` and `MaterialId`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Numeric block type identifier (index into the registry table).
pub type BlockId = u16;

/// Reserved id marking the absence of a voxel. Never a valid registry entry.
pub const AIR: BlockId = 4095;

/// Largest id the save codec can represent (12 bits, with [`AIR`] reserved).
pub const MAX_BLOCK_ID: BlockId = 4094;

/// Handle to one resolved face material (texture slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u16);

/// Faces corresponding to a block's six sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceDir {
    /// Positive Y / top face.
    Up,
    /// Negative Y / bottom face.
    Down,
    /// Negative Z face.
    North,
    /// Positive X face.
    East,
    /// Positive Z face.
    South,
    /// Negative X face.
    West,
}

impl FaceDir {
    /// All six faces in material-table order.
    pub const ALL: [FaceDir; 6] = [
        FaceDir::Up,
        FaceDir::Down,
        FaceDir::North,
        FaceDir::East,
        FaceDir::South,
        FaceDir::West,
    ];

    /// Unit offset toward the neighboring voxel across this face.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            FaceDir::Up => (0, 1, 0),
            FaceDir::Down => (0, -1, 0),
            FaceDir::North => (0, 0, -1),
            FaceDir::East => (1, 0, 0),
            FaceDir::South => (0, 0, 1),
            FaceDir::West => (-1, 0, 0),
        }
    }

    /// Index into per-block material tables.
    pub fn index(self) -> usize {
        match self {
            FaceDir::Up => 0,
            FaceDir::Down => 1,
            FaceDir::North => 2,
            FaceDir::East => 3,
            FaceDir::South => 4,
            FaceDir::West => 5,
        }
    }
}

/// Per-face texture overrides in authored block configs.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FaceTextureConfig {
    /// Apply to all faces when specified.
    pub all: Option<String>,
    /// Apply to the four side faces when specified.
    pub side: Option<String>,
    /// Specific texture for the top face.
    pub top: Option<String>,
    /// Specific texture for the bottom face.
    pub bottom: Option<String>,
}

/// One authored block definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockConfig {
    /// Human-readable identifier (e.g. "grass").
    pub name: String,
    /// Base texture name (defaults to `name`).
    #[serde(default)]
    pub texture: Option<String>,
    /// Optional per-face textures.
    #[serde(default)]
    pub textures: Option<FaceTextureConfig>,
}

impl BlockConfig {
    fn uniform(name: &str) -> Self {
        Self {
            name: name.to_string(),
            texture: None,
            textures: None,
        }
    }

    fn faced(name: &str, top: &str, bottom: &str, side: &str) -> Self {
        Self {
            name: name.to_string(),
            texture: None,
            textures: Some(FaceTextureConfig {
                all: None,
                side: Some(side.to_string()),
                top: Some(top.to_string()),
                bottom: Some(bottom.to_string()),
            }),
        }
    }
}

/// Errors emitted while resolving a block table.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two entries share a name.
    #[error("duplicate block name `{0}`")]
    DuplicateName(String),
    /// More entries than the 12-bit id space allows.
    #[error("too many block types ({0}); ids must stay below {MAX_BLOCK_ID}")]
    TooManyBlocks(usize),
}

/// A resolved block definition.
#[derive(Debug, Clone)]
pub struct BlockDef {
    /// Authoring name.
    pub name: String,
    /// Materials in [`FaceDir::ALL`] order.
    materials: [MaterialId; 6],
}

impl BlockDef {
    /// Material for the given face.
    pub fn material_for(&self, face: FaceDir) -> MaterialId {
        self.materials[face.index()]
    }
}

/// Registry storing resolved block definitions keyed by dense id.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    defs: Vec<BlockDef>,
    name_to_id: HashMap<String, BlockId>,
    material_names: Vec<String>,
}

impl BlockRegistry {
    /// Resolve authored configs into a dense table.
    pub fn from_configs(configs: &[BlockConfig]) -> Result<Self, RegistryError> {
        if configs.len() > MAX_BLOCK_ID as usize {
            return Err(RegistryError::TooManyBlocks(configs.len()));
        }
        let mut seen = HashMap::new();
        for (id, cfg) in configs.iter().enumerate() {
            if seen.insert(cfg.name.clone(), id).is_some() {
                return Err(RegistryError::DuplicateName(cfg.name.clone()));
            }
        }
        Ok(Self::build(configs))
    }

    fn build(configs: &[BlockConfig]) -> Self {
        let mut defs = Vec::with_capacity(configs.len());
        let mut name_to_id = HashMap::new();
        let mut material_names: Vec<String> = Vec::new();
        let mut material_ids: HashMap<String, MaterialId> = HashMap::new();

        let mut intern = |name: &str,
                          names: &mut Vec<String>,
                          ids: &mut HashMap<String, MaterialId>| {
            if let Some(id) = ids.get(name) {
                return *id;
            }
            let id = MaterialId(names.len() as u16);
            names.push(name.to_string());
            ids.insert(name.to_string(), id);
            id
        };

        for (id, cfg) in configs.iter().enumerate() {
            let base = cfg.texture.clone().unwrap_or_else(|| cfg.name.clone());
            let mut faces = [base.clone(), base.clone(), base.clone(), base.clone(), base.clone(), base];
            if let Some(tex) = &cfg.textures {
                if let Some(all) = &tex.all {
                    faces = [all.clone(), all.clone(), all.clone(), all.clone(), all.clone(), all.clone()];
                }
                if let Some(side) = &tex.side {
                    for face in [FaceDir::North, FaceDir::East, FaceDir::South, FaceDir::West] {
                        faces[face.index()] = side.clone();
                    }
                }
                if let Some(top) = &tex.top {
                    faces[FaceDir::Up.index()] = top.clone();
                }
                if let Some(bottom) = &tex.bottom {
                    faces[FaceDir::Down.index()] = bottom.clone();
                }
            }

            let materials = [
                intern(&faces[0], &mut material_names, &mut material_ids),
                intern(&faces[1], &mut material_names, &mut material_ids),
                intern(&faces[2], &mut material_names, &mut material_ids),
                intern(&faces[3], &mut material_names, &mut material_ids),
                intern(&faces[4], &mut material_names, &mut material_ids),
                intern(&faces[5], &mut material_names, &mut material_ids),
            ];
            name_to_id.insert(cfg.name.clone(), id as BlockId);
            defs.push(BlockDef {
                name: cfg.name.clone(),
                materials,
            });
        }

        Self {
            defs,
            name_to_id,
            material_names,
        }
    }

    /// Look up a definition by id.
    pub fn def(&self, id: BlockId) -> Option<&BlockDef> {
        self.defs.get(id as usize)
    }

    /// Resolve a block id by authoring name.
    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Material handle for a block face. Unknown ids map to material 0.
    pub fn material_for(&self, id: BlockId, face: FaceDir) -> MaterialId {
        self.def(id)
            .map(|d| d.material_for(face))
            .unwrap_or(MaterialId(0))
    }

    /// Texture name behind a material handle.
    pub fn material_name(&self, material: MaterialId) -> Option<&str> {
        self.material_names.get(material.0 as usize).map(|s| s.as_str())
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for BlockRegistry {
    /// The built-in block set. Ids are table order and stable across runs.
    fn default() -> Self {
        Self::build(&[
            BlockConfig::faced("grass", "grass", "dirt", "grass_side"),
            BlockConfig::uniform("dirt"),
            BlockConfig::uniform("stone"),
            BlockConfig::faced("wood", "log_top", "log_top", "log_side"),
            BlockConfig::uniform("leaves"),
            BlockConfig::uniform("sand"),
            BlockConfig::uniform("snow"),
            BlockConfig::faced("snowy_grass", "snow", "dirt", "snowy_grass_side"),
            BlockConfig::uniform("pine_leaves"),
        ])
    }
}

/// Well-known ids of the built-in block set.
pub mod blocks {
    use super::BlockId;

    /// Grass surface block.
    pub const GRASS: BlockId = 0;
    /// Dirt subsurface block.
    pub const DIRT: BlockId = 1;
    /// Stone deep block; also the fallback for unknown palette names.
    pub const STONE: BlockId = 2;
    /// Tree trunk.
    pub const WOOD: BlockId = 3;
    /// Oak canopy.
    pub const LEAVES: BlockId = 4;
    /// Desert surface.
    pub const SAND: BlockId = 5;
    /// Mountain surface.
    pub const SNOW: BlockId = 6;
    /// Snow-covered grass.
    pub const SNOWY_GRASS: BlockId = 7;
    /// Pine canopy.
    pub const PINE_LEAVES: BlockId = 8;
}
