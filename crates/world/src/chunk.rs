use std::fmt;

use voxelforge_core::{BlockId, AIR};

/// Chunk side length (X and Z axes) in voxels.
pub const CHUNK_SIZE: usize = 16;
/// Lowest valid voxel y.
pub const MIN_HEIGHT: i32 = 0;
/// Highest valid voxel y (inclusive).
pub const MAX_HEIGHT: i32 = 255;
/// Number of vertical voxel levels.
pub const WORLD_HEIGHT: usize = (MAX_HEIGHT - MIN_HEIGHT + 1) as usize;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * WORLD_HEIGHT;

/// Chunk-local position. `x`/`z` are offsets within the chunk, `y` is the
/// world height level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    /// Offset within the chunk, `0..CHUNK_SIZE`.
    pub x: usize,
    /// World height level.
    pub y: i32,
    /// Offset within the chunk, `0..CHUNK_SIZE`.
    pub z: usize,
}

impl LocalPos {
    /// Convert to the canonical linear index: y-major, then x, then z. This
    /// order matches the save codec's iteration, so encoding is a straight
    /// scan over the backing array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE);
        debug_assert!((MIN_HEIGHT..=MAX_HEIGHT).contains(&self.y));
        debug_assert!(self.z < CHUNK_SIZE);
        ((self.y - MIN_HEIGHT) as usize * CHUNK_SIZE + self.x) * CHUNK_SIZE + self.z
    }

    /// Inverse of [`LocalPos::index`].
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < CHUNK_VOLUME);
        Self {
            x: (index / CHUNK_SIZE) % CHUNK_SIZE,
            y: (index / (CHUNK_SIZE * CHUNK_SIZE)) as i32 + MIN_HEIGHT,
            z: index % CHUNK_SIZE,
        }
    }
}

/// Chunk coordinate (X, Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    /// Chunk-space x.
    pub x: i32,
    /// Chunk-space z.
    pub z: i32,
}

impl ChunkPos {
    /// Coordinate from chunk-space components.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given world x/z.
    pub fn from_world(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE as i32),
            z: z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// World coordinates of this chunk's minimum corner.
    pub fn origin(self) -> (i32, i32) {
        (self.x * CHUNK_SIZE as i32, self.z * CHUNK_SIZE as i32)
    }

    /// Chebyshev distance to another chunk (max of axis deltas).
    pub fn chebyshev(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Chunk lifecycle flags.
    pub struct ChunkFlags: u8 {
        /// A mesh for this chunk is currently attached to the scene.
        const LOADED = 0b0000_0001;
        /// Voxel contents changed since the last mesh build.
        const MESH_DIRTY = 0b0000_0010;
        /// Contents diverge from pure regeneration; must be persisted.
        const MODIFIED = 0b0000_0100;
    }
}

impl Default for ChunkFlags {
    fn default() -> Self {
        ChunkFlags::empty()
    }
}

/// A 16×16 column of voxels spanning the full world height, plus lifecycle
/// flags. Voxels are stored densely with [`AIR`] marking absence.
pub struct Chunk {
    position: ChunkPos,
    voxels: Vec<BlockId>,
    flags: ChunkFlags,
}

impl Chunk {
    /// Allocate a fresh all-air chunk. It starts mesh-dirty: nothing has been
    /// built for it yet.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            voxels: vec![AIR; CHUNK_VOLUME],
            flags: ChunkFlags::MESH_DIRTY,
        }
    }

    /// Rebuild a chunk from raw voxel storage in canonical index order.
    /// `voxels` must hold exactly [`CHUNK_VOLUME`] entries. The chunk starts
    /// mesh-dirty like a fresh one.
    pub fn from_voxels(position: ChunkPos, voxels: Vec<BlockId>) -> Self {
        debug_assert_eq!(voxels.len(), CHUNK_VOLUME);
        Self {
            position,
            voxels,
            flags: ChunkFlags::MESH_DIRTY,
        }
    }

    /// The chunk's coordinate.
    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Block at a local position, `None` for air.
    pub fn get(&self, pos: LocalPos) -> Option<BlockId> {
        let id = self.voxels[pos.index()];
        (id != AIR).then_some(id)
    }

    /// Whether a solid voxel occupies the local position.
    #[inline]
    pub fn is_solid(&self, pos: LocalPos) -> bool {
        self.voxels[pos.index()] != AIR
    }

    /// Insert a block if the cell is empty. Returns whether anything changed;
    /// occupied cells are left untouched, and the air sentinel is not a
    /// placeable id.
    pub fn place(&mut self, pos: LocalPos, id: BlockId) -> bool {
        let idx = pos.index();
        if id == AIR || self.voxels[idx] != AIR {
            return false;
        }
        self.voxels[idx] = id;
        self.flags.insert(ChunkFlags::MESH_DIRTY);
        true
    }

    /// Clear a cell. Returns whether anything changed; empty cells are left
    /// untouched.
    pub fn remove(&mut self, pos: LocalPos) -> bool {
        let idx = pos.index();
        if self.voxels[idx] == AIR {
            return false;
        }
        self.voxels[idx] = AIR;
        self.flags.insert(ChunkFlags::MESH_DIRTY);
        true
    }

    /// Current lifecycle flags.
    pub fn flags(&self) -> ChunkFlags {
        self.flags
    }

    /// Mark the chunk as diverging from pure regeneration.
    pub fn mark_modified(&mut self) {
        self.flags.insert(ChunkFlags::MODIFIED);
    }

    /// Record a finished mesh build: clears the dirty bit and marks the chunk
    /// as attached to the scene.
    pub fn mark_meshed(&mut self) {
        self.flags.remove(ChunkFlags::MESH_DIRTY);
        self.flags.insert(ChunkFlags::LOADED);
    }

    /// Detach from the scene, keeping voxel data and the remaining flags.
    pub fn detach(&mut self) {
        self.flags.remove(ChunkFlags::LOADED);
    }

    /// Re-attach a previously detached chunk.
    pub fn attach(&mut self) {
        self.flags.insert(ChunkFlags::LOADED);
    }

    /// Raw voxel storage in canonical index order.
    pub fn raw_voxels(&self) -> &[BlockId] {
        &self.voxels
    }

    /// Number of present (non-air) voxels.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|&&id| id != AIR).count()
    }
}
