//! Chunk residency and the world-coordinate mutation API.
//!
//! [`World`] owns every resident chunk in a `BTreeMap` keyed by
//! [`ChunkPos`], so iteration order is deterministic, and routes block
//! edits to the owning chunk. Player edits mark chunks for persistence;
//! generation writes never do.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;
use voxelforge_core::{BlockId, BlockRegistry, WorldSeed, AIR};

use crate::chunk::{Chunk, ChunkFlags, ChunkPos, LocalPos, MAX_HEIGHT, MIN_HEIGHT};
use crate::terrain::TerrainGenerator;

/// Who asked for a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationSource {
    /// A player edit: marks the chunk modified so it gets persisted.
    Player,
    /// Generation machinery: reproducible from the seed, never persisted.
    Generation,
}

/// What [`World::ensure_chunk`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The chunk did not exist and was generated.
    Generated,
    /// The chunk existed but was detached; it is attached again. Its mesh
    /// may still be valid, so the caller decides whether to rebuild.
    Reattached,
    /// The chunk was already resident and attached.
    Resident,
}

/// The chunk store plus its terrain generator.
pub struct World {
    generator: TerrainGenerator,
    /// Authored seed string; the folded [`WorldSeed`] cannot be reversed, so
    /// saves carry this label instead.
    seed_text: String,
    chunks: BTreeMap<ChunkPos, Chunk>,
    /// Detached chunks in least-recently-detached order, candidates for
    /// eviction once over `cold_cap`.
    cold: LruCache<ChunkPos, ()>,
    cold_cap: Option<NonZeroUsize>,
}

impl World {
    /// World with the standard biome roster.
    pub fn new(seed: WorldSeed, registry: &BlockRegistry) -> Self {
        Self::with_generator(TerrainGenerator::new(seed, registry))
    }

    /// World from an authored seed string, the form saves and the CLI use.
    pub fn from_seed_text(text: impl Into<String>, registry: &BlockRegistry) -> Self {
        let text = text.into();
        let seed = WorldSeed::from_str_seed(&text);
        let mut world = Self::with_generator(TerrainGenerator::new(seed, registry));
        world.seed_text = text;
        world
    }

    /// World from an authored seed string over a custom generator, e.g. one
    /// built from an overridden biome roster. The generator's own seed must
    /// already match the text's folded value.
    pub fn from_seed_text_with_generator(
        text: impl Into<String>,
        generator: TerrainGenerator,
    ) -> Self {
        let mut world = Self::with_generator(generator);
        world.seed_text = text.into();
        world
    }

    /// World over a custom generator.
    pub fn with_generator(generator: TerrainGenerator) -> Self {
        let seed_text = generator.seed().value().to_string();
        Self {
            generator,
            seed_text,
            chunks: BTreeMap::new(),
            cold: LruCache::unbounded(),
            cold_cap: None,
        }
    }

    /// Cap the number of detached, unmodified chunks kept resident. `None`
    /// keeps everything. Modified chunks are never evicted.
    pub fn set_cold_cap(&mut self, cap: Option<NonZeroUsize>) {
        self.cold_cap = cap;
        self.trim_cold();
    }

    /// The world seed.
    pub fn seed(&self) -> WorldSeed {
        self.generator.seed()
    }

    /// The authored seed label carried into saves.
    pub fn seed_text(&self) -> &str {
        &self.seed_text
    }

    /// The terrain generator.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Resident chunk at a chunk coordinate.
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Mutable resident chunk at a chunk coordinate.
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Whether a chunk is resident.
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Resident chunks in deterministic (x, then z) order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Chunks that diverge from pure regeneration, in deterministic order.
    pub fn modified_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks
            .values()
            .filter(|c| c.flags().contains(ChunkFlags::MODIFIED))
    }

    /// Block at world coordinates. `None` for air, out-of-range heights,
    /// and non-resident chunks alike.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&y) {
            return None;
        }
        let (pos, local) = split_world(x, y, z);
        self.chunks.get(&pos).and_then(|chunk| chunk.get(local))
    }

    /// Whether a solid voxel occupies the world coordinates.
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.block_at(x, y, z).is_some()
    }

    /// Make a chunk resident and attached, generating it if needed.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> EnsureOutcome {
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            if chunk.flags().contains(ChunkFlags::LOADED) {
                return EnsureOutcome::Resident;
            }
            chunk.attach();
            self.cold.pop(&pos);
            return EnsureOutcome::Reattached;
        }
        let chunk = self.generator.generate_chunk(pos);
        self.chunks.insert(pos, chunk);
        EnsureOutcome::Generated
    }

    /// Place a block at world coordinates. No-ops (returning `false`) when
    /// the height is out of range, the cell is occupied, or `id` is the air
    /// sentinel. A player placing into a non-resident chunk generates that
    /// chunk first; generation writes into non-resident chunks are dropped.
    pub fn place(&mut self, id: BlockId, x: i32, y: i32, z: i32, source: MutationSource) -> bool {
        if id == AIR || !(MIN_HEIGHT..=MAX_HEIGHT).contains(&y) {
            return false;
        }
        let (pos, local) = split_world(x, y, z);
        if !self.chunks.contains_key(&pos) {
            match source {
                MutationSource::Player => {
                    self.ensure_chunk(pos);
                }
                MutationSource::Generation => return false,
            }
        }
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        let placed = chunk.place(local, id);
        if placed && source == MutationSource::Player {
            chunk.mark_modified();
        }
        placed
    }

    /// Remove the block at world coordinates. No-ops (returning `false`)
    /// when the height is out of range, the cell is empty, or the chunk is
    /// not resident.
    pub fn remove(&mut self, x: i32, y: i32, z: i32, source: MutationSource) -> bool {
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&y) {
            return false;
        }
        let (pos, local) = split_world(x, y, z);
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        let removed = chunk.remove(local);
        if removed && source == MutationSource::Player {
            chunk.mark_modified();
        }
        removed
    }

    /// Detach a chunk from the scene, keeping its data resident. Returns
    /// whether the chunk was attached.
    pub fn detach_chunk(&mut self, pos: ChunkPos) -> bool {
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        if !chunk.flags().contains(ChunkFlags::LOADED) {
            return false;
        }
        chunk.detach();
        self.cold.push(pos, ());
        self.trim_cold();
        true
    }

    /// Record that a chunk's mesh has been rebuilt and attached.
    pub fn mark_meshed(&mut self, pos: ChunkPos) {
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            chunk.mark_meshed();
            self.cold.pop(&pos);
        }
    }

    /// Insert a chunk wholesale, replacing any resident one. Used when
    /// restoring persisted state.
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        let pos = chunk.position();
        self.cold.pop(&pos);
        self.chunks.insert(pos, chunk);
    }

    /// Drop every resident chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.cold.clear();
    }

    fn trim_cold(&mut self) {
        let Some(cap) = self.cold_cap else { return };
        while self.cold.len() > cap.get() {
            let Some((pos, ())) = self.cold.pop_lru() else {
                break;
            };
            let evictable = self.chunks.get(&pos).is_some_and(|c| {
                let flags = c.flags();
                !flags.contains(ChunkFlags::LOADED) && !flags.contains(ChunkFlags::MODIFIED)
            });
            if evictable {
                self.chunks.remove(&pos);
                debug!(chunk = %pos, "evicted cold chunk");
            }
        }
    }
}

/// Split world coordinates into the owning chunk and the local cell.
fn split_world(x: i32, y: i32, z: i32) -> (ChunkPos, LocalPos) {
    let pos = ChunkPos::from_world(x, z);
    let (ox, oz) = pos.origin();
    (
        pos,
        LocalPos {
            x: (x - ox) as usize,
            y,
            z: (z - oz) as usize,
        },
    )
}
