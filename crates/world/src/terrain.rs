//! Chunk generation: terrain columns, cave carving, tree stamping.
//!
//! Generation is a pure function of (seed, chunk position). The terrain
//! pass fills each column from the biome palette, skipping carved cells;
//! the structure pass then scans an expanded margin so trees rooted in
//! neighboring chunks overhang into this one identically no matter which
//! chunk generates first.

use rand::Rng;
use tracing::{debug, instrument};
use voxelforge_core::{BlockRegistry, WorldSeed};

use crate::biome::BiomeSet;
use crate::caves::CaveField;
use crate::chunk::{Chunk, ChunkPos, LocalPos, CHUNK_SIZE, MIN_HEIGHT};
use crate::trees::Tree;

/// Deterministic chunk generator.
pub struct TerrainGenerator {
    seed: WorldSeed,
    biomes: BiomeSet,
    caves: CaveField,
}

impl TerrainGenerator {
    /// Generator over the standard biome roster.
    pub fn new(seed: WorldSeed, registry: &BlockRegistry) -> Self {
        Self::with_biomes(seed, BiomeSet::standard(seed, registry))
    }

    /// Generator over a custom biome roster.
    pub fn with_biomes(seed: WorldSeed, biomes: BiomeSet) -> Self {
        Self {
            seed,
            biomes,
            caves: CaveField::new(seed),
        }
    }

    /// The world seed.
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The biome roster.
    pub fn biomes(&self) -> &BiomeSet {
        &self.biomes
    }

    /// The cave classifier.
    pub fn caves(&self) -> &CaveField {
        &self.caves
    }

    /// Build the chunk at `pos` from scratch.
    #[instrument(skip(self), fields(cx = pos.x, cz = pos.z))]
    pub fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos);
        self.terrain_pass(&mut chunk);
        self.structure_pass(&mut chunk);
        debug!(solids = chunk.solid_count(), "generated chunk");
        chunk
    }

    /// Fill every column with the owning biome's palette up to the blended
    /// terrain height, leaving carved cells empty.
    fn terrain_pass(&self, chunk: &mut Chunk) {
        let (ox, oz) = chunk.position().origin();
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let wx = ox + lx as i32;
                let wz = oz + lz as i32;
                let (fx, fz) = (f64::from(wx), f64::from(wz));

                let height = self.biomes.terrain_height_at(fx, fz);
                let biome = self.biomes.biome_at(fx, fz);
                let top = MIN_HEIGHT + height - 1;

                for y in MIN_HEIGHT..=top {
                    if self.caves.is_cave(wx, y, wz) {
                        continue;
                    }
                    let depth = top - y;
                    let id = if depth < biome.surface_depth as i32 {
                        biome.surface
                    } else if depth < (biome.surface_depth + biome.subsurface_depth) as i32 {
                        biome.subsurface
                    } else {
                        biome.deep
                    };
                    chunk.place(LocalPos { x: lx, y, z: lz }, id);
                }
            }
        }
    }

    /// Roll tree placement for every column within the canopy margin around
    /// the chunk. The per-column RNG stream makes a tree's presence and
    /// shape independent of which chunk's pass reaches it.
    fn structure_pass(&self, chunk: &mut Chunk) {
        let margin = self.biomes.max_canopy_radius();
        let (ox, oz) = chunk.position().origin();
        let size = CHUNK_SIZE as i32;

        for dx in -margin..size + margin {
            for dz in -margin..size + margin {
                let wx = ox + dx;
                let wz = oz + dz;
                let mut rng = self.seed.column_rng(wx, wz);

                let (fx, fz) = (f64::from(wx), f64::from(wz));
                let biome = self.biomes.biome_at(fx, fz);
                if rng.gen::<f64>() >= biome.tree.chance {
                    continue;
                }

                // No trees over cave mouths.
                let height = self.biomes.terrain_height_at(fx, fz);
                let ground = MIN_HEIGHT + height - 1;
                if self.caves.is_cave(wx, ground, wz) {
                    continue;
                }

                Tree::new(&biome.tree, wx, ground + 1, wz).stamp(chunk, &mut rng);
            }
        }
    }
}
