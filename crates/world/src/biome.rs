//! Biome catalogue and temperature-driven terrain height.
//!
//! Every biome is a declarative [`BiomeConfig`] (block palette by name,
//! height octaves, tree parameters). A [`BiomeSet`] resolves those against a
//! [`BlockRegistry`] and answers the two per-column questions generation
//! asks: which biome owns a column, and how tall the terrain is there.

use anyhow::{bail, Result};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tracing::warn;
use voxelforge_core::{blocks, BlockId, BlockRegistry, WorldSeed};

use crate::chunk::WORLD_HEIGHT;
use crate::noise::{octave_seeds, OctaveSet};
use crate::trees::{TreeConfig, TreeDef};

/// Seed offset for the shared terrain octave primitives.
const TERRAIN_SEED_OFFSET: u64 = 1000;
/// Seed offset for the temperature field.
const TEMPERATURE_SEED_OFFSET: u64 = 3000;
/// Temperature frequency: one biome band spans roughly 2500 blocks.
const TEMPERATURE_RESOLUTION: f64 = 1.0 / 2500.0;

/// Block palette a biome fills columns with, top down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeBlocks {
    /// Topmost block name.
    pub surface: String,
    /// Layers of surface block, counted from the top.
    #[serde(default = "default_surface_depth")]
    pub surface_depth: u32,
    /// Block name under the surface layers.
    pub subsurface: String,
    /// Layers of subsurface block.
    #[serde(default = "default_subsurface_depth")]
    pub subsurface_depth: u32,
    /// Block name for everything below.
    pub deep: String,
}

fn default_surface_depth() -> u32 {
    1
}

fn default_subsurface_depth() -> u32 {
    4
}

/// Height field parameters for a biome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeTerrain {
    /// Height the octave composite is added to.
    pub base_height: f64,
    /// Octave amplitudes. Zipped with `resolutions`; extra entries on either
    /// side are ignored.
    pub intensities: Vec<f64>,
    /// Octave frequencies.
    pub resolutions: Vec<f64>,
}

/// Declarative biome description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeConfig {
    /// Identifier used in logs and configs.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub display_name: String,
    /// Position on the temperature axis; selection picks the nearest.
    pub temperature: f64,
    /// Column palette.
    pub blocks: BiomeBlocks,
    /// Height field.
    pub terrain: BiomeTerrain,
    /// Tree placement.
    pub trees: TreeConfig,
}

impl BiomeConfig {
    /// The built-in biome roster.
    pub fn standard_set() -> Vec<BiomeConfig> {
        vec![
            BiomeConfig {
                name: "hills".into(),
                display_name: "Grassy Hills".into(),
                temperature: 0.0,
                blocks: BiomeBlocks {
                    surface: "grass".into(),
                    surface_depth: 1,
                    subsurface: "dirt".into(),
                    subsurface_depth: 4,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 60.0,
                    intensities: vec![24.0, 8.0, 4.0, 2.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.02, 0.05, 0.1],
                },
                trees: TreeConfig::oak(0.005, 6, 8),
            },
            BiomeConfig {
                name: "mountains".into(),
                display_name: "Extreme Mountains".into(),
                temperature: -0.5,
                blocks: BiomeBlocks {
                    surface: "snow".into(),
                    surface_depth: 1,
                    subsurface: "snowy_grass".into(),
                    subsurface_depth: 1,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 120.0,
                    intensities: vec![70.0, 24.0, 8.0, 4.0, 2.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.02, 0.05, 0.1],
                },
                trees: TreeConfig::pine(0.001, 6, 8),
            },
            BiomeConfig {
                name: "plains".into(),
                display_name: "Grassy Plains".into(),
                temperature: 0.5,
                blocks: BiomeBlocks {
                    surface: "grass".into(),
                    surface_depth: 1,
                    subsurface: "dirt".into(),
                    subsurface_depth: 4,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 65.0,
                    intensities: vec![12.0, 8.0, 3.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.04],
                },
                trees: TreeConfig::oak(0.001, 8, 12),
            },
            BiomeConfig {
                name: "forest".into(),
                display_name: "Dense Forest".into(),
                temperature: 0.3,
                blocks: BiomeBlocks {
                    surface: "grass".into(),
                    surface_depth: 1,
                    subsurface: "dirt".into(),
                    subsurface_depth: 4,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 60.0,
                    intensities: vec![24.0, 8.0, 4.0, 2.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.02, 0.05, 0.1],
                },
                trees: TreeConfig::oak(0.04, 6, 9),
            },
            BiomeConfig {
                name: "desert".into(),
                display_name: "Sandy Desert".into(),
                temperature: 0.7,
                blocks: BiomeBlocks {
                    surface: "sand".into(),
                    surface_depth: 1,
                    subsurface: "sand".into(),
                    subsurface_depth: 4,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 65.0,
                    intensities: vec![12.0, 8.0, 3.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.04],
                },
                trees: TreeConfig::palm(0.0, 4, 5),
            },
            BiomeConfig {
                name: "pine_forest".into(),
                display_name: "Pine Forest".into(),
                temperature: -0.3,
                blocks: BiomeBlocks {
                    surface: "grass".into(),
                    surface_depth: 1,
                    subsurface: "dirt".into(),
                    subsurface_depth: 4,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 60.0,
                    intensities: vec![24.0, 8.0, 4.0, 2.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.02, 0.05, 0.1],
                },
                trees: TreeConfig::pine(0.04, 10, 12),
            },
            BiomeConfig {
                name: "pine_mountains".into(),
                display_name: "Mountainous Forest".into(),
                temperature: -0.8,
                blocks: BiomeBlocks {
                    surface: "snow".into(),
                    surface_depth: 1,
                    subsurface: "snowy_grass".into(),
                    subsurface_depth: 1,
                    deep: "stone".into(),
                },
                terrain: BiomeTerrain {
                    base_height: 120.0,
                    intensities: vec![50.0, 24.0, 8.0, 4.0, 2.0, 1.0],
                    resolutions: vec![0.003, 0.01, 0.02, 0.05, 0.1],
                },
                trees: TreeConfig::pine(0.04, 10, 12),
            },
        ]
    }
}

/// A biome with its palette resolved to block ids and its noise built.
pub struct BiomeDef {
    /// Identifier used in logs.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Position on the temperature axis.
    pub temperature: f64,
    /// Topmost block.
    pub surface: BlockId,
    /// Layers of `surface`, counted from the top.
    pub surface_depth: u32,
    /// Block under the surface layers.
    pub subsurface: BlockId,
    /// Layers of `subsurface`.
    pub subsurface_depth: u32,
    /// Everything below.
    pub deep: BlockId,
    /// Height the octave composite is added to.
    pub base_height: f64,
    /// Height octaves.
    pub height_noise: OctaveSet,
    /// Tree placement.
    pub tree: TreeDef,
}

/// The resolved biome roster plus the temperature field that selects
/// between entries.
pub struct BiomeSet {
    biomes: Vec<BiomeDef>,
    temperature: Perlin,
}

impl BiomeSet {
    /// Resolve `configs` against `registry`. Unknown block names fall back
    /// to stone with a warning; an empty roster is an error.
    pub fn from_configs(
        configs: &[BiomeConfig],
        seed: WorldSeed,
        registry: &BlockRegistry,
    ) -> Result<Self> {
        if configs.is_empty() {
            bail!("at least one biome is required");
        }
        Ok(Self::build(configs, seed, registry))
    }

    /// The built-in roster resolved against `registry`.
    pub fn standard(seed: WorldSeed, registry: &BlockRegistry) -> Self {
        Self::build(&BiomeConfig::standard_set(), seed, registry)
    }

    fn build(configs: &[BiomeConfig], seed: WorldSeed, registry: &BlockRegistry) -> Self {
        // One shared pool of octave primitives, so biomes with identical
        // octave configs produce identical height fields and blend flat.
        let max_octaves = configs
            .iter()
            .map(|c| c.terrain.intensities.len().min(c.terrain.resolutions.len()))
            .max()
            .unwrap_or(0);
        let seeds = octave_seeds(seed.value().wrapping_add(TERRAIN_SEED_OFFSET), max_octaves);

        let biomes = configs
            .iter()
            .map(|config| {
                let resolve = |name: &str| resolve_block(registry, &config.name, name);
                BiomeDef {
                    name: config.name.clone(),
                    display_name: config.display_name.clone(),
                    temperature: config.temperature,
                    surface: resolve(&config.blocks.surface),
                    surface_depth: config.blocks.surface_depth,
                    subsurface: resolve(&config.blocks.subsurface),
                    subsurface_depth: config.blocks.subsurface_depth,
                    deep: resolve(&config.blocks.deep),
                    base_height: config.terrain.base_height,
                    height_noise: OctaveSet::from_arrays(
                        &config.terrain.intensities,
                        &config.terrain.resolutions,
                        &seeds,
                    ),
                    tree: TreeDef {
                        shape: config.trees.shape,
                        chance: config.trees.chance,
                        canopy_radius: config.trees.canopy_radius,
                        trunk_height_min: config.trees.trunk_height_min,
                        trunk_height_max: config.trees.trunk_height_max,
                        wood: resolve(&config.trees.wood),
                        leaves: resolve(&config.trees.leaves),
                    },
                }
            })
            .collect();

        let temperature_seed = seed.value().wrapping_add(TEMPERATURE_SEED_OFFSET) as u32;
        Self {
            biomes,
            temperature: Perlin::new(temperature_seed),
        }
    }

    /// Resolved biomes in roster order.
    pub fn biomes(&self) -> &[BiomeDef] {
        &self.biomes
    }

    /// Largest canopy radius in the roster. Generation scans this margin
    /// around a chunk so overhanging trees rooted next door still stamp in.
    pub fn max_canopy_radius(&self) -> i32 {
        self.biomes
            .iter()
            .map(|b| b.tree.canopy_radius)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Temperature at a world column, roughly in [-1, 1].
    pub fn temperature(&self, x: f64, z: f64) -> f64 {
        self.temperature
            .get([x * TEMPERATURE_RESOLUTION, z * TEMPERATURE_RESOLUTION])
    }

    /// The biome whose temperature is nearest to `t`. Ties keep the earlier
    /// roster entry.
    pub fn biome_for_temperature(&self, t: f64) -> &BiomeDef {
        &self.biomes[self.nearest_index(t)]
    }

    /// The biome owning a world column.
    pub fn biome_at(&self, x: f64, z: f64) -> &BiomeDef {
        self.biome_for_temperature(self.temperature(x, z))
    }

    /// Terrain height (solid layer count) for a forced temperature.
    ///
    /// When `t` falls strictly between two roster temperatures the two
    /// bracketing biomes' heights blend with a cubic ease; outside the
    /// roster's range, or on an exact hit, the nearest biome's height is
    /// used unblended.
    pub fn height_for_temperature(&self, t: f64, x: f64, z: f64) -> i32 {
        let raw = self.blended_raw_height(t, x, z);
        (raw.floor() as i32).clamp(1, WORLD_HEIGHT as i32)
    }

    /// Terrain height (solid layer count) at a world column.
    pub fn terrain_height_at(&self, x: f64, z: f64) -> i32 {
        self.height_for_temperature(self.temperature(x, z), x, z)
    }

    fn nearest_index(&self, t: f64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, biome) in self.biomes.iter().enumerate() {
            let distance = (biome.temperature - t).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }

    fn raw_height(&self, index: usize, x: f64, z: f64) -> f64 {
        let biome = &self.biomes[index];
        biome.base_height + biome.height_noise.sample_2d(x, z)
    }

    fn blended_raw_height(&self, t: f64, x: f64, z: f64) -> f64 {
        // Bracket t: greatest roster temperature <= t and smallest >= t.
        let mut lower: Option<usize> = None;
        let mut upper: Option<usize> = None;
        for (i, biome) in self.biomes.iter().enumerate() {
            if biome.temperature <= t
                && lower.map_or(true, |j| biome.temperature > self.biomes[j].temperature)
            {
                lower = Some(i);
            }
            if biome.temperature >= t
                && upper.map_or(true, |j| biome.temperature < self.biomes[j].temperature)
            {
                upper = Some(i);
            }
        }

        match (lower, upper) {
            (Some(lo), Some(hi)) if lo != hi => {
                let span = self.biomes[hi].temperature - self.biomes[lo].temperature;
                if span <= f64::EPSILON {
                    return self.raw_height(self.nearest_index(t), x, z);
                }
                let frac = ((t - self.biomes[lo].temperature) / span).clamp(0.0, 1.0);
                let eased = ease(frac);
                let a = self.raw_height(lo, x, z);
                let b = self.raw_height(hi, x, z);
                a + (b - a) * eased
            }
            _ => self.raw_height(self.nearest_index(t), x, z),
        }
    }
}

/// Cubic ease-in-out: flat near both endpoints so biome cores stay pure.
fn ease(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = t - 1.0;
        4.0 * u * u * u + 1.0
    }
}

fn resolve_block(registry: &BlockRegistry, biome: &str, name: &str) -> BlockId {
    match registry.id_by_name(name) {
        Some(id) => id,
        None => {
            warn!(biome, block = name, "unknown block in biome palette, using stone");
            blocks::STONE
        }
    }
}
