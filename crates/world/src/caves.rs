//! Cave carving via a 3D noise field.
//!
//! Carving only applies inside a fixed vertical band, and the carve
//! threshold tapers toward impossible at the band's edges so caves thin out
//! near the surface and the world floor instead of cutting off abruptly.

use crate::noise::{octave_seeds, OctaveSet};
use voxelforge_core::WorldSeed;

/// Seed offset for the cave octave primitives.
const CAVE_SEED_OFFSET: u64 = 2000;

/// Cave carving parameters.
#[derive(Debug, Clone)]
pub struct CaveParams {
    /// Octave amplitudes.
    pub intensities: Vec<f64>,
    /// Octave frequencies.
    pub resolutions: Vec<f64>,
    /// Lowest level caves may carve, inclusive.
    pub min_y: i32,
    /// Highest level caves may carve, inclusive.
    pub max_y: i32,
    /// Carve threshold at the band's midpoint, as a fraction of the
    /// composite's amplitude. Tapers linearly to 1.0 at the band edges.
    pub core_threshold: f64,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            intensities: vec![1.0, 0.4],
            resolutions: vec![0.015, 0.06],
            min_y: 4,
            max_y: 100,
            core_threshold: 0.55,
        }
    }
}

/// Deterministic cave classifier.
pub struct CaveField {
    noise: OctaveSet,
    params: CaveParams,
}

impl CaveField {
    /// Default parameters seeded from the world seed.
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_params(seed, CaveParams::default())
    }

    /// Custom parameters seeded from the world seed.
    pub fn with_params(seed: WorldSeed, params: CaveParams) -> Self {
        let count = params.intensities.len().min(params.resolutions.len());
        let seeds = octave_seeds(seed.value().wrapping_add(CAVE_SEED_OFFSET), count);
        Self {
            noise: OctaveSet::from_arrays(&params.intensities, &params.resolutions, &seeds),
            params,
        }
    }

    /// Whether the voxel at world coordinates is carved out.
    pub fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        if y < self.params.min_y || y > self.params.max_y {
            return false;
        }
        let sample = self
            .noise
            .sample_3d(f64::from(x), f64::from(y), f64::from(z));
        sample > self.threshold(y) * self.noise.total_intensity()
    }

    fn threshold(&self, y: i32) -> f64 {
        let mid = f64::from(self.params.min_y + self.params.max_y) / 2.0;
        let half = f64::from(self.params.max_y - self.params.min_y) / 2.0;
        if half <= 0.0 {
            return 1.0;
        }
        let edge_distance = ((f64::from(y) - mid).abs() / half).min(1.0);
        self.params.core_threshold + (1.0 - self.params.core_threshold) * edge_distance
    }
}
