//! Multi-octave noise fields for terrain height and cave density.

use noise::{NoiseFn, Perlin};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One noise layer: amplitude (intensity) plus sampling frequency
/// (resolution).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Octave {
    /// Amplitude the layer contributes to the composite.
    pub intensity: f64,
    /// Coordinate scale the layer samples at.
    pub resolution: f64,
}

/// Draw `count` octave primitive seeds from a base seed. Every caller with
/// the same base gets the same sequence, which is what lets two biomes with
/// identical octave configs share the exact same height field.
pub fn octave_seeds(base: u64, count: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(base);
    (0..count).map(|_| rng.gen()).collect()
}

/// A weighted sum of independently seeded Perlin octaves:
/// `Σ_i perlin_i(x·resolution_i, z·resolution_i) · intensity_i`.
///
/// The composite is deliberately NOT renormalized; its range is roughly
/// ±[`OctaveSet::total_intensity`].
pub struct OctaveSet {
    layers: Vec<(Octave, Perlin)>,
}

impl OctaveSet {
    /// Build from explicit octaves, taking primitive seeds positionally from
    /// `seeds`. Seed slots beyond the octave count are ignored; octaves
    /// beyond the seed count are dropped.
    pub fn new(octaves: &[Octave], seeds: &[u32]) -> Self {
        let layers = octaves
            .iter()
            .zip(seeds)
            .map(|(oct, &seed)| (*oct, Perlin::new(seed)))
            .collect();
        Self { layers }
    }

    /// Build from parallel intensity/resolution arrays. Mismatched lengths
    /// zip to the shorter array.
    pub fn from_arrays(intensities: &[f64], resolutions: &[f64], seeds: &[u32]) -> Self {
        let octaves: Vec<Octave> = intensities
            .iter()
            .zip(resolutions)
            .map(|(&intensity, &resolution)| Octave {
                intensity,
                resolution,
            })
            .collect();
        Self::new(&octaves, seeds)
    }

    /// Composite 2D sample.
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.layers
            .iter()
            .map(|(oct, perlin)| {
                perlin.get([x * oct.resolution, z * oct.resolution]) * oct.intensity
            })
            .sum()
    }

    /// Composite 3D sample.
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.layers
            .iter()
            .map(|(oct, perlin)| {
                perlin.get([x * oct.resolution, y * oct.resolution, z * oct.resolution])
                    * oct.intensity
            })
            .sum()
    }

    /// Sum of layer amplitudes (the composite's theoretical bound).
    pub fn total_intensity(&self) -> f64 {
        self.layers.iter().map(|(oct, _)| oct.intensity).sum()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the set has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
