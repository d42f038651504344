//! Deterministic seed derivation.
//!
//! World seeds are authored as strings and folded to a `u64`. Coordinate
//! channels mix with fixed odd multipliers so the derived streams are
//! independent of generation order and reproducible across runs.

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A world seed folded into a stable 64-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Fold an authored seed string (FNV-1a over its bytes).
    pub fn from_str_seed(seed: &str) -> Self {
        let value = seed
            .bytes()
            .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
        Self(value)
    }

    /// Raw seed value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Per-world stream, used to seed the noise octaves.
    pub fn world_rng(self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }

    /// Per-chunk stream keyed by chunk coordinates.
    pub fn chunk_rng(self, cx: i32, cz: i32) -> StdRng {
        StdRng::seed_from_u64(self.chunk_seed(cx, cz))
    }

    /// Per-column "location" stream keyed by world x/z, independent of the
    /// chunk that happens to be generating.
    pub fn column_rng(self, x: i32, z: i32) -> StdRng {
        StdRng::seed_from_u64(self.column_seed(x, z))
    }

    fn chunk_seed(self, cx: i32, cz: i32) -> u64 {
        self.0
            .wrapping_add((cx as u64).wrapping_mul(73_856_093))
            .wrapping_add((cz as u64).wrapping_mul(19_349_663))
            .wrapping_add(0xDEAD_BEEF)
    }

    fn column_seed(self, x: i32, z: i32) -> u64 {
        self.0
            .wrapping_add((x as u64).wrapping_mul(374_761_393))
            .wrapping_add((z as u64).wrapping_mul(668_265_263))
            .wrapping_add(0xCAFE_1234)
    }
}

impl From<u64> for WorldSeed {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
