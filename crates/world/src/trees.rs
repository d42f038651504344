//! Tree stamping for chunk decoration.
//!
//! Trees are placed from per-biome parameters and a per-column RNG stream,
//! so the same tree grows at the same column regardless of which chunk's
//! generation pass reaches it first.

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use voxelforge_core::BlockId;

use crate::chunk::{Chunk, LocalPos, CHUNK_SIZE, MAX_HEIGHT, MIN_HEIGHT};

/// How quickly leaf density falls off toward the canopy edge.
const CANOPY_FALLOFF: f64 = 0.2;

/// Canopy silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    /// Spherical canopy around the trunk top.
    Oak,
    /// Conical stack of discs with a two-block cap.
    Pine,
    /// Bare trunk with four drooping fronds.
    Palm,
}

/// Declarative tree parameters with block names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Canopy silhouette.
    pub shape: TreeKind,
    /// Per-column spawn probability.
    pub chance: f64,
    /// Horizontal canopy reach in blocks.
    pub canopy_radius: i32,
    /// Shortest trunk, inclusive.
    pub trunk_height_min: u32,
    /// Tallest trunk, inclusive.
    pub trunk_height_max: u32,
    /// Trunk block name.
    pub wood: String,
    /// Canopy block name.
    pub leaves: String,
}

impl TreeConfig {
    /// Oak with the stock wood/leaves palette.
    pub fn oak(chance: f64, trunk_height_min: u32, trunk_height_max: u32) -> Self {
        Self {
            shape: TreeKind::Oak,
            chance,
            canopy_radius: 3,
            trunk_height_min,
            trunk_height_max,
            wood: "wood".into(),
            leaves: "leaves".into(),
        }
    }

    /// Pine with needle leaves.
    pub fn pine(chance: f64, trunk_height_min: u32, trunk_height_max: u32) -> Self {
        Self {
            shape: TreeKind::Pine,
            chance,
            canopy_radius: 3,
            trunk_height_min,
            trunk_height_max,
            wood: "wood".into(),
            leaves: "pine_leaves".into(),
        }
    }

    /// Palm with the stock leaves.
    pub fn palm(chance: f64, trunk_height_min: u32, trunk_height_max: u32) -> Self {
        Self {
            shape: TreeKind::Palm,
            chance,
            canopy_radius: 3,
            trunk_height_min,
            trunk_height_max,
            wood: "wood".into(),
            leaves: "leaves".into(),
        }
    }
}

/// Tree parameters resolved to block ids.
#[derive(Debug, Clone)]
pub struct TreeDef {
    /// Canopy silhouette.
    pub shape: TreeKind,
    /// Per-column spawn probability.
    pub chance: f64,
    /// Horizontal canopy reach in blocks.
    pub canopy_radius: i32,
    /// Shortest trunk, inclusive.
    pub trunk_height_min: u32,
    /// Tallest trunk, inclusive.
    pub trunk_height_max: u32,
    /// Trunk block.
    pub wood: BlockId,
    /// Canopy block.
    pub leaves: BlockId,
}

/// A tree ready to stamp: resolved parameters plus the world root (the
/// first air cell above the ground column).
pub struct Tree<'a> {
    def: &'a TreeDef,
    x: i32,
    y: i32,
    z: i32,
}

impl<'a> Tree<'a> {
    /// Tree rooted at world coordinates.
    pub fn new(def: &'a TreeDef, x: i32, y: i32, z: i32) -> Self {
        Self { def, x, y, z }
    }

    /// Stamp the tree into `chunk`. Writes outside the chunk's footprint or
    /// the world height range are dropped; occupied cells are never
    /// overwritten. The first `rng` draw picks the trunk height, so callers
    /// must hand over the same stream position for every chunk the tree
    /// overhangs.
    pub fn stamp(&self, chunk: &mut Chunk, rng: &mut StdRng) {
        let span = self
            .def
            .trunk_height_max
            .saturating_sub(self.def.trunk_height_min)
            + 1;
        let trunk_height =
            self.def.trunk_height_min as i32 + (rng.gen::<f64>() * f64::from(span)) as i32;

        for i in 0..trunk_height {
            self.place(chunk, self.x, self.y + i, self.z, self.def.wood);
        }

        match self.def.shape {
            TreeKind::Oak => self.stamp_oak(chunk, trunk_height, rng),
            TreeKind::Pine => self.stamp_pine(chunk, trunk_height, rng),
            TreeKind::Palm => self.stamp_palm(chunk, trunk_height),
        }
    }

    /// Irregular leaf sphere centered two cells below the trunk top. The
    /// trunk's own column is skipped so the log shows through the canopy.
    fn stamp_oak(&self, chunk: &mut Chunk, trunk_height: i32, rng: &mut StdRng) {
        let radius = self.def.canopy_radius;
        let r2 = radius * radius;
        let center_y = self.y + trunk_height - 2;

        for ly in -radius..=radius {
            for lx in -radius..=radius {
                for lz in -radius..=radius {
                    if lx == 0 && lz == 0 {
                        continue;
                    }
                    let d2 = lx * lx + ly * ly + lz * lz;
                    if d2 >= r2 {
                        continue;
                    }
                    let keep = 1.0 - (f64::from(d2) / f64::from(r2)) * CANOPY_FALLOFF;
                    if rng.gen::<f64>() < keep {
                        self.place(
                            chunk,
                            self.x + lx,
                            center_y + ly,
                            self.z + lz,
                            self.def.leaves,
                        );
                    }
                }
            }
        }
    }

    /// Discs that widen downward from a two-block cap above the trunk.
    fn stamp_pine(&self, chunk: &mut Chunk, trunk_height: i32, rng: &mut StdRng) {
        let radius = self.def.canopy_radius;
        let top = self.y + trunk_height - 1;

        self.place(chunk, self.x, top + 2, self.z, self.def.leaves);
        self.place(chunk, self.x, top + 1, self.z, self.def.leaves);

        for d in 1..=(radius * 2 - 1).max(1) {
            let ring_y = top + 1 - d;
            let r = ((d + 1) / 2).min(radius);
            let r2 = r * r + 1;
            for lx in -r..=r {
                for lz in -r..=r {
                    if lx == 0 && lz == 0 {
                        continue;
                    }
                    let d2 = lx * lx + lz * lz;
                    if d2 > r2 {
                        continue;
                    }
                    let keep = 1.0 - (f64::from(d2) / f64::from(r2)) * CANOPY_FALLOFF;
                    if rng.gen::<f64>() < keep {
                        self.place(chunk, self.x + lx, ring_y, self.z + lz, self.def.leaves);
                    }
                }
            }
        }
    }

    /// Crown cap plus four straight fronds that droop at the tip.
    fn stamp_palm(&self, chunk: &mut Chunk, trunk_height: i32) {
        let radius = self.def.canopy_radius;
        let top = self.y + trunk_height - 1;

        self.place(chunk, self.x, top + 1, self.z, self.def.leaves);
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for step in 1..=radius {
                let level = if step == radius { top } else { top + 1 };
                self.place(
                    chunk,
                    self.x + dx * step,
                    level,
                    self.z + dz * step,
                    self.def.leaves,
                );
            }
        }
    }

    /// Place at world coordinates if the cell lies inside `chunk`.
    fn place(&self, chunk: &mut Chunk, x: i32, y: i32, z: i32, id: BlockId) {
        let (ox, oz) = chunk.position().origin();
        let lx = x - ox;
        let lz = z - oz;
        if lx < 0 || lx >= CHUNK_SIZE as i32 || lz < 0 || lz >= CHUNK_SIZE as i32 {
            return;
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&y) {
            return;
        }
        chunk.place(
            LocalPos {
                x: lx as usize,
                y,
                z: lz as usize,
            },
            id,
        );
    }
}
