//! Streaming driver that keeps the neighborhood around the player resident.
//!
//! Each step does a bounded amount of expensive work: first it schedules
//! mesh rebuilds for dirty chunks in view (nearest first), then it resumes
//! generating missing chunks in expanding rings around the player, and
//! finally it detaches every attached chunk outside the view radius.
//! Meshing itself happens outside this crate; the driver hands out jobs and
//! the caller reports completion through [`World::mark_meshed`].

use std::collections::VecDeque;

use tracing::debug;

use crate::chunk::{ChunkFlags, ChunkPos};
use crate::store::{EnsureOutcome, World};

/// Streaming parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Chebyshev radius of chunks kept generated and attached.
    pub view_radius: i32,
    /// Expensive operations (chunk generations, mesh jobs) per step.
    /// `0` means unlimited.
    pub work_budget: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            view_radius: 6,
            work_budget: 4,
        }
    }
}

/// What one driver step did. Positions are in nearest-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Chunks generated this step.
    pub generated: Vec<ChunkPos>,
    /// Previously detached chunks that re-entered the view; their cached
    /// meshes can simply be shown again.
    pub reattached: Vec<ChunkPos>,
    /// Chunks whose mesh must be rebuilt. Until the caller builds them and
    /// calls [`World::mark_meshed`], later steps will hand them out again.
    pub mesh_jobs: Vec<ChunkPos>,
    /// Attached chunks that left the view and were detached.
    pub unloaded: Vec<ChunkPos>,
}

impl StepReport {
    /// Whether the step found nothing to do.
    pub fn is_idle(&self) -> bool {
        self.generated.is_empty()
            && self.reattached.is_empty()
            && self.mesh_jobs.is_empty()
            && self.unloaded.is_empty()
    }

    /// Budget units consumed.
    pub fn work_done(&self) -> usize {
        self.generated.len() + self.mesh_jobs.len()
    }
}

/// Offsets within `radius`, ring by ring outward: ring 0 is the origin,
/// ring r holds every offset whose Chebyshev norm is exactly r, walked in
/// ascending (dx, dz) order.
pub fn ring_offsets(radius: i32) -> Vec<(i32, i32)> {
    let radius = radius.max(0);
    let side = (2 * radius + 1) as usize;
    let mut offsets = Vec::with_capacity(side * side);
    for r in 0..=radius {
        for dx in -r..=r {
            for dz in -r..=r {
                if dx.abs().max(dz.abs()) == r {
                    offsets.push((dx, dz));
                }
            }
        }
    }
    offsets
}

/// The chunk containing a world-space position.
pub fn chunk_of_position(x: f64, z: f64) -> ChunkPos {
    ChunkPos::from_world(x.floor() as i32, z.floor() as i32)
}

/// Resumable streaming state for one player.
pub struct ChunkStreamer {
    config: StreamConfig,
    center: Option<ChunkPos>,
    /// View positions for the current center, nearest rings first.
    view: Vec<ChunkPos>,
    /// Positions still to ensure for the current center.
    pending: VecDeque<ChunkPos>,
}

impl ChunkStreamer {
    /// Streamer with the given parameters.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            center: None,
            view: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Current parameters.
    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Run one bounded slice of streaming work.
    pub fn step(&mut self, world: &mut World, player_chunk: ChunkPos) -> StepReport {
        let mut report = StepReport::default();

        if self.center != Some(player_chunk) {
            self.center = Some(player_chunk);
            self.view = ring_offsets(self.config.view_radius)
                .into_iter()
                .map(|(dx, dz)| ChunkPos::new(player_chunk.x + dx, player_chunk.z + dz))
                .collect();
            self.pending = self.view.iter().copied().collect();
            debug!(center = %player_chunk, pending = self.pending.len(), "recentered stream");
        }

        let mut budget = if self.config.work_budget == 0 {
            usize::MAX
        } else {
            self.config.work_budget
        };

        // Mesh pass: dirty chunks in view, nearest first.
        for &pos in &self.view {
            if budget == 0 {
                break;
            }
            let Some(chunk) = world.chunk(pos) else {
                continue;
            };
            if chunk.flags().contains(ChunkFlags::MESH_DIRTY) {
                report.mesh_jobs.push(pos);
                budget -= 1;
            }
        }

        // Generation pass: resume the ring walk.
        while budget > 0 {
            let Some(&pos) = self.pending.front() else {
                break;
            };
            self.pending.pop_front();
            match world.ensure_chunk(pos) {
                EnsureOutcome::Generated => {
                    report.generated.push(pos);
                    budget -= 1;
                }
                EnsureOutcome::Reattached => report.reattached.push(pos),
                EnsureOutcome::Resident => {}
            }
        }

        // Unload pass: detach everything attached outside the view.
        let far: Vec<ChunkPos> = world
            .chunks()
            .filter(|chunk| {
                chunk.position().chebyshev(player_chunk) > self.config.view_radius
                    && chunk.flags().contains(ChunkFlags::LOADED)
            })
            .map(|chunk| chunk.position())
            .collect();
        for pos in far {
            if world.detach_chunk(pos) {
                report.unloaded.push(pos);
            }
        }

        report
    }
}
