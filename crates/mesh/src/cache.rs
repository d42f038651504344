//! Mesh ownership on behalf of the scene.
//!
//! The streaming driver reports which chunks need meshes built, shown,
//! or hidden; a [`MeshSink`] carries those transitions to whatever scene
//! layer displays the geometry. [`SceneCache`] is the in-process sink the
//! binary and the tests use.

use std::collections::BTreeMap;

use voxelforge_core::BlockRegistry;
use voxelforge_world::{ChunkFlags, ChunkPos, StepReport, World};

use crate::builder::{build_chunk_mesh, ChunkMesh};

/// Receives mesh lifecycle transitions from the driver.
///
/// A mesh submitted for a position the sink already holds replaces the
/// previous one, which must be disposed. Detach hides a mesh but keeps it
/// for a later attach; chunks re-entering the view reuse their geometry
/// without a rebuild.
pub trait MeshSink {
    /// Attach freshly built geometry for `pos`, disposing any previous.
    fn submit(&mut self, pos: ChunkPos, mesh: ChunkMesh);

    /// Show a previously detached mesh again. Returns false when the sink
    /// no longer holds geometry for `pos`.
    fn attach(&mut self, pos: ChunkPos) -> bool;

    /// Hide the mesh for `pos`, keeping the geometry.
    fn detach(&mut self, pos: ChunkPos);
}

/// Counts of the work [`service_step`] performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceReport {
    /// Meshes built and submitted.
    pub built: usize,
    /// Cached meshes shown again.
    pub shown: usize,
    /// Meshes hidden for chunks that left the view.
    pub hidden: usize,
    /// Reattach requests the sink had no geometry for.
    pub missing: usize,
}

/// Rebuild the mesh for `pos` if its contents changed since the last
/// build. Returns whether a mesh was built.
///
/// The dirty flag clears only after the sink accepted the new mesh, so an
/// aborted build leaves the chunk queued for the next step.
pub fn remesh_chunk(
    world: &mut World,
    pos: ChunkPos,
    registry: &BlockRegistry,
    sink: &mut impl MeshSink,
) -> bool {
    let Some(chunk) = world.chunk(pos) else {
        return false;
    };
    if !chunk.flags().contains(ChunkFlags::MESH_DIRTY) {
        return false;
    }
    let mesh = build_chunk_mesh(chunk, registry);
    sink.submit(pos, mesh);
    world.mark_meshed(pos);
    true
}

/// Serve one streaming step: build every requested mesh, reattach cached
/// geometry for returning chunks, and hide geometry for departing ones.
pub fn service_step(
    world: &mut World,
    report: &StepReport,
    registry: &BlockRegistry,
    sink: &mut impl MeshSink,
) -> ServiceReport {
    let mut served = ServiceReport::default();
    for &pos in &report.mesh_jobs {
        if remesh_chunk(world, pos, registry, sink) {
            served.built += 1;
        }
    }
    for &pos in &report.reattached {
        if sink.attach(pos) {
            served.shown += 1;
        } else {
            served.missing += 1;
        }
    }
    for &pos in &report.unloaded {
        sink.detach(pos);
        served.hidden += 1;
    }
    served
}

#[derive(Debug)]
struct SceneEntry {
    mesh: ChunkMesh,
    visible: bool,
}

/// In-process scene: owns built meshes keyed by chunk position and tracks
/// which are currently shown.
#[derive(Debug, Default)]
pub struct SceneCache {
    entries: BTreeMap<ChunkPos, SceneEntry>,
    replaced: usize,
    unchanged: usize,
}

impl SceneCache {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached mesh for `pos`, visible or not.
    pub fn mesh(&self, pos: ChunkPos) -> Option<&ChunkMesh> {
        self.entries.get(&pos).map(|e| &e.mesh)
    }

    /// Whether the mesh for `pos` is currently shown.
    pub fn is_visible(&self, pos: ChunkPos) -> bool {
        self.entries.get(&pos).is_some_and(|e| e.visible)
    }

    /// Number of meshes currently shown.
    pub fn visible_count(&self) -> usize {
        self.entries.values().filter(|e| e.visible).count()
    }

    /// Number of meshes held, shown or hidden.
    pub fn cached_count(&self) -> usize {
        self.entries.len()
    }

    /// Times a submit disposed an older mesh with different contents.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Times a submit carried a content hash identical to the cached mesh.
    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Triangles across every visible mesh.
    pub fn visible_triangles(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.visible)
            .map(|e| e.mesh.triangle_count())
            .sum()
    }

    /// Visible meshes in chunk order.
    pub fn iter_visible(&self) -> impl Iterator<Item = (ChunkPos, &ChunkMesh)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.visible)
            .map(|(pos, e)| (*pos, &e.mesh))
    }

    /// Drop every mesh, e.g. when the world is replaced by a load.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl MeshSink for SceneCache {
    fn submit(&mut self, pos: ChunkPos, mesh: ChunkMesh) {
        if let Some(previous) = self.entries.get(&pos) {
            if previous.mesh.hash == mesh.hash {
                self.unchanged += 1;
            } else {
                self.replaced += 1;
            }
        }
        self.entries.insert(
            pos,
            SceneEntry {
                mesh,
                visible: true,
            },
        );
    }

    fn attach(&mut self, pos: ChunkPos) -> bool {
        match self.entries.get_mut(&pos) {
            Some(entry) => {
                entry.visible = true;
                true
            }
            None => false,
        }
    }

    fn detach(&mut self, pos: ChunkPos) {
        if let Some(entry) = self.entries.get_mut(&pos) {
            entry.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxelforge_core::{blocks, WorldSeed};
    use voxelforge_world::{LocalPos, MutationSource};

    fn scene_with_one_mesh() -> (SceneCache, ChunkPos) {
        let registry = BlockRegistry::default();
        let mut chunk = voxelforge_world::Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.place(LocalPos { x: 1, y: 10, z: 1 }, blocks::STONE));
        let mesh = build_chunk_mesh(&chunk, &registry);
        let mut scene = SceneCache::new();
        scene.submit(ChunkPos::new(0, 0), mesh);
        (scene, ChunkPos::new(0, 0))
    }

    #[test]
    fn detach_hides_but_keeps_geometry() {
        let (mut scene, pos) = scene_with_one_mesh();
        assert!(scene.is_visible(pos));

        scene.detach(pos);
        assert!(!scene.is_visible(pos));
        assert_eq!(scene.cached_count(), 1);
        assert_eq!(scene.visible_count(), 0);

        assert!(scene.attach(pos));
        assert!(scene.is_visible(pos));
        assert_eq!(scene.visible_triangles(), 12);
    }

    #[test]
    fn attach_without_geometry_reports_the_miss() {
        let mut scene = SceneCache::new();
        assert!(!scene.attach(ChunkPos::new(9, 9)));
    }

    #[test]
    fn resubmitting_identical_contents_counts_as_unchanged() {
        let registry = BlockRegistry::default();
        let (mut scene, pos) = scene_with_one_mesh();

        let mut chunk = voxelforge_world::Chunk::new(pos);
        assert!(chunk.place(LocalPos { x: 1, y: 10, z: 1 }, blocks::STONE));
        scene.submit(pos, build_chunk_mesh(&chunk, &registry));
        assert_eq!(scene.unchanged(), 1);
        assert_eq!(scene.replaced(), 0);

        assert!(chunk.place(LocalPos { x: 2, y: 10, z: 1 }, blocks::DIRT));
        scene.submit(pos, build_chunk_mesh(&chunk, &registry));
        assert_eq!(scene.replaced(), 1);
        assert_eq!(scene.cached_count(), 1, "replace disposes, never grows");
    }

    #[test]
    fn remesh_builds_only_when_dirty() {
        let registry = BlockRegistry::default();
        let mut world = World::new(WorldSeed::from_str_seed("mesh-cache"), &registry);
        let pos = ChunkPos::new(0, 0);
        world.ensure_chunk(pos);
        let mut scene = SceneCache::new();

        assert!(remesh_chunk(&mut world, pos, &registry, &mut scene));
        assert!(scene.mesh(pos).is_some());
        assert!(
            !remesh_chunk(&mut world, pos, &registry, &mut scene),
            "a clean chunk must not rebuild"
        );

        assert!(world.place(blocks::STONE, 5, 250, 5, MutationSource::Player));
        assert!(remesh_chunk(&mut world, pos, &registry, &mut scene));
        assert_eq!(scene.replaced(), 1);

        assert!(
            !remesh_chunk(&mut world, ChunkPos::new(7, 7), &registry, &mut scene),
            "missing chunks are not meshable"
        );
    }

    #[test]
    fn service_step_covers_every_transition() {
        let registry = BlockRegistry::default();
        let mut world = World::new(WorldSeed::from_str_seed("mesh-service"), &registry);
        let a = ChunkPos::new(0, 0);
        let b = ChunkPos::new(1, 0);
        world.ensure_chunk(a);
        world.ensure_chunk(b);
        let mut scene = SceneCache::new();

        let report = StepReport {
            generated: vec![a, b],
            mesh_jobs: vec![a, b],
            ..StepReport::default()
        };
        let served = service_step(&mut world, &report, &registry, &mut scene);
        assert_eq!(served.built, 2);
        assert_eq!(scene.visible_count(), 2);

        let report = StepReport {
            unloaded: vec![b],
            ..StepReport::default()
        };
        let served = service_step(&mut world, &report, &registry, &mut scene);
        assert_eq!(served.hidden, 1);
        assert_eq!(scene.visible_count(), 1);
        assert_eq!(scene.cached_count(), 2);

        let report = StepReport {
            reattached: vec![b, ChunkPos::new(9, 9)],
            ..StepReport::default()
        };
        let served = service_step(&mut world, &report, &registry, &mut scene);
        assert_eq!(served.shown, 1);
        assert_eq!(served.missing, 1);
        assert_eq!(scene.visible_count(), 2);
    }
}
