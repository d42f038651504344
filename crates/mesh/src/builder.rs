//! Surface-culled mesh construction for one chunk.

use std::collections::BTreeMap;
use std::fmt;

use blake3::Hasher;
use voxelforge_core::{BlockId, BlockRegistry, FaceDir, MaterialId, AIR};
use voxelforge_world::{Chunk, LocalPos, CHUNK_SIZE, MAX_HEIGHT, MIN_HEIGHT};

use crate::face::face_geometry;

/// Hash of the combined vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHash(pub [u8; 32]);

impl MeshHash {
    /// Lowercase hex rendering for logs and metrics.
    pub fn to_hex(self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for MeshHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Vertex layout produced by the mesher.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position with x/z chunk-local and y at world height.
    pub position: [f32; 3],
    /// Face normal (unit length).
    pub normal: [f32; 3],
    /// Texture coordinates within the face's material.
    pub uv: [f32; 2],
}

/// One indexed draw range bound to a single material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroup {
    /// First index of the range.
    pub start: u32,
    /// Number of indices in the range.
    pub count: u32,
    /// Material to bind while drawing the range.
    pub material: MaterialId,
}

/// Output mesh buffers for one chunk.
#[derive(Debug, Clone)]
pub struct ChunkMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Index buffer (triangle list), tiled exactly by `groups`.
    pub indices: Vec<u32>,
    /// Draw ranges in (block id, face) order.
    pub groups: Vec<MaterialGroup>,
    /// Stable content hash of the vertex + index buffers.
    pub hash: MeshHash,
}

impl ChunkMesh {
    /// A mesh with no geometry (useful for initialization).
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            groups: Vec::new(),
            hash: MeshHash([0; 32]),
        }
    }

    /// Whether the mesh holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles across all groups.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build culled face geometry for `chunk`.
///
/// Every present voxel contributes one quad per face whose neighbor cell is
/// empty. Lookups past the chunk's own bounds are treated as blocked; the
/// builder never samples sibling chunks. Faces batch per (block id, face
/// direction) so each batch binds one material, and batches emit in that
/// key order, making the buffers a pure function of the voxel contents.
pub fn build_chunk_mesh(chunk: &Chunk, registry: &BlockRegistry) -> ChunkMesh {
    let voxels = chunk.raw_voxels();
    let mut batches: BTreeMap<(BlockId, FaceDir), Vec<LocalPos>> = BTreeMap::new();

    for (index, &id) in voxels.iter().enumerate() {
        if id == AIR {
            continue;
        }
        let pos = LocalPos::from_index(index);
        for face in FaceDir::ALL {
            if neighbor_is_open(voxels, pos, face) {
                batches.entry((id, face)).or_default().push(pos);
            }
        }
    }

    let face_count: usize = batches.values().map(Vec::len).sum();
    let mut vertices = Vec::with_capacity(face_count * 4);
    let mut indices = Vec::with_capacity(face_count * 6);
    let mut groups = Vec::with_capacity(batches.len());

    for ((block, face), cells) in &batches {
        let geom = face_geometry(*face);
        let start = indices.len() as u32;
        for cell in cells {
            let base = vertices.len() as u32;
            for (corner, uv) in geom.corners.iter().zip(geom.uv) {
                vertices.push(MeshVertex {
                    position: [
                        corner[0] + cell.x as f32,
                        corner[1] + cell.y as f32,
                        corner[2] + cell.z as f32,
                    ],
                    normal: geom.normal,
                    uv,
                });
            }
            indices.extend(geom.triangles.iter().map(|idx| base + idx));
        }
        groups.push(MaterialGroup {
            start,
            count: indices.len() as u32 - start,
            material: registry.material_for(*block, *face),
        });
    }

    let mut hasher = Hasher::new();
    hasher.update(bytemuck::cast_slice(&vertices));
    hasher.update(bytemuck::cast_slice(&indices));
    ChunkMesh {
        vertices,
        indices,
        groups,
        hash: MeshHash(*hasher.finalize().as_bytes()),
    }
}

/// Whether the face's neighbor cell is empty. Cells outside the chunk's
/// column bounds or the world height band count as blocked.
fn neighbor_is_open(voxels: &[BlockId], pos: LocalPos, face: FaceDir) -> bool {
    let (dx, dy, dz) = face.offset();
    let nx = pos.x as i32 + dx;
    let ny = pos.y + dy;
    let nz = pos.z as i32 + dz;
    let size = CHUNK_SIZE as i32;
    if nx < 0 || nx >= size || nz < 0 || nz >= size || ny < MIN_HEIGHT || ny > MAX_HEIGHT {
        return false;
    }
    let neighbor = LocalPos {
        x: nx as usize,
        y: ny,
        z: nz as usize,
    };
    voxels[neighbor.index()] == AIR
}
