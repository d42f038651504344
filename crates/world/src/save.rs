//! World save blobs.
//!
//! A save is a JSON document carrying the authored seed, the player state,
//! and the run-length code of every modified chunk. Pristine chunks are
//! never written; they regenerate from the seed on demand. Loading builds a
//! fresh [`World`] so a rejected blob leaves the caller's world untouched.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use voxelforge_core::BlockRegistry;

use crate::chunk::ChunkPos;
use crate::codec;
use crate::store::World;

/// Version written by [`encode_save`].
pub const SAVE_VERSION: u32 = 1;

/// Player data carried in a save blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// World-space feet position.
    pub position: [f64; 3],
    /// Current velocity.
    pub velocity: [f64; 3],
    /// Look rotation as YXZ Euler angles.
    pub rotation: [f64; 3],
    /// Whether the player stood on ground when saved.
    pub can_jump: bool,
    /// Opaque inventory payload, preserved as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveBlob {
    save_version: u32,
    seed: String,
    player: PlayerRecord,
    chunks: BTreeMap<String, ChunkRecord>,
}

#[derive(Serialize, Deserialize)]
struct ChunkRecord {
    blocks: String,
    modified: bool,
}

/// Pre-versioning blob. It has no seed field and still records chunks that
/// were never generated.
#[derive(Deserialize)]
struct LegacyBlob {
    player: PlayerRecord,
    #[serde(default)]
    chunks: BTreeMap<String, LegacyChunkRecord>,
}

#[derive(Deserialize)]
struct LegacyChunkRecord {
    #[serde(default)]
    blocks: String,
    #[serde(default)]
    generated: bool,
}

/// A save blob brought back to life.
pub struct RestoredWorld {
    /// The rebuilt world. Restored chunks are modified, mesh-dirty, and
    /// detached until streaming picks them up.
    pub world: World,
    /// Player state as saved.
    pub player: PlayerRecord,
}

fn chunk_key(pos: ChunkPos) -> String {
    format!("{},{}", pos.x, pos.z)
}

fn parse_chunk_key(key: &str) -> Result<ChunkPos> {
    let parsed = key.split_once(',').and_then(|(x, z)| {
        let x = x.trim().parse().ok()?;
        let z = z.trim().parse().ok()?;
        Some(ChunkPos::new(x, z))
    });
    parsed.with_context(|| format!("Malformed chunk key {key:?}"))
}

/// Serialize the player plus every modified chunk.
pub fn encode_save(world: &World, player: &PlayerRecord) -> Result<String> {
    let mut chunks = BTreeMap::new();
    for chunk in world.modified_chunks() {
        chunks.insert(
            chunk_key(chunk.position()),
            ChunkRecord {
                blocks: codec::encode_chunk(chunk),
                modified: true,
            },
        );
    }
    let blob = SaveBlob {
        save_version: SAVE_VERSION,
        seed: world.seed_text().to_owned(),
        player: player.clone(),
        chunks,
    };
    serde_json::to_string(&blob).context("Serializing save blob")
}

/// Deserialize a save blob into a fresh world. Returns `None` when the
/// version is newer than this build understands; malformed blobs are errors.
pub fn decode_save(text: &str, registry: &BlockRegistry) -> Result<Option<RestoredWorld>> {
    let value: Value = serde_json::from_str(text).context("Malformed save blob")?;
    // Blobs predating the version field count as version 0.
    let version = value.get("saveVersion").and_then(Value::as_u64).unwrap_or(0);
    match version {
        0 => decode_v0(value, registry).map(Some),
        1 => decode_v1(value, registry).map(Some),
        other => {
            warn!(version = other, "Unknown save version, refusing to load");
            Ok(None)
        }
    }
}

fn decode_v1(value: Value, registry: &BlockRegistry) -> Result<RestoredWorld> {
    let blob: SaveBlob = serde_json::from_value(value).context("Malformed version 1 save")?;
    let mut world = World::from_seed_text(blob.seed, registry);
    for (key, record) in &blob.chunks {
        let pos = parse_chunk_key(key)?;
        let mut chunk = codec::decode_chunk(pos, &record.blocks)
            .with_context(|| format!("Chunk {key}"))?;
        chunk.mark_modified();
        world.insert_chunk(chunk);
    }
    debug!(chunks = world.chunk_count(), "restored save");
    Ok(RestoredWorld {
        world,
        player: blob.player,
    })
}

fn decode_v0(value: Value, registry: &BlockRegistry) -> Result<RestoredWorld> {
    let blob: LegacyBlob = serde_json::from_value(value).context("Malformed legacy save")?;
    // Legacy worlds were all seeded "0".
    let mut world = World::from_seed_text("0", registry);
    for (key, record) in &blob.chunks {
        if !record.generated {
            continue;
        }
        let pos = parse_chunk_key(key)?;
        let mut chunk = codec::decode_chunk(pos, &record.blocks)
            .with_context(|| format!("Chunk {key}"))?;
        chunk.mark_modified();
        world.insert_chunk(chunk);
    }
    Ok(RestoredWorld {
        world,
        player: blob.player,
    })
}
