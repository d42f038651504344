//! Run-length chunk codec.
//!
//! Voxels serialize as a stream of four-symbol groups over a base64-style
//! alphabet: two symbols for the block id, two for the run length, high
//! symbol first. Runs never exceed [`RUN_CAP`]; a final run of air is left
//! off entirely and restored by the decoder, so an untouched sky column
//! costs nothing and an all-air chunk encodes to the empty string.

use anyhow::{bail, ensure, Result};
use voxelforge_core::{BlockId, AIR};

use crate::chunk::{Chunk, ChunkPos, CHUNK_VOLUME};

/// Longest run a single group can express.
pub const RUN_CAP: usize = 4095;

const SYMBOLS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn symbol(value: u16) -> char {
    SYMBOLS[(value & 0x3f) as usize] as char
}

fn value_of(byte: u8) -> Option<u16> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as u16),
        b'a'..=b'z' => Some((byte - b'a') as u16 + 26),
        b'0'..=b'9' => Some((byte - b'0') as u16 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

fn push_group(out: &mut String, id: BlockId, count: usize) {
    let count = count as u16;
    out.push(symbol(id >> 6));
    out.push(symbol(id & 0x3f));
    out.push(symbol(count >> 6));
    out.push(symbol(count & 0x3f));
}

/// Encode raw voxels in canonical index order.
pub fn encode_voxels(voxels: &[BlockId]) -> String {
    let mut out = String::new();
    let mut run: Option<(BlockId, usize)> = None;
    for &id in voxels {
        match run {
            Some((current, count)) if current == id && count < RUN_CAP => {
                run = Some((current, count + 1));
            }
            Some((current, count)) => {
                push_group(&mut out, current, count);
                run = Some((id, 1));
            }
            None => run = Some((id, 1)),
        }
    }
    if let Some((id, count)) = run {
        if id != AIR {
            push_group(&mut out, id, count);
        }
    }
    out
}

/// Encode a chunk's voxels.
pub fn encode_chunk(chunk: &Chunk) -> String {
    encode_voxels(chunk.raw_voxels())
}

/// Decode an encoded block string back to raw voxels, padding the omitted
/// air tail out to the full volume. Explicit trailing air is accepted too.
pub fn decode_voxels(text: &str) -> Result<Vec<BlockId>> {
    ensure!(
        text.len() % 4 == 0,
        "Encoded chunk length {} is not a multiple of 4",
        text.len()
    );
    let mut voxels = Vec::with_capacity(CHUNK_VOLUME);
    for group in text.as_bytes().chunks_exact(4) {
        let mut values = [0u16; 4];
        for (slot, &byte) in values.iter_mut().zip(group) {
            match value_of(byte) {
                Some(v) => *slot = v,
                None => bail!("Invalid symbol {:?} in encoded chunk", byte as char),
            }
        }
        let id: BlockId = (values[0] << 6) | values[1];
        let count = ((values[2] << 6) | values[3]) as usize;
        ensure!(
            voxels.len() + count <= CHUNK_VOLUME,
            "Encoded chunk overflows {} voxels",
            CHUNK_VOLUME
        );
        voxels.extend(std::iter::repeat(id).take(count));
    }
    voxels.resize(CHUNK_VOLUME, AIR);
    Ok(voxels)
}

/// Decode into a chunk at the given position.
pub fn decode_chunk(position: ChunkPos, text: &str) -> Result<Chunk> {
    Ok(Chunk::from_voxels(position, decode_voxels(text)?))
}
