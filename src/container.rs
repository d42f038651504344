//! On-disk container for save documents.
//!
//! Wraps the textual save blob in a small framed file: a fixed header with
//! magic, format version, CRC32 and payload length, followed by the
//! zstd-compressed blob. The CRC covers the compressed payload.

use anyhow::{Context, Result};
use crc32fast::Hasher;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Magic number for save file identification ("VFSV" = voxelforge save).
const SAVE_MAGIC: u32 = 0x5646_5356;

/// Current container format version.
const CONTAINER_VERSION: u16 = 1;

/// zstd level balancing speed against size for save-on-exit.
const COMPRESSION_LEVEL: i32 = 3;

/// Container file header.
#[derive(Debug, Clone)]
struct SaveHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl SaveHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: CONTAINER_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 14 {
            anyhow::bail!("Save header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SAVE_MAGIC {
            anyhow::bail!(
                "Invalid save magic: expected 0x{:08X}, got 0x{:08X}",
                SAVE_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != CONTAINER_VERSION {
            anyhow::bail!("Unsupported save container version: {}", version);
        }

        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// Write a save blob to disk, creating parent directories as needed.
pub fn write_save(path: &Path, blob: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create save directory")?;
    }

    let compressed = zstd::encode_all(blob.as_bytes(), COMPRESSION_LEVEL)
        .context("Failed to compress save")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let crc32 = hasher.finalize();

    let header = SaveHeader::new(crc32, compressed.len() as u32);

    let mut file = File::create(path).context("Failed to create save file")?;
    file.write_all(&header.to_bytes())
        .context("Failed to write header")?;
    file.write_all(&compressed)
        .context("Failed to write payload")?;

    Ok(())
}

/// Read a save blob back, verifying the checksum.
pub fn read_save(path: &Path) -> Result<String> {
    let mut file = File::open(path).context("Failed to open save file")?;

    let mut header_bytes = [0u8; 14];
    file.read_exact(&mut header_bytes)
        .context("Failed to read save header")?;
    let header = SaveHeader::from_bytes(&header_bytes)?;

    let mut compressed = vec![0u8; header.payload_len as usize];
    file.read_exact(&mut compressed)
        .context("Failed to read save payload")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let computed_crc = hasher.finalize();

    if computed_crc != header.crc32 {
        anyhow::bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32,
            computed_crc
        );
    }

    let decompressed = zstd::decode_all(&compressed[..]).context("Failed to decompress save")?;

    String::from_utf8(decompressed).context("Save payload is not valid UTF-8")
}
