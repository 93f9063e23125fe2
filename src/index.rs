//! Frame index accumulation
//!
//! AVI players need the `idx1` chunk at the end of the file to seek; Windows
//! Media Player refuses files without one. Entries are collected in memory
//! (16 bytes per frame) and serialized in one pass at finalize time.

/// One `idx1` entry describing a single frame chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Chunk tag the entry points at (e.g. `00dc`)
    pub tag: [u8; 4],
    /// AVIIF_* flag bits
    pub flags: u32,
    /// Byte offset of the chunk, relative to the start of the movi payload
    pub offset: u32,
    /// Chunk payload size in bytes, excluding any pad byte
    pub size: u32,
}

/// Accumulates index entries in playback order.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<IndexEntry>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. Entries are never reordered or mutated afterwards.
    pub fn record(&mut self, tag: [u8; 4], flags: u32, offset: u32, size: u32) {
        self.entries.push(IndexEntry {
            tag,
            flags,
            offset,
            size,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize all entries as the `idx1` chunk body: flat little-endian
    /// (tag, flags, offset, size) tuples in insertion order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.entries.len() * 16);
        for entry in &self.entries {
            buf.extend_from_slice(&entry.tag);
            buf.extend_from_slice(&entry.flags.to_le_bytes());
            buf.extend_from_slice(&entry.offset.to_le_bytes());
            buf.extend_from_slice(&entry.size.to_le_bytes());
        }
        buf
    }
}
