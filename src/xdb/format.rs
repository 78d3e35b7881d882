//! Index file layout constants, little-endian codec and header decoding.

use serde::{Deserialize, Serialize};

/// Header size in bytes.
pub const HEADER_INFO_LENGTH: usize = 256;

/// Number of rows in the vector index (first octet).
pub const VECTOR_INDEX_ROWS: usize = 256;

/// Number of columns in the vector index (second octet).
pub const VECTOR_INDEX_COLS: usize = 256;

/// Size of one vector index entry: start pointer + end pointer.
pub const VECTOR_INDEX_SIZE: usize = 8;

/// Total size of the vector index block.
pub const VECTOR_INDEX_LENGTH: usize = VECTOR_INDEX_ROWS * VECTOR_INDEX_COLS * VECTOR_INDEX_SIZE;

/// Size of one segment index entry.
pub const SEGMENT_INDEX_SIZE: usize = 14;

/// First byte after the vector index. No segment entry can start before it.
pub const VECTOR_INDEX_END: usize = HEADER_INFO_LENGTH + VECTOR_INDEX_LENGTH;

/// Header version written by the offline indexer.
pub const STRUCTURE_VERSION: u16 = 2;

/// Read a little-endian `u16` at `offset`.
///
/// Panics if `offset + 2 > buf.len()`.
#[inline]
pub fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Read a little-endian `u32` at `offset`.
///
/// Panics if `offset + 4 > buf.len()`.
#[inline]
pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Read a little-endian `u32` at `offset`, widened to `u64` for offset math.
#[inline]
pub fn read_u32_le_as_u64(buf: &[u8], offset: usize) -> u64 {
    u64::from(read_u32_le(buf, offset))
}

/// Bucket of the vector index covering `ip`: one per (first, second) octet pair.
#[inline]
pub fn bucket_index(ip: u32) -> usize {
    let il0 = ((ip >> 24) & 0xFF) as usize;
    let il1 = ((ip >> 16) & 0xFF) as usize;
    il0 * VECTOR_INDEX_COLS + il1
}

/// Index policy recorded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexPolicy {
    /// Two-level vector index.
    Vector = 1,
    /// B-tree index.
    BTree = 2,
}

impl IndexPolicy {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(IndexPolicy::Vector),
            2 => Some(IndexPolicy::BTree),
            _ => None,
        }
    }
}

/// Decoded index file header.
///
/// Only the segment index pointers matter for lookups; the rest is
/// informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Format version (u16 LE at 0)
    pub version: u16,
    /// Raw index policy (u16 LE at 2)
    pub index_policy: u16,
    /// Unix timestamp when the file was generated (u32 LE at 4)
    pub created_at: u32,
    /// Offset of the first segment index entry (u32 LE at 8)
    pub start_index_ptr: u32,
    /// Offset of the last segment index entry (u32 LE at 12)
    pub end_index_ptr: u32,
}

impl Header {
    /// Decode the header from the first [`HEADER_INFO_LENGTH`] bytes.
    ///
    /// Panics if `buf` is shorter than 16 bytes.
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            version: read_u16_le(buf, 0),
            index_policy: read_u16_le(buf, 2),
            created_at: read_u32_le(buf, 4),
            start_index_ptr: read_u32_le(buf, 8),
            end_index_ptr: read_u32_le(buf, 12),
        }
    }

    /// Get the index policy, if it is a known one.
    pub fn policy(&self) -> Option<IndexPolicy> {
        IndexPolicy::from_u16(self.index_policy)
    }

    /// Number of segment index entries the header pointers span.
    pub fn segment_count(&self) -> u64 {
        if self.end_index_ptr < self.start_index_ptr {
            return 0;
        }
        u64::from(self.end_index_ptr - self.start_index_ptr) / SEGMENT_INDEX_SIZE as u64 + 1
    }
}

/// One decoded segment index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentIndex {
    pub start_ip: u32,
    pub end_ip: u32,
    pub data_len: u16,
    pub data_ptr: u64,
}

impl SegmentIndex {
    /// Decode an entry from `buf` at `offset`.
    ///
    /// Layout: start IP (u32), end IP (u32), payload length (u16), payload
    /// offset (u32), all little-endian.
    #[inline]
    pub fn decode(buf: &[u8], offset: usize) -> Self {
        Self {
            start_ip: read_u32_le(buf, offset),
            end_ip: read_u32_le(buf, offset + 4),
            data_len: read_u16_le(buf, offset + 8),
            data_ptr: read_u32_le_as_u64(buf, offset + 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(VECTOR_INDEX_LENGTH, 524288);
        assert_eq!(VECTOR_INDEX_END, 524544);
    }

    #[test]
    fn test_read_little_endian() {
        let buf = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        assert_eq!(read_u16_le(&buf, 0), 0x1234);
        assert_eq!(read_u32_le(&buf, 2), 0x12345678);
    }

    #[test]
    fn test_read_u32_top_bit_set() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_u32_le(&buf, 0), u32::MAX);
        assert_eq!(read_u32_le_as_u64(&buf, 0), 0xFFFF_FFFF);
    }

    #[test]
    #[should_panic]
    fn test_read_out_of_range_panics() {
        let buf = [0u8; 3];
        read_u32_le(&buf, 0);
    }

    #[test]
    fn test_bucket_index() {
        assert_eq!(bucket_index(0), 0);
        assert_eq!(bucket_index(0x0001_FFFF), 1);
        assert_eq!(bucket_index(0x7F00_0001), 127 * 256);
        assert_eq!(bucket_index(u32::MAX), 65535);
    }

    #[test]
    fn test_header_decode() {
        let mut buf = [0u8; HEADER_INFO_LENGTH];
        buf[0..2].copy_from_slice(&2u16.to_le_bytes());
        buf[2..4].copy_from_slice(&1u16.to_le_bytes());
        buf[4..8].copy_from_slice(&1_700_000_000u32.to_le_bytes());
        buf[8..12].copy_from_slice(&600_000u32.to_le_bytes());
        buf[12..16].copy_from_slice(&600_028u32.to_le_bytes());

        let header = Header::decode(&buf);
        assert_eq!(header.version, STRUCTURE_VERSION);
        assert_eq!(header.policy(), Some(IndexPolicy::Vector));
        assert_eq!(header.created_at, 1_700_000_000);
        assert_eq!(header.segment_count(), 3);
    }

    #[test]
    fn test_unknown_policy_preserved() {
        let mut buf = [0u8; 16];
        buf[2..4].copy_from_slice(&9u16.to_le_bytes());
        let header = Header::decode(&buf);
        assert_eq!(header.index_policy, 9);
        assert_eq!(header.policy(), None);
    }

    #[test]
    fn test_segment_index_decode() {
        let mut buf = vec![0xAA; 4];
        buf.extend_from_slice(&100u32.to_le_bytes());
        buf.extend_from_slice(&199u32.to_le_bytes());
        buf.extend_from_slice(&12u16.to_le_bytes());
        buf.extend_from_slice(&0x8000_0010u32.to_le_bytes());

        let entry = SegmentIndex::decode(&buf, 4);
        assert_eq!(entry.start_ip, 100);
        assert_eq!(entry.end_ip, 199);
        assert_eq!(entry.data_len, 12);
        assert_eq!(entry.data_ptr, 0x8000_0010);
    }
}
