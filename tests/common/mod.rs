//! Test fixtures: synthesises index files in the production layout.
//!
//! Layout written: header, vector index, region payloads, segment index.
//! Segments are split on /16 boundaries so every bucket owns its own run,
//! and each bucket's end pointer sits one entry past the last of its run.
//! The header end pointer addresses the last entry of the whole index.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::Ipv4Addr;

pub const HEADER_INFO_LENGTH: usize = 256;
pub const VECTOR_INDEX_LENGTH: usize = 256 * 256 * 8;
pub const SEGMENT_INDEX_SIZE: usize = 14;

pub const LAN_REGION: &str = "0|0|0|内网IP|内网IP";
pub const CHENGDU_REGION: &str = "中国|0|四川省|成都市|电信";
pub const GOOGLE_DNS_REGION: &str = "美国|0|0|0|Level3";

/// IPs spanning many buckets of [`sample_xdb`], edges included.
pub const SAMPLE_IPS: &[&str] = &[
    "0.0.0.0",
    "0.0.255.255",
    "0.255.255.255",
    "1.0.0.0",
    "8.8.8.7",
    "8.8.8.8",
    "8.8.8.9",
    "100.64.0.1",
    "118.112.0.0",
    "118.113.138.53",
    "118.113.255.255",
    "118.114.0.0",
    "126.255.255.255",
    "127.0.0.1",
    "127.255.255.255",
    "128.0.0.0",
    "172.16.5.5",
    "192.167.255.255",
    "192.168.1.1",
    "192.169.0.0",
    "223.5.5.5",
    "255.255.255.255",
];

/// Builder for in-memory index files.
#[derive(Debug, Default, Clone)]
pub struct XdbBuilder {
    segments: Vec<(u32, u32, String)>,
    created_at: u32,
}

impl XdbBuilder {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            created_at: 1_676_390_400,
        }
    }

    /// Add an inclusive dotted-decimal range.
    pub fn segment(self, start: &str, end: &str, region: &str) -> Self {
        let start: Ipv4Addr = start.parse().expect("valid start IP");
        let end: Ipv4Addr = end.parse().expect("valid end IP");
        self.range(start.into(), end.into(), region)
    }

    /// Add an inclusive numeric range.
    pub fn range(mut self, start: u32, end: u32, region: &str) -> Self {
        assert!(start <= end, "segment start must not exceed end");
        self.segments.push((start, end, region.to_string()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut segments = self.segments.clone();
        segments.sort_by_key(|s| s.0);

        let mut buf = vec![0u8; HEADER_INFO_LENGTH + VECTOR_INDEX_LENGTH];

        // Region payloads, deduplicated.
        let mut payloads: HashMap<&str, (u32, u16)> = HashMap::new();
        for (_, _, region) in &segments {
            if !payloads.contains_key(region.as_str()) {
                let ptr = buf.len() as u32;
                buf.extend_from_slice(region.as_bytes());
                payloads.insert(region.as_str(), (ptr, region.len() as u16));
            }
        }

        // Segment index, one run per bucket.
        let mut buckets: Vec<Option<(u32, u32)>> = vec![None; 256 * 256];
        let mut first_ptr: Option<u32> = None;
        let mut last_ptr = 0u32;

        for (start, end, region) in &segments {
            let (data_ptr, data_len) = payloads[region.as_str()];
            for (s, e) in split_by_bucket(*start, *end) {
                let ptr = buf.len() as u32;
                buf.extend_from_slice(&s.to_le_bytes());
                buf.extend_from_slice(&e.to_le_bytes());
                buf.extend_from_slice(&data_len.to_le_bytes());
                buf.extend_from_slice(&data_ptr.to_le_bytes());

                let bucket = (s >> 16) as usize;
                let next = ptr + SEGMENT_INDEX_SIZE as u32;
                buckets[bucket] = match buckets[bucket] {
                    None => Some((ptr, next)),
                    Some((first, _)) => Some((first, next)),
                };
                first_ptr.get_or_insert(ptr);
                last_ptr = ptr;
            }
        }

        for (bucket, pointers) in buckets.iter().enumerate() {
            if let Some((start, end)) = pointers {
                let offset = HEADER_INFO_LENGTH + bucket * 8;
                buf[offset..offset + 4].copy_from_slice(&start.to_le_bytes());
                buf[offset + 4..offset + 8].copy_from_slice(&end.to_le_bytes());
            }
        }

        buf[0..2].copy_from_slice(&2u16.to_le_bytes());
        buf[2..4].copy_from_slice(&1u16.to_le_bytes());
        buf[4..8].copy_from_slice(&self.created_at.to_le_bytes());
        buf[8..12].copy_from_slice(&first_ptr.unwrap_or(0).to_le_bytes());
        buf[12..16].copy_from_slice(&last_ptr.to_le_bytes());

        buf
    }
}

/// Read the (start, end) vector pointers of `bucket`.
pub fn bucket_pointers(data: &[u8], bucket: usize) -> (u32, u32) {
    let offset = HEADER_INFO_LENGTH + bucket * 8;
    let word = |at: usize| u32::from_le_bytes(data[at..at + 4].try_into().unwrap());
    (word(offset), word(offset + 4))
}

/// Overwrite the (start, end) vector pointers of `bucket`.
pub fn set_bucket_pointers(data: &mut [u8], bucket: usize, start: u32, end: u32) {
    let offset = HEADER_INFO_LENGTH + bucket * 8;
    data[offset..offset + 4].copy_from_slice(&start.to_le_bytes());
    data[offset + 4..offset + 8].copy_from_slice(&end.to_le_bytes());
}

/// Split an inclusive range on /16 boundaries.
fn split_by_bucket(start: u32, end: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    let mut s = start;
    loop {
        let bucket_end = s | 0xFFFF;
        if bucket_end >= end {
            out.push((s, end));
            break;
        }
        out.push((s, bucket_end));
        s = bucket_end + 1;
    }
    out
}

/// Full-coverage index resembling production data.
pub fn sample_builder() -> XdbBuilder {
    XdbBuilder::new()
        .segment("0.0.0.0", "0.255.255.255", LAN_REGION)
        .segment("1.0.0.0", "8.8.8.7", "美国|0|华盛顿|0|谷歌")
        .segment("8.8.8.8", "8.8.8.8", GOOGLE_DNS_REGION)
        .segment("8.8.8.9", "118.111.255.255", "美国|0|0|0|0")
        .segment("118.112.0.0", "118.113.255.255", CHENGDU_REGION)
        .segment("118.114.0.0", "126.255.255.255", "中国|0|0|0|0")
        .segment("127.0.0.0", "127.255.255.255", LAN_REGION)
        .segment("128.0.0.0", "192.167.255.255", "0|0|0|0|0")
        .segment("192.168.0.0", "192.168.255.255", LAN_REGION)
        .segment("192.169.0.0", "255.255.255.255", "0|0|0|0|0")
}

pub fn sample_xdb() -> Vec<u8> {
    sample_builder().build()
}

/// Expected raw region for an IP of [`sample_xdb`], by linear scan.
pub fn expected_region(ip: &str) -> String {
    let ip = u32::from(ip.parse::<Ipv4Addr>().expect("valid IP"));
    sample_builder()
        .segments
        .iter()
        .find(|(s, e, _)| *s <= ip && ip <= *e)
        .map(|(_, _, region)| region.clone())
        .expect("sample covers the whole IPv4 space")
}
