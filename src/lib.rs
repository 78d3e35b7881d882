//! K2Region - Offline IPv4 geolocation over a read-only binary index.
//!
//! This crate resolves IPv4 addresses to a structured geographic/ISP record
//! using a precomputed two-level index file (the ip2region `xdb` layout).
//! Lookups never touch the network and never mutate the index.
//!
//! # Features
//!
//! - **Two-level index**: 256x256 vector index over the first two octets,
//!   then a binary search over the bucket's sorted segments
//! - **Pluggable data access**: whole file in memory, vector index cached, or
//!   pure on-demand file reads, all with identical results
//! - **Memory-mapped loading**: serve the in-memory strategy from an mmap
//! - **Thread-safe**: one searcher can serve any number of threads
//! - **Hot reload**: swap index files atomically behind a result cache
//!
//! # Quick Start
//!
//! ```ignore
//! use k2region::{CachePolicy, Searcher};
//! use std::path::Path;
//!
//! let searcher = Searcher::open(Path::new("ip2region.xdb"), CachePolicy::Content)?;
//!
//! // Raw region string
//! let region = searcher.search("118.113.138.53")?;
//!
//! // Structured record, with sentinels for unknown/local values
//! if let Some(location) = searcher.find("127.0.0.1")? {
//!     assert_eq!(location.normalized().isp, k2region::LAN);
//! }
//! ```
//!
//! # Default Searcher
//!
//! For applications with a single index, [`search`] and [`find`] use a
//! process-wide searcher. It is loaded from `$K2REGION_XDB` (or
//! `ip2region.xdb`) on first use unless [`init_default_searcher`] ran first.
//!
//! # Cache Policies
//!
//! - **Content**: the whole file in memory, zero I/O per query
//! - **VectorIndex**: 512 KiB vector index cached, segment and payload reads
//!   per query
//! - **File**: nothing cached, every read hits the file

mod error;
mod global;
mod ip;
mod location;

pub mod xdb;

// Re-export core types
pub use error::{Error, Result};
pub use ip::{format_ip, parse_ip};
pub use location::{normalize_field, Location, LAN, LAN_MARKER, UNKNOWN};

// Re-export searcher types
pub use xdb::{
    CacheStats, CachePolicy, CachedSearcher, CachedSearcherConfig, Header, IndexPolicy,
    IndexSource, Searcher,
};

// Re-export global API functions
pub use global::{
    default_location, default_searcher, find, init_default_searcher,
    init_default_searcher_from_bytes, is_initialized, search, DEFAULT_LOCATION,
    DEFAULT_LOCATION_ENV,
};
