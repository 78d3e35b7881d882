//! Binary index format and lookup engine.
//!
//! The index uses a header + two-level index + payload structure: a fixed
//! 256x256 vector index over the first two octets points into per-bucket runs
//! of sorted segment entries, which are binary searched.
//!
//! # File Structure
//!
//! ```text
//! +------------------+
//! |     HEADER       |  256 bytes (fixed)
//! +------------------+
//! |   VECTOR INDEX   |  256 x 256 x 8 bytes (start ptr, end ptr)
//! +------------------+
//! |  REGION PAYLOAD  |  variable, `country|area|province|city|isp`
//! +------------------+
//! |  SEGMENT INDEX   |  N x 14 bytes (start ip, end ip, len, ptr)
//! +------------------+
//! ```

mod cached_searcher;
mod format;
pub mod loader;
mod searcher;
mod source;

#[cfg(test)]
#[path = "../../tests/common/mod.rs"]
pub(crate) mod fixture;


pub use cached_searcher::{CacheStats, CachedSearcher, CachedSearcherConfig};
pub use format::*;
pub use searcher::Searcher;
pub use source::{
    CachePolicy, FileSource, IndexSource, Locked, MemorySource, ReadAt, VectorIndexSource,
};
