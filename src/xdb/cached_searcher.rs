//! Cached searcher with hot reload support.
//!
//! This module provides a searcher wrapper with:
//! - Bounded cache of region strings keyed by numeric IP
//! - Atomic hot reload for swapping index files without downtime
//! - Thread-safe concurrent access

use arc_swap::ArcSwap;
use quick_cache::sync::Cache;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::searcher::Searcher;
use super::source::CachePolicy;
use crate::ip::parse_ip;
use crate::location::Location;
use crate::Result;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Configuration for the cached searcher.
#[derive(Debug, Clone)]
pub struct CachedSearcherConfig {
    /// Maximum number of entries in the cache.
    pub cache_capacity: usize,
    /// Whether to enable caching.
    pub cache_enabled: bool,
}

impl Default for CachedSearcherConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_enabled: true,
        }
    }
}

impl CachedSearcherConfig {
    /// Create a new configuration with the specified cache capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache_capacity: capacity,
            cache_enabled: true,
        }
    }

    /// Create a configuration with caching disabled.
    pub fn no_cache() -> Self {
        Self {
            cache_capacity: 0,
            cache_enabled: false,
        }
    }
}

/// Searcher wrapper with a result cache and hot reload.
///
/// Absence is cached like any other result; errors are not.
///
/// # Example
///
/// ```ignore
/// use k2region::{CachePolicy, CachedSearcher};
/// use std::path::Path;
///
/// let searcher = CachedSearcher::open(Path::new("ip2region.xdb"), CachePolicy::VectorIndex)?;
/// let location = searcher.find("8.8.8.8")?;
///
/// // Swap in a newer index file
/// searcher.reload_from(Path::new("ip2region.new.xdb"), CachePolicy::VectorIndex)?;
/// ```
pub struct CachedSearcher {
    /// The underlying searcher, wrapped in ArcSwap for atomic replacement.
    inner: ArcSwap<Searcher>,
    /// Region cache keyed by numeric IP.
    cache: Option<Cache<u32, Option<Arc<str>>>>,
    /// Configuration.
    config: CachedSearcherConfig,
    /// Generation counter, incremented on every reload.
    generation: AtomicU64,
}

impl CachedSearcher {
    /// Wrap a searcher with default configuration.
    pub fn new(searcher: Searcher) -> Self {
        Self::with_config(searcher, CachedSearcherConfig::default())
    }

    /// Wrap a searcher with custom configuration.
    pub fn with_config(searcher: Searcher, config: CachedSearcherConfig) -> Self {
        let cache = if config.cache_enabled && config.cache_capacity > 0 {
            Some(Cache::new(config.cache_capacity))
        } else {
            None
        };

        Self {
            inner: ArcSwap::from_pointee(searcher),
            cache,
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Open an index file with default cache configuration.
    pub fn open(path: &Path, policy: CachePolicy) -> Result<Self> {
        Ok(Self::new(Searcher::open(path, policy)?))
    }

    /// Create from the full file content with default cache configuration.
    pub fn from_buffer(content: Vec<u8>) -> Result<Self> {
        Ok(Self::new(Searcher::from_buffer(content)?))
    }

    /// Hot reload with a new searcher.
    ///
    /// In-flight queries complete against the old index, new queries use the
    /// new one.
    pub fn reload(&self, searcher: Searcher) {
        self.inner.store(Arc::new(searcher));
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(ref cache) = self.cache {
            cache.clear();
        }
    }

    /// Hot reload from an index file.
    pub fn reload_from(&self, path: &Path, policy: CachePolicy) -> Result<()> {
        let searcher = Searcher::open(path, policy)?;
        self.reload(searcher);
        log::info!("Hot reloaded index from {:?}", path);
        Ok(())
    }

    /// Hot reload from the full file content.
    pub fn reload_from_buffer(&self, content: Vec<u8>) -> Result<()> {
        let searcher = Searcher::from_buffer(content)?;
        self.reload(searcher);
        log::info!("Hot reloaded index from bytes");
        Ok(())
    }

    /// Return the raw region string for a numeric IP, with caching.
    pub fn search_ip(&self, ip: u32) -> Result<Option<Arc<str>>> {
        if let Some(ref cache) = self.cache {
            if let Some(result) = cache.get(&ip) {
                return Ok(result);
            }
        }

        let searcher = self.inner.load();
        let result: Option<Arc<str>> = searcher.search_ip(ip)?.map(Arc::from);

        if let Some(ref cache) = self.cache {
            cache.insert(ip, result.clone());
        }

        Ok(result)
    }

    /// Return the raw region string for a dotted-decimal IP, with caching.
    pub fn search(&self, ip: &str) -> Result<Option<Arc<str>>> {
        self.search_ip(parse_ip(ip)?)
    }

    /// Return the structured location for a dotted-decimal IP, with caching.
    pub fn find(&self, ip: &str) -> Result<Option<Location>> {
        match self.search(ip)? {
            Some(region) => Location::from_region(&region).map(Some),
            None => Ok(None),
        }
    }

    /// Clear the cache.
    pub fn clear_cache(&self) {
        if let Some(ref cache) = self.cache {
            cache.clear();
        }
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        if let Some(ref cache) = self.cache {
            CacheStats {
                capacity: self.config.cache_capacity,
                len: cache.len(),
                enabled: true,
            }
        } else {
            CacheStats {
                capacity: 0,
                len: 0,
                enabled: false,
            }
        }
    }

    /// Get the current generation (incremented on each reload).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Get a reference to the underlying searcher.
    ///
    /// The returned Arc may become stale after a hot reload.
    pub fn inner(&self) -> arc_swap::Guard<Arc<Searcher>> {
        self.inner.load()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Maximum cache capacity.
    pub capacity: usize,
    /// Current number of entries in the cache.
    pub len: usize,
    /// Whether caching is enabled.
    pub enabled: bool,
}
