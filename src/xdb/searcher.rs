//! Lookup engine over a two-level vector index.

use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use super::format::*;
use super::source::{
    CachePolicy, FileHandle, FileSource, IndexSource, Locked, MemorySource, VectorIndexSource,
};
use crate::ip::parse_ip;
use crate::location::Location;
use crate::{Error, Result};

/// Offline IPv4 region searcher. Thread-safe.
///
/// # Example
///
/// ```ignore
/// use k2region::{CachePolicy, Searcher};
/// use std::path::Path;
///
/// let searcher = Searcher::open(Path::new("ip2region.xdb"), CachePolicy::VectorIndex)?;
///
/// // Raw region string: country|area|province|city|isp
/// let region = searcher.search("118.113.138.53")?;
///
/// // Structured record
/// if let Some(location) = searcher.find("118.113.138.53")? {
///     println!("{}", location.normalized().city);
/// }
/// ```
pub struct Searcher {
    source: Box<dyn IndexSource>,
    header: Header,
}

impl Searcher {
    /// Create a searcher over an arbitrary index source.
    pub fn with_source(source: impl IndexSource + 'static) -> Result<Self> {
        let header = Header::decode(&source.read_at(0, HEADER_INFO_LENGTH)?);

        if header.version != STRUCTURE_VERSION {
            log::warn!(
                "Unexpected index version {}, expected {}",
                header.version,
                STRUCTURE_VERSION
            );
        }
        if header.policy() != Some(IndexPolicy::Vector) {
            log::warn!("Unexpected index policy {}", header.index_policy);
        }

        log::debug!(
            "Opened index: policy={}, version={}, created_at={}, segments={}",
            source.policy(),
            header.version,
            header.created_at,
            header.segment_count()
        );

        Ok(Self {
            source: Box::new(source),
            header,
        })
    }

    /// Create a searcher over the full file content.
    pub fn from_buffer(content: Vec<u8>) -> Result<Self> {
        Self::with_source(MemorySource::new(content)?)
    }

    /// Create a searcher from a seekable handle with the given cache policy.
    ///
    /// With [`CachePolicy::Content`] the whole handle is read into memory and
    /// then dropped. Otherwise the handle is kept behind a mutex.
    pub fn from_reader<R>(mut reader: R, policy: CachePolicy) -> Result<Self>
    where
        R: Read + Seek + Send + 'static,
    {
        match policy {
            CachePolicy::Content => {
                let mut content = Vec::new();
                reader.rewind()?;
                reader.read_to_end(&mut content)?;
                Self::from_buffer(content)
            }
            CachePolicy::VectorIndex => {
                Self::with_source(VectorIndexSource::new(Locked::new(reader))?)
            }
            CachePolicy::File => Self::with_source(FileSource::new(Locked::new(reader))),
        }
    }

    /// Open an index file with the given cache policy.
    ///
    /// The file-backed policies use positioned reads on the file.
    pub fn open(path: &Path, policy: CachePolicy) -> Result<Self> {
        let file = File::open(path)?;
        match policy {
            CachePolicy::Content => Self::from_reader(file, policy),
            CachePolicy::VectorIndex => {
                Self::with_source(VectorIndexSource::new(FileHandle::from(file))?)
            }
            CachePolicy::File => Self::with_source(FileSource::new(FileHandle::from(file))),
        }
    }

    /// Open an index file as a read-only memory map.
    ///
    /// Behaves like [`CachePolicy::Content`] without a heap copy. The file
    /// must not be modified while mapped.
    pub fn open_mmap(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::with_source(MemorySource::new(mmap)?)
    }

    /// Get the file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the cache policy of the underlying source.
    pub fn cache_policy(&self) -> CachePolicy {
        self.source.policy()
    }

    /// Return the structured location for a dotted-decimal IP.
    ///
    /// Fields are raw; see [`Location::normalized`]. A matched payload that
    /// does not hold five fields is an [`Error::MalformedPayload`].
    pub fn find(&self, ip: &str) -> Result<Option<Location>> {
        match self.search(ip)? {
            Some(region) => Location::from_region(&region).map(Some),
            None => Ok(None),
        }
    }

    /// Return the raw `|` separated region string for a dotted-decimal IP.
    pub fn search(&self, ip: &str) -> Result<Option<String>> {
        self.search_ip(parse_ip(ip)?)
    }

    /// Return the raw region string for a numeric IP.
    pub fn search_ip(&self, ip: u32) -> Result<Option<String>> {
        let segment = match self.find_segment(ip)? {
            Some(segment) => segment,
            None => {
                log::trace!("No segment for {:#010x}", ip);
                return Ok(None);
            }
        };

        let data = self
            .source
            .read_at(segment.data_ptr, usize::from(segment.data_len))?;

        String::from_utf8(data.into_owned()).map(Some).map_err(|_| {
            Error::MalformedPayload(format!(
                "region at offset {} is not valid UTF-8",
                segment.data_ptr
            ))
        })
    }

    /// Locate the segment covering `ip` in its bucket's run.
    fn find_segment(&self, ip: u32) -> Result<Option<SegmentIndex>> {
        let bucket = bucket_index(ip);
        let (start_ptr, end_ptr) = self.bucket_pointers(bucket)?;

        // Vector end pointers are one past the last entry of the run; unused
        // buckets carry an empty or out-of-region pair.
        if start_ptr < VECTOR_INDEX_END as u64 || end_ptr <= start_ptr {
            return Ok(None);
        }

        let mut low = 0u64;
        let mut high = (end_ptr - start_ptr) / SEGMENT_INDEX_SIZE as u64;

        while low < high {
            let mid = low + (high - low) / 2;
            let offset = start_ptr + mid * SEGMENT_INDEX_SIZE as u64;
            let buf = self.source.read_at(offset, SEGMENT_INDEX_SIZE)?;
            let segment = SegmentIndex::decode(&buf, 0);

            if ip < segment.start_ip {
                high = mid;
            } else if ip > segment.end_ip {
                low = mid + 1;
            } else {
                return Ok(Some(segment));
            }
        }

        Ok(None)
    }

    /// Read the (start, end) segment pointers for `bucket`.
    fn bucket_pointers(&self, bucket: usize) -> Result<(u64, u64)> {
        let window = self.source.read_vector_index_window(bucket)?;
        let offset = self.source.vector_index_pointer_offset(bucket);

        if window.len() < offset + VECTOR_INDEX_SIZE {
            return Err(Error::IncompleteRead {
                offset: (HEADER_INFO_LENGTH + bucket * VECTOR_INDEX_SIZE) as u64,
                expected: VECTOR_INDEX_SIZE,
                actual: window.len().saturating_sub(offset),
            });
        }

        Ok((
            read_u32_le_as_u64(&window, offset),
            read_u32_le_as_u64(&window, offset + 4),
        ))
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("policy", &self.source.policy())
            .field("header", &self.header)
            .finish()
    }
}
