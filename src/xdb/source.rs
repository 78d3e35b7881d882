//! Index sources: where the searcher gets its bytes from.
//!
//! Three strategies trade memory for I/O while producing identical results:
//!
//! - [`MemorySource`]: the whole file in memory (heap buffer or mmap).
//! - [`VectorIndexSource`]: only the vector index cached, segment and payload
//!   reads go to the underlying handle.
//! - [`FileSource`]: nothing cached, every read goes to the handle.
//!
//! File-backed sources read through [`ReadAt`]. Files opened by path use
//! positioned reads, so concurrent queries never wait on each other; any
//! other seekable handle is wrapped in [`Locked`], which serialises the
//! seek-then-read sequence behind a mutex.

use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;

use super::format::*;
use crate::{Error, Result};

/// Read-only byte access to an index file.
pub trait IndexSource: Send + Sync {
    /// Offset, within the window returned by [`read_vector_index_window`],
    /// of the 8-byte pointer pair for `bucket`.
    ///
    /// [`read_vector_index_window`]: IndexSource::read_vector_index_window
    fn vector_index_pointer_offset(&self, bucket: usize) -> usize;

    /// Byte window holding the pointer pair for `bucket`.
    fn read_vector_index_window(&self, bucket: usize) -> Result<Cow<'_, [u8]>>;

    /// Exactly `len` bytes starting at `offset` in the index file.
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>>;

    /// Cache policy this source implements.
    fn policy(&self) -> CachePolicy;
}

/// Which parts of the index file are held in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Whole file in memory. Zero I/O per query.
    #[default]
    Content,
    /// Vector index in memory, segments and payloads read per query.
    VectorIndex,
    /// Nothing cached.
    File,
}

impl CachePolicy {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Content => "content",
            CachePolicy::VectorIndex => "vector",
            CachePolicy::File => "file",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "content" | "memory" => Ok(CachePolicy::Content),
            "vector" | "vector_index" | "vectorindex" => Ok(CachePolicy::VectorIndex),
            "file" | "nocache" => Ok(CachePolicy::File),
            _ => Err(Error::Config(format!("unknown cache policy: {}", s))),
        }
    }
}

/// Full-memory source over any byte container.
pub struct MemorySource<B = Vec<u8>> {
    content: B,
}

impl<B: AsRef<[u8]>> MemorySource<B> {
    /// Wrap the full file content.
    ///
    /// The content must at least hold the header and the vector index.
    pub fn new(content: B) -> Result<Self> {
        let len = content.as_ref().len();
        if len < VECTOR_INDEX_END {
            return Err(Error::IncompleteRead {
                offset: 0,
                expected: VECTOR_INDEX_END,
                actual: len,
            });
        }
        Ok(Self { content })
    }

    /// Get the raw content.
    pub fn content(&self) -> &[u8] {
        self.content.as_ref()
    }
}

impl<B: AsRef<[u8]> + Send + Sync> IndexSource for MemorySource<B> {
    fn vector_index_pointer_offset(&self, bucket: usize) -> usize {
        HEADER_INFO_LENGTH + bucket * VECTOR_INDEX_SIZE
    }

    fn read_vector_index_window(&self, _bucket: usize) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.content()))
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        slice_at(self.content(), offset, len).map(Cow::Borrowed)
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::Content
    }
}

/// Exact reads at an absolute offset through a shared reference.
pub trait ReadAt: Send + Sync {
    /// Fill `buf` from `offset`, failing with `IncompleteRead` on a short read.
    fn fill_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

#[cfg(unix)]
impl ReadAt for File {
    fn fill_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::unix::fs::FileExt;
        fill_with(offset, buf, |pos, chunk| self.read_at(chunk, pos))
    }
}

#[cfg(windows)]
impl ReadAt for File {
    fn fill_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::windows::fs::FileExt;
        fill_with(offset, buf, |pos, chunk| self.seek_read(chunk, pos))
    }
}

/// Handle used for index files opened by path.
#[cfg(any(unix, windows))]
pub(crate) type FileHandle = File;
#[cfg(not(any(unix, windows)))]
pub(crate) type FileHandle = Locked<File>;

/// Seekable handle shared behind a mutex.
pub struct Locked<R>(Mutex<R>);

impl<R> Locked<R> {
    pub fn new(reader: R) -> Self {
        Self(Mutex::new(reader))
    }
}

impl<R> From<R> for Locked<R> {
    fn from(reader: R) -> Self {
        Self::new(reader)
    }
}

impl<R: Read + Seek + Send> ReadAt for Locked<R> {
    fn fill_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        read_exact_at(&mut *self.0.lock(), offset, buf)
    }
}

/// Source with the vector index cached and everything else read on demand.
pub struct VectorIndexSource<R> {
    vector_index: Vec<u8>,
    reader: R,
}

impl<R: ReadAt> VectorIndexSource<R> {
    /// Load the vector index from `reader` and keep the handle for later reads.
    pub fn new(reader: R) -> Result<Self> {
        let mut vector_index = vec![0u8; VECTOR_INDEX_LENGTH];
        reader.fill_at(HEADER_INFO_LENGTH as u64, &mut vector_index)?;
        Ok(Self {
            vector_index,
            reader,
        })
    }
}

impl<R: ReadAt> IndexSource for VectorIndexSource<R> {
    fn vector_index_pointer_offset(&self, bucket: usize) -> usize {
        bucket * VECTOR_INDEX_SIZE
    }

    fn read_vector_index_window(&self, _bucket: usize) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.vector_index))
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let mut buf = vec![0u8; len];
        self.reader.fill_at(offset, &mut buf)?;
        Ok(Cow::Owned(buf))
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::VectorIndex
    }
}

/// Source that reads every region from the handle on demand.
pub struct FileSource<R> {
    reader: R,
}

impl<R: ReadAt> FileSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: ReadAt> IndexSource for FileSource<R> {
    fn vector_index_pointer_offset(&self, _bucket: usize) -> usize {
        0
    }

    fn read_vector_index_window(&self, bucket: usize) -> Result<Cow<'_, [u8]>> {
        let offset = (HEADER_INFO_LENGTH + bucket * VECTOR_INDEX_SIZE) as u64;
        self.read_at(offset, VECTOR_INDEX_SIZE)
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let mut buf = vec![0u8; len];
        self.reader.fill_at(offset, &mut buf)?;
        Ok(Cow::Owned(buf))
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::File
    }
}

/// Bounds-checked slice of `len` bytes at `offset`.
pub(crate) fn slice_at(content: &[u8], offset: u64, len: usize) -> Result<&[u8]> {
    let available = usize::try_from(offset)
        .ok()
        .and_then(|start| content.len().checked_sub(start))
        .unwrap_or(0);

    if available < len {
        return Err(Error::IncompleteRead {
            offset,
            expected: len,
            actual: available,
        });
    }

    let start = offset as usize;
    Ok(&content[start..start + len])
}

/// Seek to `offset` and fill `buf`, failing with `IncompleteRead` on a short read.
pub(crate) fn read_exact_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    buf: &mut [u8],
) -> Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    fill_with(offset, buf, |_, chunk| reader.read(chunk))
}

/// Drive `read(position, chunk)` until `buf` is full or the source is exhausted.
fn fill_with<F>(offset: u64, buf: &mut [u8], mut read: F) -> Result<()>
where
    F: FnMut(u64, &mut [u8]) -> io::Result<usize>,
{
    let mut filled = 0;
    while filled < buf.len() {
        match read(offset + filled as u64, &mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled != buf.len() {
        return Err(Error::IncompleteRead {
            offset,
            expected: buf.len(),
            actual: filled,
        });
    }

    Ok(())
}
