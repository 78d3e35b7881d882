//! Loading and structural verification of index files.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::Path;

use super::format::*;
use super::source::read_exact_at;
use crate::{Error, Result};

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read a whole index file into memory, gunzipping it if needed.
pub fn load_content(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path)?;

    if !is_gzip(&raw) {
        return Ok(raw);
    }

    let mut decoder = GzDecoder::new(&raw[..]);
    let mut content = Vec::new();
    decoder.read_to_end(&mut content)?;

    log::debug!(
        "Decompressed index {:?}: {} bytes (compressed: {} bytes)",
        path,
        content.len(),
        raw.len()
    );

    Ok(content)
}

/// Read and decode the header from a seekable handle.
pub fn load_header<R: Read + Seek>(reader: &mut R) -> Result<Header> {
    let mut buf = [0u8; HEADER_INFO_LENGTH];
    read_exact_at(reader, 0, &mut buf)?;
    Ok(Header::decode(&buf))
}

/// Read the raw vector index block from a seekable handle.
pub fn load_vector_index<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; VECTOR_INDEX_LENGTH];
    read_exact_at(reader, HEADER_INFO_LENGTH as u64, &mut buf)?;
    Ok(buf)
}

/// Check the structure of an in-memory index file and return its header.
///
/// The segment index is written last, so a well-formed file ends exactly
/// after the entry `end_index_ptr` points to.
pub fn verify_content(content: &[u8]) -> Result<Header> {
    if content.len() < VECTOR_INDEX_END {
        return Err(Error::InvalidIndex(format!(
            "file is {} bytes, header and vector index need {}",
            content.len(),
            VECTOR_INDEX_END
        )));
    }

    let header = Header::decode(content);
    verify_header(&header, content.len() as u64)?;
    Ok(header)
}

/// Check the structure of an index file on disk and return its header.
pub fn verify_file(path: &Path) -> Result<Header> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    if len < VECTOR_INDEX_END as u64 {
        return Err(Error::InvalidIndex(format!(
            "file is {} bytes, header and vector index need {}",
            len, VECTOR_INDEX_END
        )));
    }

    let header = load_header(&mut file)?;
    verify_header(&header, len)?;
    Ok(header)
}

fn verify_header(header: &Header, file_len: u64) -> Result<()> {
    let start = u64::from(header.start_index_ptr);
    let end = u64::from(header.end_index_ptr);

    if start < VECTOR_INDEX_END as u64 || end < start {
        return Err(Error::InvalidIndex(format!(
            "segment index pointers out of order: start={}, end={}",
            start, end
        )));
    }

    if (end - start) % SEGMENT_INDEX_SIZE as u64 != 0 {
        return Err(Error::InvalidIndex(format!(
            "segment index span {} is not a multiple of {}",
            end - start,
            SEGMENT_INDEX_SIZE
        )));
    }

    let expected_len = end + SEGMENT_INDEX_SIZE as u64;
    if expected_len != file_len {
        return Err(Error::InvalidIndex(format!(
            "segment index ends at {}, file is {} bytes",
            expected_len, file_len
        )));
    }

    Ok(())
}

fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}
