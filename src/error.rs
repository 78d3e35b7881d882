//! Error types for k2region.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for k2region operations.
///
/// A lookup that matches nothing is not an error: `search`/`find` return
/// `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed dotted-decimal IPv4 address
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Fewer bytes were available than a fixed-size region demands
    #[error("incomplete read at offset {offset}: expected {expected} bytes, got {actual}")]
    IncompleteRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Matched region payload could not be decoded into a location
    #[error("malformed region payload: {0}")]
    MalformedPayload(String),

    /// Index file failed structural verification
    #[error("invalid index file: {0}")]
    InvalidIndex(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Default searcher was never initialized and could not be loaded
    #[error("default searcher not initialized: loading {path:?} failed: {source}")]
    NotInitialized {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Default searcher initialized twice
    #[error("default searcher already initialized")]
    AlreadyInitialized,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for k2region operations.
pub type Result<T> = std::result::Result<T, Error>;
