//! Process-wide default searcher and public API.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::location::Location;
use crate::xdb::{loader, CachePolicy, Searcher};

/// Environment variable naming the default index file.
pub const DEFAULT_LOCATION_ENV: &str = "K2REGION_XDB";

/// Index file used when the environment variable is unset.
pub const DEFAULT_LOCATION: &str = "ip2region.xdb";

/// Global default searcher.
static DEFAULT_SEARCHER: OnceCell<Searcher> = OnceCell::new();

/// Initialize the default searcher from an index file.
///
/// This should be called once at startup.
pub fn init_default_searcher(path: &Path, policy: CachePolicy) -> Result<()> {
    let searcher = Searcher::open(path, policy)?;
    install(searcher)?;
    log::debug!("Initialized default searcher from {:?} ({})", path, policy);
    Ok(())
}

/// Initialize the default searcher from the full index content.
pub fn init_default_searcher_from_bytes(content: Vec<u8>) -> Result<()> {
    install(Searcher::from_buffer(content)?)
}

fn install(searcher: Searcher) -> Result<()> {
    DEFAULT_SEARCHER
        .set(searcher)
        .map_err(|_| Error::AlreadyInitialized)
}

/// Check if the default searcher is initialized.
pub fn is_initialized() -> bool {
    DEFAULT_SEARCHER.get().is_some()
}

/// Path the default searcher loads from when not initialized explicitly.
pub fn default_location() -> PathBuf {
    std::env::var_os(DEFAULT_LOCATION_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCATION))
}

/// Get the default searcher, loading [`default_location`] fully into memory
/// on first use.
pub fn default_searcher() -> Result<&'static Searcher> {
    DEFAULT_SEARCHER.get_or_try_init(|| load_default(&default_location()))
}

/// Load `path` fully into memory, wrapping any failure in `NotInitialized`.
fn load_default(path: &Path) -> Result<Searcher> {
    let searcher = loader::load_content(path)
        .and_then(Searcher::from_buffer)
        .map_err(|e| {
            log::error!("Failed to load default index {:?}: {}", path, e);
            Error::NotInitialized {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;
    log::debug!("Loaded default index from {:?}", path);
    Ok(searcher)
}

/// Return the raw region string for an IP using the default searcher.
///
/// # Examples
/// ```ignore
/// let region = k2region::search("118.113.138.53")?;
/// ```
pub fn search(ip: &str) -> Result<Option<String>> {
    default_searcher()?.search(ip)
}

/// Return the structured location for an IP using the default searcher.
pub fn find(ip: &str) -> Result<Option<Location>> {
    default_searcher()?.find(ip)
}
