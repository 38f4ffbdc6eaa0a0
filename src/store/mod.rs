mod rocks_store;
mod sled_store;

use std::fs;
use std::path::Path;

use crate::{Error, Result};

pub use self::rocks_store::RocksStore;
pub use self::sled_store::SledStore;

/// The set of actions the benchmark driver needs from a storage engine.
///
/// An engine is opened fresh for every run and owned exclusively by the driver,
/// so all operations take `&mut self`. `storage_unit_size` is mapped onto
/// whatever buffer, segment or file size knobs the engine has, with compression
/// disabled.
pub trait KvEngine: Sized {
    /// Name used in logs and diagnostics.
    const NAME: &'static str;

    /// Create a new database at `path`, failing if the location already holds data.
    fn open(path: &Path, storage_unit_size: u64) -> Result<Self>;

    /// Set a value. Overrides the value if key is already present
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Get a value, `None` when the key is absent.
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Remove a key, returns whether it was present.
    fn delete(&mut self, key: &[u8]) -> Result<bool>;

    /// Flush everything to disk and release the engine.
    fn close(self) -> Result<()>;
}

/// Make sure `path` is an empty directory, creating it when missing.
pub(crate) fn ensure_fresh(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::EngineOpen(format!(
                "{} exists and is not a directory",
                path.display()
            )));
        }
        if fs::read_dir(path).map_err(open_error)?.next().is_some() {
            return Err(Error::EngineOpen(format!(
                "{} already contains a database",
                path.display()
            )));
        }
    }
    fs::create_dir_all(path).map_err(open_error)?;
    Ok(())
}

/// Any failure while bringing an engine up counts as an open failure.
pub(crate) fn open_error(err: impl Into<Error>) -> Error {
    match err.into() {
        Error::EngineOpen(msg) => Error::EngineOpen(msg),
        other => Error::EngineOpen(other.to_string()),
    }
}
