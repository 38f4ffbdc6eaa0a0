use crate::store::{ensure_fresh, open_error, KvEngine};
use crate::Result;
use log::debug;
use rocksdb::{DBCompressionType, Options, DB};
use std::path::Path;

const MAX_OPEN_FILES: i32 = 1000;

/// [`KvEngine`] over RocksDB. The storage unit size becomes the target sst
/// file size, the memtable size and the total write buffer budget.
/// # Example
/// ```
/// # use std::error::Error;
/// # use tempfile::TempDir;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// # let some_dir = TempDir::new().unwrap();
/// use kiwi_bench::{KvEngine, RocksStore};
/// let mut store = RocksStore::open(&some_dir.path().join("db"), 4096)?;
///
/// store.put(b"key1", b"value1")?;
/// assert_eq!(Some(b"value1".to_vec()), store.get(b"key1")?);
///
/// assert!(store.delete(b"key1")?);
/// assert_eq!(None, store.get(b"key1")?);
/// store.close()?;
/// # Ok(())
/// # }
/// ```
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Options a database is created with for a given storage unit size.
    pub fn options(storage_unit_size: u64) -> Options {
        let buffer_size = usize::try_from(storage_unit_size).unwrap_or(usize::MAX);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_error_if_exists(true);
        opts.set_target_file_size_base(storage_unit_size);
        opts.set_write_buffer_size(buffer_size);
        opts.set_db_write_buffer_size(buffer_size);
        opts.set_max_open_files(MAX_OPEN_FILES);
        opts.set_compression_type(DBCompressionType::None);
        opts
    }
}

impl KvEngine for RocksStore {
    const NAME: &'static str = "rocksdb";

    fn open(path: &Path, storage_unit_size: u64) -> Result<Self> {
        ensure_fresh(path)?;
        debug!(
            "rocksdb target file size and write buffers {} bytes",
            storage_unit_size
        );

        let db = DB::open(&RocksStore::options(storage_unit_size), path).map_err(open_error)?;
        Ok(RocksStore { db })
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    // rocksdb deletes blindly, presence is looked up first
    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        if self.db.get_pinned(key)?.is_none() {
            return Ok(false);
        }
        self.db.delete(key)?;
        Ok(true)
    }

    fn close(self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
