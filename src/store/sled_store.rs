use crate::store::{ensure_fresh, open_error, KvEngine};
use crate::Result;
use log::debug;
use sled::Db;
use std::path::Path;

/// Segment sizes sled accepts, it also requires a power of two.
const MIN_SEGMENT_SIZE: u64 = 256;
const MAX_SEGMENT_SIZE: u64 = 1 << 24;
/// sled asserts on smaller page caches
const MIN_CACHE_CAPACITY: u64 = 256;

/// [`KvEngine`] over sled. The storage unit size becomes the page cache
/// capacity (at least 256 bytes) and, rounded to a power of two sled accepts,
/// the log segment size.
#[derive(Debug)]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Page cache capacity used for a given storage unit size.
    pub fn cache_capacity(storage_unit_size: u64) -> u64 {
        storage_unit_size.max(MIN_CACHE_CAPACITY)
    }

    /// Segment size used for a given storage unit size.
    pub fn segment_size(storage_unit_size: u64) -> usize {
        storage_unit_size
            .clamp(MIN_SEGMENT_SIZE, MAX_SEGMENT_SIZE)
            .next_power_of_two() as usize
    }
}

impl KvEngine for SledStore {
    const NAME: &'static str = "sled";

    fn open(path: &Path, storage_unit_size: u64) -> Result<Self> {
        ensure_fresh(path)?;
        let cache_capacity = SledStore::cache_capacity(storage_unit_size);
        let segment_size = SledStore::segment_size(storage_unit_size);
        debug!(
            "sled cache capacity {} bytes, segment size {} bytes",
            cache_capacity, segment_size
        );

        let db = sled::Config::new()
            .path(path)
            .create_new(true)
            .cache_capacity(cache_capacity)
            .segment_size(segment_size)
            .use_compression(false)
            .open()
            .map_err(open_error)?;
        Ok(SledStore { db })
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.db.remove(key)?.is_some())
    }

    fn close(self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn segment_size_is_a_power_of_two_in_range() {
        assert_eq!(SledStore::segment_size(1), 256);
        assert_eq!(SledStore::segment_size(4096), 4096);
        assert_eq!(SledStore::segment_size(5000), 8192);
        assert_eq!(SledStore::segment_size(1 << 30), 1 << 24);
    }

    #[test]
    fn cache_capacity_has_a_floor() {
        assert_eq!(SledStore::cache_capacity(1), 256);
        assert_eq!(SledStore::cache_capacity(255), 256);
        assert_eq!(SledStore::cache_capacity(4096), 4096);
    }

    #[test]
    fn tiny_storage_units_still_open() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = SledStore::open(&temp_dir.path().join("db"), 1).unwrap();
        store.put(b"k", &[3u8; 600]).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(vec![3u8; 600]));
        store.close().unwrap();
    }
}
