use std::fmt;
use std::path::PathBuf;

use crate::{Error, Result};

/// Location used when no path is given on the command line.
pub const DEFAULT_DB_PATH: &str = "./database";
/// Bytes loaded per unit of scale, 16 MiB.
pub const LOAD_BUDGET_BYTES: u64 = 16 * 1024 * 1024;
/// Default multiplier over [`LOAD_BUDGET_BYTES`], giving a 16 GiB load.
pub const SCALE_FACTOR: u64 = 1024;
/// Seed replayed by both the warm-up pass and the timed read pass.
pub const WARMUP_SEED: u64 = 12321;
/// Number of warm-up gets per timed query.
pub const WARMUP_ROUNDS: u64 = 10;
/// Seed of the value payload stream.
pub const PAYLOAD_SEED: u64 = 0x6b69_7769;

pub const DEFAULT_KEY_SIZE: usize = 128;
pub const DEFAULT_VALUE_SIZE: usize = 512;
/// Smallest key that still has room for one byte of padding.
pub const MIN_KEY_SIZE: usize = 18;

/// Storage engine a run is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// [`RocksStore`](crate::RocksStore), RocksDB without compression
    Rocks,
    /// [`SledStore`](crate::SledStore), a thin wrapper over sled
    Sled,
}

impl Backend {
    /// Resolve the backend from the two mutually exclusive selector flags.
    pub fn from_flags(rocksdb: bool, sled: bool) -> Result<Self> {
        match (rocksdb, sled) {
            (true, false) => Ok(Backend::Rocks),
            (false, true) => Ok(Backend::Sled),
            _ => Err(Error::Config(
                "Specify exactly one of RocksDB (-r) and sled (--sled)".to_owned(),
            )),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Rocks => write!(f, "rocksdb"),
            Backend::Sled => write!(f, "sled"),
        }
    }
}

/// Parameters of a single benchmark invocation, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub storage_unit_size: u64,
    pub key_size: usize,
    pub value_size: usize,
    pub backend: Backend,
    /// Prefix the output line with `storage_unit_size,queries_per_phase`
    pub print_header: bool,
}

impl BenchmarkConfig {
    /// Validate raw invocation parameters.
    ///
    /// The storage unit size is checked first, then the key and value sizes.
    /// Callers resolving the backend from flags should run
    /// [`check_storage_unit_size`] before [`Backend::from_flags`] to keep that
    /// order on the command line.
    pub fn new(
        storage_unit_size: Option<u64>,
        key_size: usize,
        value_size: usize,
        backend: Backend,
        print_header: bool,
    ) -> Result<Self> {
        let storage_unit_size = check_storage_unit_size(storage_unit_size)?;
        if key_size < MIN_KEY_SIZE {
            return Err(Error::Config(format!(
                "key size must be at least {} bytes, got {}",
                MIN_KEY_SIZE, key_size
            )));
        }
        if value_size == 0 {
            return Err(Error::Config("value size must be positive".to_owned()));
        }
        if key_size.checked_add(value_size).is_none() {
            return Err(Error::Config(format!(
                "record of {} byte keys and {} byte values is too large",
                key_size, value_size
            )));
        }

        Ok(BenchmarkConfig {
            storage_unit_size,
            key_size,
            value_size,
            backend,
            print_header,
        })
    }

    /// Bytes moved by one operation, key plus value.
    pub fn record_size(&self) -> usize {
        self.key_size + self.value_size
    }
}

/// A storage unit size must be given and positive.
pub fn check_storage_unit_size(storage_unit_size: Option<u64>) -> Result<u64> {
    match storage_unit_size {
        Some(0) | None => Err(Error::Config(
            "Need storage unit size input. Use -s".to_owned(),
        )),
        Some(size) => Ok(size),
    }
}

/// Process-wide constants of the harness, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    pub db_path: PathBuf,
    pub load_budget_bytes: u64,
    pub scale_factor: u64,
    pub warmup_seed: u64,
    pub warmup_rounds: u64,
    pub payload_seed: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        HarnessSettings {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            load_budget_bytes: LOAD_BUDGET_BYTES,
            scale_factor: SCALE_FACTOR,
            warmup_seed: WARMUP_SEED,
            warmup_rounds: WARMUP_ROUNDS,
            payload_seed: PAYLOAD_SEED,
        }
    }
}
