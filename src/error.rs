use std::fmt::Display;
use std::{error, fmt, io, result};

use crate::benchmark::Phase;

/// Result specific for this crate, all fallible operations return [`Error`]
pub type Result<T> = result::Result<T, Error>;

/// Errors possible while configuring or running a benchmark.
///
/// [`Error::Config`], [`Error::EngineOpen`] and [`Error::Operation`] are the three
/// fatal categories a run can end with, the rest is propagated from lower layers
/// and usually ends up wrapped in one of them.
#[derive(Debug)]
pub enum Error {
    /// Bad, missing or conflicting invocation parameters
    Config(String),
    /// Parameter outside of the domain a workload component accepts
    InvalidParameter(String),
    /// Engine rejected its configuration or the target location is not fresh
    EngineOpen(String),
    /// Key expected to exist was not found
    KeyNotFound(String),
    /// Engine operation failed during one of the benchmark phases
    Operation {
        /// Phase the failing operation belonged to
        phase: Phase,
        /// Underlying failure
        source: Box<Error>,
    },
    /// Error when any of the IO operation fails
    Io(io::Error),
    /// Error passed from the RocksDB backend
    Rocks(rocksdb::Error),
    /// Error passed from the sled backend
    Sled(sled::Error),
}

impl Error {
    /// Attach the phase an operation failed in.
    pub fn during(self, phase: Phase) -> Self {
        match self {
            Error::Operation { .. } => self,
            other => Error::Operation {
                phase,
                source: Box::new(other),
            },
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "{}", msg),
            Error::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            Error::EngineOpen(msg) => write!(f, "unable to open engine: {}", msg),
            Error::KeyNotFound(msg) => write!(f, "assertion failed: {}", msg),
            Error::Operation { phase, .. } => write!(f, "{} phase failed", phase),
            Error::Io(msg) => write!(f, "{}", msg),
            Error::Rocks(msg) => write!(f, "{}", msg),
            Error::Sled(msg) => write!(f, "{}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Operation { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Rocks(err)
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::Sled(err)
    }
}
