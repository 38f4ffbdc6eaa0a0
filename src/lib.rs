//! # KiwiBench, a random access microbenchmark for key-value engines
//!
//! Loads a fresh database with a large, record-size independent volume of
//! sequentially keyed data, warms the cache, then times random reads, random
//! inserts and random deletes. Key and value streams are seeded, so runs against
//! [`RocksStore`] and [`SledStore`] perform exactly the same operations and
//! their results can be compared side by side.
//!
//! A run is described by a [`BenchmarkConfig`] and the process wide
//! [`HarnessSettings`], and produces a [`Report`] whose [`Display`](std::fmt::Display)
//! form is a single comma separated line.

pub use benchmark::{run, run_with, Benchmark, Phase};
pub use config::{Backend, BenchmarkConfig, HarnessSettings};
pub use error::{Error, Result};
pub use report::{PhaseResult, Report};
pub use store::{KvEngine, RocksStore, SledStore};
pub use workload::{encode_key, KeyCodec, KeyTag, WorkloadPlan, WorkloadRng};

pub mod benchmark;
pub mod config;
mod error;
mod report;
mod store;
pub mod workload;
