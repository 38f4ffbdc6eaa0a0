//! The benchmark driver: load, warm-up and the three timed phases, run in a
//! fixed order against one freshly opened engine.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::config::{Backend, BenchmarkConfig, HarnessSettings};
use crate::report::{PhaseResult, Report};
use crate::store::{KvEngine, RocksStore, SledStore};
use crate::workload::{KeyCodec, KeyTag, WorkloadPlan, WorkloadRng};
use crate::{Error, Result};

/// Load progress is logged every this many records.
const LOAD_PROGRESS_INTERVAL: u64 = 1 << 20;

/// Phases of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    WarmUp,
    Reads,
    Inserts,
    Deletes,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Load => "load",
            Phase::WarmUp => "warm-up",
            Phase::Reads => "random reads",
            Phase::Inserts => "random inserts",
            Phase::Deletes => "random deletes",
        };
        write!(f, "{}", name)
    }
}

/// Resolve the workload and run it against the configured backend.
pub fn run(config: &BenchmarkConfig, settings: &HarnessSettings) -> Result<Report> {
    let plan = WorkloadPlan::resolve(config.key_size, config.value_size, settings)?;
    match config.backend {
        Backend::Rocks => run_with::<RocksStore>(config, settings, plan),
        Backend::Sled => run_with::<SledStore>(config, settings, plan),
    }
}

/// Open `E` at the configured location, run every phase and close the engine
/// whatever the outcome. Nothing is reported unless all phases succeed.
pub fn run_with<E: KvEngine>(
    config: &BenchmarkConfig,
    settings: &HarnessSettings,
    plan: WorkloadPlan,
) -> Result<Report> {
    info!(
        "opening {} at {} with storage unit size {}",
        E::NAME,
        settings.db_path.display(),
        config.storage_unit_size
    );
    let mut engine = E::open(&settings.db_path, config.storage_unit_size)?;

    let outcome =
        Benchmark::new(&mut engine, config, settings, plan).and_then(|mut bench| bench.run());
    let closed = engine.close();

    let report = outcome?;
    closed?;
    Ok(report)
}

/// State of one run over a borrowed engine.
pub struct Benchmark<'a, E: KvEngine> {
    engine: &'a mut E,
    config: &'a BenchmarkConfig,
    settings: &'a HarnessSettings,
    plan: WorkloadPlan,
    codec: KeyCodec,
    /// Picks load targets for warm-up and the timed phases
    indices: WorkloadRng,
    /// Value payloads of the load phase
    payloads: WorkloadRng,
}

impl<'a, E: KvEngine> Benchmark<'a, E> {
    pub fn new(
        engine: &'a mut E,
        config: &'a BenchmarkConfig,
        settings: &'a HarnessSettings,
        plan: WorkloadPlan,
    ) -> Result<Self> {
        Ok(Benchmark {
            engine,
            config,
            settings,
            plan,
            codec: KeyCodec::new(config.key_size)?,
            indices: WorkloadRng::new(settings.warmup_seed),
            payloads: WorkloadRng::new(settings.payload_seed),
        })
    }

    /// Every phase in order, then the report line.
    pub fn run(&mut self) -> Result<Report> {
        self.load().map_err(|err| err.during(Phase::Load))?;
        self.warm_up().map_err(|err| err.during(Phase::WarmUp))?;

        let (reads, last_value) = self.time_reads().map_err(|err| err.during(Phase::Reads))?;
        let inserts = self
            .time_inserts(&last_value)
            .map_err(|err| err.during(Phase::Inserts))?;
        let deletes = self.time_deletes().map_err(|err| err.during(Phase::Deletes))?;

        let record_size = self.config.record_size();
        let queries = self.plan.queries_per_phase;
        let mut report = Report::new();
        if self.config.print_header {
            report.header(self.config.storage_unit_size, queries);
        }
        for elapsed in [reads, inserts, deletes] {
            report.push(PhaseResult::compute(elapsed, queries, record_size));
        }
        Ok(report)
    }

    /// Sequentially put `total_load_records` keys tagged [`KeyTag::Load`], each
    /// with a fresh random value.
    pub fn load(&mut self) -> Result<()> {
        let total = self.plan.total_load_records;
        info!("{} phase: {} records", Phase::Load, total);

        let mut value = vec![0; self.config.value_size];
        for sequence in 0..total {
            self.payloads.fill_bytes(&mut value);
            let key = self.codec.encode(sequence, KeyTag::Load)?;
            if let Err(err) = self.engine.put(&key, &value) {
                error!("put of load record {} failed: {}", sequence, err);
                return Err(err);
            }
            if (sequence + 1) % LOAD_PROGRESS_INTERVAL == 0 {
                debug!("loaded {}/{} records", sequence + 1, total);
            }
        }
        Ok(())
    }

    /// Untimed gets over the same index stream the timed reads replay.
    pub fn warm_up(&mut self) -> Result<()> {
        let rounds = self.settings.warmup_rounds * self.plan.queries_per_phase;
        info!("{} phase: {} gets", Phase::WarmUp, rounds);

        self.indices.reseed(self.settings.warmup_seed);
        for _ in 0..rounds {
            let sequence = self.indices.next_index(self.plan.total_load_records);
            let key = self.codec.encode(sequence, KeyTag::Load)?;
            if self.engine.get(&key)?.is_none() {
                return Err(missing(sequence, KeyTag::Load));
            }
        }
        Ok(())
    }

    /// Timed gets of loaded keys. Returns the elapsed time and the last value
    /// read, which becomes the payload of the insert phase.
    pub fn time_reads(&mut self) -> Result<(Duration, Vec<u8>)> {
        self.indices.reseed(self.settings.warmup_seed);
        let (_, keys) = self.draw_keys(KeyTag::Load)?;
        info!("{} phase: {} gets", Phase::Reads, keys.len());

        let mut last_value = Vec::new();
        let start = Instant::now();
        for key in &keys {
            match self.engine.get(key)? {
                Some(value) => last_value = value,
                None => return Err(Error::KeyNotFound(display_key(key))),
            }
        }
        let elapsed = start.elapsed();

        debug!("{} phase took {:?}", Phase::Reads, elapsed);
        Ok((elapsed, last_value))
    }

    /// Timed puts of `payload` under fresh [`KeyTag::Insert`] keys.
    pub fn time_inserts(&mut self, payload: &[u8]) -> Result<Duration> {
        let (_, keys) = self.draw_keys(KeyTag::Insert)?;
        info!("{} phase: {} puts", Phase::Inserts, keys.len());

        let start = Instant::now();
        for key in &keys {
            self.engine.put(key, payload)?;
        }
        let elapsed = start.elapsed();

        debug!("{} phase took {:?}", Phase::Inserts, elapsed);
        Ok(elapsed)
    }

    /// Timed deletes of loaded keys.
    ///
    /// Inserts live under a different tag, so every target is still present
    /// unless this phase already deleted it. Any other miss is fatal, checked
    /// once the clock has stopped.
    pub fn time_deletes(&mut self) -> Result<Duration> {
        let (sequences, keys) = self.draw_keys(KeyTag::Load)?;
        info!("{} phase: {} deletes", Phase::Deletes, keys.len());

        let mut misses = Vec::new();
        let start = Instant::now();
        for (i, key) in keys.iter().enumerate() {
            if !self.engine.delete(key)? {
                misses.push(i);
            }
        }
        let elapsed = start.elapsed();

        for i in misses {
            let sequence = sequences[i];
            if !sequences[..i].contains(&sequence) {
                return Err(missing(sequence, KeyTag::Load));
            }
        }

        debug!("{} phase took {:?}", Phase::Deletes, elapsed);
        Ok(elapsed)
    }

    /// Draw the next `queries_per_phase` load indices and encode them with `tag`.
    fn draw_keys(&mut self, tag: KeyTag) -> Result<(Vec<u64>, Vec<Vec<u8>>)> {
        let queries = self.plan.queries_per_phase as usize;
        let mut sequences = Vec::with_capacity(queries);
        let mut keys = Vec::with_capacity(queries);
        for _ in 0..queries {
            let sequence = self.indices.next_index(self.plan.total_load_records);
            keys.push(self.codec.encode(sequence, tag)?);
            sequences.push(sequence);
        }
        Ok((sequences, keys))
    }
}

fn missing(sequence: u64, tag: KeyTag) -> Error {
    Error::KeyNotFound(format!(
        "key {}{} expected to exist",
        sequence,
        tag.as_byte() as char
    ))
}

fn display_key(key: &[u8]) -> String {
    format!("key '{}' expected to exist", String::from_utf8_lossy(key).trim_start())
}
