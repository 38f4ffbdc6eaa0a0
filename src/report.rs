use std::fmt;
use std::time::Duration;

/// Latency and throughput of one timed phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseResult {
    pub elapsed_secs: f64,
    pub micros_per_op: f64,
    pub throughput_mbps: f64,
}

impl PhaseResult {
    /// `queries` operations of `record_size` bytes each took `elapsed`.
    pub fn compute(elapsed: Duration, queries: u64, record_size: usize) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let queries = queries as f64;
        PhaseResult {
            elapsed_secs,
            micros_per_op: elapsed_secs * 1.0e6 / queries,
            throughput_mbps: record_size as f64 * queries / (1.0e6 * elapsed_secs),
        }
    }
}

/// One output record: an optional `storage_unit_size,queries_per_phase`
/// header followed by elapsed, micros/op and MB/s of every timed phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    header: Option<(u64, u64)>,
    phases: Vec<PhaseResult>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn header(&mut self, storage_unit_size: u64, queries_per_phase: u64) {
        self.header = Some((storage_unit_size, queries_per_phase));
    }

    pub fn push(&mut self, result: PhaseResult) {
        self.phases.push(result);
    }

    pub fn phases(&self) -> &[PhaseResult] {
        &self.phases
    }

    /// Fields of the record in output order.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(2 + 3 * self.phases.len());
        if let Some((storage_unit_size, queries)) = self.header {
            fields.push(storage_unit_size.to_string());
            fields.push(queries.to_string());
        }
        for phase in &self.phases {
            fields.push(phase.elapsed_secs.to_string());
            fields.push(phase.micros_per_op.to_string());
            fields.push(phase.throughput_mbps.to_string());
        }
        fields
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields().join(","))
    }
}
