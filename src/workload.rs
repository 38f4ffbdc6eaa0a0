//! Deterministic workload generation: key encoding, load sizing and the
//! seeded random streams that pick values and query targets.

use std::io::Write;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::HarnessSettings;
use crate::{Error, Result};

/// Digits of the zero padded sequence number inside a key.
pub const SEQUENCE_DIGITS: usize = 16;
/// Sequence number digits plus the tag byte.
pub const KEY_SUFFIX_LEN: usize = SEQUENCE_DIGITS + 1;
/// Largest sequence number that still fits in [`SEQUENCE_DIGITS`] digits.
pub const MAX_SEQUENCE: u64 = 9_999_999_999_999_999;

/// Queries per timed phase are one per this many loaded records.
const RECORDS_PER_QUERY: u64 = 1000;

/// Operation context of a key, keeps inserted keys disjoint from loaded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTag {
    /// Keys written by the load phase, read by warm-up and reads, removed by deletes
    Load,
    /// Keys written by the timed insert phase
    Insert,
}

impl KeyTag {
    pub fn as_byte(self) -> u8 {
        match self {
            KeyTag::Load => b'a',
            KeyTag::Insert => b'b',
        }
    }
}

/// Encodes `(sequence number, tag)` pairs into fixed width keys.
///
/// A key is `key_size - 17` spaces, the sequence number zero padded to 16
/// decimal digits and the tag byte:
///
/// ```
/// use kiwi_bench::{KeyCodec, KeyTag};
/// let codec = KeyCodec::new(20).unwrap();
/// assert_eq!(codec.encode(42, KeyTag::Load).unwrap(), b"   0000000000000042a".to_vec());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KeyCodec {
    key_size: usize,
}

impl KeyCodec {
    pub fn new(key_size: usize) -> Result<Self> {
        if key_size < KEY_SUFFIX_LEN {
            return Err(Error::InvalidParameter(format!(
                "key size {} leaves no room for a {} digit sequence number and a tag",
                key_size, SEQUENCE_DIGITS
            )));
        }
        Ok(KeyCodec { key_size })
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn encode(&self, sequence: u64, tag: KeyTag) -> Result<Vec<u8>> {
        if sequence > MAX_SEQUENCE {
            return Err(Error::InvalidParameter(format!(
                "sequence number {} has more than {} digits",
                sequence, SEQUENCE_DIGITS
            )));
        }

        let mut key = Vec::with_capacity(self.key_size);
        key.resize(self.key_size - KEY_SUFFIX_LEN, b' ');
        write!(key, "{:016}", sequence)?;
        key.push(tag.as_byte());
        Ok(key)
    }
}

/// One-shot form of [`KeyCodec::encode`].
pub fn encode_key(sequence: u64, tag: KeyTag, key_size: usize) -> Result<Vec<u8>> {
    KeyCodec::new(key_size)?.encode(sequence, tag)
}

/// Number of records loaded and queries issued per timed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    pub total_load_records: u64,
    pub queries_per_phase: u64,
}

impl WorkloadPlan {
    /// Size the workload so that the loaded volume stays roughly
    /// `load_budget_bytes * scale_factor` whatever the record shape is.
    pub fn resolve(key_size: usize, value_size: usize, settings: &HarnessSettings) -> Result<Self> {
        let record_size = key_size
            .checked_add(value_size)
            .and_then(|size| u64::try_from(size).ok())
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "{} byte keys with {} byte values overflow the record size",
                    key_size, value_size
                ))
            })?;
        if record_size == 0 {
            return Err(Error::InvalidParameter(
                "key size and value size are both zero".to_owned(),
            ));
        }

        let total_load_records = (settings.load_budget_bytes / record_size)
            .checked_mul(settings.scale_factor)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "scale factor {} overflows the load size",
                    settings.scale_factor
                ))
            })?;
        let queries_per_phase = total_load_records / RECORDS_PER_QUERY;

        if total_load_records == 0 || queries_per_phase == 0 {
            return Err(Error::InvalidParameter(format!(
                "{} byte records give {} load records and {} queries per phase, nothing to measure",
                record_size, total_load_records, queries_per_phase
            )));
        }
        if total_load_records - 1 > MAX_SEQUENCE {
            return Err(Error::InvalidParameter(format!(
                "{} load records do not fit in {} digit keys",
                total_load_records, SEQUENCE_DIGITS
            )));
        }

        Ok(WorkloadPlan {
            total_load_records,
            queries_per_phase,
        })
    }
}

/// Seeded pseudo-random stream. Identical seeds and call sequences yield
/// identical outputs on every platform, so runs against different backends
/// touch the same keys with the same payloads.
#[derive(Debug, Clone)]
pub struct WorkloadRng {
    rng: ChaCha8Rng,
}

impl WorkloadRng {
    pub fn new(seed: u64) -> Self {
        WorkloadRng {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Uniform index in `[0, bound)`, `bound` must be positive.
    pub fn next_index(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "index bound must be positive");
        self.rng.gen_range(0..bound)
    }

    pub fn next_bytes(&mut self, count: usize) -> Vec<u8> {
        let mut bytes = vec![0; count];
        self.fill_bytes(&mut bytes);
        bytes
    }

    /// Overwrite `buf` with the next `buf.len()` bytes of the stream.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_have_fixed_width_and_end_in_tag() {
        for &key_size in &[18, 20, 64, 128, 1024] {
            let codec = KeyCodec::new(key_size).unwrap();
            for &(sequence, tag) in &[(0, KeyTag::Load), (7_777, KeyTag::Insert), (MAX_SEQUENCE, KeyTag::Load)] {
                let key = codec.encode(sequence, tag).unwrap();
                assert_eq!(key.len(), key_size);
                assert_eq!(*key.last().unwrap(), tag.as_byte());
                assert!(key[..key_size - KEY_SUFFIX_LEN].iter().all(|&b| b == b' '));
            }
        }
    }

    #[test]
    fn key_layout() {
        let key = encode_key(123_456, KeyTag::Insert, 17).unwrap();
        assert_eq!(key, b"0000000000123456b".to_vec());
        let key = encode_key(9, KeyTag::Load, 19).unwrap();
        assert_eq!(key, b"  0000000000000009a".to_vec());
    }

    #[test]
    fn encoding_is_injective_and_tags_are_disjoint() {
        let codec = KeyCodec::new(32).unwrap();
        let mut seen = HashSet::new();
        for sequence in 0..5_000u64 {
            assert!(seen.insert(codec.encode(sequence, KeyTag::Load).unwrap()));
            assert!(seen.insert(codec.encode(sequence, KeyTag::Insert).unwrap()));
        }
        let far = MAX_SEQUENCE - 1;
        assert_ne!(
            codec.encode(far, KeyTag::Load).unwrap(),
            codec.encode(MAX_SEQUENCE, KeyTag::Load).unwrap()
        );
    }

    #[test]
    fn rejects_short_keys_and_long_sequences() {
        assert!(matches!(KeyCodec::new(16), Err(Error::InvalidParameter(_))));
        assert!(matches!(encode_key(1, KeyTag::Load, 0), Err(Error::InvalidParameter(_))));
        let codec = KeyCodec::new(128).unwrap();
        assert!(matches!(
            codec.encode(MAX_SEQUENCE + 1, KeyTag::Load),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn default_plan() {
        let plan = WorkloadPlan::resolve(128, 512, &HarnessSettings::default()).unwrap();
        assert_eq!(plan.total_load_records, 16 * 1024 * 1024 / 640 * 1024);
        assert_eq!(plan.total_load_records, 26_843_136);
        assert_eq!(plan.queries_per_phase, 26_843);
    }

    #[test]
    fn plan_scales_inversely_with_record_size() {
        let settings = HarnessSettings::default();
        let small = WorkloadPlan::resolve(64, 256, &settings).unwrap();
        let large = WorkloadPlan::resolve(128, 512, &settings).unwrap();
        assert_eq!(small.total_load_records, 2 * large.total_load_records);
        assert!(small.queries_per_phase > large.queries_per_phase);
        for plan in [small, large] {
            assert_eq!(plan.queries_per_phase, plan.total_load_records / 1000);
        }
    }

    #[test]
    fn unrunnable_plans_are_rejected() {
        let settings = HarnessSettings::default();
        assert!(matches!(
            WorkloadPlan::resolve(0, 0, &settings),
            Err(Error::InvalidParameter(_))
        ));

        let tiny = HarnessSettings {
            load_budget_bytes: 64 * 1024,
            scale_factor: 1,
            ..HarnessSettings::default()
        };
        // 102 records load fine but leave no query to time
        assert!(matches!(
            WorkloadPlan::resolve(128, 512, &tiny),
            Err(Error::InvalidParameter(_))
        ));

        let huge = HarnessSettings {
            scale_factor: u64::MAX,
            ..HarnessSettings::default()
        };
        assert!(matches!(
            WorkloadPlan::resolve(128, 512, &huge),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn overflowing_record_size_is_rejected() {
        let settings = HarnessSettings::default();
        assert!(matches!(
            WorkloadPlan::resolve(usize::MAX, 1, &settings),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            WorkloadPlan::resolve(1, usize::MAX, &settings),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn reseeding_replays_the_stream() {
        let mut rng = WorkloadRng::new(12321);
        let indices: Vec<u64> = (0..100).map(|_| rng.next_index(1_000_000)).collect();
        let bytes = rng.next_bytes(64);

        rng.reseed(12321);
        let replayed: Vec<u64> = (0..100).map(|_| rng.next_index(1_000_000)).collect();
        assert_eq!(indices, replayed);
        assert_eq!(bytes, rng.next_bytes(64));

        let mut other = WorkloadRng::new(12321);
        let mut buf = [0u8; 64];
        for _ in 0..100 {
            other.next_index(1_000_000);
        }
        other.fill_bytes(&mut buf);
        assert_eq!(&buf[..], &bytes[..]);
    }

    #[test]
    fn indices_stay_in_bounds() {
        let mut rng = WorkloadRng::new(7);
        for bound in 1..200 {
            assert!(rng.next_index(bound) < bound);
        }
        assert_eq!(rng.next_index(1), 0);
    }
}
