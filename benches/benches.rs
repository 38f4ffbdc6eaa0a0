use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use kiwi_bench::{KeyCodec, KeyTag, KvEngine, RocksStore, SledStore, WorkloadRng};

const RECORDS: u64 = 1000;
const STORAGE_UNIT_SIZES: [u64; 2] = [64 * 1024, 4 * 1024 * 1024];

fn open_loaded<E: KvEngine>(temp_dir: &TempDir, storage_unit_size: u64) -> E {
    let codec = KeyCodec::new(128).unwrap();
    let mut payloads = WorkloadRng::new(1);
    let mut db = E::open(&temp_dir.path().join("db"), storage_unit_size).unwrap();
    for sequence in 0..RECORDS {
        let key = codec.encode(sequence, KeyTag::Load).unwrap();
        db.put(&key, &payloads.next_bytes(512)).unwrap();
    }
    db
}

fn bench_engine<E: KvEngine>(c: &mut Criterion) {
    let codec = KeyCodec::new(128).unwrap();
    let mut group = c.benchmark_group(E::NAME);

    for &size in STORAGE_UNIT_SIZES.iter() {
        group.bench_with_input(BenchmarkId::new("write", size), &size, |b, &size| {
            let temp_dir = TempDir::new().expect("unable to create temporary working directory");
            let mut db = E::open(&temp_dir.path().join("db"), size).unwrap();
            let value = vec![7u8; 512];
            let mut sequence = 0;
            b.iter(|| {
                let key = codec.encode(sequence, KeyTag::Insert).unwrap();
                db.put(&key, &value).unwrap();
                sequence += 1;
            });
        });

        group.bench_with_input(BenchmarkId::new("read", size), &size, |b, &size| {
            let temp_dir = TempDir::new().expect("unable to create temporary working directory");
            let mut db: E = open_loaded(&temp_dir, size);
            let mut indices = WorkloadRng::new(12321);
            b.iter(|| {
                let key = codec.encode(indices.next_index(RECORDS), KeyTag::Load).unwrap();
                db.get(&key).unwrap().unwrap();
            });
        });
    }

    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    bench_engine::<RocksStore>(c);
    bench_engine::<SledStore>(c);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
