//! Benchmarks for hashkv storage operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashkv::{Config, HashIndex};
use tempfile::TempDir;

fn open_engine(max_segment_size: u64) -> (TempDir, HashIndex) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .directory(temp_dir.path())
        .max_segment_size(max_segment_size)
        .build();
    let engine = HashIndex::open(config).unwrap();
    (temp_dir, engine)
}

fn storage_benchmarks(c: &mut Criterion) {
    let value = vec![0xABu8; 128];

    // Every put is fsynced, so this measures durable write latency
    c.bench_function("put_128b_value", |b| {
        let (_temp, engine) = open_engine(4 * 1024 * 1024);
        let mut i: u64 = 0;
        b.iter(|| {
            let key = format!("key{:012}", i);
            engine.put(key.as_bytes(), &value).unwrap();
            i += 1;
        });
    });

    c.bench_function("get_hit_1k_keys", |b| {
        let (_temp, engine) = open_engine(64 * 1024);
        for i in 0..1000u64 {
            let key = format!("key{:012}", i);
            engine.put(key.as_bytes(), &value).unwrap();
        }
        let mut i: u64 = 0;
        b.iter(|| {
            let key = format!("key{:012}", i % 1000);
            black_box(engine.get(key.as_bytes()).unwrap());
            i += 1;
        });
    });

    c.bench_function("get_miss", |b| {
        let (_temp, engine) = open_engine(64 * 1024);
        engine.put(b"present", &value).unwrap();
        b.iter(|| black_box(engine.get(b"absent").is_err()));
    });

    c.bench_function("open_replay_1k_records", |b| {
        let temp_dir = TempDir::new().unwrap();
        {
            let config = Config::builder()
                .directory(temp_dir.path())
                .max_segment_size(16 * 1024)
                .build();
            let engine = HashIndex::open(config).unwrap();
            for i in 0..1000u64 {
                let key = format!("key{:012}", i % 250);
                engine.put(key.as_bytes(), &value).unwrap();
            }
            engine.close().unwrap();
        }
        b.iter_batched(
            || Config::builder().directory(temp_dir.path()).build(),
            |config| {
                let engine = HashIndex::open(config).unwrap();
                black_box(engine.len());
                engine.close().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
