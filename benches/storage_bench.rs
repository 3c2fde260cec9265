//! Benchmarks for lsmkv storage operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lsmkv::{BloomFilter, Config, Engine};
use tempfile::TempDir;

fn open_engine(dir: &TempDir, limit: usize) -> Engine {
    let config = Config::builder()
        .data_dir(dir.path())
        .memtable_size_limit(limit)
        .build()
        .unwrap();
    Engine::open(config).unwrap()
}

fn storage_benchmarks(c: &mut Criterion) {
    c.bench_function("put_single_key", |b| {
        let dir = TempDir::new().unwrap();
        let engine = open_engine(&dir, 64 * 1024);
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key_{}", i);
            engine.put(key.as_bytes(), b"value").unwrap();
            i += 1;
        });
    });

    c.bench_function("get_from_segments", |b| {
        let dir = TempDir::new().unwrap();
        let engine = open_engine(&dir, 4 * 1024);
        for i in 0..2000 {
            let key = format!("key_{}", i);
            let value = format!("value_{}", i);
            engine.put(key.as_bytes(), value.as_bytes()).unwrap();
        }
        engine.flush().unwrap();
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key_{}", i % 4000);
            let _ = engine.get(key.as_bytes()).unwrap();
            i += 1;
        });
    });

    c.bench_function("compact_ten_segments", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let engine = open_engine(&dir, 1024 * 1024);
                for seg in 0..10 {
                    for i in 0..100 {
                        let key = format!("key_{}", i);
                        let value = format!("value_{}_{}", seg, i);
                        engine.put(key.as_bytes(), value.as_bytes()).unwrap();
                    }
                    engine.flush().unwrap();
                }
                (dir, engine)
            },
            |(_dir, engine)| engine.compact().unwrap(),
            BatchSize::PerIteration,
        );
    });

    c.bench_function("bloom_might_contain", |b| {
        let mut filter = BloomFilter::default();
        for i in 0..100 {
            filter.add(format!("key_{}", i).as_bytes());
        }
        b.iter(|| filter.might_contain(b"key_4242"));
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
