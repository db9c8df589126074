//! Throughput Benchmark for StashKV
//!
//! This benchmark measures the storage facade over each driver
//! under various workloads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use stashkv::medium::{InMemoryCookieJar, InMemoryStore};
use stashkv::{DriverKind, Runtime, Storage, Value};
use std::sync::Arc;
use std::time::Duration;

const DRIVERS: [DriverKind; 3] = [DriverKind::Persistent, DriverKind::Cookie, DriverKind::Memory];

/// A fresh facade over `kind` with its own media
fn storage(kind: DriverKind) -> Storage {
    let runtime = Runtime::browser()
        .with_local_storage(Arc::new(InMemoryStore::with_quota(usize::MAX)))
        .with_cookie_jar(Arc::new(InMemoryCookieJar::new().with_max_cookies(usize::MAX)));
    Storage::with_driver(&runtime, kind)
}

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    for kind in DRIVERS {
        let storage = storage(kind);
        group.bench_with_input(BenchmarkId::new("set_small", kind), &storage, |b, storage| {
            let mut i = 0u64;
            b.iter(|| {
                storage.set(&format!("key:{}", i % 100), "small_value");
                i += 1;
            });
        });
    }

    let storage = storage(DriverKind::Memory);
    let nested = Value::from(json!({"user": {"name": "Ariz", "tags": ["a", "b", "c"]}}));
    group.bench_function("set_nested", |b| {
        let mut i = 0u64;
        b.iter(|| {
            storage.set(&format!("key:{}", i % 100), nested.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    for kind in DRIVERS {
        let storage = storage(kind);
        for i in 0..100 {
            storage.set(&format!("key:{}", i), format!("value:{}", i));
        }

        group.bench_with_input(BenchmarkId::new("get_existing", kind), &storage, |b, storage| {
            let mut i = 0u64;
            b.iter(|| {
                black_box(storage.get(&format!("key:{}", i % 100)));
                i += 1;
            });
        });

        group.bench_with_input(BenchmarkId::new("get_missing", kind), &storage, |b, storage| {
            let mut i = 0u64;
            b.iter(|| {
                black_box(storage.get(&format!("missing:{}", i)));
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark TTL writes and expired reads
fn bench_expiry(c: &mut Criterion) {
    let mut group = c.benchmark_group("expiry");
    group.throughput(Throughput::Elements(1));

    for kind in DRIVERS {
        let storage = storage(kind);
        group.bench_with_input(BenchmarkId::new("set_with_ttl", kind), &storage, |b, storage| {
            let mut i = 0u64;
            b.iter(|| {
                storage.set_with_ttl(&format!("key:{}", i % 100), "value", Duration::from_secs(3600));
                i += 1;
            });
        });
    }

    let storage = storage(DriverKind::Memory);
    group.bench_function("get_expired", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("gone:{}", i);
            storage.set_with_ttl(&key, "value", Duration::ZERO);
            black_box(storage.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark listing keys
fn bench_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("keys");

    for kind in [DriverKind::Persistent, DriverKind::Memory] {
        let storage = storage(kind);
        for i in 0..1_000 {
            storage.set(&format!("user:{}", i), "user_data");
            storage.set_with_ttl(&format!("session:{}", i), "session_data", Duration::from_secs(3600));
        }

        group.bench_with_input(BenchmarkId::new("keys_all", kind), &storage, |b, storage| {
            b.iter(|| {
                black_box(storage.keys());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_expiry, bench_keys);

criterion_main!(benches);
