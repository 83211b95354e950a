//! Criterion view of the four execution strategies at fixed batch sizes.
//!
//! Always runs against the in-memory store (harness overhead only); also runs
//! against Redis when one answers at `KV_BENCH_REDIS` (default
//! `localhost:6379`).
//!
//! Run: `cargo bench --bench kv`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kv_latency_bench::{MemoryStore, RedisStore, Store, StoreAdapter};
use tokio::runtime::Runtime;

const BATCH_SIZES: [usize; 3] = [10, 100, 1_000];
const SCRIPT_MAX_BATCH: usize = 500_000;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn redis_adapter(rt: &Runtime) -> Option<StoreAdapter<RedisStore>> {
    let addr = std::env::var("KV_BENCH_REDIS").unwrap_or_else(|_| "localhost:6379".to_string());
    match rt.block_on(RedisStore::connect(&addr)) {
        Ok(store) => Some(StoreAdapter::new(store)),
        Err(e) => {
            eprintln!("redis not available at {} ({}), memory store only", addr, e);
            None
        }
    }
}

fn bench_backend<S: Store>(c: &mut Criterion, rt: &Runtime, backend: &str, adapter: &StoreAdapter<S>) {
    let mut group = c.benchmark_group(format!("kv/{}", backend));

    for n in BATCH_SIZES {
        group.throughput(Throughput::Elements(n as u64));

        // Reads below hit keys written here.
        rt.block_on(adapter.set_many_pipelined(n, "bench_seed", 0))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("set/sync", n), &n, |b, &n| {
            b.to_async(rt)
                .iter(|| async { adapter.set_many_sync(n, "bench_sync").await.unwrap() });
        });
        group.bench_with_input(BenchmarkId::new("set/async", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .set_many_concurrent(n, "bench_async", 0)
                    .await
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("set/batch", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .set_many_pipelined(n, "bench_batch", 0)
                    .await
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("set/lua", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .set_many_scripted(n, "bench_lua", SCRIPT_MAX_BATCH, 0)
                    .await
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("get/async", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .get_many_concurrent(n, "bench_seed", 0)
                    .await
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("get/batch", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .get_many_pipelined(n, "bench_seed", 0)
                    .await
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("get/lua", n), &n, |b, &n| {
            b.to_async(rt).iter(|| async {
                adapter
                    .get_many_scripted(n, "bench_seed", SCRIPT_MAX_BATCH, 0)
                    .await
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn kv_strategies(c: &mut Criterion) {
    let rt = runtime();

    let memory = StoreAdapter::new(MemoryStore::new());
    bench_backend(c, &rt, "memory", &memory);

    if let Some(redis) = redis_adapter(&rt) {
        bench_backend(c, &rt, "redis", &redis);
    }
}

criterion_group!(benches, kv_strategies);
criterion_main!(benches);
