//! Shared test utilities.

use kv_latency_bench::{MemoryStore, StoreAdapter};

/// Adapter over a fresh in-memory store, plus a handle onto the same store
/// for inspecting keys and counters.
#[allow(dead_code)]
pub fn memory_adapter() -> (StoreAdapter<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let handle = store.clone();
    (StoreAdapter::new(store), handle)
}

/// Address of the Redis server used by the live tests.
#[allow(dead_code)]
pub fn redis_addr() -> String {
    std::env::var("KV_BENCH_REDIS").unwrap_or_else(|_| "localhost:6379".to_string())
}
