//! End-to-end sweeps over the in-memory store.

mod common;

use common::memory_adapter;
use kv_latency_bench::recorder::load_report;
use kv_latency_bench::scenario::SEPARATOR;
use kv_latency_bench::{Driver, MemoryStore, ResultRecorder, RunResult, StoreAdapter, SweepConfig};

fn small_config() -> SweepConfig {
    SweepConfig {
        operations: 3,
        sync_iterations: 2,
        sweep_iterations: 3,
        low_latency_ms: 5,
        high_latency_ms: 20,
        script_max_batch: 4,
    }
}

#[tokio::test(start_paused = true)]
async fn full_sweep_separates_each_family() {
    let (adapter, store) = memory_adapter();
    let driver = Driver::new(small_config());
    let mut out = Vec::new();
    let mut seen: Vec<RunResult> = Vec::new();

    let runs = driver
        .run(&adapter, &mut out, |r| seen.push(r.clone()))
        .await
        .unwrap();

    let expected = 2 * 2 + 3 * 3 * 2 * 3;
    assert_eq!(runs, expected);
    assert_eq!(seen.len(), expected);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let families = 2 + 3 * 3 * 2;
    assert_eq!(lines.len(), expected + families * 2);

    // Sync families run 2 iterations, swept families 3; each group of
    // result lines is closed by one separator and a blank line.
    let mut rest = &lines[..];
    for family in 0..families {
        let iterations = if family < 2 { 2 } else { 3 };
        for line in &rest[..iterations] {
            assert!(line.starts_with("Performed "), "family {}: {}", family, line);
        }
        assert_eq!(rest[iterations], SEPARATOR, "family {}", family);
        assert_eq!(rest[iterations + 1], "");
        rest = &rest[iterations + 2..];
    }
    assert!(rest.is_empty());
    assert!(lines[0].starts_with("Performed 3 SetStringBenchmark operations in "));
    assert!(text.contains("Performed 300 LuaGetStringBenchmarkBatchingAsync operations with 20 ms latency in "));

    // Every get follows its set, so all reads hit.
    for r in seen.iter().filter(|r| r.scenario.op == kv_latency_bench::Operation::Get) {
        assert_eq!(r.hits, r.operations, "{}", r.prefix);
    }

    // Sync: 3 + 30 keys; each of the 9 swept families writes 3 + 30 + 300.
    assert_eq!(store.len(), 33 + 9 * 333);
}

#[tokio::test]
async fn failure_aborts_the_sweep() {
    let adapter = StoreAdapter::new(MemoryStore::failing_after(5));
    let driver = Driver::new(small_config());
    let mut out = Vec::new();

    let result = driver.run(&adapter, &mut out, |_| {}).await;

    assert!(result.is_err());
    // Only the first sync step (3 round trips) completed.
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Performed").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn recorded_sweep_round_trips_through_json() {
    let (adapter, _store) = memory_adapter();
    let driver = Driver::new(SweepConfig {
        sweep_iterations: 1,
        sync_iterations: 1,
        ..small_config()
    });
    let mut recorder = ResultRecorder::new("sweep", "memory");

    let runs = driver
        .run(&adapter, &mut std::io::sink(), |r| recorder.record_run(r))
        .await
        .unwrap();
    assert_eq!(recorder.len(), runs);

    let dir = tempfile::tempdir().unwrap();
    let path = recorder.save_to(dir.path()).unwrap();
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("sweep-"));

    let report = load_report(&path).unwrap();
    assert_eq!(report.schema_version, 1);
    assert_eq!(report.metadata.target, "memory");
    assert_eq!(report.results.len(), runs);

    let lua_low = report
        .results
        .iter()
        .find(|r| r.benchmark == "kv/get/lua/lua_low_latency_0")
        .expect("scripted get under low latency recorded");
    assert_eq!(lua_low.scenario, "LuaGetStringBenchmarkBatchingAsync");
    assert_eq!(lua_low.metrics.operations, 3);
    assert_eq!(lua_low.metrics.latency_ms, Some(5));
    assert_eq!(lua_low.metrics.hits, Some(3));
}
