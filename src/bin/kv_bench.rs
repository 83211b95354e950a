//! Runs the full SET/GET sweep against a store.
//!
//! Run:    `cargo run --release --bin kv-bench`
//! Remote: `cargo run --release --bin kv-bench -- --addr 10.0.0.5:6379`
//! Dry:    `cargo run --bin kv-bench -- --backend memory --high-latency-ms 100`
//! Plan:   `cargo run --bin kv-bench -- --plan`

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use kv_latency_bench::driver::{
    DEFAULT_HIGH_LATENCY_MS, DEFAULT_LOW_LATENCY_MS, DEFAULT_OPERATIONS,
    DEFAULT_SCRIPT_MAX_BATCH, DEFAULT_SWEEP_ITERATIONS, DEFAULT_SYNC_ITERATIONS,
};
use kv_latency_bench::{Driver, MemoryStore, RedisStore, ResultRecorder, Store, StoreAdapter, SweepConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Redis,
    Memory,
}

#[derive(Parser, Debug)]
#[command(about = "SET/GET latency sweep against a Redis-compatible store")]
struct Args {
    /// Store address, `host:port` or `redis://` URL
    #[arg(long, default_value = "localhost:6379")]
    addr: String,
    #[arg(long, value_enum, default_value_t = Backend::Redis)]
    backend: Backend,
    /// Operation count of the first iteration (grows 10x per iteration)
    #[arg(long, default_value_t = DEFAULT_OPERATIONS)]
    operations: usize,
    #[arg(long, default_value_t = DEFAULT_SYNC_ITERATIONS)]
    sync_iterations: usize,
    /// Iterations of the concurrent, pipelined and scripted families
    #[arg(long, default_value_t = DEFAULT_SWEEP_ITERATIONS)]
    sweep_iterations: usize,
    #[arg(long, default_value_t = DEFAULT_LOW_LATENCY_MS)]
    low_latency_ms: u64,
    #[arg(long, default_value_t = DEFAULT_HIGH_LATENCY_MS)]
    high_latency_ms: u64,
    /// Keys per server-side script evaluation
    #[arg(long, default_value_t = DEFAULT_SCRIPT_MAX_BATCH)]
    max_batch: usize,
    /// Save results as JSON
    #[arg(long)]
    record: bool,
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
    /// Print the planned steps and exit
    #[arg(long)]
    plan: bool,
}

impl Args {
    fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            operations: self.operations,
            sync_iterations: self.sync_iterations,
            sweep_iterations: self.sweep_iterations,
            low_latency_ms: self.low_latency_ms,
            high_latency_ms: self.high_latency_ms,
            script_max_batch: self.max_batch,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    anyhow::ensure!(args.max_batch > 0, "--max-batch must be at least 1");

    let driver = Driver::new(args.sweep_config());

    if args.plan {
        for step in driver.plan() {
            println!(
                "{:<36} {:>9} ops  {:>5} ms  {}",
                step.scenario.name(),
                step.operations,
                step.latency_ms,
                step.prefix
            );
        }
        return Ok(());
    }

    match args.backend {
        Backend::Redis => {
            let store = RedisStore::connect(&args.addr)
                .await
                .with_context(|| format!("connecting to {}", args.addr))?;
            let target = store.addr().to_string();
            sweep(&args, &driver, store, &target).await
        }
        Backend::Memory => sweep(&args, &driver, MemoryStore::new(), "memory").await,
    }
}

async fn sweep<S: Store>(args: &Args, driver: &Driver, store: S, target: &str) -> Result<()> {
    let adapter = StoreAdapter::new(store);
    let mut recorder = args.record.then(|| ResultRecorder::new("sweep", target));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let runs = driver
        .run(&adapter, &mut out, |result| {
            if let Some(rec) = recorder.as_mut() {
                rec.record_run(result);
            }
        })
        .await
        .context("benchmark sweep aborted")?;
    info!(runs, store = target, "all scenarios finished");

    if let Some(rec) = recorder {
        rec.save_to(&args.results_dir).context("saving results")?;
    }
    Ok(())
}
