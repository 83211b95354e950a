//! Benchmark driver: the fixed scenario menu swept over operation counts and
//! latency regimes.

use std::io::Write;

use tracing::info;

use crate::adapter::StoreAdapter;
use crate::error::Result;
use crate::scenario::{Mode, Operation, RunResult, Scenario, SEPARATOR};
use crate::store::Store;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_OPERATIONS: usize = 10;
pub const DEFAULT_SYNC_ITERATIONS: usize = 4;
pub const DEFAULT_SWEEP_ITERATIONS: usize = 6;
pub const DEFAULT_LOW_LATENCY_MS: u64 = 10;
pub const DEFAULT_HIGH_LATENCY_MS: u64 = 1000;
/// Kept below the scripting engine's per-call parameter ceiling.
pub const DEFAULT_SCRIPT_MAX_BATCH: usize = 500_000;
pub const GROWTH_FACTOR: usize = 10;

/// Parameters of a full sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Operation count of the first iteration of every family.
    pub operations: usize,
    pub sync_iterations: usize,
    /// Iterations of the concurrent, pipelined and scripted families.
    pub sweep_iterations: usize,
    pub low_latency_ms: u64,
    pub high_latency_ms: u64,
    pub script_max_batch: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            operations: DEFAULT_OPERATIONS,
            sync_iterations: DEFAULT_SYNC_ITERATIONS,
            sweep_iterations: DEFAULT_SWEEP_ITERATIONS,
            low_latency_ms: DEFAULT_LOW_LATENCY_MS,
            high_latency_ms: DEFAULT_HIGH_LATENCY_MS,
            script_max_batch: DEFAULT_SCRIPT_MAX_BATCH,
        }
    }
}

impl SweepConfig {
    /// The three latency regimes, in execution order.
    pub fn regimes(&self) -> [LatencyRegime; 3] {
        [
            LatencyRegime { suffix: "", latency_ms: 0 },
            LatencyRegime { suffix: "_low_latency", latency_ms: self.low_latency_ms },
            LatencyRegime { suffix: "_high_latency", latency_ms: self.high_latency_ms },
        ]
    }
}

/// Simulated network conditions for one pass over the async families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRegime {
    /// Appended to the family name in key prefixes.
    pub suffix: &'static str,
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One scenario invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub scenario: Scenario,
    pub operations: usize,
    pub prefix: String,
    pub latency_ms: u64,
    /// Closes its family; the separator is printed after it.
    pub last_in_family: bool,
}

const SWEPT_MODES: [Mode; 3] = [Mode::Concurrent, Mode::Pipelined, Mode::Scripted];

pub struct Driver {
    config: SweepConfig,
}

impl Driver {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Every step of the sweep, in execution order.
    pub fn plan(&self) -> Vec<Step> {
        let mut steps = Vec::new();
        for op in [Operation::Set, Operation::Get] {
            self.push_family(&mut steps, op, Mode::Sync, "", 0, self.config.sync_iterations);
        }
        for regime in self.config.regimes() {
            for mode in SWEPT_MODES {
                for op in [Operation::Set, Operation::Get] {
                    self.push_family(
                        &mut steps,
                        op,
                        mode,
                        regime.suffix,
                        regime.latency_ms,
                        self.config.sweep_iterations,
                    );
                }
            }
        }
        steps
    }

    fn push_family(
        &self,
        steps: &mut Vec<Step>,
        op: Operation,
        mode: Mode,
        suffix: &str,
        latency_ms: u64,
        iterations: usize,
    ) {
        let mut operations = self.config.operations;
        for i in 0..iterations {
            steps.push(Step {
                scenario: Scenario::new(op, mode),
                operations,
                prefix: format!("{}{}_{}", mode.family(), suffix, i),
                latency_ms,
                last_in_family: i + 1 == iterations,
            });
            operations = operations.saturating_mul(GROWTH_FACTOR);
        }
    }

    /// Executes one step against `adapter`.
    pub async fn execute<S: Store>(
        &self,
        adapter: &StoreAdapter<S>,
        step: &Step,
    ) -> Result<RunResult> {
        let Step { scenario, operations: n, prefix, latency_ms: l, .. } = step;
        let (n, l) = (*n, *l);
        let batch = self.config.script_max_batch;
        match (scenario.op, scenario.mode) {
            (Operation::Set, Mode::Sync) => adapter.set_many_sync(n, prefix).await,
            (Operation::Get, Mode::Sync) => adapter.get_many_sync(n, prefix).await,
            (Operation::Set, Mode::Concurrent) => adapter.set_many_concurrent(n, prefix, l).await,
            (Operation::Get, Mode::Concurrent) => adapter.get_many_concurrent(n, prefix, l).await,
            (Operation::Set, Mode::Pipelined) => adapter.set_many_pipelined(n, prefix, l).await,
            (Operation::Get, Mode::Pipelined) => adapter.get_many_pipelined(n, prefix, l).await,
            (Operation::Set, Mode::Scripted) => {
                adapter.set_many_scripted(n, prefix, batch, l).await
            }
            (Operation::Get, Mode::Scripted) => {
                adapter.get_many_scripted(n, prefix, batch, l).await
            }
        }
    }

    /// Runs the whole sweep, writing one line per run to `out` and a
    /// separator after each family.
    ///
    /// `on_result` sees every result before it is dropped. The first error
    /// aborts the sweep.
    pub async fn run<S, W, F>(
        &self,
        adapter: &StoreAdapter<S>,
        out: &mut W,
        mut on_result: F,
    ) -> Result<usize>
    where
        S: Store,
        W: Write,
        F: FnMut(&RunResult),
    {
        let steps = self.plan();
        info!(steps = steps.len(), "starting sweep");
        for step in &steps {
            let result = self.execute(adapter, step).await?;
            writeln!(out, "{}", result)?;
            if step.last_in_family {
                writeln!(out, "{}", SEPARATOR)?;
                writeln!(out)?;
            }
            out.flush()?;
            on_result(&result);
        }
        info!(steps = steps.len(), "sweep complete");
        Ok(steps.len())
    }
}
