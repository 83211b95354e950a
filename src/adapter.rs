//! Store client adapter: the benchmarked operations over one connected store.
//!
//! Every bulk operation times the whole call and returns a [`RunResult`].
//! Simulated latency is injected differently per mode: after each request in
//! concurrent mode, once before the flush in pipelined mode, and once per
//! chunk in scripted mode.

use std::time::Duration;

use futures::future::try_join_all;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::scenario::{Mode, Operation, RunResult, Scenario};
use crate::store::{CommandBatch, Store};
use crate::workload::{key, value, ChunkPlan, ScriptArgs};

/// Owns a connected store until [`StoreAdapter::dispose`] or drop.
pub struct StoreAdapter<S: Store> {
    store: Option<S>,
}

impl<S: Store> StoreAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Releases the store. Returns `false` if it was already released.
    pub fn dispose(&mut self) -> bool {
        match self.store.take() {
            Some(store) => {
                store.close();
                info!("store connection released");
                true
            }
            None => false,
        }
    }

    fn store(&self) -> Result<&S> {
        self.store.as_ref().ok_or(Error::Disposed)
    }

    // -----------------------------------------------------------------------
    // Single requests
    // -----------------------------------------------------------------------

    pub async fn set_one(&self, key: &str, value: &str) -> Result<()> {
        self.store()?.set(key, value).await
    }

    pub async fn get_one(&self, key: &str) -> Result<Option<String>> {
        self.store()?.get(key).await
    }

    // -----------------------------------------------------------------------
    // Sequential
    // -----------------------------------------------------------------------

    pub async fn set_many_sync(&self, n: usize, prefix: &str) -> Result<RunResult> {
        let start = Instant::now();
        for i in 0..n {
            self.set_one(&key(prefix, i), &value(i)).await?;
        }
        Ok(self.finish(Operation::Set, Mode::Sync, prefix, n, 0, start, 0))
    }

    pub async fn get_many_sync(&self, n: usize, prefix: &str) -> Result<RunResult> {
        let start = Instant::now();
        let mut hits = 0;
        for i in 0..n {
            if self.get_one(&key(prefix, i)).await?.is_some() {
                hits += 1;
            }
        }
        Ok(self.finish(Operation::Get, Mode::Sync, prefix, n, 0, start, hits))
    }

    // -----------------------------------------------------------------------
    // Concurrent fan-out
    // -----------------------------------------------------------------------

    pub async fn set_many_concurrent(
        &self,
        n: usize,
        prefix: &str,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let start = Instant::now();
        let requests = (0..n).map(|i| async move {
            store.set(&key(prefix, i), &value(i)).await?;
            simulate_latency(latency_ms).await;
            Ok::<_, Error>(())
        });
        try_join_all(requests).await?;
        Ok(self.finish(Operation::Set, Mode::Concurrent, prefix, n, latency_ms, start, 0))
    }

    pub async fn get_many_concurrent(
        &self,
        n: usize,
        prefix: &str,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let start = Instant::now();
        let requests = (0..n).map(|i| async move {
            let got = store.get(&key(prefix, i)).await?;
            simulate_latency(latency_ms).await;
            Ok::<_, Error>(got)
        });
        let values = try_join_all(requests).await?;
        let hits = count_hits(&values);
        Ok(self.finish(Operation::Get, Mode::Concurrent, prefix, n, latency_ms, start, hits))
    }

    // -----------------------------------------------------------------------
    // Pipelined
    // -----------------------------------------------------------------------

    pub async fn set_many_pipelined(
        &self,
        n: usize,
        prefix: &str,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let start = Instant::now();
        let mut batch = store.batch();
        for i in 0..n {
            batch.queue_set(&key(prefix, i), &value(i));
        }
        simulate_latency(latency_ms).await;
        store.flush(batch).await?;
        Ok(self.finish(Operation::Set, Mode::Pipelined, prefix, n, latency_ms, start, 0))
    }

    pub async fn get_many_pipelined(
        &self,
        n: usize,
        prefix: &str,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let start = Instant::now();
        let mut batch = store.batch();
        for i in 0..n {
            batch.queue_get(&key(prefix, i));
        }
        simulate_latency(latency_ms).await;
        let values = store.flush(batch).await?;
        let hits = count_hits(&values);
        Ok(self.finish(Operation::Get, Mode::Pipelined, prefix, n, latency_ms, start, hits))
    }

    // -----------------------------------------------------------------------
    // Scripted batches
    // -----------------------------------------------------------------------

    pub async fn set_many_scripted(
        &self,
        n: usize,
        prefix: &str,
        max_batch: usize,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let plan = ChunkPlan::new(n, max_batch)?;
        debug!(prefix, n, max_batch, chunks = plan.chunks(), "scripted set plan");

        let start = Instant::now();
        for range in plan.ranges() {
            let chunk = ScriptArgs::for_set(prefix, range);
            simulate_latency(latency_ms).await;
            let written = store.eval_set_script(&chunk.keys, &chunk.args).await?;
            if written != chunk.len() {
                return Err(Error::ScriptReply(format!(
                    "set script wrote {} of {} keys",
                    written,
                    chunk.len()
                )));
            }
        }
        Ok(self.finish(Operation::Set, Mode::Scripted, prefix, n, latency_ms, start, 0))
    }

    pub async fn get_many_scripted(
        &self,
        n: usize,
        prefix: &str,
        max_batch: usize,
        latency_ms: u64,
    ) -> Result<RunResult> {
        let store = self.store()?;
        let plan = ChunkPlan::new(n, max_batch)?;
        debug!(prefix, n, max_batch, chunks = plan.chunks(), "scripted get plan");

        let start = Instant::now();
        let mut hits = 0;
        for range in plan.ranges() {
            let chunk = ScriptArgs::for_get(prefix, range);
            simulate_latency(latency_ms).await;
            let values = store.eval_get_script(&chunk.keys, &chunk.args).await?;
            hits += count_hits(&values);
        }
        Ok(self.finish(Operation::Get, Mode::Scripted, prefix, n, latency_ms, start, hits))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        op: Operation,
        mode: Mode,
        prefix: &str,
        operations: usize,
        latency_ms: u64,
        start: Instant,
        hits: usize,
    ) -> RunResult {
        let result = RunResult {
            scenario: Scenario::new(op, mode),
            prefix: prefix.to_string(),
            operations,
            latency_ms,
            elapsed: start.elapsed(),
            hits,
        };
        debug!(
            scenario = result.scenario.name(),
            prefix,
            operations,
            latency_ms,
            elapsed_ms = result.elapsed.as_millis() as u64,
            hits,
            "run finished"
        );
        result
    }
}

impl<S: Store> Drop for StoreAdapter<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Stands in for a slow network path. No-op when `latency_ms` is 0.
async fn simulate_latency(latency_ms: u64) {
    if latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    }
}

fn count_hits(values: &[Option<String>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}
