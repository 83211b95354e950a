use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::{CommandBatch, Store};
use crate::error::{Error, Result};
use crate::workload::declared_len;

/// In-process backend with the same surface as a Redis server.
///
/// Clones share the keyspace and the counters, so a handle kept outside the
/// adapter can inspect what the benchmark did.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    data: Mutex<HashMap<String, String>>,
    commands: AtomicUsize,
    round_trips: AtomicUsize,
    script_evals: AtomicUsize,
    releases: AtomicUsize,
    fail_after: Option<usize>,
}

/// Snapshot of what a [`MemoryStore`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Logical SET/GET commands executed.
    pub commands: usize,
    /// Network round trips a real server would have seen.
    pub round_trips: usize,
    pub script_evals: usize,
    pub releases: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every round trip after the first `ok_round_trips`.
    pub fn failing_after(ok_round_trips: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                fail_after: Some(ok_round_trips),
                ..Default::default()
            }),
        }
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            commands: self.inner.commands.load(Ordering::Relaxed),
            round_trips: self.inner.round_trips.load(Ordering::Relaxed),
            script_evals: self.inner.script_evals.load(Ordering::Relaxed),
            releases: self.inner.releases.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Reads a key directly, bypassing the counters.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data().get(key).cloned()
    }

    fn data(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid strings.
        self.inner
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn round_trip(&self, commands: usize) -> Result<()> {
        let seen = self.inner.round_trips.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.inner.fail_after {
            if seen >= limit {
                return Err(Error::Store(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "injected connection failure",
                ))));
            }
        }
        self.inner.commands.fetch_add(commands, Ordering::Relaxed);
        Ok(())
    }

    fn check_script_args(keys: &[String], args: &[String]) -> Result<usize> {
        let n = declared_len(args)?;
        if n != keys.len() || args.len() != n + 1 {
            return Err(Error::ScriptReply(format!(
                "script declared {} entries but got {} keys and {} values",
                n,
                keys.len(),
                args.len().saturating_sub(1)
            )));
        }
        Ok(n)
    }
}

/// Queued commands for [`MemoryStore::flush`].
#[derive(Debug, Default)]
pub struct MemoryBatch {
    commands: Vec<Queued>,
}

#[derive(Debug)]
enum Queued {
    Set(String, String),
    Get(String),
}

impl CommandBatch for MemoryBatch {
    fn queue_set(&mut self, key: &str, value: &str) {
        self.commands
            .push(Queued::Set(key.to_string(), value.to_string()));
    }

    fn queue_get(&mut self, key: &str) {
        self.commands.push(Queued::Get(key.to_string()));
    }

    fn len(&self) -> usize {
        self.commands.len()
    }
}

impl Store for MemoryStore {
    type Batch = MemoryBatch;

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.round_trip(1)?;
        self.data().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.round_trip(1)?;
        Ok(self.data().get(key).cloned())
    }

    fn batch(&self) -> MemoryBatch {
        MemoryBatch::default()
    }

    async fn flush(&self, batch: MemoryBatch) -> Result<Vec<Option<String>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        self.round_trip(batch.len())?;
        let mut data = self.data();
        let mut values = Vec::new();
        for command in batch.commands {
            match command {
                Queued::Set(key, value) => {
                    data.insert(key, value);
                }
                Queued::Get(key) => values.push(data.get(&key).cloned()),
            }
        }
        Ok(values)
    }

    async fn eval_set_script(&self, keys: &[String], args: &[String]) -> Result<usize> {
        let n = Self::check_script_args(keys, args)?;
        self.round_trip(n)?;
        self.inner.script_evals.fetch_add(1, Ordering::Relaxed);
        let mut data = self.data();
        for (key, value) in keys.iter().zip(&args[1..]) {
            data.insert(key.clone(), value.clone());
        }
        Ok(n)
    }

    async fn eval_get_script(
        &self,
        keys: &[String],
        args: &[String],
    ) -> Result<Vec<Option<String>>> {
        let n = Self::check_script_args(keys, args)?;
        self.round_trip(n)?;
        self.inner.script_evals.fetch_add(1, Ordering::Relaxed);
        let data = self.data();
        Ok(keys.iter().map(|k| data.get(k).cloned()).collect())
    }

    fn close(self) {
        let released = self.inner.releases.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(released, "memory store released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.stats().round_trips, 3);
    }

    #[tokio::test]
    async fn batch_is_one_round_trip() {
        let store = MemoryStore::new();
        let mut batch = store.batch();
        for i in 0..5 {
            batch.queue_set(&format!("k{}", i), &format!("v{}", i));
        }
        assert_eq!(store.stats().round_trips, 0, "queueing sends nothing");

        assert!(store.flush(batch).await.unwrap().is_empty());
        let stats = store.stats();
        assert_eq!(stats.round_trips, 1);
        assert_eq!(stats.commands, 5);
    }

    #[tokio::test]
    async fn batch_replies_follow_queue_order() {
        let store = MemoryStore::new();
        let mut batch = store.batch();
        batch.queue_get("a");
        batch.queue_set("a", "1");
        batch.queue_get("a");
        assert_eq!(batch.len(), 3);

        let values = store.flush(batch).await.unwrap();
        assert_eq!(values, vec![None, Some("1".to_string())]);
    }

    #[tokio::test]
    async fn empty_batch_skips_the_round_trip() {
        let store = MemoryStore::new();
        assert!(store.flush(store.batch()).await.unwrap().is_empty());
        assert_eq!(store.stats().round_trips, 0);
    }

    #[tokio::test]
    async fn script_rejects_mismatched_arguments() {
        let store = MemoryStore::new();
        let keys = vec!["k".to_string()];
        let args = vec!["2".to_string(), "v".to_string()];
        assert!(matches!(
            store.eval_set_script(&keys, &args).await,
            Err(Error::ScriptReply(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure() {
        let store = MemoryStore::failing_after(1);
        store.set("a", "1").await.unwrap();
        assert!(matches!(store.set("b", "2").await, Err(Error::Store(_))));
    }

    #[test]
    fn close_counts_release() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.close();
        assert_eq!(handle.stats().releases, 1);
    }
}
