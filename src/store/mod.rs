//! Key-value backends the harness drives.
//!
//! The harness never implements protocol, pooling or retries itself; it only
//! needs the narrow surface below. `RedisStore` talks to a real server,
//! `MemoryStore` emulates the same surface in-process.

mod memory;
mod redis_store;

pub use self::memory::{MemoryBatch, MemoryStore};
pub use self::redis_store::{RedisBatch, RedisStore};

use crate::error::Result;

/// Server-side script that SETs `ARGV[1]` keys to the following values.
pub const BATCH_SET_SCRIPT: &str = r#"
local n = tonumber(ARGV[1])
for i = 1, n do
    redis.call('SET', KEYS[i], ARGV[i + 1])
end
return n
"#;

/// Server-side script that GETs `ARGV[1]` keys and returns their values.
pub const BATCH_GET_SCRIPT: &str = r#"
local n = tonumber(ARGV[1])
local values = {}
for i = 1, n do
    values[i] = redis.call('GET', KEYS[i])
end
return values
"#;

/// Commands buffered client-side until [`Store::flush`] sends them.
///
/// Queueing never touches the network.
pub trait CommandBatch {
    fn queue_set(&mut self, key: &str, value: &str);

    fn queue_get(&mut self, key: &str);

    /// Commands queued so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Operations the adapter issues against a connected store.
///
/// Implementations must tolerate many in-flight calls on `&self` at once;
/// the concurrent benchmarks fan out on a single handle.
#[allow(async_fn_in_trait)]
pub trait Store {
    type Batch: CommandBatch;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Starts an empty client-side batch.
    fn batch(&self) -> Self::Batch;

    /// Sends everything queued in `batch` in one round trip. Returns the GET
    /// replies in queue order; SETs contribute nothing.
    async fn flush(&self, batch: Self::Batch) -> Result<Vec<Option<String>>>;

    /// Evaluates [`BATCH_SET_SCRIPT`]; returns the count the script reports.
    async fn eval_set_script(&self, keys: &[String], args: &[String]) -> Result<usize>;

    /// Evaluates [`BATCH_GET_SCRIPT`].
    async fn eval_get_script(&self, keys: &[String], args: &[String])
        -> Result<Vec<Option<String>>>;

    /// Releases the underlying connection.
    fn close(self)
    where
        Self: Sized,
    {
    }
}
