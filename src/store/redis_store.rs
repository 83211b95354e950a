use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use tracing::{debug, info};

use super::{CommandBatch, Store, BATCH_GET_SCRIPT, BATCH_SET_SCRIPT};
use crate::error::Result;

/// Redis backend over one multiplexed connection.
///
/// Every call clones the connection handle; clones share the same socket,
/// and the client multiplexes concurrent requests over it.
pub struct RedisStore {
    addr: String,
    conn: MultiplexedConnection,
    set_script: Script,
    get_script: Script,
}

impl RedisStore {
    /// Connects to `addr`, either `host:port` or a full `redis://` URL.
    pub async fn connect(addr: &str) -> Result<Self> {
        let url = connection_url(addr);
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!(addr = %url, "connected to store");
        Ok(Self {
            addr: url,
            conn,
            set_script: Script::new(BATCH_SET_SCRIPT),
            get_script: Script::new(BATCH_GET_SCRIPT),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

/// Normalizes a bare `host:port` into a `redis://` URL.
pub(crate) fn connection_url(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{}/", addr)
    }
}

/// A `redis::Pipeline` filled ahead of the flush.
pub struct RedisBatch {
    pipe: redis::Pipeline,
    len: usize,
}

impl CommandBatch for RedisBatch {
    fn queue_set(&mut self, key: &str, value: &str) {
        self.pipe.set(key, value).ignore();
        self.len += 1;
    }

    fn queue_get(&mut self, key: &str) {
        self.pipe.get(key);
        self.len += 1;
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Store for RedisStore {
    type Batch = RedisBatch;

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    fn batch(&self) -> RedisBatch {
        RedisBatch {
            pipe: redis::pipe(),
            len: 0,
        }
    }

    async fn flush(&self, batch: RedisBatch) -> Result<Vec<Option<String>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = batch.pipe.query_async(&mut conn).await?;
        Ok(values)
    }

    async fn eval_set_script(&self, keys: &[String], args: &[String]) -> Result<usize> {
        let mut invocation = self.set_script.prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }
        let mut conn = self.conn.clone();
        let count: usize = invocation.invoke_async(&mut conn).await?;
        Ok(count)
    }

    async fn eval_get_script(
        &self,
        keys: &[String],
        args: &[String],
    ) -> Result<Vec<Option<String>>> {
        let mut invocation = self.get_script.prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = invocation.invoke_async(&mut conn).await?;
        Ok(values)
    }

    fn close(self) {
        debug!(addr = %self.addr, "closing store connection");
        drop(self.conn);
    }
}
