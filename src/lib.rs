//! Latency and throughput sweeps of string SET/GET against a key-value store.
//!
//! The same workload runs under four execution strategies (sequential,
//! concurrent fan-out, pipelined, server-side scripted batches) and three
//! simulated network latencies. Protocol, pooling and multiplexing all belong
//! to the `redis` client; this crate only shapes the load and times it.
//!
//! ```text
//! driver   -> scenario menu, operation-count sweep, latency regimes
//! adapter  -> the benchmarked operations over one store handle
//! store    -> Redis and in-memory backends
//! workload -> key scheme and scripted-batch chunking
//! recorder -> JSON result files (schema)
//! ```

pub mod adapter;
pub mod driver;
pub mod error;
pub mod recorder;
pub mod scenario;
pub mod schema;
pub mod store;
pub mod workload;

pub use adapter::StoreAdapter;
pub use driver::{Driver, Step, SweepConfig};
pub use error::{Error, Result};
pub use recorder::ResultRecorder;
pub use scenario::{Mode, Operation, RunResult, Scenario};
pub use store::{CommandBatch, MemoryStore, RedisStore, Store};
