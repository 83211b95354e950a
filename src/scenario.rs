//! Scenario identity and the per-run result line.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Set,
    Get,
}

/// Execution strategy for a bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One request at a time.
    Sync,
    /// All requests in flight at once, awaited together.
    Concurrent,
    /// All requests buffered and flushed in one round trip.
    Pipelined,
    /// Chunks of requests executed by a server-side script.
    Scripted,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Sync, Mode::Concurrent, Mode::Pipelined, Mode::Scripted];

    /// Key prefix family for runs in this mode.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Concurrent => "async",
            Self::Pipelined => "batch",
            Self::Scripted => "lua",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scenario {
    pub op: Operation,
    pub mode: Mode,
}

impl Scenario {
    pub const fn new(op: Operation, mode: Mode) -> Self {
        Self { op, mode }
    }

    /// Name printed in the result line.
    pub fn name(&self) -> &'static str {
        match (self.op, self.mode) {
            (Operation::Set, Mode::Sync) => "SetStringBenchmark",
            (Operation::Get, Mode::Sync) => "GetStringBenchmark",
            (Operation::Set, Mode::Concurrent) => "SetStringBenchmarkAsync",
            (Operation::Get, Mode::Concurrent) => "GetStringBenchmarkAsync",
            (Operation::Set, Mode::Pipelined) => "BatchSetStringBenchmarkAsync",
            (Operation::Get, Mode::Pipelined) => "BatchGetStringBenchmarkAsync",
            (Operation::Set, Mode::Scripted) => "LuaSetStringBenchmarkBatchingAsync",
            (Operation::Get, Mode::Scripted) => "LuaGetStringBenchmarkBatchingAsync",
        }
    }

    /// Short slash-separated label used in recorded JSON files.
    pub fn label(&self) -> String {
        let op = match self.op {
            Operation::Set => "set",
            Operation::Get => "get",
        };
        format!("kv/{}/{}", op, self.mode.family())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one scenario invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub scenario: Scenario,
    pub prefix: String,
    pub operations: usize,
    /// Simulated network latency in milliseconds; 0 when disabled.
    pub latency_ms: u64,
    pub elapsed: Duration,
    /// Non-nil values read back (always 0 for sets).
    pub hits: usize,
}

impl RunResult {
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.operations as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Performed {} {} operations", self.operations, self.scenario)?;
        if self.latency_ms > 0 {
            write!(f, " with {} ms latency", self.latency_ms)?;
        }
        write!(f, " in {} ms", self.elapsed.as_millis())
    }
}

/// Printed after every result line.
pub const SEPARATOR: &str = "=========================";

#[cfg(test)]
mod tests {
    use super::*;

    fn result(latency_ms: u64) -> RunResult {
        RunResult {
            scenario: Scenario::new(Operation::Set, Mode::Pipelined),
            prefix: "batch_0".into(),
            operations: 100,
            latency_ms,
            elapsed: Duration::from_micros(12_900),
            hits: 0,
        }
    }

    #[test]
    fn line_without_latency() {
        assert_eq!(
            result(0).to_string(),
            "Performed 100 BatchSetStringBenchmarkAsync operations in 12 ms"
        );
    }

    #[test]
    fn line_with_latency() {
        assert_eq!(
            result(10).to_string(),
            "Performed 100 BatchSetStringBenchmarkAsync operations with 10 ms latency in 12 ms"
        );
    }

    #[test]
    fn names_are_distinct() {
        let mut names = std::collections::HashSet::new();
        for mode in Mode::ALL {
            for op in [Operation::Set, Operation::Get] {
                assert!(names.insert(Scenario::new(op, mode).name()));
            }
        }
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn zero_elapsed_throughput() {
        let mut r = result(0);
        r.elapsed = Duration::ZERO;
        assert_eq!(r.ops_per_sec(), 0.0);
    }
}
