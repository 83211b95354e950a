//! Result recorder for saving sweep results to JSON files.
//!
//! Files follow the types in [`crate::schema`] and land in a results
//! directory (`results/` by default).

use crate::error::Result;
use crate::scenario::{Operation, RunResult};
use crate::schema::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

/// Accumulates run results and writes them to a JSON file.
pub struct ResultRecorder {
    category: String,
    metadata: RunMetadata,
    results: Vec<BenchmarkResult>,
}

impl ResultRecorder {
    /// Create a new recorder for the given category.
    ///
    /// Captures the host, commit and start time at construction time.
    pub fn new(category: &str, target: &str) -> Self {
        Self {
            category: category.to_string(),
            metadata: RunMetadata {
                timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                git_commit: git_commit(),
                target: target.to_string(),
                harness_version: env!("CARGO_PKG_VERSION").to_string(),
                hardware: capture_hardware(),
            },
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Record one scenario invocation.
    pub fn record_run(&mut self, run: &RunResult) {
        let mut parameters = HashMap::new();
        parameters.insert("prefix".into(), serde_json::json!(run.prefix));
        parameters.insert("mode".into(), serde_json::json!(run.scenario.mode.family()));

        self.results.push(BenchmarkResult {
            benchmark: format!("{}/{}", run.scenario.label(), run.prefix),
            scenario: run.scenario.name().to_string(),
            parameters,
            metrics: BenchmarkMetrics {
                operations: run.operations as u64,
                elapsed_ns: run.elapsed.as_nanos() as u64,
                ops_per_sec: Some(run.ops_per_sec()),
                latency_ms: (run.latency_ms > 0).then_some(run.latency_ms),
                hits: (run.scenario.op == Operation::Get).then_some(run.hits as u64),
            },
        });
    }

    /// Write all accumulated results to a JSON file in `dir`.
    ///
    /// File naming: `<category>-<timestamp>-<commit>.json`
    pub fn save_to(self, dir: &Path) -> Result<PathBuf> {
        let commit = self
            .metadata
            .git_commit
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        // Colons are not portable in file names.
        let ts = self.metadata.timestamp.replace(':', "-");
        let filename = format!("{}-{}-{}.json", self.category, ts, commit);

        let report = BenchmarkReport {
            schema_version: 1,
            metadata: self.metadata,
            results: self.results,
        };

        std::fs::create_dir_all(dir)?;
        let path = dir.join(filename);
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)?;

        info!(path = %path.display(), results = report.results.len(), "results saved");
        Ok(path)
    }
}

/// Reads a report written by [`ResultRecorder::save_to`].
pub fn load_report(path: &Path) -> Result<BenchmarkReport> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ---------------------------------------------------------------------------
// Host and commit
// ---------------------------------------------------------------------------

/// Short hash of `HEAD`, if the harness runs from a git checkout.
fn git_commit() -> Option<String> {
    let out = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn capture_hardware() -> HardwareInfo {
    let cpu = std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|info| cpu_model(&info))
        .unwrap_or_else(|| "unknown".to_string());
    HardwareInfo {
        cpu,
        cores: std::thread::available_parallelism().map_or(0, |n| n.get()),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

fn cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(field, _)| field.trim() == "model name")
        .map(|(_, model)| model.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_model_from_cpuinfo() {
        let info = "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel name\t: Intel(R) Xeon(R) 8375C\n";
        assert_eq!(cpu_model(info).as_deref(), Some("Intel(R) Xeon(R) 8375C"));
        assert_eq!(cpu_model("processor\t: 0\n"), None);
    }

    #[test]
    fn file_name_has_no_colons() {
        let mut rec = ResultRecorder::new("sweep", "memory");
        rec.metadata.timestamp = "2026-10-19T08:30:00Z".to_string();
        rec.metadata.git_commit = Some("abc1234".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = rec.save_to(dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "sweep-2026-10-19T08-30-00Z-abc1234.json"
        );
    }
}
