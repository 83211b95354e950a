//! Benchmark comparison tool.
//!
//! Compares two JSON result files and prints a table of elapsed-time deltas.
//!
//! Usage: `cargo run --bin bench-compare -- <baseline.json> <candidate.json>`

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kv_latency_bench::recorder::load_report;
use kv_latency_bench::schema::{BenchmarkMetrics, BenchmarkResult};

#[derive(Parser, Debug)]
#[command(about = "Compare two kv-bench result files")]
struct Args {
    baseline: PathBuf,
    candidate: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let baseline = load_report(&args.baseline)
        .with_context(|| format!("reading {}", args.baseline.display()))?;
    let candidate = load_report(&args.candidate)
        .with_context(|| format!("reading {}", args.candidate.display()))?;

    let base_map: HashMap<&str, &BenchmarkResult> = baseline
        .results
        .iter()
        .map(|r| (r.benchmark.as_str(), r))
        .collect();

    eprintln!(
        "Baseline: {} ({}, {})",
        args.baseline.display(),
        baseline.metadata.target,
        baseline.metadata.timestamp
    );
    eprintln!(
        "Candidate: {} ({}, {})",
        args.candidate.display(),
        candidate.metadata.target,
        candidate.metadata.timestamp
    );
    eprintln!();

    println!(
        "{:<48} | {:>12} | {:>12} | {:>12}",
        "Benchmark", "Base", "New", "Delta"
    );
    println!("{}", "-".repeat(92));

    let mut matched = 0u32;
    let mut only_cand = 0u32;

    for cand in &candidate.results {
        match base_map.get(cand.benchmark.as_str()) {
            Some(base) => {
                matched += 1;
                print_comparison(&cand.benchmark, &base.metrics, &cand.metrics);
            }
            None => only_cand += 1,
        }
    }

    let only_base = baseline
        .results
        .iter()
        .filter(|b| !candidate.results.iter().any(|c| c.benchmark == b.benchmark))
        .count();

    println!("{}", "-".repeat(92));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        matched, only_base, only_cand
    );
    Ok(())
}

fn print_comparison(name: &str, base: &BenchmarkMetrics, cand: &BenchmarkMetrics) {
    let pct = delta_pct(base.elapsed_ns, cand.elapsed_ns);
    println!(
        "{:<48} | {:>12} | {:>12} | {:>+.1}% ({})",
        name,
        format_ns(base.elapsed_ns),
        format_ns(cand.elapsed_ns),
        pct,
        hint(pct),
    );
}

/// Relative change of the candidate's elapsed time; negative is faster.
fn delta_pct(base_ns: u64, cand_ns: u64) -> f64 {
    if base_ns > 0 {
        ((cand_ns as f64 - base_ns as f64) / base_ns as f64) * 100.0
    } else {
        0.0
    }
}

fn hint(delta_pct: f64) -> &'static str {
    if delta_pct < -1.0 {
        "faster"
    } else if delta_pct > 1.0 {
        "slower"
    } else {
        "~same"
    }
}

fn format_ns(ns: u64) -> String {
    if ns < 1_000 {
        format!("{} ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.2} us", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.2} ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", ns as f64 / 1_000_000_000.0)
    }
}
