//! Smoke tests for the `solver-bench` binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn solver_bench(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solver-bench"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SOLVER_BENCH_OUTPUT_DIR")
        .env_remove("SOLVER_BENCH_CONTRIBUTOR")
        .env_remove("SOLVER_BENCH_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch solver-bench")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_list_prints_catalog() {
    let dir = tempdir().unwrap();
    let output = solver_bench(dir.path(), &["list"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("lp/diet_small"));
    assert!(text.contains("sdp/max_cut_small"));
}

#[test]
fn test_list_filters_by_tag() {
    let dir = tempdir().unwrap();
    let text = stdout(&solver_bench(dir.path(), &["list", "--tag", "mip"]));
    assert!(text.contains("mip/knapsack_small"));
    assert!(!text.contains("lp/diet_small"));
}

#[test]
fn test_summarize_without_results() {
    let dir = tempdir().unwrap();
    let output = solver_bench(dir.path(), &["summarize"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No results found. Run benchmarks first."));
}

#[test]
fn test_summarize_rejects_unknown_metric() {
    let dir = tempdir().unwrap();
    let output = solver_bench(dir.path(), &["summarize", "--metric", "wall_clock"]);
    assert!(!output.status.success());
}

#[test]
fn test_run_with_missing_solver_records_error() {
    let dir = tempdir().unwrap();
    let output = solver_bench(
        dir.path(),
        &[
            "run",
            "--problems",
            "lp/diet_small",
            "--solvers",
            "NOT_INSTALLED",
            "--contributor",
            "smoke",
            "--output-dir",
            "out",
        ],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("(0 optimal, 1 solver errors)"));

    let logs: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().to_string_lossy().into_owned();
    assert!(name.contains("_smoke_") && name.ends_with(".jsonl"));

    let reliability = solver_bench(
        dir.path(),
        &["summarize", "--report", "reliability", "--results-dir", "out"],
    );
    assert!(stdout(&reliability).contains("NOT_INSTALLED:"));
}

#[test]
fn test_run_unknown_problem_fails() {
    let dir = tempdir().unwrap();
    let output = solver_bench(
        dir.path(),
        &["run", "--problems", "lp/nope", "--output-dir", "out"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid benchmark selection"));
    assert!(stderr.contains("lp/nope"));
    assert!(!dir.path().join("out").exists());
}
