//! Benchmark Module
//!
//! Runs registered problems against solver backends, records every attempt,
//! and summarises the accumulated logs.
//!
//! # Architecture
//!
//! ```text
//! ProblemRegistry ──→ BenchmarkRunner ←── SolverSet
//!                           │
//!                     BenchmarkResult (one per pairing)
//!                           ↓
//!                  results/<date>_<who>_<os>.jsonl
//!                           ↓
//!            load_all_results ──→ analysis ──→ report
//! ```
//!
//! # Workflow
//!
//! 1. Select problems (names, tags, or everything) and solvers
//! 2. For each problem, for each solver:
//!    a. Build the model from the problem factory with a fixed seed
//!    b. Classify it and record size metrics
//!    c. Solve, timing the call; failures become `solver_error` records
//! 3. Append all records to a new log file
//! 4. Later, aggregate any number of logs into comparison reports

pub mod analysis;
pub mod log;
pub mod report;
pub mod result;
pub mod runner;

pub use analysis::{
    comparison_table, fastest_per_problem, filter_by_problem_type, reliability_summary,
    BatchSummary, ComparisonTable, FastestEntry, ReliabilityCounts, ReliabilitySummary,
};
pub use log::{
    load_all_results, load_results, log_file_name, new_log_path, sanitize_contributor,
    save_results, LoadReport,
};
pub use report::{
    format_comparison_table, format_fastest, format_problem_list, format_reliability_summary,
};
pub use result::{BenchmarkResult, Metric, Provenance, OPTIMAL_STATUS, SOLVER_ERROR_STATUS};
pub use runner::{
    Attempt, AttemptState, BatchOutcome, BatchRequest, BenchmarkRunner, BENCHMARK_SEED,
};
