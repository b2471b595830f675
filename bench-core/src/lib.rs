//! Convex Solver Benchmark Library
//!
//! This library provides:
//! - A registry of seeded, reproducible convex optimization problems
//! - Structural classification of problems (MIP, SDP, ECP, SOCP, QP, LP)
//! - A sequential runner that times every (problem, solver) pairing and
//!   records failures instead of aborting
//! - A newline-delimited JSON result log and reports over accumulated logs
//!
//! # Features
//!
//! ## Problems
//! Built-in collections are registered per problem class (`lp/`, `qp/`,
//! `socp/`, `ecp/`, `sdp/`, `mip/`). Each factory takes a seed and returns a
//! fresh [`ConicModel`] in standard conic form.
//!
//! ## Solvers
//! Anything implementing [`SolverBackend`] can be benchmarked. External
//! solver binaries are wrapped by [`CommandBackend`] and declared in a
//! `solvers.toml` manifest.
//!
//! ## Reports
//! - comparison: problems × solvers grid of one metric
//! - reliability: optimal/total per solver and problem type
//! - fastest: best solver per problem among optimal runs
//!
//! # Usage
//!
//! ```no_run
//! use bench_core::{BatchRequest, BenchmarkRunner, ProblemRegistry, SolverManifest};
//! use std::path::Path;
//!
//! # fn main() -> bench_core::BenchResult<()> {
//! let registry = ProblemRegistry::builtin()?;
//! let solvers = SolverManifest::from_file(Path::new("solvers.toml"))?.into_solver_set()?;
//! let outcome = BenchmarkRunner::new(registry, solvers).run_batch(&BatchRequest::default())?;
//! println!("{} optimal", outcome.optimal_count());
//! # Ok(())
//! # }
//! ```

pub mod benchmark;
pub mod classify;
pub mod error;
pub mod model;
pub mod problems;
pub mod registry;
pub mod solver;

// Re-export key types
pub use benchmark::{
    BatchOutcome, BatchRequest, BatchSummary, BenchmarkResult, BenchmarkRunner, Metric,
};
pub use classify::{classify, ProblemType};
pub use error::{BenchError, BenchResult};
pub use model::{Cone, ConicModel, ModelBuilder, ProblemInstance, SizeMetrics};
pub use registry::{ProblemRegistry, ProblemSelection, ProblemSpec};
pub use solver::{
    CommandBackend, CommandSpec, SolveOutcome, SolveReport, SolverBackend, SolverManifest,
    SolverSet,
};
