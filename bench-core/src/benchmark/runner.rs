//! Execution engine.
//!
//! Runs the problem × solver matrix sequentially, one fresh model per
//! pairing, and writes every attempt to a new result log.
//!
//! ```text
//! ProblemSelection ─→ specs ─┐
//!                            ├─→ Pending ─→ Running ─┬─→ Completed
//! solver names ──────────────┘                       └─→ Failed
//!                                                         ↓
//!                                               <date>_<who>_<os>.jsonl
//! ```

use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::log::{new_log_path, save_results};
use super::result::{BenchmarkResult, Provenance, SOLVER_ERROR_STATUS};
use crate::classify::classify;
use crate::error::{BenchError, BenchResult};
use crate::model::ProblemInstance;
use crate::registry::{ProblemRegistry, ProblemSelection, ProblemSpec};
use crate::solver::{SolveOutcome, SolverSet};

/// Seed passed to every problem factory.
pub const BENCHMARK_SEED: u64 = 0;

/// Lifecycle of one (problem, solver) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Pending,
    Running,
    /// The backend returned a status
    Completed,
    /// The backend raised; recorded as `solver_error`
    Failed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn valid_transitions(self) -> &'static [AttemptState] {
        match self {
            Self::Pending => &[Self::Running],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    pub fn transition(self, to: AttemptState) -> BenchResult<AttemptState> {
        if self.valid_transitions().contains(&to) {
            Ok(to)
        } else {
            Err(BenchError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One cell of the batch matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub problem: String,
    pub solver: String,
    pub state: AttemptState,
}

impl Attempt {
    fn pending(problem: &str, solver: &str) -> Self {
        Self {
            problem: problem.to_string(),
            solver: solver.to_string(),
            state: AttemptState::Pending,
        }
    }

    fn advance(&mut self, to: AttemptState) -> BenchResult<()> {
        self.state = self.state.transition(to)?;
        Ok(())
    }
}

/// What to run and where to write it.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub problems: ProblemSelection,
    /// Explicit solver names; `None` runs every installed backend
    pub solvers: Option<Vec<String>>,
    pub output_dir: PathBuf,
    pub contributor: String,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            problems: ProblemSelection::All,
            solvers: None,
            output_dir: PathBuf::from("results"),
            contributor: "anonymous".to_string(),
        }
    }
}

/// Results of a batch plus the log they were written to.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<BenchmarkResult>,
    pub attempts: Vec<Attempt>,
    pub log_path: PathBuf,
}

impl BatchOutcome {
    pub fn optimal_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_optimal()).count()
    }
}

/// Runs problems from a registry against a set of solver backends.
#[derive(Debug)]
pub struct BenchmarkRunner {
    registry: ProblemRegistry,
    solvers: SolverSet,
    seed: u64,
}

impl BenchmarkRunner {
    pub fn new(registry: ProblemRegistry, solvers: SolverSet) -> Self {
        Self {
            registry,
            solvers,
            seed: BENCHMARK_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn registry(&self) -> &ProblemRegistry {
        &self.registry
    }

    pub fn solvers(&self) -> &SolverSet {
        &self.solvers
    }

    /// Benchmark one problem with one solver.
    ///
    /// Never fails: a backend error or panic becomes a `solver_error` record
    /// with `total_time` set and solve statistics absent.
    pub fn run_one(
        &self,
        spec: &ProblemSpec,
        solver_name: &str,
        contributor: &str,
    ) -> BenchmarkResult {
        let provenance = Provenance::capture();
        let model = spec.instantiate(self.seed);
        let problem_type = classify(&model);
        let size = model.size_metrics();

        let mut result = BenchmarkResult::new(&spec.name, solver_name);
        result.apply_provenance(&provenance);
        result.contributor = contributor.to_string();
        result.problem_type = problem_type.as_str().to_string();
        result.num_scalar_variables = Some(size.num_scalar_variables as u64);
        result.num_scalar_eq_constr = Some(size.num_scalar_eq_constr as u64);
        result.num_scalar_leq_constr = Some(size.num_scalar_leq_constr as u64);

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.solvers.solve(solver_name, &model)
        }))
        .unwrap_or_else(|payload| SolveOutcome::SolverError(panic_message(payload.as_ref())));
        result.total_time = Some(started.elapsed().as_secs_f64());

        match outcome {
            SolveOutcome::Solved(report) => {
                result.status = report.status;
                result.objective_value = report.objective_value;
                result.num_iters = report.num_iters;
                result.compilation_time = report.compilation_time;
                result.solve_time = report.solve_time;
                result.setup_time = report.setup_time;
                result.solver_version = self.solvers.version(solver_name);
            }
            SolveOutcome::SolverError(message) => {
                warn!(
                    problem = %spec.name,
                    solver = solver_name,
                    "Solver failed: {message}"
                );
                result.status = SOLVER_ERROR_STATUS.to_string();
            }
        }
        result
    }

    /// Run the selected matrix problem-major and write one new log file.
    ///
    /// Only selection errors (unknown problem names) and log write failures
    /// abort the batch; solver failures are recorded and the batch goes on.
    pub fn run_batch(&self, request: &BatchRequest) -> BenchResult<BatchOutcome> {
        let specs = self.registry.select(&request.problems)?;
        let mut seen = HashSet::new();
        let solver_names: Vec<String> = request
            .solvers
            .clone()
            .unwrap_or_else(|| self.solvers.installed())
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();

        info!(
            problems = specs.len(),
            solvers = solver_names.len(),
            "Starting benchmark batch"
        );

        let mut results = Vec::with_capacity(specs.len() * solver_names.len());
        let mut attempts = Vec::with_capacity(results.capacity());
        for spec in &specs {
            for solver in &solver_names {
                let mut attempt = Attempt::pending(&spec.name, solver);
                attempt.advance(AttemptState::Running)?;
                info!(problem = %spec.name, solver = %solver, "Running");

                let result = self.run_one(spec, solver, &request.contributor);
                attempt.advance(if result.is_solver_error() {
                    AttemptState::Failed
                } else {
                    AttemptState::Completed
                })?;
                info!(
                    problem = %spec.name,
                    solver = %solver,
                    status = %result.status,
                    total_time = result.total_time.unwrap_or_default(),
                    "Finished"
                );
                results.push(result);
                attempts.push(attempt);
            }
        }

        let log_path = new_log_path(&request.output_dir, &request.contributor);
        save_results(&results, &log_path)?;
        info!(path = %log_path.display(), count = results.len(), "Wrote results");

        Ok(BatchOutcome {
            results,
            attempts,
            log_path,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("solver panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("solver panicked: {s}")
    } else {
        "solver panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cone, ConicModel, ModelBuilder, Row};
    use crate::solver::{SolveReport, SolverBackend};
    use tempfile::TempDir;

    struct Optimal;

    impl SolverBackend for Optimal {
        fn name(&self) -> &str {
            "OPT"
        }

        fn version(&self) -> String {
            "2.1".into()
        }

        fn solve(&self, _model: &ConicModel) -> SolveOutcome {
            SolveOutcome::Solved(SolveReport {
                status: "optimal".into(),
                objective_value: Some(3.0),
                num_iters: Some(4),
                solve_time: Some(0.01),
                ..SolveReport::default()
            })
        }
    }

    struct Panics;

    impl SolverBackend for Panics {
        fn name(&self) -> &str {
            "PANIC"
        }

        fn solve(&self, _model: &ConicModel) -> SolveOutcome {
            panic!("segfault in disguise")
        }
    }

    fn tiny(_seed: u64) -> ConicModel {
        let mut m = ModelBuilder::new();
        let x = m.variables(2);
        m.linear_cost(x.start, 1.0);
        m.constraint(Cone::Nonnegative(2), x.map(Row::var).collect());
        m.build()
    }

    fn runner() -> BenchmarkRunner {
        let mut registry = ProblemRegistry::new();
        registry.register("lp/tiny", &["lp"], "two variables", tiny).unwrap();
        let solvers = SolverSet::new()
            .with(Optimal)
            .unwrap()
            .with(Panics)
            .unwrap();
        BenchmarkRunner::new(registry, solvers)
    }

    #[test]
    fn test_state_transitions() {
        let s = AttemptState::Pending.transition(AttemptState::Running).unwrap();
        assert_eq!(s.transition(AttemptState::Failed).unwrap(), AttemptState::Failed);
        assert!(AttemptState::Pending.transition(AttemptState::Completed).is_err());
        assert!(AttemptState::Completed.is_terminal());
        assert!(matches!(
            AttemptState::Failed.transition(AttemptState::Running),
            Err(BenchError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_run_one_success_copies_stats() {
        let r = runner();
        let spec = r.registry().get("lp/tiny").unwrap();
        let result = r.run_one(spec, "OPT", "tester");
        assert_eq!(result.status, "optimal");
        assert_eq!(result.objective_value, Some(3.0));
        assert_eq!(result.num_iters, Some(4));
        assert_eq!(result.setup_time, None);
        assert_eq!(result.problem_type, "LP");
        assert_eq!(result.num_scalar_variables, Some(2));
        assert_eq!(result.num_scalar_leq_constr, Some(2));
        assert_eq!(result.solver_version, "2.1");
        assert_eq!(result.contributor, "tester");
        assert!(result.total_time.is_some());
    }

    #[test]
    fn test_panicking_backend_is_recorded() {
        let r = runner();
        let spec = r.registry().get("lp/tiny").unwrap();
        let result = r.run_one(spec, "PANIC", "");
        assert!(result.is_solver_error());
        assert!(result.total_time.is_some());
        assert_eq!(result.objective_value, None);
        assert_eq!(result.problem_type, "LP");
    }

    #[test]
    fn test_batch_writes_log_and_tracks_attempts() {
        let dir = TempDir::new().unwrap();
        let request = BatchRequest {
            output_dir: dir.path().to_path_buf(),
            contributor: "ci".into(),
            ..BatchRequest::default()
        };
        let outcome = runner().run_batch(&request).unwrap();

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.optimal_count(), 1);
        let states: Vec<_> = outcome.attempts.iter().map(|a| a.state).collect();
        assert_eq!(states, vec![AttemptState::Completed, AttemptState::Failed]);
        assert!(outcome.log_path.starts_with(dir.path()));
        assert!(outcome
            .log_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains("_ci_"));
    }

    #[test]
    fn test_unknown_solver_name_fails_only_that_attempt() {
        let dir = TempDir::new().unwrap();
        let request = BatchRequest {
            solvers: Some(vec!["MOSEK".into(), "OPT".into()]),
            output_dir: dir.path().to_path_buf(),
            ..BatchRequest::default()
        };
        let outcome = runner().run_batch(&request).unwrap();
        assert!(outcome.results[0].is_solver_error());
        assert!(outcome.results[1].is_optimal());
    }

    #[test]
    fn test_repeated_names_run_once() {
        let dir = TempDir::new().unwrap();
        let request = BatchRequest {
            problems: ProblemSelection::Names(vec!["lp/tiny".into(), "lp/tiny".into()]),
            solvers: Some(vec!["OPT".into(), "PANIC".into(), "OPT".into()]),
            output_dir: dir.path().to_path_buf(),
            ..BatchRequest::default()
        };
        let outcome = runner().run_batch(&request).unwrap();
        let keys: Vec<_> = outcome.results.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![("lp/tiny", "OPT"), ("lp/tiny", "PANIC")]);
        assert_eq!(outcome.attempts.len(), 2);
    }

    #[test]
    fn test_unknown_problem_aborts_before_writing() {
        let dir = TempDir::new().unwrap();
        let request = BatchRequest {
            problems: ProblemSelection::Names(vec!["lp/missing".into()]),
            output_dir: dir.path().join("out"),
            ..BatchRequest::default()
        };
        let err = runner().run_batch(&request).unwrap_err();
        assert!(matches!(err, BenchError::ProblemNotFound { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_empty_matrix_still_writes_log() {
        let dir = TempDir::new().unwrap();
        let request = BatchRequest {
            solvers: Some(vec![]),
            output_dir: dir.path().to_path_buf(),
            ..BatchRequest::default()
        };
        let outcome = runner().run_batch(&request).unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.log_path.exists());
    }
}
