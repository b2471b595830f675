//! Solver backend boundary.
//!
//! A backend turns a [`ConicModel`] into a [`SolveOutcome`]. Failures are
//! values: a backend that cannot solve returns `SolveOutcome::SolverError`
//! instead of erroring, so the runner can record the attempt and move on.

pub mod command;

pub use command::{CommandBackend, CommandSpec, SolverManifest};

use crate::error::{BenchError, BenchResult};
use crate::model::ConicModel;
use serde::{Deserialize, Serialize};

/// Statistics reported by a backend after a solve.
///
/// Every statistic is optional; absence means the backend did not report it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveReport {
    /// Status string as reported by the backend (e.g. `optimal`, `infeasible`)
    pub status: String,
    pub objective_value: Option<f64>,
    pub num_iters: Option<u64>,
    /// Seconds spent transforming the model into solver input
    pub compilation_time: Option<f64>,
    /// Seconds spent in the solver's own solve phase
    pub solve_time: Option<f64>,
    /// Seconds spent in the solver's setup phase
    pub setup_time: Option<f64>,
}

impl SolveReport {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }
}

/// Result of one solve attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The backend returned a status (which may itself be a failure status)
    Solved(SolveReport),
    /// The backend raised instead of returning a status
    SolverError(String),
}

impl SolveOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::SolverError(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::SolverError(_))
    }
}

/// A solver that can be benchmarked.
pub trait SolverBackend: Send + Sync {
    /// Identifier used in selections and result records
    fn name(&self) -> &str;

    /// Backend version recorded as provenance; empty when unknown
    fn version(&self) -> String {
        String::new()
    }

    /// Solve one model. Must not panic on solver failure.
    fn solve(&self, model: &ConicModel) -> SolveOutcome;
}

/// The backends available in this environment, in registration order.
#[derive(Default)]
pub struct SolverSet {
    backends: Vec<Box<dyn SolverBackend>>,
}

impl SolverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend. Names must be unique.
    pub fn add(&mut self, backend: Box<dyn SolverBackend>) -> BenchResult<()> {
        if self.contains(backend.name()) {
            return Err(BenchError::duplicate_solver(backend.name()));
        }
        self.backends.push(backend);
        Ok(())
    }

    /// Builder-style [`SolverSet::add`]
    pub fn with(mut self, backend: impl SolverBackend + 'static) -> BenchResult<Self> {
        self.add(Box::new(backend))?;
        Ok(self)
    }

    /// Names of every available backend
    pub fn installed(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn SolverBackend> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Version of the named backend, empty if unknown
    pub fn version(&self, name: &str) -> String {
        self.get(name).map(|b| b.version()).unwrap_or_default()
    }

    /// Solve with the named backend.
    ///
    /// An unknown name is a solver error, not a registry error: requesting a
    /// backend that is not installed fails that attempt only.
    pub fn solve(&self, name: &str, model: &ConicModel) -> SolveOutcome {
        match self.get(name) {
            Some(backend) => backend.solve(model),
            None => SolveOutcome::error(format!("solver {name} is not installed")),
        }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for SolverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.installed()).finish()
    }
}
