//! The per-attempt result record.
//!
//! One [`BenchmarkResult`] is produced for every (problem, solver) pairing,
//! whether the solve succeeded or not. Records are flat so they serialize to
//! one JSON object per log line.

use crate::error::{BenchError, BenchResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status recorded when the backend raised instead of returning a status.
pub const SOLVER_ERROR_STATUS: &str = "solver_error";

/// Status a backend reports for a successful solve.
pub const OPTIMAL_STATUS: &str = "optimal";

/// A single benchmark attempt.
///
/// Missing keys deserialize to `""` / `None`; unknown keys are ignored so
/// logs written by other harness versions still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkResult {
    pub problem_name: String,
    pub solver_name: String,

    /// Seconds spent compiling the model into solver input
    pub compilation_time: Option<f64>,
    /// Seconds reported by the solver for its solve phase
    pub solve_time: Option<f64>,
    /// Seconds reported by the solver for its setup phase
    pub setup_time: Option<f64>,
    /// Wall-clock seconds measured by the harness around the solve call
    pub total_time: Option<f64>,

    pub status: String,
    pub objective_value: Option<f64>,
    pub num_iters: Option<u64>,

    pub problem_type: String,
    pub num_scalar_variables: Option<u64>,
    pub num_scalar_eq_constr: Option<u64>,
    pub num_scalar_leq_constr: Option<u64>,

    #[serde(alias = "cvxpy_version")]
    pub library_version: String,
    /// `rustc --version` of the toolchain that built the harness
    #[serde(alias = "python_version")]
    pub rust_version: String,
    pub solver_version: String,
    pub os_info: String,
    pub cpu_info: String,
    /// ISO-8601 UTC timestamp taken when the attempt started
    pub timestamp: String,
    pub contributor: String,
}

impl BenchmarkResult {
    pub fn new(problem_name: impl Into<String>, solver_name: impl Into<String>) -> Self {
        Self {
            problem_name: problem_name.into(),
            solver_name: solver_name.into(),
            ..Self::default()
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == OPTIMAL_STATUS
    }

    pub fn is_solver_error(&self) -> bool {
        self.status == SOLVER_ERROR_STATUS
    }

    /// `(problem_name, solver_name)`
    pub fn key(&self) -> (&str, &str) {
        (&self.problem_name, &self.solver_name)
    }

    /// Numeric value of the selected field, if present.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let count = |v: Option<u64>| v.map(|n| n as f64);
        match metric {
            Metric::CompilationTime => self.compilation_time,
            Metric::SolveTime => self.solve_time,
            Metric::SetupTime => self.setup_time,
            Metric::TotalTime => self.total_time,
            Metric::ObjectiveValue => self.objective_value,
            Metric::NumIters => count(self.num_iters),
            Metric::NumScalarVariables => count(self.num_scalar_variables),
            Metric::NumScalarEqConstr => count(self.num_scalar_eq_constr),
            Metric::NumScalarLeqConstr => count(self.num_scalar_leq_constr),
        }
    }

    pub fn apply_provenance(&mut self, provenance: &Provenance) {
        self.library_version = provenance.library_version.clone();
        self.rust_version = provenance.rust_version.clone();
        self.os_info = provenance.os_info.clone();
        self.cpu_info = provenance.cpu_info.clone();
        self.timestamp = provenance.timestamp.clone();
    }

    pub fn to_json_line(&self) -> BenchResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one log line. Bare `NaN` / `Infinity` tokens written by older
    /// harnesses for unbounded problems load as `None`.
    pub fn from_json_line(line: &str) -> BenchResult<Self> {
        match serde_json::from_str(line) {
            Ok(record) => Ok(record),
            Err(e) => match nonfinite_to_null(line) {
                Some(rewritten) => Ok(serde_json::from_str(&rewritten)?),
                None => Err(e.into()),
            },
        }
    }
}

const NONFINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace non-finite float tokens outside string literals with `null`.
/// Returns `None` when there was nothing to replace.
fn nonfinite_to_null(line: &str) -> Option<String> {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut in_string = false;
    let mut changed = false;
    while let Some(c) = rest.chars().next() {
        if in_string {
            if c == '\\' {
                let escape: usize = rest.chars().take(2).map(char::len_utf8).sum();
                out.push_str(&rest[..escape]);
                rest = &rest[escape..];
                continue;
            }
            in_string = c != '"';
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NONFINITE_TOKENS.iter().find(|t| rest.starts_with(*t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            changed = true;
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    changed.then_some(out)
}

/// Environment facts recorded with every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub library_version: String,
    pub rust_version: String,
    pub os_info: String,
    pub cpu_info: String,
    pub timestamp: String,
}

impl Provenance {
    pub fn capture() -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            rust_version: env!("BENCH_RUSTC_VERSION").to_string(),
            os_info: format!(
                "{}-{}",
                std::env::consts::OS,
                std::env::consts::FAMILY
            ),
            cpu_info: std::env::consts::ARCH.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// A numeric record field usable in comparisons.
///
/// Names match the log's field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    CompilationTime,
    #[default]
    SolveTime,
    SetupTime,
    TotalTime,
    ObjectiveValue,
    NumIters,
    NumScalarVariables,
    NumScalarEqConstr,
    NumScalarLeqConstr,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::CompilationTime,
        Metric::SolveTime,
        Metric::SetupTime,
        Metric::TotalTime,
        Metric::ObjectiveValue,
        Metric::NumIters,
        Metric::NumScalarVariables,
        Metric::NumScalarEqConstr,
        Metric::NumScalarLeqConstr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::CompilationTime => "compilation_time",
            Metric::SolveTime => "solve_time",
            Metric::SetupTime => "setup_time",
            Metric::TotalTime => "total_time",
            Metric::ObjectiveValue => "objective_value",
            Metric::NumIters => "num_iters",
            Metric::NumScalarVariables => "num_scalar_variables",
            Metric::NumScalarEqConstr => "num_scalar_eq_constr",
            Metric::NumScalarLeqConstr => "num_scalar_leq_constr",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| BenchError::unknown_metric(s))
    }
}
