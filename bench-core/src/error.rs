//! Benchmark error types
//!
//! Errors that abort an operation. Solver failures are not errors here: they
//! are recorded as `solver_error` results by the runner.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors raised by the registry, result log, and runner.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A problem with this name is already registered
    #[error("Problem already registered: {name}")]
    DuplicateProblem { name: String },

    /// Problem name rejected at registration
    #[error("Invalid problem name '{name}': {reason}")]
    InvalidProblemName { name: String, reason: String },

    /// Problem not found in registry
    #[error("Problem not found: {name}")]
    ProblemNotFound { name: String },

    /// A solver backend with this name is already in the set
    #[error("Solver backend already registered: {name}")]
    DuplicateSolver { name: String },

    /// Metric name does not match a numeric result field
    #[error("Unknown metric '{name}'")]
    UnknownMetric { name: String },

    /// Problem type label outside the classifier taxonomy
    #[error("Unknown problem type '{name}'")]
    UnknownProblemType { name: String },

    /// Conic model dimensions are inconsistent
    #[error("Invalid model: {message}")]
    InvalidModel { message: String },

    /// Invalid attempt state transition
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Solver configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Result log could not be written
    #[error("Failed to write result log {}: {source}", path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BenchError {
    /// Create a duplicate problem error
    pub fn duplicate_problem(name: impl Into<String>) -> Self {
        Self::DuplicateProblem { name: name.into() }
    }

    /// Create an invalid problem name error
    pub fn invalid_problem_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProblemName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a problem not found error
    pub fn problem_not_found(name: impl Into<String>) -> Self {
        Self::ProblemNotFound { name: name.into() }
    }

    /// Create a duplicate solver error
    pub fn duplicate_solver(name: impl Into<String>) -> Self {
        Self::DuplicateSolver { name: name.into() }
    }

    /// Create an unknown metric error
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        Self::UnknownMetric { name: name.into() }
    }

    /// Create an invalid model error
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error concerns problem registration or lookup.
    ///
    /// These are fatal to a CLI invocation and never retried.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateProblem { .. }
                | Self::InvalidProblemName { .. }
                | Self::ProblemNotFound { .. }
                | Self::DuplicateSolver { .. }
        )
    }
}
