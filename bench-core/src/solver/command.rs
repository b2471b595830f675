//! External solver processes.
//!
//! Wraps a solver binary via `tokio::process::Command`. The model is written
//! to the child's stdin as JSON and a [`SolveReport`] is read back from
//! stdout. Every failure mode (spawn, exit code, output, timeout) degrades to
//! `SolveOutcome::SolverError`.
//!
//! Each solve drives its own current-thread runtime, so `solve` must not be
//! called from inside an async context.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{SolveOutcome, SolveReport, SolverBackend, SolverSet};
use crate::error::{BenchError, BenchResult};
use crate::model::ConicModel;

/// One `[[solver]]` entry of a solver manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub version: String,
    /// Kill the process after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Solver backends declared in TOML.
///
/// ```toml
/// [[solver]]
/// name = "SCS"
/// command = "scs-json"
/// version = "3.2.4"
/// timeout_secs = 600
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverManifest {
    #[serde(default, rename = "solver")]
    pub solvers: Vec<CommandSpec>,
}

impl SolverManifest {
    pub fn from_toml_str(content: &str) -> BenchResult<Self> {
        let manifest: SolverManifest = toml::from_str(content)?;
        for spec in &manifest.solvers {
            if spec.name.trim().is_empty() {
                return Err(BenchError::config("solver entry with empty name"));
            }
            if spec.command.trim().is_empty() {
                return Err(BenchError::config(format!(
                    "solver {} has no command",
                    spec.name
                )));
            }
        }
        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build a [`SolverSet`] with one [`CommandBackend`] per entry.
    pub fn into_solver_set(self) -> BenchResult<SolverSet> {
        let mut set = SolverSet::new();
        for spec in self.solvers {
            set.add(Box::new(CommandBackend::new(spec)))?;
        }
        Ok(set)
    }
}

/// A solver that runs as a child process.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    spec: CommandSpec,
}

impl CommandBackend {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    fn run(&self, model: &ConicModel) -> Result<SolveReport, String> {
        let payload =
            serde_json::to_vec(model).map_err(|e| format!("failed to encode model: {e}"))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("failed to start solver runtime: {e}"))?;

        let output = runtime.block_on(async {
            let Some(secs) = self.spec.timeout_secs else {
                return self.execute(payload).await;
            };
            match tokio::time::timeout(Duration::from_secs(secs), self.execute(payload)).await {
                Ok(output) => output,
                Err(_) => Err(format!("timed out after {secs}s")),
            }
        })?;
        self.parse_output(output)
    }

    /// Spawn the solver, feed it the model and collect its output.
    ///
    /// Dropping the future kills the child, and its pipes are released
    /// even if descendants still hold them open.
    async fn execute(&self, payload: Vec<u8>) -> Result<Output, String> {
        let mut child = Command::new(&self.spec.command)
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start `{}`: {e}", self.spec.command))?;
        debug!(solver = %self.spec.name, pid = ?child.id(), "Spawned solver process");

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading is reported by its status
                let _ = stdin.write_all(&payload).await;
            }
        };
        let ((), output) = tokio::join!(feed, child.wait_with_output());
        output.map_err(|e| format!("failed to wait for solver: {e}"))
    }

    fn parse_output(&self, output: Output) -> Result<SolveReport, String> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim().lines().last().unwrap_or("");
            return Err(format!(
                "`{}` exited with {}: {detail}",
                self.spec.command, output.status
            ));
        }

        let report: SolveReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("invalid solver output: {e}"))?;
        if report.status.is_empty() {
            return Err("solver output has no status".to_string());
        }
        Ok(report)
    }
}

impl SolverBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn version(&self) -> String {
        self.spec.version.clone()
    }

    fn solve(&self, model: &ConicModel) -> SolveOutcome {
        match self.run(model) {
            Ok(report) => SolveOutcome::Solved(report),
            Err(message) => SolveOutcome::SolverError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelBuilder;
    use std::time::Instant;

    fn shell(name: &str, script: &str) -> CommandBackend {
        CommandBackend::new(CommandSpec {
            name: name.into(),
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
            version: "0.0-test".into(),
            timeout_secs: None,
        })
    }

    fn model() -> ConicModel {
        let mut m = ModelBuilder::new();
        let x = m.variables(2);
        m.linear_cost(x.start, 1.0);
        m.build()
    }

    #[test]
    fn test_manifest_parses_solver_tables() {
        let manifest = SolverManifest::from_toml_str(
            r#"
            [[solver]]
            name = "SCS"
            command = "scs-json"
            version = "3.2.4"
            timeout_secs = 60

            [[solver]]
            name = "ECOS"
            command = "ecos-json"
            args = ["--quiet"]
            "#,
        )
        .unwrap();
        assert_eq!(manifest.solvers.len(), 2);
        assert_eq!(manifest.solvers[0].timeout_secs, Some(60));
        assert_eq!(manifest.solvers[1].args, vec!["--quiet"]);
        assert_eq!(manifest.solvers[1].version, "");

        let set = manifest.into_solver_set().unwrap();
        assert_eq!(set.installed(), vec!["SCS", "ECOS"]);
        assert_eq!(set.version("SCS"), "3.2.4");
    }

    #[test]
    fn test_manifest_rejects_missing_command() {
        let err = SolverManifest::from_toml_str("[[solver]]\nname = \"X\"\ncommand = \"\"\n")
            .unwrap_err();
        assert!(matches!(err, BenchError::Config { .. }));
    }

    #[test]
    fn test_manifest_rejects_duplicate_names() {
        let manifest = SolverManifest::from_toml_str(concat!(
            "[[solver]]\nname = \"X\"\ncommand = \"a\"\n",
            "[[solver]]\nname = \"X\"\ncommand = \"b\"\n",
        ))
        .unwrap();
        assert!(matches!(
            manifest.into_solver_set(),
            Err(BenchError::DuplicateSolver { .. })
        ));
    }

    #[test]
    fn test_missing_binary_is_solver_error() {
        let backend = CommandBackend::new(CommandSpec {
            name: "GHOST".into(),
            command: "definitely-not-a-solver-binary".into(),
            args: vec![],
            version: String::new(),
            timeout_secs: None,
        });
        assert!(backend.solve(&model()).is_error());
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_report_from_stdout() {
        let backend = shell(
            "ECHO",
            r#"cat > /dev/null; echo '{"status":"optimal","objective_value":1.5,"num_iters":7}'"#,
        );
        match backend.solve(&model()) {
            SolveOutcome::Solved(report) => {
                assert_eq!(report.status, "optimal");
                assert_eq!(report.objective_value, Some(1.5));
                assert_eq!(report.num_iters, Some(7));
                assert_eq!(report.solve_time, None);
            }
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let backend = shell("FAIL", "cat > /dev/null; echo 'license expired' >&2; exit 3");
        match backend.solve(&model()) {
            SolveOutcome::SolverError(message) => assert!(message.contains("license expired")),
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_is_solver_error() {
        let backend = shell("NOISE", "cat > /dev/null; echo 'not json'");
        assert!(backend.solve(&model()).is_error());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let mut backend = shell("SLOW", "exec sleep 30");
        backend.spec.timeout_secs = Some(1);
        let started = Instant::now();
        match backend.solve(&model()) {
            SolveOutcome::SolverError(message) => assert!(message.contains("timed out")),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_bounds_wrapped_solver() {
        // The shell forks `sleep`, which keeps the output pipes open after
        // the shell itself is killed.
        let mut backend = shell("WRAPPED", "cat > /dev/null; sleep 6; true");
        backend.spec.timeout_secs = Some(1);
        let started = Instant::now();
        match backend.solve(&model()) {
            SolveOutcome::SolverError(message) => assert_eq!(message, "timed out after 1s"),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_model_round_trips_through_pipes() {
        let mut m = ModelBuilder::new();
        let x = m.variables(20_000);
        for j in x {
            m.linear_cost(j, 1.0);
        }
        let backend = shell(
            "BIG",
            r#"cat > /dev/null; echo '{"status":"optimal","solve_time":0.5}'"#,
        );
        assert!(!backend.solve(&m.build()).is_error());
    }
}
