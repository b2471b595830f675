use anyhow::{Context, Result};
use bench_core::{SolverManifest, SolverSet};
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_CONTRIBUTOR: &str = "anonymous";
pub const DEFAULT_SOLVER_MANIFEST: &str = "solvers.toml";

/// Runtime settings for the benchmark CLI.
///
/// Resolved as defaults, then `SOLVER_BENCH_*` environment variables, then
/// command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Directory result logs are written to and read from
    pub output_dir: PathBuf,
    /// Contributor id recorded in results and log file names
    pub contributor: String,
    /// Solver manifest; `None` means look for `solvers.toml` in the working
    /// directory and tolerate its absence.
    pub solver_manifest: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            contributor: DEFAULT_CONTRIBUTOR.to_string(),
            solver_manifest: None,
        }
    }
}

impl BenchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            output_dir: non_empty("SOLVER_BENCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            contributor: non_empty("SOLVER_BENCH_CONTRIBUTOR").unwrap_or(defaults.contributor),
            solver_manifest: non_empty("SOLVER_BENCH_CONFIG").map(PathBuf::from),
        }
    }

    /// Apply command-line flags on top of the current values.
    pub fn with_overrides(
        mut self,
        output_dir: Option<PathBuf>,
        contributor: Option<String>,
        solver_manifest: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(who) = contributor {
            self.contributor = who;
        }
        if let Some(path) = solver_manifest {
            self.solver_manifest = Some(path);
        }
        self
    }

    /// Build the solver set from the manifest.
    ///
    /// An explicitly configured manifest must exist. The implicit
    /// `solvers.toml` is optional; without it the set is empty.
    pub fn load_solvers(&self) -> Result<SolverSet> {
        let path = match &self.solver_manifest {
            Some(path) => path.clone(),
            None => {
                let path = PathBuf::from(DEFAULT_SOLVER_MANIFEST);
                if !path.exists() {
                    warn!("No {DEFAULT_SOLVER_MANIFEST} found; no solver backends installed");
                    return Ok(SolverSet::new());
                }
                path
            }
        };
        let manifest = SolverManifest::from_file(&path)
            .with_context(|| format!("Failed to load solver manifest {}", path.display()))?;
        let solvers = manifest
            .into_solver_set()
            .with_context(|| format!("Invalid solver manifest {}", path.display()))?;
        info!(path = %path.display(), solvers = ?solvers.installed(), "Loaded solver backends");
        Ok(solvers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(BenchConfig::from_lookup(env(&[])), BenchConfig::default());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = BenchConfig::from_lookup(env(&[
            ("SOLVER_BENCH_OUTPUT_DIR", "/tmp/bench"),
            ("SOLVER_BENCH_CONTRIBUTOR", "lab-7"),
            ("SOLVER_BENCH_CONFIG", "ci-solvers.toml"),
        ]));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/bench"));
        assert_eq!(config.contributor, "lab-7");
        assert_eq!(config.solver_manifest, Some(PathBuf::from("ci-solvers.toml")));
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = BenchConfig::from_lookup(env(&[("SOLVER_BENCH_CONTRIBUTOR", "  ")]));
        assert_eq!(config.contributor, DEFAULT_CONTRIBUTOR);
    }

    #[test]
    fn test_flags_override_env() {
        let config = BenchConfig::from_lookup(env(&[("SOLVER_BENCH_CONTRIBUTOR", "env")]))
            .with_overrides(Some(PathBuf::from("out")), Some("flag".into()), None);
        assert_eq!(config.contributor, "flag");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.solver_manifest, None);
    }

    #[test]
    fn test_explicit_manifest_must_exist() {
        let dir = TempDir::new().unwrap();
        let config = BenchConfig::default().with_overrides(
            None,
            None,
            Some(dir.path().join("missing.toml")),
        );
        assert!(config.load_solvers().is_err());
    }

    #[test]
    fn test_manifest_loads_backends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("solvers.toml");
        std::fs::write(
            &path,
            "[[solver]]\nname = \"SCS\"\ncommand = \"scs-json\"\nversion = \"3.2\"\n",
        )
        .unwrap();
        let config = BenchConfig::default().with_overrides(None, None, Some(path));
        let solvers = config.load_solvers().unwrap();
        assert_eq!(solvers.installed(), vec!["SCS"]);
    }
}
