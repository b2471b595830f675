//! Aggregations over result records.
//!
//! All functions are pure and work on any slice of records, typically the
//! union of every log in a results directory.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use super::result::{BenchmarkResult, Metric};
use crate::classify::ProblemType;

/// Problems × solvers grid of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub metric: Metric,
    /// Row labels, sorted
    pub problems: Vec<String>,
    /// Column labels, sorted
    pub solvers: Vec<String>,
    cells: HashMap<(String, String), Option<f64>>,
}

impl ComparisonTable {
    /// Metric value for a pairing; `None` if the pairing was never run or
    /// the record lacks the metric.
    pub fn cell(&self, problem: &str, solver: &str) -> Option<f64> {
        self.cells
            .get(&(problem.to_string(), solver.to_string()))
            .copied()
            .flatten()
    }

    pub fn row(&self, problem: &str) -> Vec<Option<f64>> {
        self.solvers.iter().map(|s| self.cell(problem, s)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Build a comparison table, optionally restricted to one problem type.
///
/// When a pairing appears more than once the last record wins.
pub fn comparison_table(
    results: &[BenchmarkResult],
    metric: Metric,
    problem_type: Option<ProblemType>,
) -> ComparisonTable {
    let mut problems = BTreeSet::new();
    let mut solvers = BTreeSet::new();
    let mut cells = HashMap::new();
    for r in results
        .iter()
        .filter(|r| problem_type.map_or(true, |t| r.problem_type == t.as_str()))
    {
        problems.insert(r.problem_name.clone());
        solvers.insert(r.solver_name.clone());
        cells.insert(
            (r.problem_name.clone(), r.solver_name.clone()),
            r.metric(metric),
        );
    }
    ComparisonTable {
        metric,
        problems: problems.into_iter().collect(),
        solvers: solvers.into_iter().collect(),
        cells,
    }
}

/// Attempts and optimal outcomes for one solver on one problem type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReliabilityCounts {
    pub total: usize,
    pub optimal: usize,
}

impl ReliabilityCounts {
    /// Percentage of attempts that were optimal, 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.optimal as f64 / self.total as f64 * 100.0
        }
    }
}

/// solver → problem type → counts
pub type ReliabilitySummary = BTreeMap<String, BTreeMap<String, ReliabilityCounts>>;

pub fn reliability_summary(results: &[BenchmarkResult]) -> ReliabilitySummary {
    let mut summary = ReliabilitySummary::new();
    for r in results {
        let counts = summary
            .entry(r.solver_name.clone())
            .or_default()
            .entry(r.problem_type.clone())
            .or_default();
        counts.total += 1;
        if r.is_optimal() {
            counts.optimal += 1;
        }
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct FastestEntry {
    pub solver: String,
    pub value: f64,
}

/// Lowest metric value per problem among optimal records that report it.
///
/// Ties keep the record seen first.
pub fn fastest_per_problem(
    results: &[BenchmarkResult],
    metric: Metric,
) -> BTreeMap<String, FastestEntry> {
    let mut best: BTreeMap<String, FastestEntry> = BTreeMap::new();
    for r in results.iter().filter(|r| r.is_optimal()) {
        let Some(value) = r.metric(metric) else {
            continue;
        };
        match best.get_mut(&r.problem_name) {
            Some(entry) if value < entry.value => {
                entry.solver = r.solver_name.clone();
                entry.value = value;
            }
            Some(_) => {}
            None => {
                best.insert(
                    r.problem_name.clone(),
                    FastestEntry {
                        solver: r.solver_name.clone(),
                        value,
                    },
                );
            }
        }
    }
    best
}

pub fn filter_by_problem_type(
    results: &[BenchmarkResult],
    problem_type: ProblemType,
) -> Vec<BenchmarkResult> {
    results
        .iter()
        .filter(|r| r.problem_type == problem_type.as_str())
        .cloned()
        .collect()
}

/// Outcome counts printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub optimal: usize,
    pub solver_errors: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BenchmarkResult]) -> Self {
        results.iter().fold(Self::default(), |mut s, r| {
            s.total += 1;
            s.optimal += usize::from(r.is_optimal());
            s.solver_errors += usize::from(r.is_solver_error());
            s
        })
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed {} benchmark runs ({} optimal, {} solver errors)",
            self.total, self.optimal, self.solver_errors
        )
    }
}
