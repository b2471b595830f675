//! Fixed-width text rendering of analysis results.

use std::collections::BTreeMap;

use super::analysis::{ComparisonTable, FastestEntry, ReliabilitySummary};
use super::result::Metric;
use crate::registry::ProblemSpec;

/// Placeholder for a pairing with no value.
pub const MISSING_CELL: &str = "—";

const MIN_COLUMN_WIDTH: usize = 10;

pub fn format_comparison_table(table: &ComparisonTable) -> String {
    if table.is_empty() {
        return "No results to display.".to_string();
    }

    let widths: Vec<usize> = table
        .solvers
        .iter()
        .map(|s| s.chars().count().max(MIN_COLUMN_WIDTH))
        .collect();
    let name_width = table
        .problems
        .iter()
        .map(|p| p.chars().count())
        .chain(std::iter::once("Problem".len()))
        .max()
        .unwrap_or_default();

    let columns: Vec<String> = table
        .solvers
        .iter()
        .zip(widths.iter().copied())
        .map(|(s, w)| format!("{s:>w$}"))
        .collect();
    let header = format!("{:<name_width$}  {}", "Problem", columns.join("  "));
    let sep = "-".repeat(header.chars().count());

    let mut lines = vec![format!("Metric: {}", table.metric), sep.clone(), header, sep.clone()];
    for problem in &table.problems {
        let cells: Vec<String> = table
            .row(problem)
            .into_iter()
            .zip(widths.iter().copied())
            .map(|(value, w)| match value {
                Some(v) => format!("{v:>w$.4}"),
                None => format!("{MISSING_CELL:>w$}"),
            })
            .collect();
        lines.push(format!("{problem:<name_width$}  {}", cells.join("  ")));
    }
    lines.push(sep);
    lines.join("\n")
}

pub fn format_reliability_summary(summary: &ReliabilitySummary) -> String {
    let mut lines = vec![
        "Solver Reliability Summary".to_string(),
        "=".repeat(40),
    ];
    for (solver, by_type) in summary {
        lines.push(format!("\n{solver}:"));
        for (problem_type, counts) in by_type {
            lines.push(format!(
                "  {problem_type:>6}: {}/{} ({:.0}%)",
                counts.optimal,
                counts.total,
                counts.success_rate()
            ));
        }
    }
    lines.join("\n")
}

pub fn format_fastest(fastest: &BTreeMap<String, FastestEntry>, metric: Metric) -> String {
    let mut lines = vec![
        format!("Fastest solver per problem (metric: {metric})"),
        "=".repeat(60),
    ];
    if fastest.is_empty() {
        lines.push("  No optimal results with this metric.".to_string());
    }
    for (problem, entry) in fastest {
        lines.push(format!(
            "  {problem:<35} {:<15} {:.4}",
            entry.solver, entry.value
        ));
    }
    lines.join("\n")
}

pub fn format_problem_list(specs: &[&ProblemSpec]) -> String {
    let mut lines = vec![
        format!("{:<35} {:<25} Description", "Name", "Tags"),
        "-".repeat(80),
    ];
    for spec in specs {
        let tags = spec.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        lines.push(format!("{:<35} {tags:<25} {}", spec.name, spec.description));
    }
    lines.join("\n")
}
