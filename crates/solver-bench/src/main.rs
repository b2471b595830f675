//! Convex solver benchmark CLI
//!
//! # Usage
//!
//! ```bash
//! # List the problem catalog
//! solver-bench list
//! solver-bench list --tag socp
//!
//! # Run every problem against every solver in solvers.toml
//! solver-bench run --contributor alice
//!
//! # Run a subset
//! solver-bench run --tags lp qp --contributor alice
//! solver-bench run --problems lp/diet_small qp/lasso_medium --solvers SCS CLARABEL
//!
//! # Summarize all logs in results/
//! solver-bench summarize --report comparison --metric total_time --problem-type LP
//! solver-bench summarize --report reliability
//! solver-bench summarize --report fastest
//! ```
//!
//! `SOLVER_BENCH_OUTPUT_DIR`, `SOLVER_BENCH_CONTRIBUTOR` and
//! `SOLVER_BENCH_CONFIG` provide defaults for the matching flags.

mod config;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use bench_core::benchmark::{
    comparison_table, fastest_per_problem, filter_by_problem_type, format_comparison_table,
    format_fastest, format_problem_list, format_reliability_summary, load_all_results,
    reliability_summary,
};
use bench_core::{
    BatchRequest, BatchSummary, BenchmarkRunner, Metric, ProblemRegistry, ProblemSelection,
    ProblemType,
};
use clap::{Parser, Subcommand, ValueEnum};
use config::BenchConfig;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark convex optimization solvers", long_about = None)]
struct Cli {
    /// Log progress at info level (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run benchmarks and append the results to a log file
    Run(RunArgs),
    /// List available problems
    List {
        /// Only show problems with this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Summarize accumulated benchmark results
    Summarize(SummarizeArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Specific problem names to run (takes precedence over --tags)
    #[arg(long, num_args = 1..)]
    problems: Option<Vec<String>>,

    /// Specific solver names to run (default: every configured solver)
    #[arg(long, num_args = 1..)]
    solvers: Option<Vec<String>>,

    /// Run problems matching any of these tags
    #[arg(long, num_args = 1..)]
    tags: Option<Vec<String>>,

    /// Contributor name for results (overrides SOLVER_BENCH_CONTRIBUTOR)
    #[arg(long)]
    contributor: Option<String>,

    /// Output directory for results (overrides SOLVER_BENCH_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Solver manifest (overrides SOLVER_BENCH_CONFIG, default solvers.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReportKind {
    Comparison,
    Reliability,
    Fastest,
}

#[derive(clap::Args, Debug)]
struct SummarizeArgs {
    /// Report type
    #[arg(long, value_enum, default_value_t = ReportKind::Comparison)]
    report: ReportKind,

    /// Result field used by the comparison and fastest reports
    #[arg(long, default_value = "solve_time")]
    metric: String,

    /// Only include results of this problem type (LP, QP, SOCP, ECP, SDP, MIP)
    #[arg(long)]
    problem_type: Option<String>,

    /// Directory containing .jsonl result logs (overrides SOLVER_BENCH_OUTPUT_DIR)
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => run(args),
        Command::List { tag } => list(tag.as_deref()),
        Command::Summarize(args) => summarize(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let config =
        BenchConfig::from_env().with_overrides(args.output_dir, args.contributor, args.config);
    let registry = ProblemRegistry::builtin().context("Failed to register problem catalog")?;
    let solvers = config.load_solvers()?;
    if args.solvers.is_none() && solvers.is_empty() {
        warn!("No solvers selected; the batch will be empty");
    }

    info!(
        output_dir = %config.output_dir.display(),
        contributor = %config.contributor,
        "Benchmark run starting"
    );
    let request = BatchRequest {
        problems: ProblemSelection::from_args(args.problems, args.tags),
        solvers: args.solvers,
        output_dir: config.output_dir,
        contributor: config.contributor,
    };
    let outcome = BenchmarkRunner::new(registry, solvers)
        .run_batch(&request)
        .map_err(|e| {
            if e.is_registration_error() {
                anyhow!("Invalid benchmark selection: {e}")
            } else {
                anyhow::Error::new(e).context("Benchmark run failed")
            }
        })?;

    println!("\n{}", BatchSummary::from_results(&outcome.results));
    println!("Results written to: {}", outcome.log_path.display());
    Ok(())
}

fn list(tag: Option<&str>) -> Result<()> {
    let registry = ProblemRegistry::builtin().context("Failed to register problem catalog")?;
    println!("{}", format_problem_list(&registry.list(tag)));
    Ok(())
}

fn summarize(args: SummarizeArgs) -> Result<()> {
    let metric: Metric = args.metric.parse()?;
    let problem_type = args
        .problem_type
        .as_deref()
        .map(str::parse::<ProblemType>)
        .transpose()?;
    let results_dir = args
        .results_dir
        .unwrap_or_else(|| BenchConfig::from_env().output_dir);

    let loaded = load_all_results(&results_dir)
        .with_context(|| format!("Failed to read results from {}", results_dir.display()))?;
    if loaded.skipped_lines > 0 {
        warn!(skipped = loaded.skipped_lines, "Some result lines could not be parsed");
    }
    if loaded.results.is_empty() {
        println!("No results found. Run benchmarks first.");
        return Ok(());
    }

    let results = match problem_type {
        Some(t) => filter_by_problem_type(&loaded.results, t),
        None => loaded.results,
    };

    let text = match args.report {
        ReportKind::Comparison => {
            format_comparison_table(&comparison_table(&results, metric, problem_type))
        }
        ReportKind::Reliability => format_reliability_summary(&reliability_summary(&results)),
        ReportKind::Fastest => format_fastest(&fastest_per_problem(&results, metric), metric),
    };
    println!("{text}");
    Ok(())
}
