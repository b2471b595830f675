//! Newline-delimited JSON result log.
//!
//! Each line is one [`BenchmarkResult`]. A batch appends to the file named
//! `<YYYYMMDD>_<contributor>_<platform>.jsonl`, so runs by one contributor on
//! one day share a file. A results directory is the union of all such files.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use super::result::BenchmarkResult;
use crate::error::{BenchError, BenchResult};

const ANONYMOUS: &str = "anonymous";

/// Records read from one or more log files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub results: Vec<BenchmarkResult>,
    /// Malformed lines that were skipped
    pub skipped_lines: usize,
    /// Log files read
    pub files: usize,
}

impl LoadReport {
    fn absorb(&mut self, other: LoadReport) {
        self.results.extend(other.results);
        self.skipped_lines += other.skipped_lines;
        self.files += other.files;
    }
}

/// Replace anything outside `[A-Za-z0-9_-]` so the contributor id is safe
/// inside a file name.
pub fn sanitize_contributor(contributor: &str) -> String {
    let cleaned: String = contributor
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        ANONYMOUS.to_string()
    } else {
        cleaned
    }
}

pub fn log_file_name(date: NaiveDate, contributor: &str, platform: &str) -> String {
    format!(
        "{}_{}_{}.jsonl",
        date.format("%Y%m%d"),
        sanitize_contributor(contributor),
        platform.to_lowercase()
    )
}

/// Path for a new log in `dir`, dated today (UTC) for the current platform.
pub fn new_log_path(dir: &Path, contributor: &str) -> PathBuf {
    dir.join(log_file_name(
        Utc::now().date_naive(),
        contributor,
        std::env::consts::OS,
    ))
}

/// Append `results` to `path`, creating the file and its parent directories.
///
/// An empty slice still creates the file.
pub fn save_results(results: &[BenchmarkResult], path: &Path) -> BenchResult<()> {
    let log_err = |source: std::io::Error| BenchError::LogWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(log_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_err)?;
    let mut writer = BufWriter::new(file);
    for result in results {
        let line = result.to_json_line()?;
        writeln!(writer, "{line}").map_err(log_err)?;
    }
    writer.flush().map_err(log_err)?;
    debug!(path = %path.display(), count = results.len(), "Saved results");
    Ok(())
}

/// Read one log file. Blank lines are ignored and malformed lines are
/// skipped with a warning.
pub fn load_results(path: &Path) -> BenchResult<LoadReport> {
    let file = fs::File::open(path)?;
    let mut report = LoadReport {
        files: 1,
        ..LoadReport::default()
    };
    for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
        let raw = raw?;
        let parsed = match std::str::from_utf8(&raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => BenchmarkResult::from_json_line(line.trim()).map_err(|e| e.to_string()),
            Err(e) => Err(format!("invalid UTF-8: {e}")),
        };
        match parsed {
            Ok(result) => report.results.push(result),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    line = index + 1,
                    "Skipping malformed result line: {e}"
                );
                report.skipped_lines += 1;
            }
        }
    }
    Ok(report)
}

/// Read every `*.jsonl` file in `dir` in file-name order.
///
/// A missing directory yields an empty report.
pub fn load_all_results(dir: &Path) -> BenchResult<LoadReport> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Results directory does not exist");
        return Ok(LoadReport::default());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jsonl"))
        .collect();
    paths.sort();

    let mut report = LoadReport::default();
    for path in paths {
        report.absorb(load_results(&path)?);
    }
    Ok(report)
}
