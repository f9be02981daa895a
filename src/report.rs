//! Output formatting for perfume results.
//!
//! Supports two stdout formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//!
//! and a batched JSON writer that receives findings from
//! [`Engine::detect_into`](crate::detect::Engine::detect_into).

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detect::{DetectedInstance, ScanReport, ScanSummary, SkippedFile};

const SUMMARY_FILE: &str = "summary.json";
const BATCH_PREFIX: &str = "batch_";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where serialized results go.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl OutputConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// Receives findings in bounded chunks, then the run summary.
pub trait FindingSink {
    fn accept_batch(&mut self, batch: &[DetectedInstance]) -> Result<(), OutputError>;

    fn finish(&mut self, summary: &ScanSummary) -> Result<(), OutputError>;
}

// =============================================================================
// Batched JSON files
// =============================================================================

/// Writes each batch to `batch_NNNN.json` and the summary to `summary.json`.
///
/// Numbering continues after the highest batch already in the directory.
#[derive(Debug)]
pub struct JsonBatchWriter {
    directory: PathBuf,
    next_batch: usize,
}

impl JsonBatchWriter {
    /// Prepare `directory`, creating it when missing.
    pub fn create(directory: &Path) -> Result<Self, OutputError> {
        if directory.exists() && !directory.is_dir() {
            return Err(OutputError::NotADirectory(directory.to_path_buf()));
        }
        fs::create_dir_all(directory).map_err(|source| OutputError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        let next_batch = existing_batches(directory)?
            .into_iter()
            .max()
            .map(|n| n + 1)
            .unwrap_or(0);
        Ok(Self {
            directory: directory.to_path_buf(),
            next_batch,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), OutputError> {
        let path = self.directory.join(name);
        let io_err = |source| OutputError::Io {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush().map_err(io_err)
    }
}

fn batch_number(name: &str) -> Option<usize> {
    name.strip_prefix(BATCH_PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn existing_batches(directory: &Path) -> Result<Vec<usize>, OutputError> {
    let entries = fs::read_dir(directory).map_err(|source| OutputError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(entries
        .filter_map(|e| e.ok())
        .filter_map(|e| batch_number(&e.file_name().to_string_lossy()))
        .collect())
}

impl FindingSink for JsonBatchWriter {
    fn accept_batch(&mut self, batch: &[DetectedInstance]) -> Result<(), OutputError> {
        if batch.is_empty() {
            return Ok(());
        }
        let name = format!("{}{:04}.json", BATCH_PREFIX, self.next_batch);
        self.write_json(&name, batch)?;
        tracing::debug!(batch = self.next_batch, findings = batch.len(), "wrote batch");
        self.next_batch += 1;
        Ok(())
    }

    fn finish(&mut self, summary: &ScanSummary) -> Result<(), OutputError> {
        self.write_json(SUMMARY_FILE, summary)
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub path: String,
    pub summary: ScanSummary,
    pub findings: &'a [DetectedInstance],
    #[serde(skip_serializing_if = "no_skips")]
    pub skipped: &'a [SkippedFile],
}

fn no_skips(skipped: &&[SkippedFile]) -> bool {
    skipped.is_empty()
}

/// Render a report as a JSON document.
pub fn render_json(path: &Path, report: &ScanReport) -> Result<String, OutputError> {
    let json = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        path: path.display().to_string(),
        summary: report.summary(),
        findings: &report.findings,
        skipped: &report.skipped,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Write results in JSON format to stdout.
pub fn write_json(path: &Path, report: &ScanReport) -> Result<(), OutputError> {
    println!("{}", render_json(path, report)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn relative_path(file: &Path, base: &Path) -> String {
    if file == base {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
    }
    file.strip_prefix(base)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file.display().to_string())
}

/// Render a report for the terminal.
pub fn render_pretty(path: &Path, report: &ScanReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "  {} v{}\n\n",
        "perfume".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!("  {}{}\n\n", "Scanning: ".dimmed(), path.display()));

    let mut by_file: BTreeMap<&Path, Vec<&DetectedInstance>> = BTreeMap::new();
    for f in &report.findings {
        by_file.entry(f.file.as_path()).or_default().push(f);
    }

    if by_file.is_empty() {
        out.push_str(&format!("  {}\n\n", "No perfumes found".dimmed()));
    }
    for (file, findings) in &by_file {
        out.push_str(&format!("  {}\n", relative_path(file, path).blue()));
        for f in findings {
            out.push_str(&format!(
                "    {:<34}{}{}\n",
                f.detectable.name.green(),
                f.type_name,
                format!(":{}", f.line()).dimmed()
            ));
        }
        out.push('\n');
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!(
            "  {} ({}):\n",
            "Skipped".yellow(),
            report.skipped.len()
        ));
        for s in &report.skipped {
            out.push_str(&format!(
                "    {}  {}\n",
                relative_path(&s.path, path),
                s.reason.dimmed()
            ));
        }
        out.push('\n');
    }

    let summary = report.summary();
    if !summary.per_perfume.is_empty() {
        out.push_str(&format!("  {}\n", "Breakdown:".bold()));
        let mut counts: Vec<_> = summary.per_perfume.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in counts {
            out.push_str(&format!("    {:<34}{:>4}\n", name, count));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "  {} findings in {} of {} files\n",
        summary.total_findings.to_string().green().bold(),
        summary.files_with_findings,
        summary.files_scanned
    ));
    out
}

/// Write results in pretty format to stdout.
pub fn write_pretty(path: &Path, report: &ScanReport) {
    print!("{}", render_pretty(path, report));
}
