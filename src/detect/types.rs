//! Core types for detection results.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tree_sitter::Node;

use crate::analysis::{CodeRange, ParsedFile};
use crate::registry::Detectable;

fn serialize_detectable<S: Serializer>(d: &Arc<Detectable>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&d.name)
}

/// One occurrence of a perfume.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedInstance {
    #[serde(rename = "perfume", serialize_with = "serialize_detectable")]
    pub detectable: Arc<Detectable>,
    pub file: PathBuf,
    /// Enclosing type, nested types joined with `.`.
    pub type_name: String,
    pub ranges: Vec<CodeRange>,
    /// Matched source text, one entry per range.
    pub snippets: Vec<String>,
}

impl DetectedInstance {
    /// Build a finding spanning the given nodes, one range per node.
    pub fn from_nodes(
        detectable: &Arc<Detectable>,
        file: &ParsedFile,
        type_name: impl Into<String>,
        nodes: &[Node],
    ) -> Self {
        Self {
            detectable: Arc::clone(detectable),
            file: file.path.clone(),
            type_name: type_name.into(),
            ranges: nodes.iter().map(|n| CodeRange::from_node(*n)).collect(),
            snippets: nodes.iter().map(|n| file.node_text(*n).to_string()).collect(),
        }
    }

    /// Build a finding from a precomputed range and its snippet.
    pub fn with_range(
        detectable: &Arc<Detectable>,
        file: &ParsedFile,
        type_name: impl Into<String>,
        range: CodeRange,
        snippet: String,
    ) -> Self {
        Self {
            detectable: Arc::clone(detectable),
            file: file.path.clone(),
            type_name: type_name.into(),
            ranges: vec![range],
            snippets: vec![snippet],
        }
    }

    /// First line of the first range.
    pub fn line(&self) -> usize {
        self.ranges.first().map(|r| r.begin_line).unwrap_or(0)
    }
}

impl Ord for DetectedInstance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(&other.type_name)
            .then_with(|| self.ranges.cmp(&other.ranges))
            .then_with(|| self.file.cmp(&other.file))
            .then_with(|| self.detectable.name.cmp(&other.detectable.name))
    }
}

impl PartialOrd for DetectedInstance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DetectedInstance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DetectedInstance {}

/// A file that could not be analysed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Statistics of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub total_findings: usize,
    /// Findings per perfume name.
    pub per_perfume: BTreeMap<String, usize>,
    /// Distinct files with at least one finding.
    pub files_with_findings: usize,
    #[serde(skip)]
    touched: BTreeSet<PathBuf>,
}

impl ScanSummary {
    /// Empty statistics for a run over `files_scanned` files.
    pub fn new(files_scanned: usize) -> Self {
        Self {
            files_scanned,
            ..Self::default()
        }
    }

    /// Account for a chunk of findings.
    pub fn record(&mut self, findings: &[DetectedInstance]) {
        for f in findings {
            self.total_findings += 1;
            *self
                .per_perfume
                .entry(f.detectable.name.clone())
                .or_insert(0) += 1;
            if self.touched.insert(f.file.clone()) {
                self.files_with_findings += 1;
            }
        }
    }
}

/// Everything a collecting run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub findings: Vec<DetectedInstance>,
    pub skipped: Vec<SkippedFile>,
    pub files_scanned: usize,
}

impl ScanReport {
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary::new(self.files_scanned);
        summary.files_skipped = self.skipped.len();
        summary.record(&self.findings);
        summary
    }
}
