//! Detection engine that runs every registered detector over a source tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{JavaTreeProvider, PathFilter, ResolutionContext, TreeProvider};
use crate::config::{ScanConfig, DEFAULT_BATCH_SIZE};
use crate::registry::Registry;
use crate::report::{FindingSink, JsonBatchWriter, OutputConfig, OutputError};

use super::{DetectedInstance, DetectorError, ScanReport, ScanSummary, SkippedFile};

/// Per-file results in flight between workers and the consumer.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} is neither a file nor a directory")]
    InvalidPath(PathBuf),

    #[error("cannot write output to {path}: {reason}")]
    InvalidOutput { path: PathBuf, reason: String },

    #[error("detector for '{rule}' failed on {file}")]
    Detector {
        rule: String,
        file: PathBuf,
        #[source]
        source: DetectorError,
    },

    #[error("registry has no detectors loaded")]
    RegistryNotLoaded,

    #[error("invalid exclude pattern: {0}")]
    Exclude(#[from] globset::Error),

    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Run options of the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Globs of paths never scanned.
    pub excludes: Vec<String>,
    pub include_tests: bool,
    /// Build a resolution context before detecting.
    pub resolve_symbols: bool,
    /// Extra source roots indexed for resolution only.
    pub dependencies: Vec<PathBuf>,
    /// Maximum findings per sink batch.
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            excludes: Vec::new(),
            include_tests: true,
            resolve_symbols: true,
            dependencies: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl From<&ScanConfig> for EngineConfig {
    fn from(config: &ScanConfig) -> Self {
        Self {
            excludes: config.excluded_paths.clone(),
            include_tests: config.include_tests,
            resolve_symbols: config.resolve_symbols,
            dependencies: config.dependencies.clone(),
            batch_size: config.batch_size,
        }
    }
}

/// Result of analysing one file.
enum FileOutcome {
    Analysed(Vec<DetectedInstance>),
    Skipped(SkippedFile),
}

/// Files and resolution context of one run.
struct RunPlan {
    files: Vec<PathBuf>,
    context: Option<Arc<dyn ResolutionContext>>,
}

/// Runs the registered detectors over source trees.
pub struct Engine {
    registry: Arc<Registry>,
    config: EngineConfig,
    provider: Arc<dyn TreeProvider>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            provider: Arc::new(JavaTreeProvider::new()),
        }
    }

    /// Replace the syntax tree provider.
    pub fn with_provider(mut self, provider: Arc<dyn TreeProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyse `path` and collect every finding.
    ///
    /// Findings are ordered by file, then by instance order within a file.
    pub fn scan(&self, path: &Path) -> Result<ScanReport, EngineError> {
        validate_input(path)?;
        let plan = self.plan(path)?;
        let context = plan.context.as_deref();

        let outcomes = plan
            .files
            .par_iter()
            .map(|file| self.analyse_file(file, context))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = ScanReport {
            files_scanned: plan.files.len(),
            ..ScanReport::default()
        };
        for outcome in outcomes {
            match outcome {
                FileOutcome::Analysed(findings) => report.findings.extend(findings),
                FileOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }

        info!(
            files = report.files_scanned,
            skipped = report.skipped.len(),
            findings = report.findings.len(),
            "scan complete"
        );
        Ok(report)
    }

    /// Analyse `path` and return the findings only.
    pub fn detect(&self, path: &Path) -> Result<Vec<DetectedInstance>, EngineError> {
        self.scan(path).map(|report| report.findings)
    }

    /// Analyse `path`, streaming findings to `sink` in chunks of at most
    /// `batch_size`.
    ///
    /// Workers hand per-file results to the calling thread through a bounded
    /// channel, so memory stays proportional to the batch size. Batches
    /// follow completion order, not file order.
    pub fn detect_into(
        &self,
        path: &Path,
        sink: &mut dyn FindingSink,
        batch_size: usize,
    ) -> Result<ScanSummary, EngineError> {
        validate_input(path)?;
        let plan = self.plan(path)?;
        let context = plan.context.as_deref();
        let batch_size = batch_size.max(1);

        let (tx, rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
        let mut summary = ScanSummary::new(plan.files.len());

        std::thread::scope(|scope| {
            let files = &plan.files;
            scope.spawn(move || {
                // Stops early once the consumer hangs up or a detector fails.
                let _ = files.par_iter().try_for_each_with(tx, |tx, file| {
                    let outcome = self.analyse_file(file, context);
                    let failed = outcome.is_err();
                    if tx.send(outcome).is_err() || failed {
                        return Err(());
                    }
                    Ok(())
                });
            });

            let mut buffer: Vec<DetectedInstance> = Vec::with_capacity(batch_size);
            for outcome in rx {
                match outcome? {
                    FileOutcome::Analysed(findings) => {
                        for finding in findings {
                            buffer.push(finding);
                            if buffer.len() == batch_size {
                                flush(sink, &mut summary, &mut buffer)?;
                            }
                        }
                    }
                    FileOutcome::Skipped(_) => summary.files_skipped += 1,
                }
            }
            flush(sink, &mut summary, &mut buffer)
        })?;

        sink.finish(&summary)?;
        info!(
            files = summary.files_scanned,
            skipped = summary.files_skipped,
            findings = summary.total_findings,
            "detection complete"
        );
        Ok(summary)
    }

    /// Analyse `path` and write JSON batches plus a summary to the output
    /// directory. Both locations are checked before any analysis.
    pub fn detect_and_serialize(
        &self,
        path: &Path,
        output: &OutputConfig,
    ) -> Result<ScanSummary, EngineError> {
        validate_input(path)?;
        if !self.registry.is_loaded() {
            return Err(EngineError::RegistryNotLoaded);
        }
        let mut writer = JsonBatchWriter::create(&output.directory).map_err(|e| {
            EngineError::InvalidOutput {
                path: output.directory.clone(),
                reason: e.to_string(),
            }
        })?;
        self.detect_into(path, &mut writer, self.config.batch_size)
    }

    fn plan(&self, path: &Path) -> Result<RunPlan, EngineError> {
        if !self.registry.is_loaded() {
            return Err(EngineError::RegistryNotLoaded);
        }
        let files = PathFilter::new(self.provider.file_extensions())
            .with_excludes(&self.config.excludes)?
            .include_tests(self.config.include_tests)
            .collect(path)?;
        info!(
            path = %path.display(),
            files = files.len(),
            detectors = self.registry.len(),
            "starting scan"
        );

        let context = if self.config.resolve_symbols {
            self.provider
                .resolution_context_for(path, &self.config.dependencies)
        } else {
            None
        };
        Ok(RunPlan { files, context })
    }

    fn analyse_file(
        &self,
        path: &Path,
        context: Option<&dyn ResolutionContext>,
    ) -> Result<FileOutcome, EngineError> {
        let parsed = match self.provider.parse(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                return Ok(FileOutcome::Skipped(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }));
            }
        };

        let mut findings = Vec::new();
        for detector in self.registry.registered_detectors() {
            let found = detector
                .detect(&parsed, context)
                .map_err(|source| EngineError::Detector {
                    rule: detector.detectable().name.clone(),
                    file: path.to_path_buf(),
                    source,
                })?;
            findings.extend(found);
        }
        findings.sort();
        debug!(file = %path.display(), findings = findings.len(), "analysed");
        Ok(FileOutcome::Analysed(findings))
    }
}

fn validate_input(path: &Path) -> Result<(), EngineError> {
    if path.is_file() || path.is_dir() {
        Ok(())
    } else {
        Err(EngineError::InvalidPath(path.to_path_buf()))
    }
}

fn flush(
    sink: &mut dyn FindingSink,
    summary: &mut ScanSummary,
    buffer: &mut Vec<DetectedInstance>,
) -> Result<(), EngineError> {
    if buffer.is_empty() {
        return Ok(());
    }
    summary.record(buffer);
    sink.accept_batch(buffer)?;
    buffer.clear();
    Ok(())
}
