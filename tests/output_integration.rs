//! Integration tests for batched output and input validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use perfume::detect::{DetectedInstance, Engine, EngineConfig, EngineError, ScanSummary};
use perfume::registry::{Registry, RegistryConfig};
use perfume::report::{FindingSink, OutputConfig, OutputError};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/java")
}

fn engine(batch_size: usize) -> Engine {
    let mut registry = Registry::new(RegistryConfig::default());
    registry.load_registry("en").unwrap();
    Engine::new(
        Arc::new(registry),
        EngineConfig {
            batch_size,
            ..EngineConfig::default()
        },
    )
}

fn batch_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("batch_"))
        .collect();
    names.sort();
    names
}

#[derive(Default)]
struct Recording {
    largest_batch: usize,
    total: usize,
    finished: bool,
}

impl FindingSink for Recording {
    fn accept_batch(&mut self, batch: &[DetectedInstance]) -> Result<(), OutputError> {
        self.largest_batch = self.largest_batch.max(batch.len());
        self.total += batch.len();
        Ok(())
    }

    fn finish(&mut self, _summary: &ScanSummary) -> Result<(), OutputError> {
        self.finished = true;
        Ok(())
    }
}

#[test]
fn test_batches_never_exceed_batch_size() {
    let engine = engine(3);
    let expected = engine.detect(&fixtures()).unwrap().len();

    let mut sink = Recording::default();
    let summary = engine.detect_into(&fixtures(), &mut sink, 3).unwrap();
    assert!(sink.largest_batch <= 3);
    assert_eq!(sink.total, expected);
    assert!(sink.finished);
    assert_eq!(summary.files_scanned, 5);
    assert_eq!(summary.files_skipped, 1);
}

#[test]
fn test_detect_and_serialize_writes_batches() {
    let out = TempDir::new().unwrap();
    let engine = engine(2);
    let summary = engine
        .detect_and_serialize(&fixtures(), &OutputConfig::new(out.path()))
        .unwrap();

    let batches = batch_files(out.path());
    assert_eq!(batches.len(), summary.total_findings.div_ceil(2));
    let mut written = 0;
    for name in &batches {
        let content = fs::read_to_string(out.path().join(name)).unwrap();
        let batch: serde_json::Value = serde_json::from_str(&content).unwrap();
        let len = batch.as_array().unwrap().len();
        assert!((1..=2).contains(&len));
        written += len;
    }
    assert_eq!(written, summary.total_findings);

    let summary_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary_json["total_findings"], summary.total_findings);
    assert_eq!(summary_json["files_skipped"], 1);
}

#[test]
fn test_second_run_continues_numbering() {
    let out = TempDir::new().unwrap();
    let engine = engine(500);
    let config = OutputConfig::new(out.path());
    engine.detect_and_serialize(&fixtures(), &config).unwrap();
    engine.detect_and_serialize(&fixtures(), &config).unwrap();
    assert_eq!(batch_files(out.path()), vec!["batch_0000.json", "batch_0001.json"]);
}

#[test]
fn test_invalid_input_path() {
    let out = TempDir::new().unwrap();
    let err = engine(10)
        .detect_and_serialize(
            &fixtures().join("missing"),
            &OutputConfig::new(out.path()),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPath(_)));
    assert!(batch_files(out.path()).is_empty());
}

#[test]
fn test_invalid_output_directory() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("taken.txt");
    fs::write(&blocker, "not a directory").unwrap();
    let err = engine(10)
        .detect_and_serialize(&fixtures(), &OutputConfig::new(&blocker))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOutput { .. }));
}
