//! Integration tests for the detection engine over Java fixtures.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use perfume::detect::{DetectedInstance, Engine, EngineConfig};
use perfume::registry::{Registry, RegistryConfig};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/java")
}

fn engine_with(config: EngineConfig) -> Engine {
    let mut registry = Registry::new(RegistryConfig::default());
    registry.load_registry("en").unwrap();
    Engine::new(Arc::new(registry), config)
}

fn engine() -> Engine {
    engine_with(EngineConfig::default())
}

fn names_in(findings: &[DetectedInstance], file: &str) -> BTreeSet<String> {
    findings
        .iter()
        .filter(|f| f.file.ends_with(file))
        .map(|f| f.detectable.name.clone())
        .collect()
}

fn scan_source(file: &str, source: &str) -> Vec<DetectedInstance> {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(file), source).unwrap();
    engine().detect(temp.path()).unwrap()
}

fn count(findings: &[DetectedInstance], name: &str) -> usize {
    findings
        .iter()
        .filter(|f| f.detectable.name == name)
        .count()
}

#[test]
fn test_fixture_tree() {
    let report = engine().scan(&fixtures()).unwrap();

    assert_eq!(report.files_scanned, 5);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("Broken.java"));
    assert!(names_in(&report.findings, "Broken.java").is_empty());

    let point = names_in(&report.findings, "Point.java");
    for expected in [
        "Equals Blueprint",
        "Equals And HashCode",
        "Override Annotation",
        "Private Fields",
        "Immutable Class",
    ] {
        assert!(point.contains(expected), "Point.java lacks {}", expected);
    }

    assert!(names_in(&report.findings, "Pair.java").contains("Copy Constructor"));
    assert!(names_in(&report.findings, "Palette.java").contains("Singleton"));

    let reader = names_in(&report.findings, "ResourceReader.java");
    for expected in ["Try With Resources", "Specific Exception Catch", "Optional Return"] {
        assert!(reader.contains(expected), "ResourceReader.java lacks {}", expected);
    }
}

#[test]
fn test_findings_are_sorted_by_file() {
    let findings = engine().detect(&fixtures()).unwrap();
    let files: Vec<&PathBuf> = findings.iter().map(|f| &f.file).collect();
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
}

#[test]
fn test_detect_is_idempotent() {
    let engine = engine();
    let mut first = engine.detect(&fixtures()).unwrap();
    let mut second = engine.detect(&fixtures()).unwrap();
    first.sort();
    second.sort();
    assert_eq!(first, second);
}

#[test]
fn test_single_file_path() {
    let findings = engine()
        .detect(&fixtures().join("shapes/Palette.java"))
        .unwrap();
    assert_eq!(count(&findings, "Singleton"), 1);
}

#[test]
fn test_excludes_and_syntactic_mode() {
    let engine = engine_with(EngineConfig {
        excludes: vec!["**/shapes/**".to_string()],
        resolve_symbols: false,
        ..EngineConfig::default()
    });
    let report = engine.scan(&fixtures()).unwrap();
    assert_eq!(report.files_scanned, 2);
    assert!(report
        .findings
        .iter()
        .all(|f| f.file.ends_with("ResourceReader.java")));
}

#[test]
fn test_guarded_equals() {
    let canonical = r#"
class P {
    public boolean equals(Object other) {
        if (this == other) return true;
        if (!(other instanceof P)) return false;
        P o = (P) other;
        return true;
    }
}
"#;
    let found = scan_source("P.java", canonical);
    let blueprint: Vec<_> = found
        .iter()
        .filter(|f| f.detectable.name == "Equals Blueprint")
        .collect();
    assert_eq!(blueprint.len(), 1);
    assert_eq!(blueprint[0].ranges[0].begin_line, 3);
    assert_eq!(blueprint[0].ranges[0].end_line, 8);

    let wrong = canonical.replacen("return true;", "return false;", 1);
    assert_eq!(count(&scan_source("P.java", &wrong), "Equals Blueprint"), 0);
}

#[test]
fn test_copy_constructor() {
    let full = r#"
class Pair {
    private int a;
    private int b;
    Pair(Pair other) {
        this.a = other.a;
        this.b = other.b;
    }
}
"#;
    assert_eq!(count(&scan_source("Pair.java", full), "Copy Constructor"), 1);

    let partial = full.replace("        this.b = other.b;\n", "");
    assert_eq!(count(&scan_source("Pair.java", &partial), "Copy Constructor"), 0);
}

#[test]
fn test_enum_singleton() {
    let with_method = r#"
enum Registry {
    INSTANCE;
    private int hits;
    public int hit() { return ++hits; }
}
"#;
    assert_eq!(count(&scan_source("Registry.java", with_method), "Singleton"), 1);

    let without = with_method.replace("public int hit()", "int hit()");
    assert_eq!(count(&scan_source("Registry.java", &without), "Singleton"), 0);
}

#[test]
fn test_resolution_across_files() {
    let temp = TempDir::new().unwrap();
    let pkg = temp.path().join("geo");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("Shape.java"),
        "package geo;\npublic interface Shape { double area(); }\n",
    )
    .unwrap();
    fs::write(
        pkg.join("Square.java"),
        "package geo;\npublic class Square implements Shape { public double area() { return 1; } }\n",
    )
    .unwrap();
    fs::write(
        pkg.join("Canvas.java"),
        "package geo;\nclass Canvas { private Shape shape = new Square(); }\n",
    )
    .unwrap();

    let resolved = engine().detect(temp.path()).unwrap();
    assert_eq!(count(&resolved, "Program To Interface"), 1);

    let syntactic = engine_with(EngineConfig {
        resolve_symbols: false,
        ..EngineConfig::default()
    })
    .detect(temp.path())
    .unwrap();
    assert_eq!(count(&syntactic, "Program To Interface"), 0);
}
