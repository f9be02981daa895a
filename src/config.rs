//! Scan configuration for perfume.
//!
//! A configuration file tunes which files are scanned, how symbols are
//! resolved and the vocabularies the syntactic fallbacks rely on.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["perfume.yaml", ".perfume.yaml"];

/// Default number of findings handed to an output collaborator at once.
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,
}

/// Top-level scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob patterns for paths to exclude (e.g., "**/generated/**")
    pub excluded_paths: Vec<String>,
    /// Whether test sources are scanned (default: true)
    pub include_tests: bool,
    /// Whether to build a resolution context from the scanned sources
    pub resolve_symbols: bool,
    /// Extra source roots indexed for resolution only
    pub dependencies: Vec<PathBuf>,
    pub locale: String,
    /// Extra locale files, one YAML map per file
    pub locales: Vec<PathBuf>,
    /// Alternative rule definition file
    pub rules: Option<PathBuf>,
    pub batch_size: usize,
    pub heuristics: Heuristics,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_paths: Vec::new(),
            include_tests: true,
            resolve_symbols: true,
            dependencies: Vec::new(),
            locale: "en".to_string(),
            locales: Vec::new(),
            rules: None,
            batch_size: DEFAULT_BATCH_SIZE,
            heuristics: Heuristics::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScanConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Find a config file in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Validate a configuration for logical errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        for pattern in &self.excluded_paths {
            globset::Glob::new(pattern).map_err(|source| ConfigError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Vocabularies used when symbol resolution cannot decide.
///
/// These are deliberately incomplete name lists; extend them per project
/// rather than in code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Heuristics {
    /// Method names that produce a copy of their receiver or argument.
    pub copy_methods: Vec<String>,
    /// Annotations that forbid a null argument.
    pub nullability_annotations: Vec<String>,
    /// Calls that reject a null first argument.
    pub null_check_methods: Vec<String>,
    /// Boolean variables that mean "the iterator has more elements".
    pub has_next_variables: Vec<String>,
    /// Assertions that expect an exception from an executable.
    pub exception_assertions: Vec<String>,
    /// Annotations that supply arguments to a parameterized test.
    pub argument_sources: Vec<String>,
    /// Exception types too broad to count as a specific catch.
    pub broad_exceptions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            copy_methods: strings(&[
                "clone", "copy", "copyOf", "copyOfRange", "deepCopy", "of", "from", "valueOf",
            ]),
            nullability_annotations: strings(&["NonNull", "NotNull", "Nonnull"]),
            null_check_methods: strings(&[
                "requireNonNull",
                "checkNotNull",
                "notNull",
                "requireNonNullElse",
            ]),
            has_next_variables: strings(&[
                "hasNext",
                "hasMore",
                "hasMoreElements",
                "hasNextElement",
                "more",
            ]),
            exception_assertions: strings(&["assertThrows", "assertThrowsExactly"]),
            argument_sources: strings(&[
                "ValueSource",
                "CsvSource",
                "CsvFileSource",
                "MethodSource",
                "EnumSource",
                "ArgumentsSource",
                "NullSource",
                "EmptySource",
                "NullAndEmptySource",
                "FieldSource",
            ]),
            broad_exceptions: strings(&["Exception", "Throwable", "RuntimeException", "Error"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perfume.yaml");
        fs::write(
            &path,
            r#"
excluded_paths:
  - "**/generated/**"
locale: de
batch_size: 50
heuristics:
  copy_methods: [clone, duplicate]
"#,
        )
        .unwrap();

        let config = ScanConfig::parse_file(&path).unwrap();
        assert_eq!(config.locale, "de");
        assert_eq!(config.batch_size, 50);
        assert!(config.include_tests);
        assert_eq!(config.heuristics.copy_methods, vec!["clone", "duplicate"]);
        // untouched tables keep their defaults
        assert_eq!(
            config.heuristics.broad_exceptions,
            Heuristics::default().broad_exceptions
        );
        assert!(config.validate().is_ok());
        assert_eq!(ScanConfig::discover(dir.path()), Some(path));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ScanConfig {
            batch_size: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBatchSize)));

        let config = ScanConfig {
            excluded_paths: vec!["[unclosed".to_string()],
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Glob { .. })));
    }
}
