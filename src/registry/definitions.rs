//! Rule definitions and where they are read from.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::RegistryError;

/// Rule definitions compiled into the binary.
const EMBEDDED_DEFINITIONS: &str = include_str!("../rules/perfumes.yaml");

/// Metadata describing one recognizable perfume.
///
/// Identity is the `name`: equality, hashing and ordering ignore every other
/// field, so localized text never changes which rule a value denotes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Detectable {
    pub name: String,
    pub description: String,
    /// Id of the detection logic realizing this rule.
    pub detector: String,
    /// Literature reference for the pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl Detectable {
    pub fn new(name: impl Into<String>, detector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            detector: detector.into(),
            source: None,
            category: None,
            additional_info: None,
        }
    }
}

impl PartialEq for Detectable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Detectable {}

impl Hash for Detectable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ord for Detectable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for Detectable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Detectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Layout of a definition file.
#[derive(Debug, Deserialize)]
struct DefinitionFile {
    perfumes: Vec<Detectable>,
}

/// Where rule definitions come from.
#[derive(Debug, Clone, Default)]
pub enum DefinitionSource {
    /// The definitions shipped with the crate.
    #[default]
    Embedded,
    File(PathBuf),
    Inline(String),
}

impl DefinitionSource {
    fn origin(&self) -> String {
        match self {
            DefinitionSource::Embedded => "embedded definitions".to_string(),
            DefinitionSource::File(path) => path.display().to_string(),
            DefinitionSource::Inline(_) => "inline definitions".to_string(),
        }
    }

    /// Read and validate every definition.
    pub fn load(&self) -> Result<Vec<Detectable>, RegistryError> {
        let origin = self.origin();
        let load_error = |message: String| RegistryError::DefinitionLoad {
            origin: origin.clone(),
            message,
        };

        let content = match self {
            DefinitionSource::Embedded => EMBEDDED_DEFINITIONS.to_string(),
            DefinitionSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?
            }
            DefinitionSource::Inline(text) => text.clone(),
        };

        let file: DefinitionFile =
            serde_yaml::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        if file.perfumes.is_empty() {
            return Err(load_error("no definitions".to_string()));
        }

        let mut names = HashSet::new();
        for d in &file.perfumes {
            if d.name.trim().is_empty() {
                return Err(load_error("definition with empty name".to_string()));
            }
            if !names.insert(d.name.as_str()) {
                return Err(load_error(format!("duplicate definition {:?}", d.name)));
            }
        }
        Ok(file.perfumes)
    }
}
