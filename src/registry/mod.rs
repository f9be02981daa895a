//! Detectable registry.
//!
//! Loads rule definitions, localizes their text and binds exactly one
//! detector to each of them:
//! - Definitions come from a [`DefinitionSource`] (embedded YAML by default)
//! - Text substitution comes from a [`LocaleCatalog`]
//! - Detector ids resolve through the [`DetectorKind`] dispatch table

mod definitions;
mod locale;

pub use definitions::{DefinitionSource, Detectable};
pub use locale::{LocaleCatalog, Localization};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Heuristics, ScanConfig};
use crate::detect::{Detector, DetectorKind};

/// Errors that abort a registry load.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("cannot load rule definitions from {origin}: {message}")]
    DefinitionLoad { origin: String, message: String },
    #[error("cannot bind rule {rule:?} to detector {detector:?}: {reason}")]
    DetectorBinding {
        rule: String,
        detector: String,
        reason: String,
    },
}

/// Inputs of a registry load.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub source: DefinitionSource,
    pub catalog: LocaleCatalog,
    pub heuristics: Heuristics,
}

impl RegistryConfig {
    /// Registry inputs described by a scan configuration: the rule file, the
    /// built-in locales plus extra locale files, and the heuristics.
    pub fn from_scan(config: &ScanConfig) -> Result<Self, RegistryError> {
        let mut catalog = LocaleCatalog::builtin()?;
        for path in &config.locales {
            catalog = catalog.with_file(path)?;
        }
        let source = match &config.rules {
            Some(path) => DefinitionSource::File(path.clone()),
            None => DefinitionSource::Embedded,
        };
        Ok(Self {
            source,
            catalog,
            heuristics: config.heuristics.clone(),
        })
    }
}

/// Map from every loaded rule to its bound detector.
pub struct Registry {
    config: RegistryConfig,
    detectors: BTreeMap<Arc<Detectable>, Box<dyn Detector>>,
}

impl Registry {
    /// Create an empty registry. Nothing is read until [`load_registry`].
    ///
    /// [`load_registry`]: Registry::load_registry
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            detectors: BTreeMap::new(),
        }
    }

    /// Load, localize and bind every definition.
    ///
    /// Either every rule ends up with a detector or the registry keeps its
    /// previous contents.
    pub fn load_registry(&mut self, locale: &str) -> Result<(), RegistryError> {
        let definitions = self.config.source.load()?;
        if !self.config.catalog.has_locale(locale) {
            tracing::debug!(locale, "no translations, keeping default rule text");
        }

        let mut bound_ids: HashMap<DetectorKind, String> = HashMap::new();
        let mut detectors = BTreeMap::new();

        for mut detectable in definitions {
            if let Some(text) = self.config.catalog.lookup(locale, &detectable.name) {
                text.apply(&mut detectable);
            }

            let kind = DetectorKind::from_id(&detectable.detector).ok_or_else(|| {
                RegistryError::DetectorBinding {
                    rule: detectable.name.clone(),
                    detector: detectable.detector.clone(),
                    reason: "unknown detector id".to_string(),
                }
            })?;
            if let Some(previous) = bound_ids.insert(kind, detectable.name.clone()) {
                return Err(RegistryError::DetectorBinding {
                    rule: detectable.name,
                    detector: kind.as_str().to_string(),
                    reason: format!("already bound to {:?}", previous),
                });
            }

            let detectable = Arc::new(detectable);
            let detector = kind.bind(Arc::clone(&detectable), &self.config.heuristics);
            detectors.insert(detectable, detector);
        }

        tracing::info!(rules = detectors.len(), locale, "registry loaded");
        self.detectors = detectors;
        Ok(())
    }

    pub fn registered_detectables(&self) -> Vec<Arc<Detectable>> {
        self.detectors.keys().cloned().collect()
    }

    pub fn registered_detectors(&self) -> Vec<&dyn Detector> {
        self.detectors.values().map(|d| d.as_ref()).collect()
    }

    pub fn detector_for(&self, detectable: &Detectable) -> Option<&dyn Detector> {
        self.detectors.get(detectable).map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        !self.detectors.is_empty()
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.config.heuristics
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.detectors.keys().map(|d| &d.name).collect::<Vec<_>>())
            .finish()
    }
}
