//! Localized rule text.
//!
//! A catalog is built once at startup and handed to the registry by
//! reference. Lookups never fail: a missing locale or entry simply leaves
//! the default text in place.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{Detectable, RegistryError};

const BUILTIN_LOCALES: &[&str] = &[include_str!("../locales/de.yaml")];

/// Replacement text for one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Localization {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl Localization {
    /// Overwrite the localizable fields of `detectable`.
    pub fn apply(&self, detectable: &mut Detectable) {
        if let Some(description) = &self.description {
            detectable.description = description.clone();
        }
        if let Some(info) = &self.additional_info {
            detectable.additional_info = Some(info.clone());
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    locale: String,
    #[serde(default)]
    perfumes: HashMap<String, Localization>,
}

/// Immutable table of localized texts keyed by locale, then rule name.
#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    locales: HashMap<String, HashMap<String, Localization>>,
}

impl LocaleCatalog {
    /// Catalog with no translations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the locales shipped with the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut catalog = Self::empty();
        for content in BUILTIN_LOCALES {
            catalog.merge_str(content, "builtin locale")?;
        }
        Ok(catalog)
    }

    /// Add the translations of a locale file.
    pub fn with_file(mut self, path: &Path) -> Result<Self, RegistryError> {
        let origin = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| RegistryError::DefinitionLoad {
                origin: origin.clone(),
                message: e.to_string(),
            })?;
        self.merge_str(&content, &origin)?;
        Ok(self)
    }

    fn merge_str(&mut self, content: &str, origin: &str) -> Result<(), RegistryError> {
        let file: LocaleFile =
            serde_yaml::from_str(content).map_err(|e| RegistryError::DefinitionLoad {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        self.locales
            .entry(file.locale)
            .or_default()
            .extend(file.perfumes);
        Ok(())
    }

    pub fn insert(&mut self, locale: &str, name: &str, text: Localization) {
        self.locales
            .entry(locale.to_string())
            .or_default()
            .insert(name.to_string(), text);
    }

    pub fn lookup(&self, locale: &str, name: &str) -> Option<&Localization> {
        self.locales.get(locale)?.get(name)
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Known locales, sorted.
    pub fn locales(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
