//! Source file discovery.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "target",
    "build",
    "out",
    "bin",
    "node_modules",
    "resources",
];

/// Directory names that hold test sources.
const TEST_DIRS: &[&str] = &["test", "tests"];

/// Compilation units that carry no type declarations worth scanning.
const SKIPPED_FILES: &[&str] = &["package-info.java", "module-info.java"];

/// Decides which files under a root are scanned.
#[derive(Debug, Clone)]
pub struct PathFilter {
    extensions: Vec<String>,
    excludes: Option<GlobSet>,
    include_tests: bool,
}

impl PathFilter {
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            excludes: None,
            include_tests: true,
        }
    }

    /// Exclude paths matching any of the given globs (`**` supported).
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self, globset::Error> {
        if patterns.is_empty() {
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        self.excludes = Some(builder.build()?);
        Ok(self)
    }

    /// Whether test directories are scanned (defaults to true).
    pub fn include_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excludes
            .as_ref()
            .map(|set| set.is_match(path))
            .unwrap_or(false)
    }

    fn descend(&self, entry: &DirEntry) -> bool {
        // The root itself is always walked, even when hidden.
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
            return false;
        }
        if !self.include_tests && TEST_DIRS.contains(&name.as_ref()) {
            return false;
        }
        !self.is_excluded(entry.path())
    }

    /// Whether a single file would be scanned.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !self.extensions.iter().any(|e| e == ext) {
            return false;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if SKIPPED_FILES.contains(&name) {
            return false;
        }
        if !self.include_tests && name.ends_with("Test.java") {
            return false;
        }
        !self.is_excluded(path)
    }

    /// Collect eligible files under `root` (or `root` itself), sorted.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| self.descend(e))
        {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_eligible(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
