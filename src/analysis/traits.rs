//! Core traits for obtaining syntax trees.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::{Import, ResolutionContext};

/// Errors produced while turning one file into a syntax tree.
///
/// These are always recoverable: the engine logs them and skips the file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },
    #[error("syntax error in {path} at {line}:{column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("parser unavailable: {0}")]
    Parser(String),
}

/// A parsed compilation unit: tree, source text and file-level scope.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: String,
    /// The file path (for reporting).
    pub path: PathBuf,
    /// Declared package, if any.
    pub package: Option<String>,
    /// Import declarations in source order.
    pub imports: Vec<Import>,
}

impl ParsedFile {
    /// Root node of the tree.
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Qualify a top-level simple name with this file's package.
    pub fn qualify(&self, simple_name: &str) -> String {
        match &self.package {
            Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, simple_name),
            _ => simple_name.to_string(),
        }
    }

    /// Whether a single-type or wildcard import brings `qualified` into scope.
    pub fn imports_type(&self, qualified: &str) -> bool {
        let Some((pkg, _)) = qualified.rsplit_once('.') else {
            return false;
        };
        self.imports.iter().any(|i| {
            !i.is_static
                && ((!i.is_wildcard && i.path == qualified) || (i.is_wildcard && i.path == pkg))
        })
    }
}

/// Provider of syntax trees and, optionally, a resolution context.
///
/// # Thread Safety
///
/// `tree_sitter::Parser` is not `Sync`, so implementations create parsers
/// per call.
pub trait TreeProvider: Send + Sync {
    /// Returns file extensions this provider handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse already loaded source text.
    fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedFile, ParseError>;

    /// Read and parse one file.
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8(bytes).map_err(|_| ParseError::Encoding {
            path: path.to_path_buf(),
        })?;
        self.parse_source(path, &source)
    }

    /// Build a resolution context covering `root` and extra source roots.
    ///
    /// Returns `None` when the provider has no semantic support.
    fn resolution_context_for(
        &self,
        _root: &Path,
        _dependencies: &[PathBuf],
    ) -> Option<Arc<dyn ResolutionContext>> {
        None
    }

    /// Check if this provider handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
