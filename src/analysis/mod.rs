//! AST-backed Java analysis.
//!
//! This module turns Java sources into tree-sitter trees and answers the
//! semantic questions detectors ask about them:
//! - Parsed compilation units with package and imports
//! - Structural queries over declarations, statements and expressions
//! - Type facts (kinds, supertypes, declared methods) per declared type
//! - A resolution context over every type in the scanned sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ JavaTreeProvider │────▶│ ParsedFile    │
//! └─────────────────┘     └──────────────────┘     │ (tree, scope) │
//!                                  │               └───────────────┘
//!                                  ▼                       │
//!                         ┌──────────────────┐             ▼
//!                         │ TypeIndex        │◀────┌───────────────┐
//!                         │ (Resolution-     │     │ Detectors     │
//!                         │  Context)        │────▶│ (query::*)    │
//!                         └──────────────────┘     └───────────────┘
//! ```

mod context;
mod facts;
mod files;
mod java;
pub mod query;
mod resolution;
mod traits;

pub use context::TypeIndex;
pub use facts::{CodeRange, Import, MethodSignature, TypeFacts, TypeKind};
pub use files::PathFilter;
pub use java::JavaTreeProvider;
pub use resolution::{
    jdk_is_subtype, jdk_type_by_simple_name, MethodBinding, Resolution, ResolutionContext,
    JDK_INTERFACES, JDK_SUPERTYPES,
};
pub use traits::{ParseError, ParsedFile, TreeProvider};
