//! Perfume - static detection of code perfumes in Java sources.
//!
//! A perfume is the opposite of a code smell: a recognisable, well-engineered
//! pattern such as a paired `equals`/`hashCode`, a copy constructor or a
//! try-with-resources block.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter parsing, the tree-query toolkit, file discovery
//!   and the type index used for symbol resolution
//! - `registry`: rule definitions, localization and detector binding
//! - `detect`: the detector trait, one detector per rule, and the engine
//! - `config`: YAML scan configuration and heuristic vocabularies
//! - `report`: output formatting and the batched JSON writer
//!
//! # Adding a Rule
//!
//! Add a detector under `src/detect/perfumes/`, a variant to
//! [`detect::DetectorKind`] and an entry to `src/rules/perfumes.yaml`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod registry;
pub mod report;

pub use analysis::{JavaTreeProvider, ParsedFile, Resolution, ResolutionContext, TypeIndex};
pub use config::ScanConfig;
pub use detect::{DetectedInstance, Detector, DetectorKind, Engine, EngineConfig, EngineError};
pub use registry::{Detectable, Registry, RegistryConfig};
pub use report::{FindingSink, JsonBatchWriter, OutputConfig};
