//! Perfume detection.
//!
//! Every rule is realized by one [`Detector`]. Detectors are created by the
//! registry through the [`DetectorKind`] dispatch table and then shared by
//! all worker threads for the whole run.

pub mod perfumes;
mod runner;
mod types;

use std::sync::Arc;

use thiserror::Error;
use tree_sitter::Node;

use crate::analysis::{ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::registry::Detectable;

pub use runner::{Engine, EngineConfig, EngineError};
pub use types::{DetectedInstance, ScanReport, ScanSummary, SkippedFile};

use perfumes::*;

/// Raised when a tree does not have the shape the grammar promises.
///
/// A detector never returns this for code it merely does not recognize.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("{kind} at line {line} has no `{field}`")]
    MalformedTree {
        kind: &'static str,
        field: &'static str,
        line: usize,
    },
}

/// Fetch a field the grammar declares mandatory for `node`.
pub fn required_field<'t>(node: Node<'t>, field: &'static str) -> Result<Node<'t>, DetectorError> {
    node.child_by_field_name(field)
        .ok_or(DetectorError::MalformedTree {
            kind: node.kind(),
            field,
            line: node.start_position().row + 1,
        })
}

/// Detection logic bound to exactly one rule.
///
/// Implementations hold no per-file state and may be invoked concurrently.
pub trait Detector: Send + Sync {
    /// The rule this detector reports.
    fn detectable(&self) -> &Arc<Detectable>;

    /// Find every occurrence in `file`. `ctx` is `None` when symbol
    /// resolution is disabled.
    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError>;
}

/// Compile-time table of every detector implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetectorKind {
    EqualsHashCode,
    EqualsBlueprint,
    CopyConstructor,
    Singleton,
    IteratorNext,
    SingleCallExceptionTest,
    DefensiveNullCheck,
    TryWithResources,
    OverrideAnnotation,
    SwitchDefault,
    PrivateFields,
    ProgramToInterface,
    StringBuilderLoop,
    ImmutableClass,
    UtilityClass,
    SpecificExceptionCatch,
    FunctionalInterface,
    OptionalReturn,
    ParameterizedTest,
    GroupedAssertions,
    ConstantNaming,
    BuilderPattern,
}

impl DetectorKind {
    pub const ALL: &'static [DetectorKind] = &[
        DetectorKind::EqualsHashCode,
        DetectorKind::EqualsBlueprint,
        DetectorKind::CopyConstructor,
        DetectorKind::Singleton,
        DetectorKind::IteratorNext,
        DetectorKind::SingleCallExceptionTest,
        DetectorKind::DefensiveNullCheck,
        DetectorKind::TryWithResources,
        DetectorKind::OverrideAnnotation,
        DetectorKind::SwitchDefault,
        DetectorKind::PrivateFields,
        DetectorKind::ProgramToInterface,
        DetectorKind::StringBuilderLoop,
        DetectorKind::ImmutableClass,
        DetectorKind::UtilityClass,
        DetectorKind::SpecificExceptionCatch,
        DetectorKind::FunctionalInterface,
        DetectorKind::OptionalReturn,
        DetectorKind::ParameterizedTest,
        DetectorKind::GroupedAssertions,
        DetectorKind::ConstantNaming,
        DetectorKind::BuilderPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::EqualsHashCode => "equals_hash_code",
            DetectorKind::EqualsBlueprint => "equals_blueprint",
            DetectorKind::CopyConstructor => "copy_constructor",
            DetectorKind::Singleton => "singleton",
            DetectorKind::IteratorNext => "iterator_next",
            DetectorKind::SingleCallExceptionTest => "single_call_exception_test",
            DetectorKind::DefensiveNullCheck => "defensive_null_check",
            DetectorKind::TryWithResources => "try_with_resources",
            DetectorKind::OverrideAnnotation => "override_annotation",
            DetectorKind::SwitchDefault => "switch_default",
            DetectorKind::PrivateFields => "private_fields",
            DetectorKind::ProgramToInterface => "program_to_interface",
            DetectorKind::StringBuilderLoop => "string_builder_loop",
            DetectorKind::ImmutableClass => "immutable_class",
            DetectorKind::UtilityClass => "utility_class",
            DetectorKind::SpecificExceptionCatch => "specific_exception_catch",
            DetectorKind::FunctionalInterface => "functional_interface",
            DetectorKind::OptionalReturn => "optional_return",
            DetectorKind::ParameterizedTest => "parameterized_test",
            DetectorKind::GroupedAssertions => "grouped_assertions",
            DetectorKind::ConstantNaming => "constant_naming",
            DetectorKind::BuilderPattern => "builder_pattern",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == id)
    }

    /// Construct the detector for this kind, bound to `detectable`.
    pub fn bind(&self, detectable: Arc<Detectable>, heuristics: &Heuristics) -> Box<dyn Detector> {
        match self {
            DetectorKind::EqualsHashCode => Box::new(EqualsHashCodeDetector::new(detectable)),
            DetectorKind::EqualsBlueprint => Box::new(EqualsBlueprintDetector::new(detectable)),
            DetectorKind::CopyConstructor => {
                Box::new(CopyConstructorDetector::new(detectable, heuristics))
            }
            DetectorKind::Singleton => Box::new(SingletonDetector::new(detectable)),
            DetectorKind::IteratorNext => {
                Box::new(IteratorNextDetector::new(detectable, heuristics))
            }
            DetectorKind::SingleCallExceptionTest => {
                Box::new(SingleCallExceptionTestDetector::new(detectable, heuristics))
            }
            DetectorKind::DefensiveNullCheck => {
                Box::new(DefensiveNullCheckDetector::new(detectable, heuristics))
            }
            DetectorKind::TryWithResources => Box::new(TryWithResourcesDetector::new(detectable)),
            DetectorKind::OverrideAnnotation => {
                Box::new(OverrideAnnotationDetector::new(detectable))
            }
            DetectorKind::SwitchDefault => Box::new(SwitchDefaultDetector::new(detectable)),
            DetectorKind::PrivateFields => Box::new(PrivateFieldsDetector::new(detectable)),
            DetectorKind::ProgramToInterface => {
                Box::new(ProgramToInterfaceDetector::new(detectable))
            }
            DetectorKind::StringBuilderLoop => Box::new(StringBuilderLoopDetector::new(detectable)),
            DetectorKind::ImmutableClass => Box::new(ImmutableClassDetector::new(detectable)),
            DetectorKind::UtilityClass => Box::new(UtilityClassDetector::new(detectable)),
            DetectorKind::SpecificExceptionCatch => {
                Box::new(SpecificExceptionCatchDetector::new(detectable, heuristics))
            }
            DetectorKind::FunctionalInterface => {
                Box::new(FunctionalInterfaceDetector::new(detectable))
            }
            DetectorKind::OptionalReturn => Box::new(OptionalReturnDetector::new(detectable)),
            DetectorKind::ParameterizedTest => {
                Box::new(ParameterizedTestDetector::new(detectable, heuristics))
            }
            DetectorKind::GroupedAssertions => Box::new(GroupedAssertionsDetector::new(detectable)),
            DetectorKind::ConstantNaming => Box::new(ConstantNamingDetector::new(detectable)),
            DetectorKind::BuilderPattern => Box::new(BuilderPatternDetector::new(detectable)),
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_table() {
        for kind in DetectorKind::ALL {
            assert_eq!(DetectorKind::from_id(kind.as_str()), Some(*kind));
        }
        assert_eq!(DetectorKind::from_id("no_such_detector"), None);
    }

    #[test]
    fn test_bind_keeps_detectable() {
        let heuristics = Heuristics::default();
        for kind in DetectorKind::ALL {
            let d = Arc::new(Detectable::new(format!("rule {}", kind), kind.as_str()));
            let detector = kind.bind(Arc::clone(&d), &heuristics);
            assert!(Arc::ptr_eq(detector.detectable(), &d));
        }
    }
}
