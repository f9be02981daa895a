//! Detector implementations, one module per rule.
//!
//! All detectors follow the same skeleton: collect candidates with
//! [`crate::analysis::query`], filter them by shape, consult the resolution
//! context where the rule depends on types and fall back to a conservative
//! syntactic check when it cannot answer.

mod builder_pattern;
mod constant_naming;
mod copy_constructor;
mod defensive_null_check;
mod equals_blueprint;
mod equals_hash_code;
mod functional_interface;
mod grouped_assertions;
mod immutable_class;
mod iterator_next;
mod optional_return;
mod override_annotation;
mod parameterized_test;
mod private_fields;
mod program_to_interface;
mod single_call_exception_test;
mod singleton;
mod specific_exception_catch;
mod string_builder_loop;
mod switch_default;
mod try_with_resources;
mod utility_class;

pub use builder_pattern::BuilderPatternDetector;
pub use constant_naming::ConstantNamingDetector;
pub use copy_constructor::CopyConstructorDetector;
pub use defensive_null_check::DefensiveNullCheckDetector;
pub use equals_blueprint::EqualsBlueprintDetector;
pub use equals_hash_code::EqualsHashCodeDetector;
pub use functional_interface::FunctionalInterfaceDetector;
pub use grouped_assertions::GroupedAssertionsDetector;
pub use immutable_class::ImmutableClassDetector;
pub use iterator_next::IteratorNextDetector;
pub use optional_return::OptionalReturnDetector;
pub use override_annotation::OverrideAnnotationDetector;
pub use parameterized_test::ParameterizedTestDetector;
pub use private_fields::PrivateFieldsDetector;
pub use program_to_interface::ProgramToInterfaceDetector;
pub use single_call_exception_test::SingleCallExceptionTestDetector;
pub use singleton::SingletonDetector;
pub use specific_exception_catch::SpecificExceptionCatchDetector;
pub use string_builder_loop::StringBuilderLoopDetector;
pub use switch_default::SwitchDefaultDetector;
pub use try_with_resources::TryWithResourcesDetector;
pub use utility_class::UtilityClassDetector;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};

/// Whether `type_node` names the type `type_decl` declares.
///
/// Compares simple names first, then resolved qualified names.
fn names_declaring_type(
    type_node: Node,
    type_decl: Node,
    file: &ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> bool {
    let own = query::declaration_name(type_decl, file);
    if query::simple_type_name(type_node, file) == own {
        return true;
    }
    let Some(ctx) = ctx else {
        return false;
    };
    let declared = file.qualify(&query::type_path(type_decl, file));
    ctx.resolve_type_node(type_node, file) == Resolution::Resolved(declared)
}

/// Instance (non-static) field declarations of a type.
fn instance_fields<'t>(type_decl: Node<'t>, file: &ParsedFile) -> Vec<Node<'t>> {
    query::fields_of(type_decl)
        .into_iter()
        .filter(|f| f.kind() == "field_declaration" && !query::modifiers(*f, file).is_static())
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::Arc;

    use crate::analysis::{JavaTreeProvider, ParsedFile, TreeProvider, TypeIndex};
    use crate::detect::{DetectedInstance, Detector, DetectorKind};
    use crate::config::Heuristics;
    use crate::registry::Detectable;

    pub fn parse(source: &str) -> ParsedFile {
        JavaTreeProvider::new()
            .parse_source(Path::new("Test.java"), source)
            .unwrap()
    }

    pub fn detector(kind: DetectorKind) -> Box<dyn Detector> {
        let detectable = Arc::new(Detectable::new(kind.as_str(), kind.as_str()));
        kind.bind(detectable, &Heuristics::default())
    }

    /// Run without a resolution context.
    pub fn run(kind: DetectorKind, source: &str) -> Vec<DetectedInstance> {
        let file = parse(source);
        detector(kind).detect(&file, None).unwrap()
    }

    /// Run with a type index built from the snippet itself.
    pub fn run_resolved(kind: DetectorKind, source: &str) -> Vec<DetectedInstance> {
        let provider = JavaTreeProvider::new();
        let file = parse(source);
        let index = TypeIndex::from_parsed(&provider, std::slice::from_ref(&file));
        detector(kind).detect(&file, Some(&index)).unwrap()
    }
}
