//! Classes assembled through a static nested builder.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct BuilderPatternDetector {
    detectable: Arc<Detectable>,
}

impl BuilderPatternDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

fn returns_type(method: Node, name: &str, file: &ParsedFile) -> bool {
    method
        .child_by_field_name("type")
        .map(|t| query::simple_type_name(t, file) == name)
        .unwrap_or(false)
}

/// A method declared to return its builder that only ever returns `this`.
fn is_fluent(method: Node, builder: &str, file: &ParsedFile) -> bool {
    if !returns_type(method, builder, file) {
        return false;
    }
    let Some(body) = method.child_by_field_name("body") else {
        return false;
    };
    let returns = query::collect_kinds_in_scope(body, &["return_statement"]);
    !returns.is_empty()
        && returns.iter().all(|r| {
            query::returned_expression(*r)
                .map(|e| e.kind() == "this")
                .unwrap_or(false)
        })
}

fn is_builder_of(nested: Node, outer: &str, file: &ParsedFile) -> bool {
    if nested.kind() != "class_declaration" || !query::modifiers(nested, file).is_static() {
        return false;
    }
    let builder = query::declaration_name(nested, file);
    let methods = query::methods_of(nested);
    let has_fluent = methods.iter().any(|m| is_fluent(*m, builder, file));
    let has_build = methods.iter().any(|m| {
        query::declaration_name(*m, file) == "build"
            && query::parameters(*m).is_empty()
            && returns_type(*m, outer, file)
    });
    has_fluent && has_build
}

impl Detector for BuilderPatternDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for class in query::class_declarations(file.root()) {
            let outer = query::declaration_name(class, file);
            let builder = query::nested_types_of(class)
                .into_iter()
                .find(|n| is_builder_of(*n, outer, file));
            if let Some(builder) = builder {
                found.push(DetectedInstance::with_range(
                    &self.detectable,
                    file,
                    query::type_path(class, file),
                    query::header_range(builder),
                    query::header_snippet(builder, file),
                ));
            }
        }
        Ok(found)
    }
}
