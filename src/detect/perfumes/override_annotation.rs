//! Types whose overriding methods all carry `@Override`.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

/// Overridable `java.lang.Object` methods as (name, arity).
const OBJECT_METHODS: &[(&str, usize)] = &[
    ("equals", 1),
    ("hashCode", 0),
    ("toString", 0),
    ("clone", 0),
    ("finalize", 0),
];

pub struct OverrideAnnotationDetector {
    detectable: Arc<Detectable>,
}

impl OverrideAnnotationDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

fn overrides_object_method(method: Node, file: &ParsedFile) -> bool {
    let name = query::declaration_name(method, file);
    let params = query::parameters(method);
    let matches_shape = OBJECT_METHODS
        .iter()
        .any(|(n, arity)| *n == name && *arity == params.len());
    if !matches_shape {
        return false;
    }
    // equals(P) is an overload, not an override
    name != "equals"
        || query::parameter_type(params[0])
            .map(|t| query::simple_type_name(t, file) == "Object")
            .unwrap_or(false)
}

/// Whether some ancestor declares a method with the same name and arity.
fn overrides_ancestor_method(
    method: Node,
    file: &ParsedFile,
    ancestors: &[String],
    ctx: &dyn ResolutionContext,
) -> bool {
    let name = query::declaration_name(method, file);
    let arity = query::parameters(method).len();
    ancestors.iter().any(|ancestor| match ctx.declared_methods(ancestor) {
        Resolution::Resolved(methods) => methods
            .iter()
            .any(|m| m.matches(name, arity) && !m.is_static),
        Resolution::Unresolved => false,
    })
}

impl Detector for OverrideAnnotationDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for type_decl in query::type_declarations(file.root()) {
            if type_decl.kind() == "interface_declaration" {
                continue;
            }
            let ancestors = ctx
                .and_then(|ctx| {
                    let qualified = file.qualify(&query::type_path(type_decl, file));
                    ctx.ancestors(&qualified).resolved()
                })
                .unwrap_or_default();

            let mut overriding = 0usize;
            let mut all_annotated = true;
            for method in query::methods_of(type_decl) {
                let mods = query::modifiers(method, file);
                if mods.is_static() || mods.is_private() {
                    continue;
                }
                let overrides = overrides_object_method(method, file)
                    || ctx
                        .map(|ctx| overrides_ancestor_method(method, file, &ancestors, ctx))
                        .unwrap_or(false);
                if overrides {
                    overriding += 1;
                    all_annotated &= mods.has_annotation("Override");
                }
            }

            if overriding > 0 && all_annotated {
                found.push(DetectedInstance::with_range(
                    &self.detectable,
                    file,
                    query::type_path(type_decl, file),
                    query::header_range(type_decl),
                    query::header_snippet(type_decl, file),
                ));
            }
        }
        Ok(found)
    }
}
