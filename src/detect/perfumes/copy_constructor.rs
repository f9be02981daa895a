//! Copy constructors that copy every field requiring a copy.

use std::sync::Arc;

use tree_sitter::Node;

use super::{instance_fields, names_declaring_type};
use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct CopyConstructorDetector {
    detectable: Arc<Detectable>,
    copy_methods: Vec<String>,
}

impl CopyConstructorDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            copy_methods: heuristics.copy_methods.clone(),
        }
    }

    /// `source.field`, parentheses ignored.
    fn is_source_field(&self, node: Node, file: &ParsedFile, source: &str, field: &str) -> bool {
        match query::field_access_parts(query::strip_parens(node), file) {
            Some((object, name)) => name == field && query::is_identifier(object, file, source),
            None => false,
        }
    }

    /// Whether `value` is recognized as a copy of `source.field`.
    fn is_copy_of(&self, value: Node, file: &ParsedFile, source: &str, field: &str) -> bool {
        let value = query::strip_parens(value);
        if self.is_source_field(value, file, source, field) {
            return true;
        }
        match value.kind() {
            "method_invocation" => {
                let name = query::invocation_name(value, file);
                if !self.copy_methods.iter().any(|m| m == name) {
                    return false;
                }
                let on_field = query::invocation_object(value)
                    .map(|o| self.is_source_field(o, file, source, field))
                    .unwrap_or(false);
                on_field
                    || query::arguments(value)
                        .iter()
                        .any(|a| self.is_source_field(*a, file, source, field))
            }
            "object_creation_expression" => {
                let args = query::arguments(value);
                args.len() == 1 && self.is_source_field(args[0], file, source, field)
            }
            _ => false,
        }
    }

    fn copies_field(&self, ctor: Node, file: &ParsedFile, source: &str, field: &str) -> bool {
        query::collect_kinds_in_scope(ctor, &["assignment_expression"])
            .into_iter()
            .filter(|a| query::operator(*a, file) == "=")
            .any(|a| {
                let targets_field = a
                    .child_by_field_name("left")
                    .map(|l| query::is_own_field_ref(l, file, field, &[source]))
                    .unwrap_or(false);
                targets_field
                    && a.child_by_field_name("right")
                        .map(|r| self.is_copy_of(r, file, source, field))
                        .unwrap_or(false)
            })
    }
}

/// Names of instance fields a copy constructor has to assign.
///
/// Final fields that already have an initializer cannot be assigned.
fn fields_requiring_copy<'f>(type_decl: Node, file: &'f ParsedFile) -> Vec<&'f str> {
    instance_fields(type_decl, file)
        .into_iter()
        .flat_map(|decl| {
            let is_final = query::modifiers(decl, file).is_final();
            query::declarators(decl)
                .into_iter()
                .filter(move |d| !(is_final && d.child_by_field_name("value").is_some()))
        })
        .map(|d| query::declaration_name(d, file))
        .collect()
}

impl Detector for CopyConstructorDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for type_decl in query::class_declarations(file.root()) {
            let required = fields_requiring_copy(type_decl, file);
            if required.is_empty() {
                continue;
            }
            for ctor in query::constructors_of(type_decl) {
                if ctor.kind() != "constructor_declaration"
                    || query::modifiers(ctor, file).is_private()
                {
                    continue;
                }
                let params = query::parameters(ctor);
                if params.len() != 1 || params[0].kind() != "formal_parameter" {
                    continue;
                }
                let own_type = query::parameter_type(params[0])
                    .map(|t| names_declaring_type(t, type_decl, file, ctx))
                    .unwrap_or(false);
                if !own_type {
                    continue;
                }
                let source = query::parameter_name(params[0], file);
                if required
                    .iter()
                    .all(|field| self.copies_field(ctor, file, source, field))
                {
                    found.push(DetectedInstance::from_nodes(
                        &self.detectable,
                        file,
                        query::type_path(type_decl, file),
                        &[ctor],
                    ));
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::CopyConstructor;

    #[test]
    fn test_all_fields_copied() {
        let found = run(
            KIND,
            r#"
class Pair {
    private int a;
    private int b;
    Pair(Pair other) {
        this.a = other.a;
        b = other.b;
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Pair");
    }

    #[test]
    fn test_one_field_missing() {
        let found = run(
            KIND,
            r#"
class Pair {
    private int a;
    private int b;
    Pair(Pair other) {
        this.a = other.a;
    }
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_copy_vocabulary_and_creation() {
        let found = run(
            KIND,
            r#"
import java.util.*;
class Bag {
    private static int created;
    private final String label = "bag";
    private List<String> items;
    private int[] counts;
    private Map<String, Integer> index;
    public Bag(Bag source) {
        this.items = List.copyOf(source.items);
        this.counts = source.counts.clone();
        this.index = new HashMap<>(source.index);
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_unrecognized_copy_rejected() {
        let found = run(
            KIND,
            r#"
class Box {
    private Object value;
    Box(Box other) {
        this.value = transform(other.value);
    }
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_private_or_foreign_parameter_rejected() {
        let found = run(
            KIND,
            r#"
class Box {
    private int v;
    private Box(Box other) { this.v = other.v; }
    Box(Crate other) { this.v = other.v; }
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_no_fields_to_copy() {
        let found = run(KIND, "class Empty { Empty(Empty other) {} }");
        assert!(found.is_empty());
    }
}
