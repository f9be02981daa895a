//! Public methods that guard every reference parameter against null.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct DefensiveNullCheckDetector {
    detectable: Arc<Detectable>,
    nullability_annotations: Vec<String>,
    null_check_methods: Vec<String>,
}

impl DefensiveNullCheckDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            nullability_annotations: heuristics.nullability_annotations.clone(),
            null_check_methods: heuristics.null_check_methods.clone(),
        }
    }

    /// `requireNonNull(p, ...)` anywhere in a top-level statement.
    fn has_check_call(&self, stmt: Node, file: &ParsedFile, param: &str) -> bool {
        query::collect_kinds_in_scope(stmt, &["method_invocation"])
            .into_iter()
            .any(|call| {
                let name = query::invocation_name(call, file);
                self.null_check_methods.iter().any(|m| m == name)
                    && query::arguments(call)
                        .first()
                        .map(|a| query::is_identifier(query::strip_parens(*a), file, param))
                        .unwrap_or(false)
            })
    }

    fn is_guarded(&self, param: Node, body: &[Node], file: &ParsedFile) -> bool {
        if query::modifiers(param, file).has_any_annotation(&self.nullability_annotations) {
            return true;
        }
        let name = query::parameter_name(param, file);
        body.iter()
            .any(|stmt| self.has_check_call(*stmt, file, name) || is_null_guard(*stmt, file, name))
    }
}

/// `if (p == null ...) throw ...;`
fn is_null_guard(stmt: Node, file: &ParsedFile, param: &str) -> bool {
    if stmt.kind() != "if_statement" {
        return false;
    }
    let Some(cond) = query::condition(stmt) else {
        return false;
    };
    let compares_null = query::collect_kinds(cond, &["binary_expression"])
        .into_iter()
        .any(|b| {
            if query::operator(b, file) != "==" {
                return false;
            }
            let (Some(l), Some(r)) = (
                b.child_by_field_name("left").map(query::strip_parens),
                b.child_by_field_name("right").map(query::strip_parens),
            ) else {
                return false;
            };
            (query::is_identifier(l, file, param) && r.kind() == "null_literal")
                || (l.kind() == "null_literal" && query::is_identifier(r, file, param))
        });
    compares_null
        && stmt
            .child_by_field_name("consequence")
            .and_then(query::single_statement)
            .map(|s| s.kind() == "throw_statement")
            .unwrap_or(false)
}

fn is_reference_parameter(param: Node) -> bool {
    param.kind() == "spread_parameter"
        || query::parameter_type(param)
            .map(|t| !query::is_primitive_type(t))
            .unwrap_or(false)
}

impl Detector for DefensiveNullCheckDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        let callables = query::collect_kinds(
            file.root(),
            &["method_declaration", "constructor_declaration"],
        );
        for callable in callables {
            let mods = query::modifiers(callable, file);
            if !(mods.is_public() || mods.has("protected")) || !query::has_body(callable) {
                continue;
            }
            let params = query::parameters(callable);
            if query::declaration_name(callable, file) == "equals" && params.len() == 1 {
                continue;
            }
            let references: Vec<_> = params
                .into_iter()
                .filter(|p| is_reference_parameter(*p))
                .collect();
            if references.is_empty() {
                continue;
            }
            let body = query::body_statements(callable);
            if references.iter().all(|p| self.is_guarded(*p, &body, file)) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(callable, file),
                    &[callable],
                ));
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::DefensiveNullCheck;

    #[test]
    fn test_all_guard_styles() {
        let found = run(
            KIND,
            r#"
import java.util.Objects;
public class Account {
    private String owner;
    public Account(String owner) {
        this.owner = Objects.requireNonNull(owner, "owner");
    }
    public void rename(String first, String last) {
        if (first == null || last == null) {
            throw new IllegalArgumentException("name");
        }
        owner = first + last;
    }
    public void tag(@NonNull String tag, int weight) {
        owner = owner + tag + weight;
    }
}
"#,
        );
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_partial_or_missing_guards() {
        let found = run(
            KIND,
            r#"
public class Account {
    public void rename(String first, String last) {
        if (first == null) throw new IllegalArgumentException();
        System.out.println(first + last);
    }
    public void add(int amount) {}
    void internal(String s) { java.util.Objects.requireNonNull(s); }
    public boolean equals(Object o) {
        if (o == null) throw new IllegalStateException();
        return true;
    }
}
"#,
        );
        assert!(found.is_empty());
    }
}
