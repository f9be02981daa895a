//! Final classes that offer no way to change their state.

use std::sync::Arc;

use tree_sitter::Node;

use super::instance_fields;
use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct ImmutableClassDetector {
    detectable: Arc<Detectable>,
}

impl ImmutableClassDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

fn is_setter_name(name: &str) -> bool {
    name.strip_prefix("set")
        .and_then(|rest| rest.chars().next())
        .map(|c| c.is_uppercase() || c == '_')
        .unwrap_or(false)
}

/// Names a method introduces that shadow fields.
fn local_names<'f>(method: Node, file: &'f ParsedFile) -> Vec<&'f str> {
    let mut names: Vec<_> = query::parameters(method)
        .into_iter()
        .map(|p| query::parameter_name(p, file))
        .collect();
    for decl in query::collect_kinds_in_scope(method, &["local_variable_declaration"]) {
        names.extend(
            query::declarators(decl)
                .into_iter()
                .map(|d| query::declaration_name(d, file)),
        );
    }
    names
}

/// Whether `method` assigns or increments one of `fields`.
fn mutates_field(method: Node, file: &ParsedFile, fields: &[&str]) -> bool {
    let shadowed = local_names(method, file);
    let targets = query::collect_kinds_in_scope(method, &["assignment_expression", "update_expression"])
        .into_iter()
        .filter_map(|n| match n.kind() {
            "assignment_expression" => n.child_by_field_name("left"),
            _ => query::named_children(n).into_iter().next(),
        });
    for target in targets {
        let target = query::strip_parens(target);
        if fields
            .iter()
            .any(|f| query::is_own_field_ref(target, file, f, &shadowed))
        {
            return true;
        }
    }
    false
}

impl Detector for ImmutableClassDetector {
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
            if !query::modifiers(class, file).is_final() {
                continue;
            }
            let fields = instance_fields(class, file);
            if fields.is_empty()
                || !fields.iter().all(|f| {
                    let mods = query::modifiers(*f, file);
                    mods.is_private() && mods.is_final()
                })
            {
                continue;
            }
            let field_names: Vec<&str> = fields
                .iter()
                .flat_map(|f| query::declarators(*f))
                .map(|d| query::declaration_name(d, file))
                .collect();
            let methods = query::methods_of(class);
            let has_setter = methods
                .iter()
                .any(|m| is_setter_name(query::declaration_name(*m, file)));
            if has_setter || methods.iter().any(|m| mutates_field(*m, file, &field_names)) {
                continue;
            }
            found.push(DetectedInstance::with_range(
                &self.detectable,
                file,
                query::type_path(class, file),
                query::header_range(class),
                query::header_snippet(class, file),
            ));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::ImmutableClass;

    #[test]
    fn test_immutable_value() {
        let found = run(
            KIND,
            r#"
public final class Money {
    private final long cents;
    private final String currency;
    public Money(long cents, String currency) {
        this.cents = cents;
        this.currency = currency;
    }
    public Money plus(Money other) {
        long cents = this.cents + other.cents;
        return new Money(cents, currency);
    }
    public long settle() { return cents; }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].snippets[0], "public final class Money");
    }

    #[test]
    fn test_mutable_variants_rejected() {
        let found = run(
            KIND,
            r#"
public class NotFinal {
    private final int a;
    NotFinal(int a) { this.a = a; }
}
public final class WithSetter {
    private final int a;
    WithSetter(int a) { this.a = a; }
    public void setA(int a) {}
}
public final class NonFinalField {
    private int a;
}
public final class Counter {
    private final int[] counts;
    private int hits;
    Counter() { counts = new int[1]; }
}
"#,
        );
        assert!(found.is_empty());
    }
}
