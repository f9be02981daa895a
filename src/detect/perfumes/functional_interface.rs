use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct FunctionalInterfaceDetector {
    detectable: Arc<Detectable>,
}

impl FunctionalInterfaceDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// Public `Object` methods redeclared in an interface do not count as abstract.
fn is_object_method(method: Node, file: &ParsedFile) -> bool {
    let params = query::parameters(method);
    match (query::declaration_name(method, file), params.as_slice()) {
        ("hashCode" | "toString", []) => true,
        ("equals", [param]) => query::parameter_type(*param)
            .map(|t| query::simple_type_name(t, file) == "Object")
            .unwrap_or(false),
        _ => false,
    }
}

fn is_abstract_member(method: Node, file: &ParsedFile) -> bool {
    let mods = query::modifiers(method, file);
    !query::has_body(method)
        && !mods.is_static()
        && !mods.has("default")
        && !mods.is_private()
        && !is_object_method(method, file)
}

impl Detector for FunctionalInterfaceDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for iface in query::collect_kinds(file.root(), &["interface_declaration"]) {
            if !query::modifiers(iface, file).has_annotation("FunctionalInterface") {
                continue;
            }
            let abstract_count = query::methods_of(iface)
                .into_iter()
                .filter(|m| is_abstract_member(*m, file))
                .count();
            if abstract_count == 1 {
                found.push(DetectedInstance::with_range(
                    &self.detectable,
                    file,
                    query::type_path(iface, file),
                    query::header_range(iface),
                    query::header_snippet(iface, file),
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

    #[test]
    fn test_single_abstract_method() {
        let found = run(
            DetectorKind::FunctionalInterface,
            r#"
@FunctionalInterface
public interface Parser<T> {
    T parse(String input);
    default Parser<T> trimmed() { return s -> parse(s.trim()); }
    static <T> Parser<T> constant(T value) { return s -> value; }
    boolean equals(Object other);
    String toString();
}
@FunctionalInterface
interface TooMany {
    void a();
    void b();
}
interface Unmarked {
    void run();
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Parser");
        assert_eq!(found[0].line(), 2);
    }
}
