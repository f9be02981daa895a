//! Variables declared with an interface their implementation satisfies.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{
    jdk_is_subtype, jdk_type_by_simple_name, query, ParsedFile, Resolution, ResolutionContext,
    TypeKind, JDK_INTERFACES,
};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct ProgramToInterfaceDetector {
    detectable: Arc<Detectable>,
}

impl ProgramToInterfaceDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

fn resolved_match(
    declared: Node,
    created: Node,
    file: &ParsedFile,
    ctx: &dyn ResolutionContext,
) -> Resolution<bool> {
    ctx.resolve_type_node(declared, file).and_then(|iface| {
        ctx.type_kind(&iface).and_then(|kind| {
            if kind != TypeKind::Interface {
                return Resolution::Resolved(false);
            }
            ctx.resolve_type_node(created, file)
                .and_then(|class| ctx.is_subtype_of(&class, &iface))
        })
    })
}

/// Fallback over the built-in JDK table, by simple name.
fn jdk_match(declared: Node, created: Node, file: &ParsedFile) -> bool {
    let (Some(iface), Some(class)) = (
        jdk_type_by_simple_name(&query::simple_type_name(declared, file)),
        jdk_type_by_simple_name(&query::simple_type_name(created, file)),
    ) else {
        return false;
    };
    JDK_INTERFACES.contains(iface) && jdk_is_subtype(class, iface) == Some(true)
}

impl Detector for ProgramToInterfaceDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        let decls = query::collect_kinds(
            file.root(),
            &["field_declaration", "local_variable_declaration"],
        );
        for decl in decls {
            let Some(declared) = decl.child_by_field_name("type") else {
                continue;
            };
            if query::is_primitive_type(declared) || file.node_text(declared) == "var" {
                continue;
            }
            let creations = query::declarators(decl).into_iter().filter_map(|d| {
                d.child_by_field_name("value")
                    .map(query::strip_parens)
                    .filter(|v| v.kind() == "object_creation_expression")
                    // anonymous classes implement the declared type directly
                    .filter(|v| {
                        !query::named_children(*v)
                            .iter()
                            .any(|c| c.kind() == "class_body")
                    })
                    .and_then(|v| v.child_by_field_name("type"))
            });
            let matched = creations.into_iter().any(|created| {
                if query::simple_type_name(created, file) == query::simple_type_name(declared, file)
                {
                    return false;
                }
                match ctx.map(|c| resolved_match(declared, created, file, c)) {
                    Some(Resolution::Resolved(answer)) => answer,
                    _ => jdk_match(declared, created, file),
                }
            });
            if matched {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(decl, file),
                    &[decl],
                ));
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::{run, run_resolved};
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::ProgramToInterface;

    #[test]
    fn test_jdk_collections() {
        let src = r#"
import java.util.*;
class Inventory {
    private final List<String> names = new ArrayList<>();
    private ArrayList<String> concrete = new ArrayList<>();
    void run() {
        Map<String, Integer> counts = new HashMap<>();
        Set<String> seen = new TreeSet<>();
        Runnable r = new Runnable() { public void run() {} };
        var inferred = new ArrayList<String>();
        int n = 0;
    }
}
"#;
        assert_eq!(run(KIND, src).len(), 3);
        assert_eq!(run_resolved(KIND, src).len(), 3);
    }

    #[test]
    fn test_double_brace_initializer_is_anonymous() {
        let src = r#"
import java.util.*;
class Defaults {
    void run() {
        List<String> names = new ArrayList<>() {{ add("x"); }};
    }
}
"#;
        assert!(run(KIND, src).is_empty());
        assert!(run_resolved(KIND, src).is_empty());
    }

    #[test]
    fn test_project_interface_needs_resolution() {
        let src = r#"
interface Shape { double area(); }
class Square implements Shape { public double area() { return 1; } }
class Canvas {
    private Shape shape = new Square();
    private Square square = new Square();
}
"#;
        assert!(run(KIND, src).is_empty());
        let found = run_resolved(KIND, src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Canvas");
    }

    #[test]
    fn test_unrelated_types() {
        let src = r#"
import java.util.*;
class Mixed {
    private List<String> a = new HashSet<>();
}
"#;
        assert!(run(KIND, src).is_empty());
    }
}
