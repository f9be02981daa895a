//! Loops that build strings through a `StringBuilder` declared outside.

use std::collections::HashSet;
use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

const BUILDER_TYPES: &[&str] = &["StringBuilder", "StringBuffer"];
const QUALIFIED_BUILDER_TYPES: &[&str] = &["java.lang.StringBuilder", "java.lang.StringBuffer"];

pub struct StringBuilderLoopDetector {
    detectable: Arc<Detectable>,
}

impl StringBuilderLoopDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// Variable name of an append receiver: `sb` or `this.sb`.
fn receiver_name<'f>(receiver: Node, file: &'f ParsedFile) -> Option<&'f str> {
    match receiver.kind() {
        "identifier" => Some(file.node_text(receiver)),
        "field_access" => match query::field_access_parts(receiver, file) {
            Some((object, field)) if object.kind() == "this" => Some(field),
            _ => None,
        },
        _ => None,
    }
}

fn is_builder_type(type_node: Node, file: &ParsedFile, ctx: Option<&dyn ResolutionContext>) -> bool {
    if let Some(ctx) = ctx {
        if let Resolution::Resolved(q) = ctx.resolve_type_node(type_node, file) {
            return QUALIFIED_BUILDER_TYPES.contains(&q.as_str());
        }
    }
    BUILDER_TYPES.contains(&query::simple_type_name(type_node, file).as_str())
}

impl Detector for StringBuilderLoopDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        let mut reported = HashSet::new();
        for call in query::method_invocations(file.root()) {
            if query::invocation_name(call, file) != "append" {
                continue;
            }
            let Some(name) = query::invocation_object(call).and_then(|r| receiver_name(r, file))
            else {
                continue;
            };
            let Some(lp) = query::enclosing_loop(call) else {
                continue;
            };
            let Some(declared) = query::declared_type_of(name, call, file) else {
                continue;
            };
            // declared inside the loop means a fresh builder per iteration
            if query::is_within(declared, lp) || !is_builder_type(declared, file, ctx) {
                continue;
            }
            if reported.insert(lp.id()) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(lp, file),
                    &[lp],
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

    const KIND: DetectorKind = DetectorKind::StringBuilderLoop;

    #[test]
    fn test_builder_outside_loop() {
        let src = r#"
class Joiner {
    private final StringBuffer log = new StringBuffer();
    String join(String[] parts) {
        StringBuilder sb = new StringBuilder();
        for (String p : parts) {
            sb.append(p).append(',');
        }
        int i = 0;
        while (i < parts.length) {
            this.log.append(parts[i++]);
        }
        return sb.toString();
    }
    String perIteration(String[] parts) {
        String last = "";
        for (String p : parts) {
            StringBuilder local = new StringBuilder();
            local.append(p);
            last = local.toString();
        }
        return last;
    }
}
"#;
        let found = run(KIND, src);
        assert_eq!(found.len(), 2);
        assert_eq!(run_resolved(KIND, src).len(), 2);
    }

    #[test]
    fn test_append_outside_loop() {
        let found = run(
            KIND,
            "class A { String f() { StringBuilder sb = new StringBuilder(); sb.append(1); return sb.toString(); } }",
        );
        assert!(found.is_empty());
    }
}
