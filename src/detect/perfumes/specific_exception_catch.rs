//! Try statements whose catch clauses name specific exception types.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct SpecificExceptionCatchDetector {
    detectable: Arc<Detectable>,
    broad: Vec<String>,
}

impl SpecificExceptionCatchDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            broad: heuristics.broad_exceptions.clone(),
        }
    }

    /// Whether a catch clause catches a broad type or swallows the exception.
    fn is_lax(&self, clause: Node, file: &ParsedFile) -> bool {
        let empty_body = clause
            .child_by_field_name("body")
            .map(|b| query::statements(b).is_empty())
            .unwrap_or(true);
        if empty_body {
            return true;
        }
        let caught = query::named_children(clause)
            .into_iter()
            .filter(|n| n.kind() == "catch_formal_parameter")
            .flat_map(query::named_children)
            .filter(|n| n.kind() == "catch_type")
            .flat_map(query::named_children);
        caught
            .map(|ty| query::simple_type_name(ty, file))
            .any(|name| self.broad.contains(&name))
    }
}

impl Detector for SpecificExceptionCatchDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for stmt in query::try_statements(file.root()) {
            let clauses: Vec<_> = query::named_children(stmt)
                .into_iter()
                .filter(|n| n.kind() == "catch_clause")
                .collect();
            if clauses.is_empty() || clauses.iter().any(|c| self.is_lax(*c, file)) {
                continue;
            }
            found.push(DetectedInstance::from_nodes(
                &self.detectable,
                file,
                query::enclosing_type_name(stmt, file),
                &[stmt],
            ));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::SpecificExceptionCatch;

    #[test]
    fn test_specific_catches() {
        let found = run(
            KIND,
            r#"
class Loader {
    String read(java.nio.file.Path p) {
        try {
            return java.nio.file.Files.readString(p);
        } catch (java.nio.file.NoSuchFileException | SecurityException e) {
            return "";
        } catch (java.io.IOException e) {
            throw new IllegalStateException(e);
        }
    }
    void broad() {
        try { run(); } catch (Exception e) { log(e); }
    }
    void swallowed() {
        try { run(); } catch (IllegalStateException e) { }
    }
    void noCatch() {
        try { run(); } finally { close(); }
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line(), 4);
    }

    #[test]
    fn test_multi_catch_with_broad_member() {
        let found = run(
            KIND,
            "class A { void f() { try { g(); } catch (IllegalStateException | RuntimeException e) { h(e); } } }",
        );
        assert!(found.is_empty());
    }
}
