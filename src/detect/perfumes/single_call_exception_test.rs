//! Exception tests whose executable makes exactly one call.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

const CALL_KINDS: &[&str] = &["method_invocation", "object_creation_expression"];

pub struct SingleCallExceptionTestDetector {
    detectable: Arc<Detectable>,
    assertions: Vec<String>,
}

impl SingleCallExceptionTestDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            assertions: heuristics.exception_assertions.clone(),
        }
    }
}

/// Whether the executable passed to an assertion makes a single call.
fn is_single_call_executable(arg: Node) -> bool {
    match arg.kind() {
        "method_reference" => true,
        "lambda_expression" => arg
            .child_by_field_name("body")
            .map(|body| query::collect_kinds(body, CALL_KINDS).len() == 1)
            .unwrap_or(false),
        _ => false,
    }
}

/// JUnit 4 `@Test(expected = X.class)`.
fn expects_exception(method: Node, file: &ParsedFile) -> bool {
    query::annotations(method).into_iter().any(|a| {
        a.kind() == "annotation"
            && query::annotation_name(a, file) == "Test"
            && a.child_by_field_name("arguments")
                .map(|args| {
                    query::named_children(args).into_iter().any(|pair| {
                        pair.kind() == "element_value_pair"
                            && pair
                                .child_by_field_name("key")
                                .map(|k| file.node_text(k) == "expected")
                                .unwrap_or(false)
                    })
                })
                .unwrap_or(false)
    })
}

impl Detector for SingleCallExceptionTestDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();

        for call in query::method_invocations(file.root()) {
            let name = query::invocation_name(call, file);
            if !self.assertions.iter().any(|a| a == name) {
                continue;
            }
            let executable = query::arguments(call)
                .into_iter()
                .find(|a| matches!(a.kind(), "lambda_expression" | "method_reference"));
            if executable.map(is_single_call_executable).unwrap_or(false) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(call, file),
                    &[call],
                ));
            }
        }

        for method in query::method_declarations(file.root()) {
            if !expects_exception(method, file) {
                continue;
            }
            let body = query::body_statements(method);
            if body.len() == 1 && query::collect_kinds(body[0], CALL_KINDS).len() == 1 {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(method, file),
                    &[method],
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

    const KIND: DetectorKind = DetectorKind::SingleCallExceptionTest;

    #[test]
    fn test_assert_throws_forms() {
        let found = run(
            KIND,
            r#"
import static org.junit.jupiter.api.Assertions.*;
class ParserTest {
    @Test
    void rejectsEmpty() {
        assertThrows(IllegalArgumentException.class, () -> Parser.parse(""));
    }
    @Test
    void rejectsNull() {
        Assertions.assertThrows(NullPointerException.class, Parser::parseNull);
    }
    @Test
    void tooMuch() {
        assertThrows(IllegalStateException.class, () -> Parser.parse(read()));
    }
    @Test
    void block() {
        assertThrowsExactly(IllegalStateException.class, () -> { new Parser(null); });
    }
}
"#,
        );
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|f| f.type_name == "ParserTest"));
    }

    #[test]
    fn test_junit4_expected() {
        let found = run(
            KIND,
            r#"
class LegacyTest {
    @Test(expected = ArithmeticException.class)
    public void divides() {
        Calculator.divide(1, 0);
    }
    @Test(expected = ArithmeticException.class)
    public void setupAndDivide() {
        Calculator c = new Calculator();
        c.divide(1, 0);
    }
    @Test
    public void plain() {
        Calculator.divide(1, 1);
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].snippets[0].contains("divides"));
    }
}
