//! Methods that express a missing result through `Optional`.

use std::sync::Arc;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

const OPTIONAL_TYPES: &[&str] = &["Optional", "OptionalInt", "OptionalLong", "OptionalDouble"];

pub struct OptionalReturnDetector {
    detectable: Arc<Detectable>,
}

impl OptionalReturnDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

impl Detector for OptionalReturnDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for method in query::method_declarations(file.root()) {
            let Some(ret) = method.child_by_field_name("type") else {
                continue;
            };
            if !OPTIONAL_TYPES.contains(&query::simple_type_name(ret, file).as_str()) {
                continue;
            }
            let Some(body) = method.child_by_field_name("body") else {
                continue;
            };
            // returns inside lambdas and anonymous classes belong to them
            let returns = query::collect_kinds_in_scope(body, &["return_statement"]);
            if returns.is_empty() || returns.iter().any(|r| query::returns_literal(*r, "null")) {
                continue;
            }
            found.push(DetectedInstance::from_nodes(
                &self.detectable,
                file,
                query::enclosing_type_name(method, file),
                &[method],
            ));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    #[test]
    fn test_optional_returns() {
        let found = run(
            DetectorKind::OptionalReturn,
            r#"
import java.util.*;
class Users {
    private final Map<String, String> byId = new HashMap<>();
    Optional<String> find(String id) {
        return Optional.ofNullable(byId.get(id));
    }
    OptionalInt age(String id) {
        Comparator<String> c = new Comparator<String>() {
            public int compare(String a, String b) { return 0; }
        };
        return OptionalInt.empty();
    }
    Optional<String> broken(String id) {
        if (id == null) return null;
        return Optional.of(id);
    }
    abstract Optional<String> pending();
    String plain() { return ""; }
}
"#,
        );
        let lines: Vec<_> = found.iter().map(|f| f.line()).collect();
        assert_eq!(lines, vec![5, 8]);
    }
}
