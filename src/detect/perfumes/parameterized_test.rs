use std::sync::Arc;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct ParameterizedTestDetector {
    detectable: Arc<Detectable>,
    sources: Vec<String>,
}

impl ParameterizedTestDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            sources: heuristics.argument_sources.clone(),
        }
    }
}

impl Detector for ParameterizedTestDetector {
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
            let mods = query::modifiers(method, file);
            if mods.has_annotation("ParameterizedTest")
                && mods.has_any_annotation(&self.sources)
                && !query::parameters(method).is_empty()
            {
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

    #[test]
    fn test_parameterized_with_source() {
        let found = run(
            DetectorKind::ParameterizedTest,
            r#"
class PalindromeTest {
    @ParameterizedTest
    @ValueSource(strings = {"racecar", "radar"})
    void palindromes(String candidate) {
        assertTrue(isPalindrome(candidate));
    }

    @ParameterizedTest
    void noSource(String candidate) {}

    @ParameterizedTest
    @org.junit.jupiter.params.provider.CsvSource({"1, 1", "2, 4"})
    void qualified(int in, int out) {}

    @ParameterizedTest
    @EmptySource
    void noParameters() {}
}
"#,
        );
        let lines: Vec<_> = found.iter().map(|f| f.line()).collect();
        assert_eq!(lines, vec![3, 12]);
    }
}
