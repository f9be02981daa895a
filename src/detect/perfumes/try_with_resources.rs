//! Resources closed by try-with-resources.

use std::sync::Arc;

use crate::analysis::{query, CodeRange, ParsedFile, ResolutionContext};
use crate::detect::{required_field, DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct TryWithResourcesDetector {
    detectable: Arc<Detectable>,
}

impl TryWithResourcesDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

impl Detector for TryWithResourcesDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for stmt in query::collect_kinds(file.root(), &["try_with_resources_statement"]) {
            // report `try (...)`, not the whole block
            let resources = required_field(stmt, "resources")?;
            let snippet = file
                .source
                .get(stmt.start_byte()..resources.end_byte())
                .unwrap_or("")
                .to_string();
            found.push(DetectedInstance::with_range(
                &self.detectable,
                file,
                query::enclosing_type_name(stmt, file),
                CodeRange::between(stmt, resources),
                snippet,
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
    fn test_reports_resource_header() {
        let found = run(
            DetectorKind::TryWithResources,
            r#"
class Reader {
    String first(java.nio.file.Path p) throws java.io.IOException {
        try (var in = java.nio.file.Files.newBufferedReader(p)) {
            return in.readLine();
        }
    }
    void plain() {
        try { run(); } finally { close(); }
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Reader");
        assert!(found[0].snippets[0].starts_with("try (var in"));
        assert!(found[0].snippets[0].ends_with(')'));
        assert_eq!(found[0].ranges[0].begin_line, 4);
    }
}
