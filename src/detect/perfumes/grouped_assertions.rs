use std::sync::Arc;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct GroupedAssertionsDetector {
    detectable: Arc<Detectable>,
}

impl GroupedAssertionsDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

impl Detector for GroupedAssertionsDetector {
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
            if query::invocation_name(call, file) != "assertAll" {
                continue;
            }
            let executables = query::arguments(call)
                .into_iter()
                .filter(|a| matches!(a.kind(), "lambda_expression" | "method_reference"))
                .count();
            if executables >= 2 {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(call, file),
                    &[call],
                ));
            }
        }
        Ok(found)
    }
}
