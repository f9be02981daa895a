//! Classes whose instance fields are all private.

use std::sync::Arc;

use super::instance_fields;
use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct PrivateFieldsDetector {
    detectable: Arc<Detectable>,
}

impl PrivateFieldsDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

impl Detector for PrivateFieldsDetector {
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
            let fields = instance_fields(class, file);
            if !fields.is_empty()
                && fields
                    .iter()
                    .all(|f| query::modifiers(*f, file).is_private())
            {
                found.push(DetectedInstance::with_range(
                    &self.detectable,
                    file,
                    query::type_path(class, file),
                    query::header_range(class),
                    query::header_snippet(class, file),
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
    fn test_private_fields() {
        let found = run(
            DetectorKind::PrivateFields,
            r#"
class Hidden {
    public static final int LIMIT = 3;
    private int a;
    private String b;
}
class Exposed {
    private int a;
    int b;
}
class Stateless {
    static int counter;
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Hidden");
        assert_eq!(found[0].snippets[0], "class Hidden");
    }
}
