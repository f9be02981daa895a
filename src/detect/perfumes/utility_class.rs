//! Non-instantiable classes of static members.

use std::sync::Arc;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct UtilityClassDetector {
    detectable: Arc<Detectable>,
}

impl UtilityClassDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

impl Detector for UtilityClassDetector {
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
            let mut static_methods = 0usize;
            let mut constructors = 0usize;
            let mut accepted = true;
            for member in query::body_members(class) {
                let mods = query::modifiers(member, file);
                match member.kind() {
                    "constructor_declaration" => {
                        constructors += 1;
                        accepted &= mods.is_private();
                    }
                    "method_declaration" => {
                        static_methods += 1;
                        accepted &= mods.is_static();
                    }
                    "field_declaration" => accepted &= mods.is_static(),
                    // instance initializer
                    "block" => accepted = false,
                    "class_declaration" => accepted &= mods.is_static(),
                    _ => {}
                }
            }
            if accepted && static_methods > 0 && constructors > 0 {
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

    const KIND: DetectorKind = DetectorKind::UtilityClass;

    #[test]
    fn test_utility_class() {
        let found = run(
            KIND,
            r#"
public final class Strings {
    private static final String EMPTY = "";
    static { System.loadLibrary("x"); }
    private Strings() {}
    public static boolean isBlank(String s) { return s == null || s.trim().isEmpty(); }
}
"#,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_instantiable_or_stateful() {
        let found = run(
            KIND,
            r#"
class NoConstructor {
    static int twice(int x) { return 2 * x; }
}
class PublicConstructor {
    public PublicConstructor() {}
    static int twice(int x) { return 2 * x; }
}
class InstanceMethod {
    private InstanceMethod() {}
    static int twice(int x) { return 2 * x; }
    int self() { return 1; }
}
class InstanceField {
    private int cache;
    private InstanceField() {}
    static int twice(int x) { return 2 * x; }
}
"#,
        );
        assert!(found.is_empty());
    }
}
