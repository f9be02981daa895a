//! Types whose constants all follow UPPER_SNAKE_CASE.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

static CONSTANT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").unwrap());

const IGNORED: &[&str] = &["serialVersionUID"];

pub struct ConstantNamingDetector {
    detectable: Arc<Detectable>,
}

impl ConstantNamingDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// `static final` of a primitive or `String`; every field of an interface.
fn is_constant(field: Node, in_interface: bool, file: &ParsedFile) -> bool {
    if in_interface || field.kind() == "constant_declaration" {
        return true;
    }
    let mods = query::modifiers(field, file);
    if !(mods.is_static() && mods.is_final()) {
        return false;
    }
    field
        .child_by_field_name("type")
        .map(|t| query::is_primitive_type(t) || query::simple_type_name(t, file) == "String")
        .unwrap_or(false)
}

impl Detector for ConstantNamingDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for type_decl in query::type_declarations(file.root()) {
            let in_interface = type_decl.kind() == "interface_declaration";
            let names: Vec<&str> = query::fields_of(type_decl)
                .into_iter()
                .filter(|f| is_constant(*f, in_interface, file))
                .flat_map(query::declarators)
                .map(|d| query::declaration_name(d, file))
                .filter(|name| !IGNORED.contains(name))
                .collect();
            if !names.is_empty() && names.iter().all(|n| CONSTANT_NAME.is_match(n)) {
                found.push(DetectedInstance::with_range(
                    &self.detectable,
                    file,
                    query::type_path(type_decl, file),
                    query::header_range(type_decl),
                    query::header_snippet(type_decl, file),
                ));
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::CONSTANT_NAME;
    use crate::detect::perfumes::testing::run;
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::ConstantNaming;

    #[test]
    fn test_pattern() {
        for ok in ["MAX", "MAX_SIZE", "HTTP2_PORT", "A1_B2"] {
            assert!(CONSTANT_NAME.is_match(ok), "{}", ok);
        }
        for bad in ["max", "MaxSize", "MAX__SIZE", "_MAX", "MAX_", "2X"] {
            assert!(!CONSTANT_NAME.is_match(bad), "{}", bad);
        }
    }

    #[test]
    fn test_types() {
        let found = run(
            KIND,
            r#"
class Limits implements java.io.Serializable {
    private static final long serialVersionUID = 1L;
    public static final int MAX_USERS = 10;
    static final String DEFAULT_NAME = "guest";
    static final java.util.List<String> names = java.util.List.of();
    private int counter;
}
interface Codes {
    int OK = 0;
    int notFound = 404;
}
class Mixed {
    static final int LIMIT = 1;
    static final double defaultRatio = 0.5;
}
class NoConstants {
    private int x;
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Limits");
    }
}
