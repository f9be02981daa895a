//! Singleton variants: eager field, lazy factory, single-constant enum.

use std::sync::Arc;

use tree_sitter::Node;

use super::{instance_fields, names_declaring_type};
use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct SingletonDetector {
    detectable: Arc<Detectable>,
}

impl SingletonDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// Static fields of the declaring type, with their first declarator name.
fn own_static_fields<'t, 'f>(
    type_decl: Node<'t>,
    file: &'f ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> Vec<(Node<'t>, Node<'t>)> {
    query::fields_of(type_decl)
        .into_iter()
        .filter(|f| f.kind() == "field_declaration" && query::modifiers(*f, file).is_static())
        .filter(|f| {
            f.child_by_field_name("type")
                .map(|t| names_declaring_type(t, type_decl, file, ctx))
                .unwrap_or(false)
        })
        .flat_map(|f| query::declarators(f).into_iter().map(move |d| (f, d)))
        .collect()
}

/// Whether the last statement of `method` returns `field`.
fn returns_field_last(method: Node, file: &ParsedFile, field: &str) -> bool {
    let Some(last) = query::body_statements(method).last().copied() else {
        return false;
    };
    let Some(expr) = query::returned_expression(last) else {
        return false;
    };
    if query::is_identifier(expr, file, field) {
        return true;
    }
    matches!(
        query::field_access_parts(expr, file),
        Some((_, name)) if name == field
    )
}

/// Variant (a): `public static final T INSTANCE = new T();` and only
/// private constructors.
fn eager_field<'f>(
    type_decl: Node,
    file: &'f ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> Option<&'f str> {
    let ctors = query::constructors_of(type_decl);
    if ctors.is_empty() || !ctors.iter().all(|c| query::modifiers(*c, file).is_private()) {
        return None;
    }
    own_static_fields(type_decl, file, ctx)
        .into_iter()
        .find(|(decl, declarator)| {
            let mods = query::modifiers(*decl, file);
            mods.is_public() && mods.is_final() && declarator.child_by_field_name("value").is_some()
        })
        .map(|(_, declarator)| query::declaration_name(declarator, file))
}

/// Variant (b): `private static T instance;` plus exactly one public static
/// no-arg factory returning it last.
fn factory_field<'f>(
    type_decl: Node,
    file: &'f ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> Option<&'f str> {
    own_static_fields(type_decl, file, ctx)
        .into_iter()
        .filter(|(decl, _)| query::modifiers(*decl, file).is_private())
        .map(|(_, declarator)| query::declaration_name(declarator, file))
        .find(|field| {
            let factories = query::methods_of(type_decl)
                .into_iter()
                .filter(|m| {
                    let mods = query::modifiers(*m, file);
                    mods.is_public()
                        && mods.is_static()
                        && query::parameters(*m).is_empty()
                        && returns_field_last(*m, file, field)
                })
                .count();
            factories == 1
        })
}

/// Variant (c): enum with one constant, state and behavior.
fn is_enum_singleton(type_decl: Node, file: &ParsedFile) -> bool {
    if type_decl.kind() != "enum_declaration" || query::enum_constants(type_decl).len() != 1 {
        return false;
    }
    let has_state = !instance_fields(type_decl, file).is_empty();
    let has_behavior = query::methods_of(type_decl).into_iter().any(|m| {
        let mods = query::modifiers(m, file);
        mods.is_public() && !mods.is_static()
    });
    has_state && has_behavior
}

fn is_serializable(type_decl: Node, file: &ParsedFile, ctx: Option<&dyn ResolutionContext>) -> bool {
    if let Some(ctx) = ctx {
        let qualified = file.qualify(&query::type_path(type_decl, file));
        if let Resolution::Resolved(answer) = ctx.is_subtype_of(&qualified, "java.io.Serializable")
        {
            return answer;
        }
    }
    query::interfaces(type_decl).into_iter().any(|t| {
        matches!(
            query::simple_type_name(t, file).as_str(),
            "Serializable" | "Externalizable"
        )
    })
}

/// Extra obligations of a serializable singleton.
fn survives_serialization(type_decl: Node, file: &ParsedFile, field: &str) -> bool {
    let all_transient = instance_fields(type_decl, file)
        .into_iter()
        .all(|f| query::modifiers(f, file).has("transient"));
    let resolvers: Vec<_> = query::methods_of(type_decl)
        .into_iter()
        .filter(|m| query::declaration_name(*m, file) == "readResolve")
        .filter(|m| query::parameters(*m).is_empty())
        .collect();
    all_transient && resolvers.len() == 1 && returns_field_last(resolvers[0], file, field)
}

impl Detector for SingletonDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for type_decl in query::type_declarations(file.root()) {
            let accepted = match type_decl.kind() {
                "class_declaration" => {
                    let field = eager_field(type_decl, file, ctx)
                        .or_else(|| factory_field(type_decl, file, ctx));
                    match field {
                        Some(field) if is_serializable(type_decl, file, ctx) => {
                            survives_serialization(type_decl, file, field)
                        }
                        Some(_) => true,
                        None => false,
                    }
                }
                "enum_declaration" => is_enum_singleton(type_decl, file),
                _ => false,
            };
            if accepted {
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
    use crate::detect::perfumes::testing::{run, run_resolved};
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::Singleton;

    #[test]
    fn test_enum_singleton() {
        let found = run(
            KIND,
            r#"
public enum Registry {
    INSTANCE;
    private int count;
    public int next() { return ++count; }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].snippets[0], "public enum Registry");
    }

    #[test]
    fn test_enum_without_public_method() {
        let found = run(
            KIND,
            r#"
enum Registry {
    INSTANCE;
    private int count;
    int next() { return ++count; }
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_eager_field() {
        let found = run(
            KIND,
            r#"
public class Clock {
    public static final Clock INSTANCE = new Clock();
    private Clock() {}
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_name, "Clock");
    }

    #[test]
    fn test_eager_field_with_public_constructor() {
        let found = run(
            KIND,
            r#"
public class Clock {
    public static final Clock INSTANCE = new Clock();
    public Clock() {}
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_lazy_factory() {
        let found = run(
            KIND,
            r#"
public class Config {
    private static Config instance;
    private Config() {}
    public static Config getInstance() {
        if (instance == null) {
            instance = new Config();
        }
        return instance;
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_two_factories_rejected() {
        let found = run(
            KIND,
            r#"
public class Config {
    private static Config instance = new Config();
    public static Config get() { return instance; }
    public static Config current() { return instance; }
}
"#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_serializable_needs_read_resolve() {
        let without = r#"
import java.io.Serializable;
public class Session implements Serializable {
    public static final Session INSTANCE = new Session();
    private transient int hits;
    private Session() {}
}
"#;
        assert!(run(KIND, without).is_empty());

        let with = r#"
import java.io.Serializable;
public class Session implements Serializable {
    public static final Session INSTANCE = new Session();
    private transient int hits;
    private Session() {}
    private Object readResolve() { return INSTANCE; }
}
"#;
        assert_eq!(run(KIND, with).len(), 1);
        assert_eq!(run_resolved(KIND, with).len(), 1);
    }

    #[test]
    fn test_serializable_through_superclass() {
        let src = r#"
import java.io.Serializable;
abstract class Base implements Serializable {}
public class Session extends Base {
    public static final Session INSTANCE = new Session();
    private int hits;
    private Session() {}
}
"#;
        // syntactically the superclass is unknown; with resolution it is serializable
        assert_eq!(run(KIND, src).len(), 1);
        assert!(run_resolved(KIND, src).is_empty());
    }
}
