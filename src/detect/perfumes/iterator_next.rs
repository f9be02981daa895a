//! `Iterator.next` guarded by a has-more check that throws
//! `NoSuchElementException`.
//!
//! Four arrangements are equivalent:
//! - `if (!hasNext()) throw ...;`
//! - `if (hasNext()) { ... } else throw ...;` or a trailing `throw`
//! - the same two with a has-more variable instead of the call

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};
use crate::config::Heuristics;
use crate::detect::{required_field, DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

const ITERATOR: &str = "java.util.Iterator";
const NO_SUCH_ELEMENT: &str = "java.util.NoSuchElementException";

pub struct IteratorNextDetector {
    detectable: Arc<Detectable>,
    has_next_variables: Vec<String>,
}

impl IteratorNextDetector {
    pub fn new(detectable: Arc<Detectable>, heuristics: &Heuristics) -> Self {
        Self {
            detectable,
            has_next_variables: heuristics.has_next_variables.clone(),
        }
    }

    /// `hasNext()` call or has-more variable, without negation.
    fn is_has_more(
        &self,
        expr: Node,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> bool {
        let expr = query::strip_parens(expr);
        match expr.kind() {
            "method_invocation" => {
                let receiver_ok = query::invocation_object(expr)
                    .map(|o| o.kind() == "this")
                    .unwrap_or(true);
                if !receiver_ok
                    || query::invocation_name(expr, file) != "hasNext"
                    || !query::arguments(expr).is_empty()
                {
                    return false;
                }
                let Some(ctx) = ctx else {
                    return true;
                };
                // unresolved: the name and arity already match
                ctx.resolve_call(expr, file)
                    .and_then(|binding| ctx.is_subtype_of(&binding.declaring_type, ITERATOR))
                    .resolved()
                    .unwrap_or(true)
            }
            "identifier" => self.is_has_next_variable(file.node_text(expr)),
            "field_access" => match query::field_access_parts(expr, file) {
                Some((object, field)) => {
                    object.kind() == "this" && self.is_has_next_variable(field)
                }
                None => false,
            },
            _ => false,
        }
    }

    fn is_has_next_variable(&self, name: &str) -> bool {
        self.has_next_variables.iter().any(|v| v == name)
    }

    /// Split a condition into (has-more check found, negated).
    fn classify_condition(
        &self,
        cond: Node,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Option<bool> {
        if cond.kind() == "unary_expression" && query::operator(cond, file) == "!" {
            let operand = cond.child_by_field_name("operand")?;
            return self.is_has_more(operand, file, ctx).then_some(true);
        }
        self.is_has_more(cond, file, ctx).then_some(false)
    }
}

fn throws_no_such_element(
    branch: Node,
    file: &ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> bool {
    let Some(stmt) = query::single_statement(branch) else {
        return false;
    };
    if stmt.kind() != "throw_statement" {
        return false;
    }
    let Some(created) = query::named_children(stmt).first().map(|e| query::strip_parens(*e))
    else {
        return false;
    };
    if created.kind() != "object_creation_expression" {
        return false;
    }
    let Some(ty) = created.child_by_field_name("type") else {
        return false;
    };
    if query::simple_type_name(ty, file) == "NoSuchElementException" {
        return true;
    }
    ctx.map(|ctx| {
        ctx.resolve_type_node(ty, file)
            .and_then(|q| ctx.is_subtype_of(&q, NO_SUCH_ELEMENT))
            == Resolution::Resolved(true)
    })
    .unwrap_or(false)
}

fn implements_iterator(
    type_decl: Node,
    file: &ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> bool {
    if let Some(ctx) = ctx {
        let qualified = file.qualify(&query::type_path(type_decl, file));
        if let Resolution::Resolved(answer) = ctx.is_subtype_of(&qualified, ITERATOR) {
            return answer;
        }
    }
    query::interfaces(type_decl).into_iter().any(|t| {
        matches!(
            query::simple_type_name(t, file).as_str(),
            "Iterator" | "ListIterator"
        )
    })
}

impl Detector for IteratorNextDetector {
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
            if type_decl.kind() == "interface_declaration"
                || !implements_iterator(type_decl, file, ctx)
            {
                continue;
            }
            let next_methods = query::methods_of(type_decl).into_iter().filter(|m| {
                query::declaration_name(*m, file) == "next"
                    && query::parameters(*m).is_empty()
                    && query::has_body(*m)
            });
            for method in next_methods {
                let body = query::body_statements(method);
                let last = body.last().copied();
                let mut guarded = false;
                for stmt in query::collect_kinds_in_scope(method, &["if_statement"]) {
                    let cond = query::strip_parens(required_field(stmt, "condition")?);
                    let consequence = required_field(stmt, "consequence")?;
                    let Some(negated) = self.classify_condition(cond, file, ctx) else {
                        continue;
                    };
                    guarded = if negated {
                        throws_no_such_element(consequence, file, ctx)
                    } else {
                        match stmt.child_by_field_name("alternative") {
                            Some(alt) => throws_no_such_element(alt, file, ctx),
                            // fall through to a trailing throw
                            None => {
                                body.iter().any(|s| s.id() == stmt.id())
                                    && last
                                        .map(|l| {
                                            l.id() != stmt.id()
                                                && throws_no_such_element(l, file, ctx)
                                        })
                                        .unwrap_or(false)
                            }
                        }
                    };
                    if guarded {
                        break;
                    }
                }
                if guarded {
                    found.push(DetectedInstance::from_nodes(
                        &self.detectable,
                        file,
                        query::type_path(type_decl, file),
                        &[method],
                    ));
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::perfumes::testing::{run, run_resolved};
    use crate::detect::DetectorKind;

    const KIND: DetectorKind = DetectorKind::IteratorNext;

    fn iterator(next_body: &str) -> String {
        format!(
            r#"
import java.util.Iterator;
import java.util.NoSuchElementException;
public class Countdown implements Iterator<Integer> {{
    private int left = 3;
    private boolean hasMore = true;
    public boolean hasNext() {{ return left > 0; }}
    public Integer next() {{
{}
    }}
}}
"#,
            next_body
        )
    }

    #[test]
    fn test_negated_call_inline_throw() {
        let src = iterator(
            "if (!hasNext()) throw new NoSuchElementException();\nreturn left--;",
        );
        assert_eq!(run(KIND, &src).len(), 1);
        assert_eq!(run_resolved(KIND, &src).len(), 1);
    }

    #[test]
    fn test_positive_call_with_else() {
        let src = iterator(
            "if (hasNext()) { return left--; } else { throw new NoSuchElementException(); }",
        );
        assert_eq!(run(KIND, &src).len(), 1);
    }

    #[test]
    fn test_positive_call_with_trailing_throw() {
        let src = iterator("if (this.hasNext()) { return left--; }\nthrow new NoSuchElementException();");
        assert_eq!(run_resolved(KIND, &src).len(), 1);
    }

    #[test]
    fn test_has_next_inherited_from_non_iterator() {
        let src = r#"
import java.util.Iterator;
import java.util.NoSuchElementException;
class Cursor {
    protected int left = 3;
    public boolean hasNext() { return left > 0; }
}
public class Countdown extends Cursor implements Iterator<Integer> {
    public Integer next() {
        if (!hasNext()) throw new NoSuchElementException();
        return left--;
    }
}
"#;
        assert_eq!(run(KIND, src).len(), 1);
        assert!(run_resolved(KIND, src).is_empty());
    }

    #[test]
    fn test_variable_forms() {
        let negated = iterator(
            "if (!hasMore) throw new java.util.NoSuchElementException();\nreturn left--;",
        );
        assert_eq!(run(KIND, &negated).len(), 1);
        let positive = iterator(
            "if (hasMore) return left--; else throw new NoSuchElementException();",
        );
        assert_eq!(run(KIND, &positive).len(), 1);
    }

    #[test]
    fn test_wrong_exception() {
        let src = iterator(
            "if (!hasNext()) throw new IllegalStateException();\nreturn left--;",
        );
        assert!(run(KIND, &src).is_empty());
        assert!(run_resolved(KIND, &src).is_empty());
    }

    #[test]
    fn test_unguarded_next() {
        let src = iterator("return left--;");
        assert!(run(KIND, &src).is_empty());
    }

    #[test]
    fn test_not_an_iterator() {
        let src = r#"
class Cursor {
    boolean hasNext() { return false; }
    Object next() {
        if (!hasNext()) throw new java.util.NoSuchElementException();
        return null;
    }
}
"#;
        assert!(run(KIND, src).is_empty());
        assert!(run_resolved(KIND, src).is_empty());
    }
}
