//! `equals` written as reference check, type check, cast.
//!
//! The body is matched as a three-step state machine over its statement
//! list. Any deviation rejects the whole method.

use std::sync::Arc;

use tree_sitter::Node;

use super::names_declaring_type;
use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct EqualsBlueprintDetector {
    detectable: Arc<Detectable>,
}

impl EqualsBlueprintDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// Outcome of the type-check step.
enum TypeCheck {
    Rejected,
    /// Accepted; `true` when the check bound a pattern variable.
    Accepted { pattern_bound: bool },
}

struct Matcher<'a, 'f> {
    file: &'f ParsedFile,
    ctx: Option<&'a dyn ResolutionContext>,
    type_decl: Node<'f>,
    param: &'f str,
}

impl<'a, 'f> Matcher<'a, 'f> {
    /// S0: `if (this == p) return true;` in either operand order.
    fn is_reference_check(&self, stmt: Node) -> bool {
        if stmt.kind() != "if_statement" {
            return false;
        }
        let Some(cond) = query::condition(stmt) else {
            return false;
        };
        if cond.kind() != "binary_expression" || query::operator(cond, self.file) != "==" {
            return false;
        }
        let (Some(left), Some(right)) = (
            cond.child_by_field_name("left").map(query::strip_parens),
            cond.child_by_field_name("right").map(query::strip_parens),
        ) else {
            return false;
        };
        let is_param = |n: Node| query::is_identifier(n, self.file, self.param);
        let operands_match = (left.kind() == "this" && is_param(right))
            || (is_param(left) && right.kind() == "this");
        operands_match
            && stmt
                .child_by_field_name("consequence")
                .map(|b| query::branch_returns_literal(b, "true"))
                .unwrap_or(false)
    }

    /// S1: `if (!(p instanceof T)) return false;` with no `else`.
    fn type_check(&self, stmt: Node) -> TypeCheck {
        if stmt.kind() != "if_statement" || stmt.child_by_field_name("alternative").is_some() {
            return TypeCheck::Rejected;
        }
        let Some(cond) = query::condition(stmt) else {
            return TypeCheck::Rejected;
        };
        if cond.kind() != "unary_expression" || query::operator(cond, self.file) != "!" {
            return TypeCheck::Rejected;
        }
        let Some(operand) = cond
            .child_by_field_name("operand")
            .map(query::strip_parens)
        else {
            return TypeCheck::Rejected;
        };
        if operand.kind() != "instanceof_expression" {
            return TypeCheck::Rejected;
        }
        let left_is_param = operand
            .child_by_field_name("left")
            .map(|l| query::is_identifier(query::strip_parens(l), self.file, self.param))
            .unwrap_or(false);
        let right_is_own_type = operand
            .child_by_field_name("right")
            .map(|t| names_declaring_type(t, self.type_decl, self.file, self.ctx))
            .unwrap_or(false);
        let returns_false = stmt
            .child_by_field_name("consequence")
            .map(|b| query::branch_returns_literal(b, "false"))
            .unwrap_or(false);

        if left_is_param && right_is_own_type && returns_false {
            TypeCheck::Accepted {
                pattern_bound: operand.child_by_field_name("name").is_some(),
            }
        } else {
            TypeCheck::Rejected
        }
    }

    /// S2: `T o = (T) p;`
    fn is_cast_declaration(&self, stmt: Node) -> bool {
        if stmt.kind() != "local_variable_declaration" {
            return false;
        }
        let declared_own = stmt
            .child_by_field_name("type")
            .map(|t| names_declaring_type(t, self.type_decl, self.file, self.ctx))
            .unwrap_or(false);
        let declarators = query::declarators(stmt);
        if !declared_own || declarators.len() != 1 {
            return false;
        }
        let Some(value) = declarators[0]
            .child_by_field_name("value")
            .map(query::strip_parens)
        else {
            return false;
        };
        if value.kind() != "cast_expression" {
            return false;
        }
        let cast_own = value
            .child_by_field_name("type")
            .map(|t| names_declaring_type(t, self.type_decl, self.file, self.ctx))
            .unwrap_or(false);
        let casts_param = value
            .child_by_field_name("value")
            .map(|v| query::is_identifier(query::strip_parens(v), self.file, self.param))
            .unwrap_or(false);
        cast_own && casts_param
    }

    fn matches(&self, body: &[Node]) -> bool {
        let Some(first) = body.first() else {
            return false;
        };
        if !self.is_reference_check(*first) {
            return false;
        }

        // The type check is either the `else if` of the reference check or
        // the very next statement.
        let (check, rest) = match first.child_by_field_name("alternative") {
            Some(alt) => (Some(alt), &body[1..]),
            None => (body.get(1).copied(), body.get(2..).unwrap_or(&[])),
        };
        let Some(check) = check else {
            return false;
        };
        match self.type_check(check) {
            TypeCheck::Rejected => false,
            TypeCheck::Accepted { pattern_bound: true } => true,
            TypeCheck::Accepted {
                pattern_bound: false,
            } => rest
                .first()
                .map(|s| self.is_cast_declaration(*s))
                .unwrap_or(false),
        }
    }
}

impl Detector for EqualsBlueprintDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for method in query::method_declarations(file.root()) {
            if query::declaration_name(method, file) != "equals" {
                continue;
            }
            let params = query::parameters(method);
            if params.len() != 1 {
                continue;
            }
            let Some(type_decl) = query::enclosing_type(method) else {
                continue;
            };
            let matcher = Matcher {
                file,
                ctx,
                type_decl,
                param: query::parameter_name(params[0], file),
            };
            if matcher.matches(&query::body_statements(method)) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::type_path(type_decl, file),
                    &[method],
                ));
            }
        }
        Ok(found)
    }
}
