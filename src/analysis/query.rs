//! Tree-query toolkit.
//!
//! Stateless helpers that collect nodes of a given syntactic kind from a
//! (sub)tree and answer small structural questions about Java declarations.
//! Every collector returns an owned `Vec` in preorder so detectors never
//! share mutable accumulators.

use tree_sitter::Node;

use super::{CodeRange, ParsedFile};

/// Node kinds that declare a type.
pub const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

/// Node kinds that are loops.
pub const LOOP_KINDS: &[&str] = &[
    "for_statement",
    "enhanced_for_statement",
    "while_statement",
    "do_statement",
];

/// Kinds that open a new member or closure scope. Scoped collectors do not
/// descend below these (except at the root).
const SCOPE_BOUNDARY_KINDS: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "annotation_type_body",
    "lambda_expression",
];

fn collect_impl<'t>(
    root: Node<'t>,
    stop_at_scopes: bool,
    pred: &dyn Fn(Node<'t>) -> bool,
) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if pred(node) {
            out.push(node);
        }
        if stop_at_scopes && node.id() != root.id() && SCOPE_BOUNDARY_KINDS.contains(&node.kind())
        {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

/// All nodes under `root` (inclusive) whose kind is one of `kinds`.
pub fn collect_kinds<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    collect_impl(root, false, &|n| kinds.contains(&n.kind()))
}

/// Like [`collect_kinds`] but does not enter nested type bodies or lambdas.
pub fn collect_kinds_in_scope<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    collect_impl(root, true, &|n| kinds.contains(&n.kind()))
}

/// All nodes under `root` satisfying `pred`.
pub fn collect_where<'t>(root: Node<'t>, pred: impl Fn(Node<'t>) -> bool) -> Vec<Node<'t>> {
    collect_impl(root, false, &pred)
}

pub fn type_declarations<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, TYPE_DECLARATION_KINDS)
}

pub fn class_declarations<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, &["class_declaration"])
}

pub fn method_declarations<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, &["method_declaration"])
}

pub fn method_invocations<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, &["method_invocation"])
}

/// Switch statements and switch expressions.
pub fn switches<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, &["switch_expression", "switch_statement"])
}

/// Plain try statements and try-with-resources statements.
pub fn try_statements<'t>(root: Node<'t>) -> Vec<Node<'t>> {
    collect_kinds(root, &["try_statement", "try_with_resources_statement"])
}

// =============================================================================
// Declarations
// =============================================================================

/// Named, non-comment children of a node.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect()
}

/// Children for a repeated field (e.g. `declarator`).
pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// `name` field text of a declaration.
pub fn declaration_name<'a>(node: Node, file: &'a ParsedFile) -> &'a str {
    node.child_by_field_name("name")
        .map(|n| file.node_text(n))
        .unwrap_or("")
}

/// Direct members of a type declaration body.
///
/// For enums this is the member list after the constants.
pub fn body_members<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    let Some(body) = type_decl.child_by_field_name("body") else {
        return Vec::new();
    };
    if body.kind() == "enum_body" {
        return named_children(body)
            .into_iter()
            .filter(|n| n.kind() == "enum_body_declarations")
            .flat_map(named_children)
            .collect();
    }
    named_children(body)
}

pub fn methods_of<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    body_members(type_decl)
        .into_iter()
        .filter(|n| n.kind() == "method_declaration")
        .collect()
}

pub fn constructors_of<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    body_members(type_decl)
        .into_iter()
        .filter(|n| {
            matches!(
                n.kind(),
                "constructor_declaration" | "compact_constructor_declaration"
            )
        })
        .collect()
}

/// Field declarations, including interface constants.
pub fn fields_of<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    body_members(type_decl)
        .into_iter()
        .filter(|n| matches!(n.kind(), "field_declaration" | "constant_declaration"))
        .collect()
}

/// Nested type declarations directly inside a type body.
pub fn nested_types_of<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    body_members(type_decl)
        .into_iter()
        .filter(|n| TYPE_DECLARATION_KINDS.contains(&n.kind()))
        .collect()
}

pub fn enum_constants<'t>(enum_decl: Node<'t>) -> Vec<Node<'t>> {
    let Some(body) = enum_decl.child_by_field_name("body") else {
        return Vec::new();
    };
    named_children(body)
        .into_iter()
        .filter(|n| n.kind() == "enum_constant")
        .collect()
}

/// Variable declarators of a field or local variable declaration.
pub fn declarators<'t>(decl: Node<'t>) -> Vec<Node<'t>> {
    field_children(decl, "declarator")
}

/// Formal parameters of a method or constructor (receiver excluded).
pub fn parameters<'t>(callable: Node<'t>) -> Vec<Node<'t>> {
    let Some(params) = callable.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(params)
        .into_iter()
        .filter(|n| matches!(n.kind(), "formal_parameter" | "spread_parameter"))
        .collect()
}

/// Name of a formal or spread parameter.
pub fn parameter_name<'a>(param: Node, file: &'a ParsedFile) -> &'a str {
    if let Some(name) = param.child_by_field_name("name") {
        return file.node_text(name);
    }
    // spread parameters carry a variable_declarator
    named_children(param)
        .into_iter()
        .find(|n| n.kind() == "variable_declarator")
        .map(|d| declaration_name(d, file))
        .unwrap_or("")
}

/// Type node of a parameter.
pub fn parameter_type<'t>(param: Node<'t>) -> Option<Node<'t>> {
    if let Some(ty) = param.child_by_field_name("type") {
        return Some(ty);
    }
    named_children(param)
        .into_iter()
        .find(|n| n.kind() != "modifiers" && n.kind() != "variable_declarator")
}

/// Statements of a block-like node (`block`, `constructor_body`).
pub fn statements<'t>(block: Node<'t>) -> Vec<Node<'t>> {
    named_children(block)
}

/// Top-level statements of a method or constructor body.
pub fn body_statements<'t>(callable: Node<'t>) -> Vec<Node<'t>> {
    callable
        .child_by_field_name("body")
        .map(statements)
        .unwrap_or_default()
}

/// Whether a method declaration has a body (i.e. is not abstract/native).
pub fn has_body(callable: Node) -> bool {
    callable.child_by_field_name("body").is_some()
}

/// If `stmt` is a block holding exactly one statement, that statement;
/// otherwise `stmt` itself when it is not a block.
pub fn single_statement(stmt: Node) -> Option<Node> {
    if stmt.kind() == "block" {
        let inner = statements(stmt);
        if inner.len() == 1 {
            return Some(inner[0]);
        }
        return None;
    }
    Some(stmt)
}

// =============================================================================
// Modifiers and annotations
// =============================================================================

/// Modifier keywords and annotation names of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub keywords: Vec<String>,
    /// Annotation simple names (`Override`, `Test`, ...).
    pub annotations: Vec<String>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn is_public(&self) -> bool {
        self.has("public")
    }

    pub fn is_private(&self) -> bool {
        self.has("private")
    }

    pub fn is_static(&self) -> bool {
        self.has("static")
    }

    pub fn is_final(&self) -> bool {
        self.has("final")
    }

    pub fn is_abstract(&self) -> bool {
        self.has("abstract")
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }

    pub fn has_any_annotation(&self, names: &[String]) -> bool {
        self.annotations.iter().any(|a| names.contains(a))
    }
}

/// The `modifiers` child of a declaration, if present.
pub fn modifiers_node<'t>(decl: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = decl.walk();
    let found = decl.children(&mut cursor).find(|n| n.kind() == "modifiers");
    found
}

/// Annotation nodes attached to a declaration.
pub fn annotations<'t>(decl: Node<'t>) -> Vec<Node<'t>> {
    modifiers_node(decl)
        .map(|m| {
            named_children(m)
                .into_iter()
                .filter(|n| matches!(n.kind(), "marker_annotation" | "annotation"))
                .collect()
        })
        .unwrap_or_default()
}

/// Simple name of an annotation node (`org.junit.Test` → `Test`).
pub fn annotation_name<'a>(annotation: Node, file: &'a ParsedFile) -> &'a str {
    let name = declaration_name(annotation, file);
    name.rsplit('.').next().unwrap_or(name)
}

pub fn modifiers(decl: Node, file: &ParsedFile) -> Modifiers {
    let mut result = Modifiers::default();
    let Some(node) = modifiers_node(decl) else {
        return result;
    };
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                result
                    .annotations
                    .push(annotation_name(child, file).to_string());
            }
            "line_comment" | "block_comment" => {}
            _ => result.keywords.push(file.node_text(child).to_string()),
        }
    }
    result
}

// =============================================================================
// Types
// =============================================================================

/// Whether a type node denotes a primitive type.
pub fn is_primitive_type(type_node: Node) -> bool {
    matches!(
        type_node.kind(),
        "integral_type" | "floating_point_type" | "boolean_type"
    )
}

/// Simple name of a type node: package, outer types and generics stripped.
///
/// `java.util.List<String>` → `List`, `int[]` → `int[]`.
pub fn simple_type_name(type_node: Node, file: &ParsedFile) -> String {
    match type_node.kind() {
        "generic_type" | "annotated_type" => named_children(type_node)
            .into_iter()
            .find(|n| {
                matches!(
                    n.kind(),
                    "type_identifier" | "scoped_type_identifier" | "generic_type"
                )
            })
            .map(|n| simple_type_name(n, file))
            .unwrap_or_default(),
        "scoped_type_identifier" => named_children(type_node)
            .into_iter()
            .filter(|n| n.kind() == "type_identifier")
            .last()
            .map(|n| file.node_text(n).to_string())
            .unwrap_or_default(),
        "array_type" => type_node
            .child_by_field_name("element")
            .map(|e| format!("{}[]", simple_type_name(e, file)))
            .unwrap_or_default(),
        _ => file.node_text(type_node).to_string(),
    }
}

/// Type name as written, without type arguments or whitespace.
///
/// `java.util.Map<K, V>` → `java.util.Map`.
pub fn written_type_name(type_node: Node, file: &ParsedFile) -> String {
    strip_type_arguments(file.node_text(type_node))
}

/// Remove `<...>` sections and whitespace from a type text.
pub fn strip_type_arguments(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => out.push(c),
            _ => {}
        }
    }
    out
}

/// Type node of the `extends` clause of a class.
pub fn superclass<'t>(type_decl: Node<'t>) -> Option<Node<'t>> {
    type_decl
        .child_by_field_name("superclass")
        .and_then(|s| named_children(s).into_iter().next())
}

/// Type nodes of `implements` (classes, enums, records) or `extends`
/// (interfaces) clauses.
pub fn interfaces<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    named_children(type_decl)
        .into_iter()
        .filter(|n| matches!(n.kind(), "super_interfaces" | "extends_interfaces"))
        .flat_map(named_children)
        .filter(|n| n.kind() == "type_list")
        .flat_map(named_children)
        .collect()
}

/// All direct supertype nodes of a type declaration.
pub fn supertypes<'t>(type_decl: Node<'t>) -> Vec<Node<'t>> {
    let mut all: Vec<_> = superclass(type_decl).into_iter().collect();
    all.extend(interfaces(type_decl));
    all
}

/// Last dotted segment of a (possibly qualified) name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

// =============================================================================
// Expressions
// =============================================================================

/// Unwrap any number of enclosing parentheses.
pub fn strip_parens(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        match named_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Condition of an `if`/`while`, parentheses removed.
pub fn condition(stmt: Node) -> Option<Node> {
    stmt.child_by_field_name("condition").map(strip_parens)
}

/// Operator token of a binary, unary or assignment expression.
pub fn operator<'a>(expr: Node, file: &'a ParsedFile) -> &'a str {
    expr.child_by_field_name("operator")
        .map(|op| file.node_text(op))
        .unwrap_or("")
}

/// Arguments of a call or object creation.
pub fn arguments<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default()
}

/// Name of an invoked method.
pub fn invocation_name<'a>(call: Node, file: &'a ParsedFile) -> &'a str {
    declaration_name(call, file)
}

/// Receiver of a method invocation, if written.
pub fn invocation_object<'t>(call: Node<'t>) -> Option<Node<'t>> {
    call.child_by_field_name("object")
}

/// Whether `node` is an identifier with the given text.
pub fn is_identifier(node: Node, file: &ParsedFile, name: &str) -> bool {
    node.kind() == "identifier" && file.node_text(node) == name
}

/// `obj.field` → (`obj`, `field`).
pub fn field_access_parts<'t, 'a>(
    node: Node<'t>,
    file: &'a ParsedFile,
) -> Option<(Node<'t>, &'a str)> {
    if node.kind() != "field_access" {
        return None;
    }
    let object = node.child_by_field_name("object")?;
    let field = node.child_by_field_name("field")?;
    Some((object, file.node_text(field)))
}

/// Whether `node` refers to a field `name` of the current instance: either
/// `this.name` or a bare `name` not shadowed by `shadowed`.
pub fn is_own_field_ref(node: Node, file: &ParsedFile, name: &str, shadowed: &[&str]) -> bool {
    if let Some((object, field)) = field_access_parts(node, file) {
        return object.kind() == "this" && field == name;
    }
    is_identifier(node, file, name) && !shadowed.contains(&name)
}

/// Whether a statement is `return <literal>;` for `true`/`false`/`null`.
pub fn returns_literal(stmt: Node, literal: &str) -> bool {
    if stmt.kind() != "return_statement" {
        return false;
    }
    let kind = match literal {
        "null" => "null_literal",
        other => other,
    };
    named_children(stmt)
        .first()
        .map(|e| strip_parens(*e).kind() == kind)
        .unwrap_or(false)
}

/// Expression returned by a `return` statement.
pub fn returned_expression(stmt: Node) -> Option<Node> {
    if stmt.kind() != "return_statement" {
        return None;
    }
    named_children(stmt).first().map(|e| strip_parens(*e))
}

/// Whether a branch (statement or single-statement block) is `return <literal>;`.
pub fn branch_returns_literal(branch: Node, literal: &str) -> bool {
    single_statement(branch)
        .map(|s| returns_literal(s, literal))
        .unwrap_or(false)
}

// =============================================================================
// Scopes
// =============================================================================

/// Nearest enclosing type declaration of `node` (exclusive).
pub fn enclosing_type(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        if TYPE_DECLARATION_KINDS.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Nearest enclosing method or constructor of `node`.
pub fn enclosing_callable(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                return Some(n)
            }
            k if TYPE_DECLARATION_KINDS.contains(&k) => return None,
            _ => current = n.parent(),
        }
    }
    None
}

/// Nearest enclosing loop of `node` within the same callable scope.
pub fn enclosing_loop(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        if LOOP_KINDS.contains(&n.kind()) {
            return Some(n);
        }
        if SCOPE_BOUNDARY_KINDS.contains(&n.kind())
            || matches!(n.kind(), "method_declaration" | "constructor_declaration")
        {
            return None;
        }
        current = n.parent();
    }
    None
}

/// Whether `node` lies inside `ancestor` (inclusive).
pub fn is_within(node: Node, ancestor: Node) -> bool {
    node.start_byte() >= ancestor.start_byte() && node.end_byte() <= ancestor.end_byte()
}

/// Dotted path of a type declaration through its enclosing types.
pub fn type_path(type_decl: Node, file: &ParsedFile) -> String {
    let mut names = vec![declaration_name(type_decl, file).to_string()];
    let mut current = type_decl;
    while let Some(outer) = enclosing_type(current) {
        names.push(declaration_name(outer, file).to_string());
        current = outer;
    }
    names.reverse();
    names.join(".")
}

/// Name of the type enclosing `node`, or the file stem for top-level code.
pub fn enclosing_type_name(node: Node, file: &ParsedFile) -> String {
    if TYPE_DECLARATION_KINDS.contains(&node.kind()) {
        return type_path(node, file);
    }
    match enclosing_type(node) {
        Some(t) => type_path(t, file),
        None => file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
    }
}

/// Range of a type declaration header: modifiers through the token before
/// the body.
pub fn header_range(type_decl: Node) -> CodeRange {
    let full = CodeRange::from_node(type_decl);
    let body = type_decl.child_by_field_name("body");
    let mut cursor = type_decl.walk();
    let last_header = type_decl
        .children(&mut cursor)
        .take_while(|n| Some(*n) != body)
        .last();
    match last_header {
        Some(last) => {
            let end = CodeRange::from_node(last);
            CodeRange::new(full.begin_line, full.begin_col, end.end_line, end.end_col)
        }
        None => full,
    }
}

/// Header text of a type declaration (everything before the body).
pub fn header_snippet(type_decl: Node, file: &ParsedFile) -> String {
    let end = type_decl
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| type_decl.end_byte());
    file.source
        .get(type_decl.start_byte()..end)
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Declared type of a variable visible at `at`: parameters and earlier
/// locals of the enclosing callable, then fields of the enclosing types.
pub fn declared_type_of<'t>(name: &str, at: Node<'t>, file: &ParsedFile) -> Option<Node<'t>> {
    if let Some(callable) = enclosing_callable(at) {
        for param in parameters(callable) {
            if parameter_name(param, file) == name {
                return parameter_type(param);
            }
        }
        let locals = collect_kinds_in_scope(callable, &["local_variable_declaration"]);
        for decl in locals.into_iter().rev() {
            if decl.start_byte() > at.start_byte() {
                continue;
            }
            if declarators(decl)
                .iter()
                .any(|d| declaration_name(*d, file) == name)
            {
                return decl.child_by_field_name("type");
            }
        }
    }
    let mut current = enclosing_type(at);
    while let Some(type_decl) = current {
        for field in fields_of(type_decl) {
            if declarators(field)
                .iter()
                .any(|d| declaration_name(*d, file) == name)
            {
                return field.child_by_field_name("type");
            }
        }
        current = enclosing_type(type_decl);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{JavaTreeProvider, TreeProvider};
    use std::path::Path;

    fn parse(source: &str) -> ParsedFile {
        JavaTreeProvider::new()
            .parse_source(Path::new("Test.java"), source)
            .unwrap()
    }

    #[test]
    fn test_collect_type_declarations() {
        let file = parse(
            r#"
class Outer {
    static class Inner {}
    interface Callback {}
}
enum Color { RED }
"#,
        );
        let types = type_declarations(file.root());
        let names: Vec<_> = types.iter().map(|t| type_path(*t, &file)).collect();
        assert_eq!(
            names,
            vec!["Outer", "Outer.Inner", "Outer.Callback", "Color"]
        );
    }

    #[test]
    fn test_modifiers_and_annotations() {
        let file = parse(
            r#"
class A {
    @Override
    @Deprecated
    public static final int x() { return 1; }
}
"#,
        );
        let method = method_declarations(file.root())[0];
        let mods = modifiers(method, &file);
        assert!(mods.is_public());
        assert!(mods.is_static());
        assert!(mods.is_final());
        assert!(!mods.is_private());
        assert!(mods.has_annotation("Override"));
        assert!(mods.has_annotation("Deprecated"));
    }

    #[test]
    fn test_simple_type_name() {
        let file = parse(
            r#"
class A {
    java.util.Map<String, Integer> a;
    List<String> b;
    int[] c;
}
"#,
        );
        let fields = fields_of(type_declarations(file.root())[0]);
        let names: Vec<_> = fields
            .iter()
            .map(|f| simple_type_name(f.child_by_field_name("type").unwrap(), &file))
            .collect();
        assert_eq!(names, vec!["Map", "List", "int[]"]);
        let written = written_type_name(fields[0].child_by_field_name("type").unwrap(), &file);
        assert_eq!(written, "java.util.Map");
    }

    #[test]
    fn test_scoped_collection_skips_lambdas() {
        let file = parse(
            r#"
class A {
    void run() {
        foo();
        Runnable r = () -> bar();
    }
}
"#,
        );
        let method = method_declarations(file.root())[0];
        assert_eq!(collect_kinds_in_scope(method, &["method_invocation"]).len(), 1);
        assert_eq!(method_invocations(method).len(), 2);
    }

    #[test]
    fn test_declared_type_of_local_and_field() {
        let file = parse(
            r#"
class A {
    private StringBuilder field;
    void run(String param) {
        int local = 1;
        use(local, param, field);
    }
}
"#,
        );
        let call = method_invocations(file.root())[0];
        let ty = |name| declared_type_of(name, call, &file).map(|t| simple_type_name(t, &file));
        assert_eq!(ty("local"), Some("int".to_string()));
        assert_eq!(ty("param"), Some("String".to_string()));
        assert_eq!(ty("field"), Some("StringBuilder".to_string()));
        assert_eq!(ty("missing"), None);
    }

    #[test]
    fn test_header_snippet() {
        let file = parse("public final class Point implements Comparable<Point> { int x; }");
        let class = class_declarations(file.root())[0];
        assert_eq!(
            header_snippet(class, &file),
            "public final class Point implements Comparable<Point>"
        );
        assert_eq!(header_range(class).begin_line, 1);
    }

    #[test]
    fn test_strip_type_arguments() {
        assert_eq!(strip_type_arguments("Map<String, List<Integer>>"), "Map");
        assert_eq!(strip_type_arguments("java.util.List<T>"), "java.util.List");
    }
}
