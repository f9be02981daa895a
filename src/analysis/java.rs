//! Java tree provider using tree-sitter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

use super::query;
use super::{
    Import, MethodSignature, ParseError, ParsedFile, PathFilter, ResolutionContext, TreeProvider,
    TypeFacts, TypeIndex, TypeKind,
};

/// Tree-sitter query for import declarations.
const IMPORT_QUERY: &str = r#"
(import_declaration) @import
"#;

/// Tree-sitter query for package declaration.
const PACKAGE_QUERY: &str = r#"
(package_declaration
  [(scoped_identifier) (identifier)] @package_name
)
"#;

pub struct JavaTreeProvider {
    language: Language,
}

impl JavaTreeProvider {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Parser(e.to_string()))?;
        Ok(parser)
    }

    fn query(&self, source: &str) -> Result<Query, ParseError> {
        Query::new(&self.language, source).map_err(|e| ParseError::Parser(e.to_string()))
    }

    fn extract_package(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Option<String>, ParseError> {
        let query = self.query(PACKAGE_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    let text = capture.node.utf8_text(source.as_bytes()).unwrap_or("");
                    return Ok(Some(query::strip_type_arguments(text)));
                }
            }
        }
        Ok(None)
    }

    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<Import>, ParseError> {
        let query = self.query(IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let mut is_static = false;
                let mut is_wildcard = false;
                let mut path = String::new();
                let mut walker = node.walk();
                for child in node.children(&mut walker) {
                    match child.kind() {
                        "static" => is_static = true,
                        "asterisk" => is_wildcard = true,
                        "identifier" | "scoped_identifier" => {
                            path = query::strip_type_arguments(
                                child.utf8_text(source.as_bytes()).unwrap_or(""),
                            );
                        }
                        _ => {}
                    }
                }
                if !path.is_empty() {
                    imports.push(Import {
                        path,
                        is_static,
                        is_wildcard,
                    });
                }
            }
        }
        Ok(imports)
    }

    /// Extract the facts the type index needs from one parsed file.
    ///
    /// Supertype names are left as written; the index qualifies them once
    /// every project type is known.
    pub fn extract_type_facts(&self, parsed: &ParsedFile) -> Vec<TypeFacts> {
        query::type_declarations(parsed.root())
            .into_iter()
            .map(|decl| {
                let kind = TypeKind::from_node_kind(decl.kind()).unwrap_or(TypeKind::Class);
                let path = query::type_path(decl, parsed);
                let supertypes = query::supertypes(decl)
                    .into_iter()
                    .map(|t| query::written_type_name(t, parsed))
                    .collect();
                let methods = query::methods_of(decl)
                    .into_iter()
                    .map(|m| {
                        let mods = query::modifiers(m, parsed);
                        MethodSignature {
                            name: query::declaration_name(m, parsed).to_string(),
                            parameter_types: query::parameters(m)
                                .into_iter()
                                .filter_map(query::parameter_type)
                                .map(|t| query::simple_type_name(t, parsed))
                                .collect(),
                            is_static: mods.is_static(),
                            is_abstract: !query::has_body(m),
                        }
                    })
                    .collect();
                TypeFacts {
                    qualified_name: parsed.qualify(&path),
                    simple_name: query::declaration_name(decl, parsed).to_string(),
                    kind,
                    supertypes,
                    methods,
                    file: parsed.path.to_string_lossy().to_string(),
                }
            })
            .collect()
    }
}

impl Default for JavaTreeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// First ERROR or MISSING node in preorder.
fn first_error(root: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if !root.has_error() {
        return None;
    }
    query::collect_where(root, |n| n.is_error() || n.is_missing())
        .into_iter()
        .next()
        .or(Some(root))
}

impl TreeProvider for JavaTreeProvider {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedFile, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Parser(format!("no tree for {}", path.display())))?;

        if let Some(node) = first_error(tree.root_node()) {
            let pos = node.start_position();
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }

        let package = self.extract_package(&tree, source)?;
        let imports = self.extract_imports(&tree, source)?;

        Ok(ParsedFile {
            tree,
            source: source.to_string(),
            path: path.to_path_buf(),
            package,
            imports,
        })
    }

    fn resolution_context_for(
        &self,
        root: &Path,
        dependencies: &[PathBuf],
    ) -> Option<Arc<dyn ResolutionContext>> {
        let filter = PathFilter::new(self.file_extensions());
        let mut files = Vec::new();
        for source_root in std::iter::once(root).chain(dependencies.iter().map(PathBuf::as_path)) {
            match filter.collect(source_root) {
                Ok(found) => files.extend(found),
                Err(e) => tracing::warn!("cannot index {}: {}", source_root.display(), e),
            }
        }
        let index = TypeIndex::build(self, &files);
        tracing::debug!(types = index.len(), files = files.len(), "built type index");
        Some(Arc::new(index))
    }
}
