//! Fact structures extracted from Java syntax trees.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Source location with 1-indexed line/column positions.
///
/// Columns are 0 when only line information is available
/// (see [`CodeRange::lines`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeRange {
    pub begin_line: usize,
    pub begin_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl CodeRange {
    pub fn new(begin_line: usize, begin_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            begin_line,
            begin_col,
            end_line,
            end_col,
        }
    }

    /// Line-only range, used when column information is unavailable.
    pub fn lines(begin_line: usize, end_line: usize) -> Self {
        Self::new(begin_line, 0, end_line, 0)
    }

    /// Create a range from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            begin_line: start.row + 1, // tree-sitter is 0-indexed
            begin_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Range spanning from the start of `first` to the end of `last`.
    pub fn between(first: tree_sitter::Node, last: tree_sitter::Node) -> Self {
        let start = Self::from_node(first);
        let end = Self::from_node(last);
        Self::new(start.begin_line, start.begin_col, end.end_line, end.end_col)
    }

    /// Whether columns are known.
    pub fn has_columns(&self) -> bool {
        self.begin_col != 0 || self.end_col != 0
    }
}

impl Ord for CodeRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.begin_line
            .cmp(&other.begin_line)
            .then(self.end_line.cmp(&other.end_line))
            .then(self.begin_col.cmp(&other.begin_col))
            .then(self.end_col.cmp(&other.end_col))
    }
}

impl PartialOrd for CodeRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_columns() {
            write!(
                f,
                "{}:{}-{}:{}",
                self.begin_line, self.begin_col, self.end_line, self.end_col
            )
        } else {
            write!(f, "{}-{}", self.begin_line, self.end_line)
        }
    }
}

/// An import declaration of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The imported path without `.*` (e.g. `java.util.List`, `java.util`).
    pub path: String,
    pub is_static: bool,
    /// `import java.util.*;`
    pub is_wildcard: bool,
}

impl Import {
    /// Last segment of a single-type import.
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// Kind of a Java type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            "annotation_type_declaration" => Some(TypeKind::Annotation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name and arity of a declared method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    /// Simple parameter type names, generics stripped.
    pub parameter_types: Vec<String>,
    pub is_static: bool,
    pub is_abstract: bool,
}

impl MethodSignature {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Same name and parameter count.
    pub fn matches(&self, name: &str, arity: usize) -> bool {
        self.name == name && self.arity() == arity
    }
}

/// Facts about one declared type, collected for the type index.
#[derive(Debug, Clone)]
pub struct TypeFacts {
    /// Fully qualified name (`com.example.Outer.Inner`).
    pub qualified_name: String,
    pub simple_name: String,
    pub kind: TypeKind,
    /// Direct supertypes. Qualified when they could be resolved at index
    /// time, otherwise the name as written.
    pub supertypes: Vec<String>,
    pub methods: Vec<MethodSignature>,
    /// File the type was declared in.
    pub file: String,
}
