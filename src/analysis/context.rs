//! Type index: the resolution context built from project sources.
//!
//! The TypeIndex provides:
//! - Qualified name lookup for every type declared in the indexed sources
//! - Simple-name resolution through package, imports and `java.lang`
//! - Subtype queries across project types and well-known JDK types
//! - Call binding for receivers whose declared type is visible in the file

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use rayon::prelude::*;
use tree_sitter::Node;

use super::query;
use super::resolution::{jdk_is_subtype, JDK_INTERFACES, JDK_SUPERTYPES};
use super::{
    Import, JavaTreeProvider, MethodBinding, MethodSignature, ParsedFile, Resolution,
    ResolutionContext, TreeProvider, TypeFacts, TypeKind,
};

/// Methods of JDK types that detectors ask about, as `name/arity`.
static JDK_METHODS: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "java.lang.Object" => &["equals/1", "hashCode/0", "toString/0", "clone/0", "finalize/0", "getClass/0"],
    "java.util.Iterator" => &["hasNext/0", "next/0", "remove/0", "forEachRemaining/1"],
    "java.util.ListIterator" => &["hasPrevious/0", "previous/0", "nextIndex/0", "previousIndex/0", "set/1", "add/1"],
    "java.util.Enumeration" => &["hasMoreElements/0", "nextElement/0", "asIterator/0"],
    "java.lang.Iterable" => &["iterator/0", "forEach/1", "spliterator/0"],
    "java.lang.Comparable" => &["compareTo/1"],
    "java.lang.AutoCloseable" => &["close/0"],
    "java.io.Closeable" => &["close/0"],
    "java.lang.Runnable" => &["run/0"],
    "java.lang.CharSequence" => &["length/0", "charAt/1", "subSequence/2", "toString/0"],
};

/// Package, imports and file of the unit a name is written in.
struct Scope<'a> {
    package: Option<&'a str>,
    imports: &'a [Import],
    file: &'a str,
}

impl<'a> Scope<'a> {
    fn of(file: &'a ParsedFile, path: &'a str) -> Self {
        Self {
            package: file.package.as_deref(),
            imports: &file.imports,
            file: path,
        }
    }
}

/// Ancestor list of a type plus whether some link could not be resolved.
#[derive(Debug, Clone)]
struct Ancestry {
    ancestors: Vec<String>,
    has_gap: bool,
}

/// Resolution context over a fixed set of parsed Java files.
///
/// Immutable after construction apart from the ancestry memo, whose entries
/// are pure functions of the immutable index.
pub struct TypeIndex {
    /// Facts keyed by qualified name; supertypes are qualified where possible.
    types: HashMap<String, TypeFacts>,
    /// Qualified names declared per file.
    by_file: HashMap<String, Vec<String>>,
    ancestry_cache: RwLock<HashMap<String, Arc<Ancestry>>>,
}

impl TypeIndex {
    /// Parse and index the given files. Unparseable files are skipped.
    pub fn build(provider: &JavaTreeProvider, files: &[PathBuf]) -> Self {
        let parsed: Vec<ParsedFile> = files
            .par_iter()
            .filter_map(|path| match provider.parse(path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::debug!("not indexing {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        Self::from_parsed(provider, &parsed)
    }

    /// Index already parsed files.
    pub fn from_parsed(provider: &JavaTreeProvider, files: &[ParsedFile]) -> Self {
        let mut index = Self {
            types: HashMap::new(),
            by_file: HashMap::new(),
            ancestry_cache: RwLock::new(HashMap::new()),
        };

        let mut pending = Vec::new();
        for file in files {
            for facts in provider.extract_type_facts(file) {
                index
                    .by_file
                    .entry(facts.file.clone())
                    .or_default()
                    .push(facts.qualified_name.clone());
                pending.push((facts, file));
            }
        }
        for (facts, _) in &pending {
            index
                .types
                .insert(facts.qualified_name.clone(), facts.clone());
        }

        // Second pass: qualify supertypes now that every project type is known.
        let mut qualified = HashMap::new();
        for (facts, file) in &pending {
            let path = file.path.to_string_lossy().to_string();
            let scope = Scope::of(file, &path);
            let supertypes: Vec<String> = facts
                .supertypes
                .iter()
                .map(|written| {
                    index
                        .resolve_in_scope(written, &scope)
                        .unwrap_or_else(|| written.clone())
                })
                .collect();
            qualified.insert(facts.qualified_name.clone(), supertypes);
        }
        for (name, supertypes) in qualified {
            if let Some(facts) = index.types.get_mut(&name) {
                facts.supertypes = supertypes;
            }
        }

        index
    }

    /// Number of indexed project types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Facts for a qualified project type.
    pub fn facts(&self, qualified: &str) -> Option<&TypeFacts> {
        self.types.get(qualified)
    }

    fn is_known(&self, qualified: &str) -> bool {
        self.types.contains_key(qualified) || JDK_SUPERTYPES.contains_key(qualified)
    }

    fn resolve_in_scope(&self, written: &str, scope: &Scope) -> Option<String> {
        if let Some((head, rest)) = written.split_once('.') {
            if self.is_known(written) {
                return Some(written.to_string());
            }
            // Outer.Inner written relative to an importable outer type
            return self
                .resolve_in_scope(head, scope)
                .map(|outer| format!("{}.{}", outer, rest))
                .filter(|candidate| self.is_known(candidate))
                .or_else(|| Some(written.to_string()));
        }

        if let Some(import) = scope
            .imports
            .iter()
            .find(|i| !i.is_static && !i.is_wildcard && i.simple_name() == written)
        {
            return Some(import.path.clone());
        }

        // Types declared in the same file, including nested ones
        if let Some(names) = self.by_file.get(scope.file) {
            let local: Vec<_> = names
                .iter()
                .filter(|q| query::last_segment(q) == written)
                .collect();
            if local.len() == 1 {
                return Some(local[0].clone());
            }
        }

        let same_package = match scope.package {
            Some(pkg) => format!("{}.{}", pkg, written),
            None => written.to_string(),
        };
        if self.types.contains_key(&same_package) {
            return Some(same_package);
        }

        let lang = format!("java.lang.{}", written);
        if self.is_known(&lang) {
            return Some(lang);
        }

        let mut wildcard_hits = scope
            .imports
            .iter()
            .filter(|i| i.is_wildcard && !i.is_static)
            .map(|i| format!("{}.{}", i.path, written))
            .filter(|candidate| self.is_known(candidate));
        match (wildcard_hits.next(), wildcard_hits.next()) {
            (Some(hit), None) => Some(hit),
            _ => None,
        }
    }

    fn ancestry(&self, qualified: &str) -> Arc<Ancestry> {
        {
            let cache = self
                .ancestry_cache
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = cache.get(qualified) {
                return Arc::clone(found);
            }
        }

        let computed = Arc::new(self.compute_ancestry(qualified));
        let mut cache = self
            .ancestry_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(qualified.to_string())
            .or_insert(computed)
            .clone()
    }

    fn compute_ancestry(&self, qualified: &str) -> Ancestry {
        let mut ancestors = Vec::new();
        let mut has_gap = false;
        let mut seen = HashSet::new();
        seen.insert(qualified.to_string());
        let mut queue = std::collections::VecDeque::from(self.direct_supertypes(qualified));
        if !self.is_known(qualified) {
            has_gap = true;
        }

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if !self.is_known(&next) {
                has_gap = true;
            }
            queue.extend(self.direct_supertypes(&next));
            ancestors.push(next);
        }

        if qualified != "java.lang.Object" && !ancestors.iter().any(|a| a == "java.lang.Object") {
            ancestors.push("java.lang.Object".to_string());
        }
        Ancestry { ancestors, has_gap }
    }

    fn direct_supertypes(&self, qualified: &str) -> Vec<String> {
        if let Some(facts) = self.types.get(qualified) {
            let mut supers = facts.supertypes.clone();
            match facts.kind {
                TypeKind::Enum => supers.push("java.lang.Enum".to_string()),
                TypeKind::Record => supers.push("java.lang.Record".to_string()),
                _ => {}
            }
            return supers;
        }
        JDK_SUPERTYPES
            .get(qualified)
            .map(|parents| parents.iter().map(|p| p.to_string()).collect())
            .unwrap_or_default()
    }

    fn find_method(&self, qualified: &str, name: &str, arity: usize) -> Resolution<MethodBinding> {
        let ancestry = self.ancestry(qualified);
        for candidate in std::iter::once(qualified).chain(ancestry.ancestors.iter().map(String::as_str)) {
            if let Resolution::Resolved(methods) = self.declared_methods(candidate) {
                if let Some(signature) = methods.into_iter().find(|m| m.matches(name, arity)) {
                    return Resolution::Resolved(MethodBinding {
                        declaring_type: candidate.to_string(),
                        signature,
                    });
                }
            }
        }
        Resolution::Unresolved
    }

    fn receiver_type(&self, receiver: Node, call: Node, file: &ParsedFile) -> Resolution<String> {
        match receiver.kind() {
            "this" => self.enclosing_qualified(call, file),
            "identifier" => {
                let name = file.node_text(receiver);
                match query::declared_type_of(name, call, file) {
                    Some(ty) => self.resolve_type_node(ty, file),
                    // static call on a type name
                    None => self.resolve_type(name, file),
                }
            }
            "field_access" => match query::field_access_parts(receiver, file) {
                Some((object, field)) if object.kind() == "this" => {
                    match query::declared_type_of(field, call, file) {
                        Some(ty) => self.resolve_type_node(ty, file),
                        None => Resolution::Unresolved,
                    }
                }
                _ => Resolution::Unresolved,
            },
            _ => Resolution::Unresolved,
        }
    }

    fn enclosing_qualified(&self, node: Node, file: &ParsedFile) -> Resolution<String> {
        match query::enclosing_type(node) {
            Some(type_decl) => {
                let qualified = file.qualify(&query::type_path(type_decl, file));
                if self.types.contains_key(&qualified) {
                    Resolution::Resolved(qualified)
                } else {
                    Resolution::Unresolved
                }
            }
            None => Resolution::Unresolved,
        }
    }
}

impl ResolutionContext for TypeIndex {
    fn resolve_type(&self, name: &str, file: &ParsedFile) -> Resolution<String> {
        let path = file.path.to_string_lossy().to_string();
        let scope = Scope::of(file, &path);
        let name = query::strip_type_arguments(name);
        self.resolve_in_scope(&name, &scope).into()
    }

    fn type_kind(&self, qualified: &str) -> Resolution<TypeKind> {
        if let Some(facts) = self.types.get(qualified) {
            return Resolution::Resolved(facts.kind);
        }
        if JDK_INTERFACES.contains(qualified) {
            return Resolution::Resolved(TypeKind::Interface);
        }
        if JDK_SUPERTYPES.contains_key(qualified) {
            return Resolution::Resolved(TypeKind::Class);
        }
        Resolution::Unresolved
    }

    fn is_subtype_of(&self, qualified: &str, ancestor: &str) -> Resolution<bool> {
        if qualified == ancestor || ancestor == "java.lang.Object" {
            return Resolution::Resolved(true);
        }
        if !self.types.contains_key(qualified) {
            return jdk_is_subtype(qualified, ancestor).into();
        }
        let ancestry = self.ancestry(qualified);
        if ancestry.ancestors.iter().any(|a| a == ancestor) {
            Resolution::Resolved(true)
        } else if ancestry.has_gap {
            Resolution::Unresolved
        } else {
            Resolution::Resolved(false)
        }
    }

    fn declared_methods(&self, qualified: &str) -> Resolution<Vec<MethodSignature>> {
        if let Some(facts) = self.types.get(qualified) {
            return Resolution::Resolved(facts.methods.clone());
        }
        JDK_METHODS
            .get(qualified)
            .map(|methods| {
                methods
                    .iter()
                    .filter_map(|m| m.split_once('/'))
                    .map(|(name, arity)| MethodSignature {
                        name: name.to_string(),
                        parameter_types: vec!["?".to_string(); arity.parse().unwrap_or(0)],
                        is_static: false,
                        is_abstract: false,
                    })
                    .collect()
            })
            .into()
    }

    fn ancestors(&self, qualified: &str) -> Resolution<Vec<String>> {
        if !self.is_known(qualified) {
            return Resolution::Unresolved;
        }
        Resolution::Resolved(self.ancestry(qualified).ancestors.clone())
    }

    fn resolve_call(&self, call: Node, file: &ParsedFile) -> Resolution<MethodBinding> {
        if call.kind() != "method_invocation" {
            return Resolution::Unresolved;
        }
        let name = query::invocation_name(call, file);
        let arity = query::arguments(call).len();

        match query::invocation_object(call) {
            None => {
                // Unqualified calls: the enclosing type, then outer types.
                let mut current = query::enclosing_type(call);
                while let Some(type_decl) = current {
                    let qualified = file.qualify(&query::type_path(type_decl, file));
                    if let Resolution::Resolved(binding) = self.find_method(&qualified, name, arity) {
                        return Resolution::Resolved(binding);
                    }
                    current = query::enclosing_type(type_decl);
                }
                Resolution::Unresolved
            }
            Some(receiver) if receiver.kind() == "super" => self
                .enclosing_qualified(call, file)
                .and_then(|own| {
                    let ancestry = self.ancestry(&own);
                    Resolution::from(
                        ancestry
                            .ancestors
                            .iter()
                            .find_map(|a| self.find_method(a, name, arity).resolved()),
                    )
                }),
            Some(receiver) => self
                .receiver_type(receiver, call, file)
                .and_then(|ty| self.find_method(&ty, name, arity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn index(sources: &[(&str, &str)]) -> (TypeIndex, Vec<ParsedFile>) {
        let provider = JavaTreeProvider::new();
        let parsed: Vec<_> = sources
            .iter()
            .map(|(path, src)| provider.parse_source(Path::new(path), src).unwrap())
            .collect();
        (TypeIndex::from_parsed(&provider, &parsed), parsed)
    }

    #[test]
    fn test_resolve_through_imports_and_package() {
        let (idx, files) = index(&[
            (
                "a/Shape.java",
                "package geo; public abstract class Shape implements java.io.Serializable {}",
            ),
            (
                "a/Circle.java",
                "package geo; import java.util.List; public class Circle extends Shape {}",
            ),
        ]);
        let circle = &files[1];
        assert_eq!(
            idx.resolve_type("Shape", circle),
            Resolution::Resolved("geo.Shape".to_string())
        );
        assert_eq!(
            idx.resolve_type("List<String>", circle),
            Resolution::Resolved("java.util.List".to_string())
        );
        assert_eq!(
            idx.resolve_type("String", circle),
            Resolution::Resolved("java.lang.String".to_string())
        );
        assert_eq!(idx.resolve_type("Widget", circle), Resolution::Unresolved);
    }

    #[test]
    fn test_transitive_subtype() {
        let (idx, _) = index(&[
            (
                "Shape.java",
                "package geo; public abstract class Shape implements java.io.Serializable {}",
            ),
            ("Circle.java", "package geo; public class Circle extends Shape {}"),
        ]);
        assert_eq!(
            idx.is_subtype_of("geo.Circle", "java.io.Serializable"),
            Resolution::Resolved(true)
        );
        assert_eq!(
            idx.is_subtype_of("geo.Circle", "java.util.Iterator"),
            Resolution::Resolved(false)
        );
        assert_eq!(
            idx.type_kind("geo.Shape"),
            Resolution::Resolved(TypeKind::Class)
        );
    }

    #[test]
    fn test_unknown_supertype_is_unresolved() {
        let (idx, _) = index(&[(
            "Widget.java",
            "import com.vendor.Base; public class Widget extends Base {}",
        )]);
        assert_eq!(
            idx.is_subtype_of("Widget", "java.io.Serializable"),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_resolve_unqualified_call() {
        let (idx, files) = index(&[(
            "Range.java",
            r#"
import java.util.Iterator;
public class Range implements Iterator<Integer> {
    private int cur;
    public boolean hasNext() { return cur < 10; }
    public Integer next() { if (!hasNext()) throw new java.util.NoSuchElementException(); return cur++; }
}
"#,
        )]);
        let file = &files[0];
        let call = query::method_invocations(file.root())
            .into_iter()
            .find(|c| query::invocation_name(*c, file) == "hasNext")
            .unwrap();
        let binding = idx.resolve_call(call, file).resolved().unwrap();
        assert_eq!(binding.declaring_type, "Range");
        assert_eq!(
            idx.is_subtype_of(&binding.declaring_type, "java.util.Iterator"),
            Resolution::Resolved(true)
        );
    }
}
