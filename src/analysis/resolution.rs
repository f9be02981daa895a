//! Symbol resolution capability consumed by detectors.
//!
//! Every query may fail to resolve. Answers are [`Resolution`] values so the
//! syntactic fallback branches in detectors stay exhaustive.

use tree_sitter::Node;

use super::{MethodSignature, ParsedFile, TypeKind};

/// Outcome of a resolution query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    Unresolved,
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            Resolution::Unresolved => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(v) => Resolution::Resolved(f(v)),
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Resolution<U>) -> Resolution<U> {
        match self {
            Resolution::Resolved(v) => f(v),
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Resolution::Resolved(v),
            None => Resolution::Unresolved,
        }
    }
}

/// A method a call expression binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBinding {
    /// Qualified name of the type declaring the method.
    pub declaring_type: String,
    pub signature: MethodSignature,
}

/// Semantic oracle over a set of compilation units.
///
/// Implementations must be safe for concurrent reads: detectors for
/// different files query the same context from several worker threads.
pub trait ResolutionContext: Send + Sync {
    /// Qualified name of a type name as seen from `file`.
    fn resolve_type(&self, name: &str, file: &ParsedFile) -> Resolution<String>;

    /// Kind of a qualified type.
    fn type_kind(&self, qualified: &str) -> Resolution<TypeKind>;

    /// Whether `qualified` is `ancestor` or (transitively) extends or
    /// implements it. Unresolved when an unknown link in the hierarchy
    /// prevents a definite answer.
    fn is_subtype_of(&self, qualified: &str, ancestor: &str) -> Resolution<bool>;

    /// Methods declared directly by a qualified type.
    fn declared_methods(&self, qualified: &str) -> Resolution<Vec<MethodSignature>>;

    /// Qualified names of all known supertypes of `qualified`, excluding
    /// itself, nearest first.
    fn ancestors(&self, qualified: &str) -> Resolution<Vec<String>>;

    /// Method declaration a call binds to.
    fn resolve_call(&self, call: Node, file: &ParsedFile) -> Resolution<MethodBinding>;

    /// Whether a value of type `from` can be assigned to `to`.
    fn is_assignable(&self, from: &str, to: &str) -> Resolution<bool> {
        if to == "java.lang.Object" || from == to {
            return Resolution::Resolved(true);
        }
        self.is_subtype_of(from, to)
    }

    /// Resolve a type node written in `file`.
    fn resolve_type_node(&self, type_node: Node, file: &ParsedFile) -> Resolution<String> {
        let written = super::query::written_type_name(type_node, file);
        self.resolve_type(&written, file)
    }
}

/// Direct supertypes of well-known JDK types.
pub static JDK_SUPERTYPES: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "java.lang.Object" => &[],
    "java.lang.Iterable" => &[],
    "java.lang.AutoCloseable" => &[],
    "java.lang.Cloneable" => &[],
    "java.lang.Comparable" => &[],
    "java.lang.CharSequence" => &[],
    "java.lang.Runnable" => &[],
    "java.lang.String" => &["java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"],
    "java.lang.StringBuilder" => &["java.io.Serializable", "java.lang.CharSequence"],
    "java.lang.StringBuffer" => &["java.io.Serializable", "java.lang.CharSequence"],
    "java.lang.Enum" => &["java.io.Serializable", "java.lang.Comparable"],
    "java.lang.Record" => &[],
    "java.lang.Throwable" => &["java.io.Serializable"],
    "java.lang.Exception" => &["java.lang.Throwable"],
    "java.lang.Error" => &["java.lang.Throwable"],
    "java.lang.RuntimeException" => &["java.lang.Exception"],
    "java.lang.IllegalArgumentException" => &["java.lang.RuntimeException"],
    "java.lang.IllegalStateException" => &["java.lang.RuntimeException"],
    "java.lang.NullPointerException" => &["java.lang.RuntimeException"],
    "java.lang.UnsupportedOperationException" => &["java.lang.RuntimeException"],
    "java.lang.IndexOutOfBoundsException" => &["java.lang.RuntimeException"],
    "java.util.NoSuchElementException" => &["java.lang.RuntimeException"],
    "java.util.ConcurrentModificationException" => &["java.lang.RuntimeException"],
    "java.io.IOException" => &["java.lang.Exception"],
    "java.io.UncheckedIOException" => &["java.lang.RuntimeException"],
    "java.io.Serializable" => &[],
    "java.io.Externalizable" => &["java.io.Serializable"],
    "java.io.Closeable" => &["java.lang.AutoCloseable"],
    "java.util.Iterator" => &[],
    "java.util.ListIterator" => &["java.util.Iterator"],
    "java.util.Enumeration" => &[],
    "java.util.Collection" => &["java.lang.Iterable"],
    "java.util.SequencedCollection" => &["java.util.Collection"],
    "java.util.List" => &["java.util.SequencedCollection"],
    "java.util.Set" => &["java.util.Collection"],
    "java.util.SortedSet" => &["java.util.Set"],
    "java.util.NavigableSet" => &["java.util.SortedSet"],
    "java.util.Queue" => &["java.util.Collection"],
    "java.util.Deque" => &["java.util.Queue", "java.util.SequencedCollection"],
    "java.util.Map" => &[],
    "java.util.SortedMap" => &["java.util.Map"],
    "java.util.NavigableMap" => &["java.util.SortedMap"],
    "java.util.RandomAccess" => &[],
    "java.util.AbstractCollection" => &["java.util.Collection"],
    "java.util.AbstractList" => &["java.util.AbstractCollection", "java.util.List"],
    "java.util.AbstractSet" => &["java.util.AbstractCollection", "java.util.Set"],
    "java.util.AbstractMap" => &["java.util.Map"],
    "java.util.ArrayList" => &["java.util.AbstractList", "java.util.RandomAccess", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.LinkedList" => &["java.util.AbstractList", "java.util.Deque", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.Vector" => &["java.util.AbstractList", "java.util.RandomAccess", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.HashSet" => &["java.util.AbstractSet", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.LinkedHashSet" => &["java.util.HashSet"],
    "java.util.TreeSet" => &["java.util.AbstractSet", "java.util.NavigableSet", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.EnumSet" => &["java.util.AbstractSet", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.ArrayDeque" => &["java.util.AbstractCollection", "java.util.Deque", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.PriorityQueue" => &["java.util.AbstractCollection", "java.util.Queue", "java.io.Serializable"],
    "java.util.HashMap" => &["java.util.AbstractMap", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.LinkedHashMap" => &["java.util.HashMap"],
    "java.util.TreeMap" => &["java.util.AbstractMap", "java.util.NavigableMap", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.Hashtable" => &["java.util.Map", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.EnumMap" => &["java.util.AbstractMap", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.Optional" => &[],
    "java.util.concurrent.ConcurrentMap" => &["java.util.Map"],
    "java.util.concurrent.ConcurrentHashMap" => &["java.util.AbstractMap", "java.util.concurrent.ConcurrentMap", "java.io.Serializable"],
    "java.util.concurrent.CopyOnWriteArrayList" => &["java.util.List", "java.util.RandomAccess", "java.lang.Cloneable", "java.io.Serializable"],
    "java.util.concurrent.BlockingQueue" => &["java.util.Queue"],
    "java.util.concurrent.LinkedBlockingQueue" => &["java.util.AbstractCollection", "java.util.concurrent.BlockingQueue", "java.io.Serializable"],
    "java.util.concurrent.ArrayBlockingQueue" => &["java.util.AbstractCollection", "java.util.concurrent.BlockingQueue", "java.io.Serializable"],
};

/// JDK interfaces among [`JDK_SUPERTYPES`].
pub static JDK_INTERFACES: phf::Set<&'static str> = phf::phf_set! {
    "java.lang.Iterable",
    "java.lang.AutoCloseable",
    "java.lang.Cloneable",
    "java.lang.Comparable",
    "java.lang.CharSequence",
    "java.lang.Runnable",
    "java.io.Serializable",
    "java.io.Externalizable",
    "java.io.Closeable",
    "java.util.Iterator",
    "java.util.ListIterator",
    "java.util.Enumeration",
    "java.util.Collection",
    "java.util.SequencedCollection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.NavigableSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.Map",
    "java.util.SortedMap",
    "java.util.NavigableMap",
    "java.util.RandomAccess",
    "java.util.concurrent.ConcurrentMap",
    "java.util.concurrent.BlockingQueue",
};

/// Packages whose JDK types are known by simple name in [`JDK_SUPERTYPES`].
const JDK_PACKAGES: &[&str] = &["java.lang", "java.util", "java.io", "java.util.concurrent"];

/// Qualified JDK name for a simple name, when exactly one known JDK type
/// carries it.
pub fn jdk_type_by_simple_name(simple: &str) -> Option<&'static str> {
    let mut found = None;
    for package in JDK_PACKAGES {
        let candidate = format!("{}.{}", package, simple);
        if let Some((key, _)) = JDK_SUPERTYPES.get_entry(candidate.as_str()) {
            if found.is_some() {
                return None;
            }
            found = Some(*key);
        }
    }
    found
}

/// Whether `sub` reaches `ancestor` through the JDK table alone.
pub fn jdk_is_subtype(sub: &str, ancestor: &str) -> Option<bool> {
    if sub == ancestor || ancestor == "java.lang.Object" {
        return Some(true);
    }
    let mut stack = vec![JDK_SUPERTYPES.get_entry(sub).map(|(k, _)| *k)?];
    let mut seen = std::collections::HashSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        for parent in JDK_SUPERTYPES.get(current).copied().unwrap_or(&[]) {
            if *parent == ancestor {
                return Some(true);
            }
            stack.push(*parent);
        }
    }
    Some(false)
}
