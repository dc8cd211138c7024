//! Data model for the call graph consumed by the scanner.
//!
//! The graph is produced by an external static-analysis provider (see
//! `provider`) and consumed read-only after augmentation. Node identity is
//! `(namespace, name, flavor)`; filename and span are payload, so two nodes
//! built independently (e.g. by inheritance aliasing) compare equal when they
//! denote the same logical entity.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Syntactic kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavor {
    Function,
    Method,
    ClassMethod,
    StaticMethod,
    Attribute,
    ImportedItem,
    Class,
    Module,
    /// Anything the provider emits that the scanner has no rule for.
    #[serde(other)]
    Unknown,
}

impl Flavor {
    /// Flavors with a body the scanner descends into.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Flavor::Function | Flavor::Method | Flavor::ClassMethod | Flavor::StaticMethod
        )
    }
}

/// Inclusive source line range, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
}

impl Span {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// One syntactic element of the analyzed program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Dotted scope path: module, optionally nested class/function scopes.
    pub namespace: String,
    /// Local identifier inside `namespace`.
    pub name: String,
    /// Source path, absolute or root-relative.
    pub filename: String,
    pub flavor: Flavor,
    /// Absent for synthetic or unresolved nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Node {
    /// The scope a class body opens: `namespace.name`. Methods of the class
    /// carry this as their own namespace.
    pub fn scope_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

// Identity is (namespace, name, flavor) only.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name && self.flavor == other.flavor
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
        self.flavor.hash(state);
    }
}

/// Root-relative file path -> set of changed line numbers. Membership test
/// only.
pub type ChangedLines = HashMap<String, BTreeSet<u32>>;

/// Whole-program call graph as handed over by the provider, plus the indices
/// the augmenter fills in.
#[derive(Debug, Default)]
pub struct CallGraph {
    /// Caller -> ordered, deduplicated set of used nodes. Every definition
    /// node has an entry here, even with no outgoing edges, so tests with
    /// trivial bodies stay discoverable.
    pub uses_edges: HashMap<Node, Vec<Node>>,
    /// Every distinct node, indexed by local name. Drives imported-item and
    /// decorator resolution.
    pub nodes_by_name: HashMap<String, Vec<Node>>,
    /// Decorator expressions recorded per definition node, dotted-name text
    /// as written in the source.
    pub decorators: HashMap<Node, Vec<String>>,
    /// Literal boolean bindings per namespace. Only consumer is the
    /// test-collection marker lookup.
    pub scope_flags: HashMap<String, HashMap<String, bool>>,
    /// Class node -> linearized ancestor order, self first.
    pub inheritance: HashMap<Node, Vec<Node>>,
    /// Namespaces whose collection marker is false. Resolved once by the
    /// augmenter; the scanner never reads `scope_flags` directly.
    pub suppressed: HashSet<String>,
}

impl CallGraph {
    /// Record `from -> to`, indexing both endpoints. Preserves neighbor
    /// insertion order and drops duplicates.
    pub fn add_use(&mut self, from: Node, to: Node) {
        self.index_node(&from);
        self.index_node(&to);
        let neighbors = self.uses_edges.entry(from).or_default();
        if !neighbors.contains(&to) {
            neighbors.push(to);
        }
    }

    /// Ensure a definition node is present as an edge key, even without
    /// outgoing edges.
    pub fn add_node(&mut self, node: Node) {
        self.index_node(&node);
        self.uses_edges.entry(node).or_default();
    }

    pub fn index_node(&mut self, node: &Node) {
        let bucket = self.nodes_by_name.entry(node.name.clone()).or_default();
        if !bucket.contains(node) {
            bucket.push(node.clone());
        }
    }

    pub fn neighbors(&self, node: &Node) -> &[Node] {
        self.uses_edges
            .get(node)
            .map(|nodes| nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes_by_name.values().map(Vec::len).sum()
    }
}

/// True when `inner` lives inside the dotted scope `container` (or is that
/// scope itself). Matches on dotted-segment boundaries, not raw prefixes.
pub fn namespace_contains(container: &str, inner: &str) -> bool {
    inner == container
        || (inner.len() > container.len()
            && inner.starts_with(container)
            && inner.as_bytes()[container.len()] == b'.')
}
