//! Affected-test scanner
//!
//! The reachability core: for every non-suppressed test entry point, walk the
//! augmented uses-graph looking for a node whose span overlaps a changed
//! line. The walk is an explicit-stack depth-first search with a visited set
//! local to each test evaluation, so mutual recursion in the analyzed code
//! cannot loop the scan and deep call chains cannot exhaust the stack.
//!
//! Traversal rules by flavor:
//! - Function/Method/ClassMethod/StaticMethod: check, then expand into the
//!   node's own uses.
//! - ImportedItem: resolved heuristically to same-name definitions in the
//!   same file whose namespace the import contains; every match is expanded
//!   (over-approximation beats silently missing the real binding).
//! - Attribute: checked leaf — decorators and module-level reads have no
//!   body to descend into.
//! - Anything else: skipped.
//!
//! The first affecting path short-circuits the whole test's search.

use crate::config::Config;
use crate::model::{CallGraph, ChangedLines, Flavor, Node, namespace_contains};
use crate::util;
use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::Path;

pub struct AffectedTestScanner<'a> {
    graph: &'a CallGraph,
    changed: &'a ChangedLines,
    root: &'a Path,
}

impl<'a> AffectedTestScanner<'a> {
    pub fn new(graph: &'a CallGraph, changed: &'a ChangedLines, root: &'a Path) -> Self {
        Self {
            graph,
            changed,
            root,
        }
    }

    /// Evaluate every test entry point and return the qualified names of the
    /// affected ones, sorted and deduplicated.
    pub fn collect_tests(&self) -> Vec<String> {
        let prefix = &Config::get().test_prefix;
        let mut affected = BTreeSet::new();

        for (test, neighbors) in &self.graph.uses_edges {
            if !test.name.starts_with(prefix.as_str()) {
                continue;
            }
            // Suppression is per-namespace; an inherited alias carries the
            // derived class's namespace and is judged on its own.
            if self.graph.suppressed.contains(&test.namespace) {
                continue;
            }
            // A change to the test's own body always selects it; only then
            // does the search descend.
            if self.node_affected(test) || self.scan_nodes(neighbors) {
                affected.insert(self.qualified_name(test));
            }
        }

        affected.into_iter().collect()
    }

    /// Depth-first reachability from one test's neighbor set. Returns true as
    /// soon as any reachable node overlaps the changed lines.
    fn scan_nodes(&self, roots: &[Node]) -> bool {
        let mut visited: HashSet<&Node> = HashSet::new();
        let mut stack: Vec<&Node> = roots.iter().rev().collect();

        while let Some(node) = stack.pop() {
            match node.flavor {
                Flavor::Function | Flavor::Method | Flavor::ClassMethod | Flavor::StaticMethod => {
                    if self.node_affected(node) {
                        return true;
                    }
                    if visited.insert(node) {
                        for next in self.graph.neighbors(node).iter().rev() {
                            stack.push(next);
                        }
                    }
                }
                Flavor::ImportedItem => {
                    if visited.insert(node) {
                        let mut candidates = self.resolve_import(node);
                        candidates.reverse();
                        stack.extend(candidates);
                    }
                }
                Flavor::Attribute => {
                    if self.node_affected(node) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Heuristic import binding: same local name, same file as the imported
    /// item records, namespace contained by the import's namespace, callable
    /// flavor. Not a real binder — ambiguous matches are all kept.
    fn resolve_import(&self, item: &Node) -> Vec<&Node> {
        let Some(bucket) = self.graph.nodes_by_name.get(&item.name) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter(|candidate| candidate.flavor.is_callable())
            .filter(|candidate| candidate.filename == item.filename)
            .filter(|candidate| namespace_contains(&item.namespace, &candidate.namespace))
            .collect()
    }

    /// Direct hit: the node has a span and at least one changed line of its
    /// file falls inside it. Span-less nodes are never directly affected.
    fn node_affected(&self, node: &Node) -> bool {
        let Some(span) = node.span else {
            return false;
        };
        let rel = util::rel_to_root(self.root, &node.filename);
        match self.changed.get(&rel) {
            Some(lines) => lines
                .range(span.start_line..=span.end_line)
                .next()
                .is_some(),
            None => false,
        }
    }

    /// `<relative-file>::[ClassName::]test_name`. Namespace segments are
    /// walked innermost-out and stop at the module's own filename stem.
    fn qualified_name(&self, test: &Node) -> String {
        let rel = util::rel_to_root(self.root, &test.filename);
        let stem = Path::new(&rel)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("");

        let mut segments: Vec<&str> = Vec::new();
        for segment in test.namespace.rsplit('.') {
            if segment == stem {
                break;
            }
            segments.push(segment);
        }
        segments.reverse();

        let mut name = rel;
        for segment in segments {
            name.push_str("::");
            name.push_str(segment);
        }
        name.push_str("::");
        name.push_str(&test.name);
        name
    }
}
