//! Graph augmentation
//!
//! Post-processes the provider's graph before any scanning:
//!
//! 1. Decorator-use synthesis: a decorator is referenced by name at
//!    definition time, never called from the function body, so no natural
//!    call edge captures it. An explicit `decorated -> decorator` uses-edge
//!    makes a decorator-body change reach every function it wraps.
//! 2. Inherited test aliasing: a test method defined on a base class gets a
//!    fresh alias node under every subclass that inherits it without
//!    overriding, sharing the ancestor's outgoing edges. Subclass suites
//!    then report inherited tests under their own qualified name.
//! 3. Suppression resolution: scope flags collapse into the set of
//!    namespaces whose collection marker is false.

use crate::config::Config;
use crate::model::{CallGraph, Flavor, Node, namespace_contains};

/// Run all augmentation passes, in order, once per invocation.
pub fn augment(graph: &mut CallGraph) {
    synthesize_decorator_edges(graph);
    propagate_inherited_tests(graph);
    resolve_suppression(graph);
}

/// Resolve each recorded decorator expression to its defining node(s) and add
/// a uses-edge from the decorated definition. Ambiguity resolves to every
/// candidate; an unresolvable decorator adds nothing.
fn synthesize_decorator_edges(graph: &mut CallGraph) {
    let mut edges: Vec<(Node, Node)> = Vec::new();

    for (definition, expressions) in &graph.decorators {
        if !definition.flavor.is_callable() {
            continue;
        }
        for expression in expressions {
            let Some(name) = decorator_name(expression) else {
                continue;
            };
            let Some(candidates) = graph.nodes_by_name.get(name) else {
                continue;
            };
            for candidate in candidates {
                if !matches!(
                    candidate.flavor,
                    Flavor::Function | Flavor::Attribute | Flavor::ImportedItem
                ) {
                    continue;
                }
                // Keep candidates plausibly visible from the definition site:
                // same file, or an enclosing namespace.
                if candidate.filename == definition.filename
                    || namespace_contains(&candidate.namespace, &definition.namespace)
                {
                    edges.push((definition.clone(), candidate.clone()));
                }
            }
        }
    }

    for (from, to) in edges {
        graph.add_use(from, to);
    }
}

/// Trailing name segment of a decorator expression: `pytest.mark.skip` ->
/// `skip`, `retry(times=3)` -> `retry`.
fn decorator_name(expression: &str) -> Option<&str> {
    let callee = expression.split('(').next().unwrap_or(expression).trim();
    let name = callee.rsplit('.').next().unwrap_or(callee);
    if name.is_empty() { None } else { Some(name) }
}

/// For every class D with strict ancestor C, alias C's test methods into D's
/// scope. The alias is a fresh node keyed under D's namespace with D's file
/// and the ancestor method's span, bound to a copy of the ancestor's outgoing
/// edges; the ancestor node itself is never touched, so both keep independent
/// traversal state.
///
/// Methods D defines itself are skipped: the override already owns that
/// identity, and inserting an alias would clobber its edges.
fn propagate_inherited_tests(graph: &mut CallGraph) {
    let prefix = &Config::get().test_prefix;
    let mut aliases: Vec<(Node, Vec<Node>)> = Vec::new();

    for (class, order) in &graph.inheritance {
        let derived_scope = class.scope_name();
        for ancestor in order.iter().skip(1) {
            if ancestor == class {
                continue;
            }
            let ancestor_scope = ancestor.scope_name();
            for (method, neighbors) in &graph.uses_edges {
                if method.namespace != ancestor_scope
                    || !method.flavor.is_callable()
                    || !method.name.starts_with(prefix.as_str())
                {
                    continue;
                }
                let alias = Node {
                    namespace: derived_scope.clone(),
                    name: method.name.clone(),
                    filename: class.filename.clone(),
                    flavor: method.flavor,
                    // Ancestor span: the alias is checked against the body it
                    // inherits. Changes visible only through derived-class
                    // shadowing are not detected (known limitation).
                    span: method.span,
                };
                if is_overridden(graph, &alias) {
                    continue;
                }
                aliases.push((alias, neighbors.clone()));
            }
        }
    }

    for (alias, neighbors) in aliases {
        if graph.uses_edges.contains_key(&alias) {
            continue; // two ancestors can supply the same name; first wins
        }
        graph.index_node(&alias);
        graph.uses_edges.insert(alias, neighbors);
    }
}

fn is_overridden(graph: &CallGraph, alias: &Node) -> bool {
    graph
        .nodes_by_name
        .get(&alias.name)
        .is_some_and(|bucket| bucket.contains(alias))
}

/// Collapse the scope flag tables into the namespaces whose collection marker
/// is explicitly false. A missing or truthy marker leaves the scope enabled.
fn resolve_suppression(graph: &mut CallGraph) {
    let marker = &Config::get().collect_marker;
    graph.suppressed = graph
        .scope_flags
        .iter()
        .filter(|(_, flags)| flags.get(marker.as_str()) == Some(&false))
        .map(|(namespace, _)| namespace.clone())
        .collect();
}
