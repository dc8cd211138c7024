//! Scanner + augmenter integration over in-memory graphs.
//!
//! The graph shapes mirror the canonical scenario: `helpers.py` defines
//! `call_something()` calling `func1()`; `test_a.py` defines tests reaching
//! into it through an imported item.

use diffsel::augment::augment;
use diffsel::model::{CallGraph, ChangedLines, Flavor, Node, Span};
use diffsel::scanner::AffectedTestScanner;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

fn node(namespace: &str, name: &str, filename: &str, flavor: Flavor, span: (u32, u32)) -> Node {
    Node {
        namespace: namespace.to_string(),
        name: name.to_string(),
        filename: filename.to_string(),
        flavor,
        span: Some(Span::new(span.0, span.1)),
    }
}

fn changed(entries: &[(&str, &[u32])]) -> ChangedLines {
    let mut map = ChangedLines::new();
    for (file, lines) in entries {
        map.insert(
            file.to_string(),
            lines.iter().copied().collect::<BTreeSet<_>>(),
        );
    }
    map
}

fn scan(graph: &CallGraph, changed: &ChangedLines) -> Vec<String> {
    AffectedTestScanner::new(graph, changed, Path::new(".")).collect_tests()
}

/// helpers.py:
///   1-3  call_something()  (calls func1)
///   6-7  func1()
/// test_a.py:
///   4-6  test_func1()      (uses imported call_something)
fn helpers_scenario() -> CallGraph {
    let mut graph = CallGraph::default();
    let test = node("test_a", "test_func1", "test_a.py", Flavor::Function, (4, 6));
    let imported = Node {
        span: None,
        ..node(
            "helpers",
            "call_something",
            "helpers.py",
            Flavor::ImportedItem,
            (0, 0),
        )
    };
    let call_something = node(
        "helpers",
        "call_something",
        "helpers.py",
        Flavor::Function,
        (1, 3),
    );
    let func1 = node("helpers", "func1", "helpers.py", Flavor::Function, (6, 7));
    graph.add_use(test, imported);
    graph.add_use(call_something, func1.clone());
    graph.add_node(func1);
    graph
}

#[test]
fn change_in_leaf_function_selects_test() {
    let mut graph = helpers_scenario();
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[7])]);
    assert_eq!(scan(&graph, &changed), vec!["test_a.py::test_func1"]);
}

#[test]
fn change_in_intermediate_helper_selects_test() {
    let mut graph = helpers_scenario();
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[2])]);
    assert_eq!(scan(&graph, &changed), vec!["test_a.py::test_func1"]);
}

#[test]
fn change_outside_any_span_selects_nothing() {
    let mut graph = helpers_scenario();
    augment(&mut graph);

    // A comment line between the two function bodies.
    let changed = changed(&[("helpers.py", &[5])]);
    assert!(scan(&graph, &changed).is_empty());
}

#[test]
fn change_in_unreached_helper_selects_nothing() {
    let mut graph = helpers_scenario();
    let orphan = node("helpers", "orphan", "helpers.py", Flavor::Function, (10, 12));
    graph.add_node(orphan);
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[11])]);
    assert!(scan(&graph, &changed).is_empty());
}

#[test]
fn mutual_recursion_terminates_and_stays_unselected() {
    let mut graph = CallGraph::default();
    let test = node("test_a", "test_func1", "test_a.py", Flavor::Function, (1, 3));
    let ping = node("m", "ping", "m.py", Flavor::Function, (1, 2));
    let pong = node("m", "pong", "m.py", Flavor::Function, (4, 5));
    graph.add_use(test, ping.clone());
    graph.add_use(ping.clone(), pong.clone());
    graph.add_use(pong, ping);
    augment(&mut graph);

    let changed = changed(&[("m.py", &[40])]);
    assert!(scan(&graph, &changed).is_empty());
}

#[test]
fn decorator_body_change_selects_decorated_test() {
    let mut graph = CallGraph::default();
    let test = node("test_a", "test_wrapped", "test_a.py", Flavor::Function, (8, 11));
    let retry = node("helpers", "retry", "test_a.py", Flavor::Attribute, (1, 4));
    graph.add_node(test.clone());
    graph.index_node(&retry);
    graph.decorators.insert(test, vec!["retry".to_string()]);
    augment(&mut graph);

    // Only the decorator's own lines changed; the test body is untouched.
    let changed = changed(&[("test_a.py", &[2])]);
    assert_eq!(scan(&graph, &changed), vec!["test_a.py::test_wrapped"]);
}

#[test]
fn suppressed_class_is_excluded_even_on_direct_hit() {
    let mut graph = CallGraph::default();
    let test = node(
        "test_a.TestLegacy",
        "test_method",
        "test_a.py",
        Flavor::Method,
        (4, 8),
    );
    graph.add_node(test);
    graph
        .scope_flags
        .entry("test_a.TestLegacy".to_string())
        .or_default()
        .insert("__test__".to_string(), false);
    augment(&mut graph);

    let changed = changed(&[("test_a.py", &[5])]);
    assert!(scan(&graph, &changed).is_empty());
}

fn inheritance_scenario() -> CallGraph {
    // test_base.py defines TestBase.test_shared calling a helper;
    // test_derived.py defines TestDerived(TestBase) without overriding it.
    let mut graph = CallGraph::default();
    let base = node("test_base", "TestBase", "test_base.py", Flavor::Class, (1, 10));
    let derived = node(
        "test_derived",
        "TestDerived",
        "test_derived.py",
        Flavor::Class,
        (3, 5),
    );
    let method = node(
        "test_base.TestBase",
        "test_shared",
        "test_base.py",
        Flavor::Method,
        (2, 6),
    );
    let helper = node("helpers", "helper", "helpers.py", Flavor::Function, (1, 4));
    graph.add_use(method, helper);
    graph
        .inheritance
        .insert(derived.clone(), vec![derived, base]);
    graph
}

#[test]
fn inherited_test_reports_under_both_classes() {
    let mut graph = inheritance_scenario();
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[2])]);
    assert_eq!(
        scan(&graph, &changed),
        vec![
            "test_base.py::TestBase::test_shared",
            "test_derived.py::TestDerived::test_shared",
        ]
    );
}

#[test]
fn suppressed_base_still_yields_derived_alias() {
    let mut graph = inheritance_scenario();
    graph
        .scope_flags
        .entry("test_base.TestBase".to_string())
        .or_default()
        .insert("__test__".to_string(), false);
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[2])]);
    assert_eq!(
        scan(&graph, &changed),
        vec!["test_derived.py::TestDerived::test_shared"],
        "each alias is judged against its own namespace's marker"
    );
}

#[test]
fn suppressed_derived_drops_only_the_alias() {
    let mut graph = inheritance_scenario();
    graph
        .scope_flags
        .entry("test_derived.TestDerived".to_string())
        .or_default()
        .insert("__test__".to_string(), false);
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[2])]);
    assert_eq!(
        scan(&graph, &changed),
        vec!["test_base.py::TestBase::test_shared"]
    );
}

#[test]
fn alias_direct_hit_uses_ancestor_span() {
    let mut graph = inheritance_scenario();
    augment(&mut graph);

    // Lines 2-6 of the *derived* file overlap the ancestor method's span;
    // the alias carries the derived filename with the ancestor span.
    let changed = changed(&[("test_derived.py", &[3])]);
    assert_eq!(
        scan(&graph, &changed),
        vec!["test_derived.py::TestDerived::test_shared"]
    );
}

#[test]
fn repeated_scans_are_identical() {
    let mut graph = helpers_scenario();
    augment(&mut graph);

    let changed = changed(&[("helpers.py", &[7]), ("test_a.py", &[5])]);
    let first = scan(&graph, &changed);
    let second = scan(&graph, &changed);
    assert_eq!(first, second);
    assert_eq!(first, vec!["test_a.py::test_func1"]);
}

#[test]
fn absolute_node_paths_match_relative_diff_paths() {
    let mut graph = CallGraph::default();
    let test = node(
        "test_a",
        "test_func1",
        "/repo/test_a.py",
        Flavor::Function,
        (4, 6),
    );
    graph.add_node(test);
    augment(&mut graph);

    let changed = changed(&[("test_a.py", &[5])]);
    let root = PathBuf::from("/repo");
    let tests = AffectedTestScanner::new(&graph, &changed, &root).collect_tests();
    assert_eq!(tests, vec!["test_a.py::test_func1"]);
}
