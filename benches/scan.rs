use criterion::{Criterion, black_box, criterion_group, criterion_main};
use diffsel::augment::augment;
use diffsel::model::{CallGraph, ChangedLines, Flavor, Node, Span};
use diffsel::scanner::AffectedTestScanner;
use std::collections::BTreeSet;
use std::path::Path;

fn function(namespace: &str, name: &str, filename: &str, start: u32) -> Node {
    Node {
        namespace: namespace.to_string(),
        name: name.to_string(),
        filename: filename.to_string(),
        flavor: Flavor::Function,
        span: Some(Span::new(start, start + 4)),
    }
}

/// `tests` test functions, each entering a shared call chain of `depth`
/// helpers. Worst case for the scanner: every test walks the full chain.
fn chain_graph(tests: usize, depth: usize) -> CallGraph {
    let mut graph = CallGraph::default();
    let mut chain = Vec::with_capacity(depth);
    for i in 0..depth {
        chain.push(function("helpers", &format!("helper_{i}"), "helpers.py", (i as u32) * 10 + 1));
    }
    for pair in chain.windows(2) {
        graph.add_use(pair[0].clone(), pair[1].clone());
    }
    if let Some(last) = chain.last() {
        graph.add_node(last.clone());
    }
    for i in 0..tests {
        let test = function("test_a", &format!("test_{i}"), "test_a.py", (i as u32) * 10 + 1);
        graph.add_use(test, chain[0].clone());
    }
    graph
}

fn changed_at(file: &str, line: u32) -> ChangedLines {
    let mut changed = ChangedLines::new();
    changed.insert(file.to_string(), BTreeSet::from([line]));
    changed
}

fn bench_scan(c: &mut Criterion) {
    let mut graph = chain_graph(100, 1000);
    augment(&mut graph);
    let root = Path::new(".");

    // Change at the chain tail: every test walks the whole chain to the hit.
    let tail_hit = changed_at("helpers.py", 999 * 10 + 2);
    c.bench_function("scan_100_tests_chain_1000_tail_hit", |b| {
        b.iter(|| {
            let scanner = AffectedTestScanner::new(&graph, &tail_hit, root);
            black_box(scanner.collect_tests())
        })
    });

    // No hit anywhere: full exhaustive traversal per test.
    let miss = changed_at("unrelated.py", 1);
    c.bench_function("scan_100_tests_chain_1000_miss", |b| {
        b.iter(|| {
            let scanner = AffectedTestScanner::new(&graph, &miss, root);
            black_box(scanner.collect_tests())
        })
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
