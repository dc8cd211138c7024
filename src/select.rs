//! Pipeline orchestration
//!
//! One invocation: translate the diff, bail out early when no Python source
//! changed, drive the provider over the source tree, augment the graph, scan.
//! Nothing persists across runs; the graph and changed-line map live for one
//! call and are dropped with the result.

use crate::provider::{self, GraphProvider};
use crate::scanner::AffectedTestScanner;
use crate::{augment, diff};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Outcome of one selection run.
#[derive(Debug, Serialize)]
pub struct SelectResult {
    /// Qualified test names, sorted and deduplicated.
    pub tests: Vec<String>,
    /// Files touched by the diff (any extension).
    pub changed_files: usize,
    /// Python sources fed to the provider; 0 on the early-exit path.
    pub python_files: usize,
    /// Distinct nodes in the augmented graph; 0 on the early-exit path.
    pub graph_nodes: usize,
    pub duration_ms: u64,
}

/// Select the tests affected by `git diff <selector>` under `repo_root`.
///
/// When the diff touches no `.py` file the provider is never invoked — graph
/// construction is the expensive step and cannot change the empty answer.
pub fn select_tests(
    repo_root: &Path,
    selector: &str,
    provider: &mut dyn GraphProvider,
) -> Result<SelectResult> {
    let started = Instant::now();
    let root = repo_root
        .canonicalize()
        .with_context(|| format!("resolve repo root {}", repo_root.display()))?;

    let changed = diff::changed_lines(&root, selector)?;
    let changed_files = changed.len();
    if !changed.keys().any(|path| path.ends_with(".py")) {
        eprintln!("diffsel: no python file in the change, skipping graph construction");
        return Ok(SelectResult {
            tests: Vec::new(),
            changed_files,
            python_files: 0,
            graph_nodes: 0,
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }

    let files = provider::python_files(&root)?;
    eprintln!("diffsel: analyzing {} python files", files.len());
    let mut graph = provider::build_graph(provider, &files)?;
    augment::augment(&mut graph);

    let tests = AffectedTestScanner::new(&graph, &changed, &root).collect_tests();

    Ok(SelectResult {
        tests,
        changed_files,
        python_files: files.len(),
        graph_nodes: graph.node_count(),
        duration_ms: started.elapsed().as_millis() as u64,
    })
}
