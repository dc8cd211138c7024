//! Call graph provider contract
//!
//! Graph construction (parsing, name binding, defines/uses edges, MRO
//! computation) is an external concern. The core consumes any component that
//! implements [`GraphProvider`]: a per-file processing hook, a finalization
//! hook that resolves imports once every file has been seen, and a handoff of
//! the finished [`CallGraph`].
//!
//! [`JsonGraphProvider`] adapts analyzers that run out of process and export
//! their graph as a JSON file.

use crate::model::{CallGraph, Node};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// External static-analysis component that builds the call graph.
pub trait GraphProvider {
    /// Per-file processing hook, called once per source file in walk order.
    fn process_file(&mut self, path: &Path) -> Result<()>;

    /// Finalization hook. Runs after every file has been processed and before
    /// any edge is trusted.
    fn resolve_imports(&mut self) -> Result<()>;

    /// Hand the finished graph to the caller. Called once, last.
    fn take_graph(&mut self) -> CallGraph;
}

/// Drive a provider over the file set.
///
/// A failure on one file is reported and skipped — that file contributes no
/// nodes, but a single unparsable source must not prevent selecting tests
/// affected by the others. A failing finalization pass is fatal: without
/// resolved imports no edge can be trusted.
pub fn build_graph(provider: &mut dyn GraphProvider, files: &[PathBuf]) -> Result<CallGraph> {
    for file in files {
        if let Err(err) = provider.process_file(file) {
            eprintln!("diffsel: skipping {}: {err:#}", file.display());
        }
    }
    provider.resolve_imports().context("resolve imports")?;
    Ok(provider.take_graph())
}

/// Collect every `.py` file under `root`, honoring ignore files, in sorted
/// order so providers see a deterministic sequence.
pub fn python_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
        if is_file && entry.path().extension().and_then(OsStr::to_str) == Some("py") {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Flat wire format for a graph exported by an external analyzer. Node-keyed
/// maps do not survive JSON, so each index is a list of entries.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphFile {
    /// Definition nodes with their outgoing uses. Nodes without uses still
    /// get an entry so they remain discoverable as scan roots.
    #[serde(default)]
    pub uses: Vec<UsesEntry>,
    /// Decorator expressions attached to definition nodes.
    #[serde(default)]
    pub decorators: Vec<DecoratorEntry>,
    /// Literal boolean bindings in class/module scopes.
    #[serde(default)]
    pub scopes: Vec<ScopeFlagEntry>,
    /// Class nodes with their linearized ancestor order (self first).
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsesEntry {
    pub node: Node,
    #[serde(default)]
    pub uses: Vec<Node>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecoratorEntry {
    pub node: Node,
    pub decorators: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeFlagEntry {
    pub namespace: String,
    pub name: String,
    pub value: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassEntry {
    pub class: Node,
    #[serde(default)]
    pub mro: Vec<Node>,
}

impl GraphFile {
    pub fn into_graph(self) -> CallGraph {
        let mut graph = CallGraph::default();
        for entry in self.uses {
            graph.add_node(entry.node.clone());
            for used in entry.uses {
                graph.add_use(entry.node.clone(), used);
            }
        }
        for entry in self.decorators {
            graph.index_node(&entry.node);
            graph
                .decorators
                .entry(entry.node)
                .or_default()
                .extend(entry.decorators);
        }
        for entry in self.scopes {
            graph
                .scope_flags
                .entry(entry.namespace)
                .or_default()
                .insert(entry.name, entry.value);
        }
        for entry in self.classes {
            graph.index_node(&entry.class);
            graph.inheritance.insert(entry.class, entry.mro);
        }
        graph
    }
}

/// Provider backed by a graph export on disk. The analysis already ran out of
/// process, so the per-file hook only counts progress and finalization is a
/// no-op — the export is required to arrive import-resolved.
pub struct JsonGraphProvider {
    graph: CallGraph,
    files_seen: usize,
}

impl JsonGraphProvider {
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read graph export {}", path.display()))?;
        let wire: GraphFile = serde_json::from_str(&content)
            .with_context(|| format!("parse graph export {}", path.display()))?;
        Ok(Self {
            graph: wire.into_graph(),
            files_seen: 0,
        })
    }

    pub fn files_seen(&self) -> usize {
        self.files_seen
    }
}

impl GraphProvider for JsonGraphProvider {
    fn process_file(&mut self, _path: &Path) -> Result<()> {
        self.files_seen += 1;
        Ok(())
    }

    fn resolve_imports(&mut self) -> Result<()> {
        Ok(())
    }

    fn take_graph(&mut self) -> CallGraph {
        std::mem::take(&mut self.graph)
    }
}
