use agentrisk_core::{Graph, Node, NodeKind};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// On-disk graph schema.
///
/// Edges may be given per node (`nodes[].edges`) or as a flat list of
/// `[source, target]` pairs; both forms may appear in one file. Simulation
/// parameters ride along under the reserved `__harness` key so that graph
/// files exported from orchestration frameworks stay loadable unchanged.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    #[serde(default)]
    pub start_node: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub edges: Vec<String>,
    #[serde(default, rename = "__harness")]
    pub harness: Option<HarnessOverrides>,
}

/// Per-node simulation overrides.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HarnessOverrides {
    #[serde(default)]
    pub failure_prob: Option<f64>,
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default)]
    pub loop_policy: Option<LoopPolicy>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoopPolicy {
    pub max_iters: u32,
}

/// External kind overrides, id -> kind.
pub type KindMap = BTreeMap<String, NodeKind>;

pub fn load_kind_map(path: &Path) -> Result<KindMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading kind map {}", path.display()))?;
    let map = serde_json::from_str(&text)
        .with_context(|| format!("parsing kind map {}", path.display()))?;
    Ok(map)
}

/// Resolve a parsed graph file into the validated graph model.
///
/// Kind precedence: kind map override, then the file's explicit kind, then
/// inference from identifier and label. Kind-map keys missing from the graph
/// are warned about, never fatal.
pub fn graph_from_file(file: GraphFile, kind_map: &KindMap) -> Result<Graph> {
    let graph_ids: BTreeSet<&str> = file.nodes.iter().map(|n| n.id.as_str()).collect();
    for key in kind_map.keys() {
        if !graph_ids.contains(key.as_str()) {
            warn!(node = %key, "kind map key not found in graph");
        }
    }

    let mut nodes = Vec::with_capacity(file.nodes.len());
    for entry in &file.nodes {
        let kind = kind_map
            .get(&entry.id)
            .copied()
            .or(entry.kind)
            .unwrap_or_else(|| NodeKind::infer(&entry.id, entry.label.as_deref()));

        let overrides = entry.harness.clone().unwrap_or_default();
        let mut node = Node::new(entry.id.clone(), kind).with_edges(entry.edges.clone());
        if let Some(p) = overrides.failure_prob {
            node = node.with_failure_prob(p);
        }
        if let Some(retry) = overrides.retry_policy {
            node = node.with_max_retries(retry.max_retries);
        }
        if let Some(looping) = overrides.loop_policy {
            node = node.with_loop_cap(looping.max_iters);
        }
        nodes.push(node);
    }

    // Attach flat edge pairs to their source nodes
    for (from, to) in &file.edges {
        match nodes.iter_mut().find(|n| &n.id == from) {
            Some(node) => node.edges.push(to.clone()),
            None => bail!("edge `{from}` -> `{to}` references unknown node `{from}`"),
        }
    }

    let start = match file.start_node {
        Some(start) => start,
        None => file
            .nodes
            .first()
            .map(|n| n.id.clone())
            .unwrap_or_default(),
    };

    Ok(Graph::new(nodes, start)?)
}

pub fn load_graph(path: &Path, kind_map: &KindMap) -> Result<Graph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph {}", path.display()))?;
    let file: GraphFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing graph {}", path.display()))?;
    debug!(path = %path.display(), nodes = file.nodes.len(), "loaded graph file");
    graph_from_file(file, kind_map)
}

/// All `*.json` graph files under a directory, recursively, in sorted order.
pub fn discover_graphs(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// File stem used to key summaries and reports.
pub fn graph_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
