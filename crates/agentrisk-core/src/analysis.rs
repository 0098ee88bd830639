use crate::graph::{Graph, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Presentation-oriented structural drivers of a graph's risk profile.
///
/// Read-only pass over the graph model; never feeds scoring or simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drivers {
    /// Generative node with the highest betweenness centrality, if any
    /// generative node exists.
    pub risk_hub: Option<String>,
    /// Deterministic nodes with total degree >= 2 (fan-in/out points).
    pub anchors: Vec<String>,
    /// Distinct generative-to-generative edges.
    pub gg_edges: Vec<(String, String)>,
}

pub fn find_drivers(graph: &Graph) -> Drivers {
    let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    let index_of = |id: &str| ids.binary_search(&id).ok();

    // Distinct edges only; duplicates would skew path counts and degrees.
    let mut edge_set: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (from, to) in graph.edges() {
        if let (Some(u), Some(v)) = (index_of(from), index_of(to)) {
            edge_set.insert((u, v));
        }
    }
    let n = ids.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut degree = vec![0usize; n];
    for &(u, v) in &edge_set {
        adjacency[u].push(v);
        degree[u] += 1;
        degree[v] += 1;
    }

    let centrality = betweenness(&adjacency);

    let mut risk_hub: Option<(usize, f64)> = None;
    let mut anchors = Vec::new();
    let mut gg_edges = Vec::new();
    for (i, node) in graph.nodes().enumerate() {
        match node.kind {
            NodeKind::Generative => {
                let better = match risk_hub {
                    Some((_, best)) => centrality[i] > best,
                    None => true,
                };
                if better {
                    risk_hub = Some((i, centrality[i]));
                }
            }
            NodeKind::Deterministic => {
                if degree[i] >= 2 {
                    anchors.push(node.id.clone());
                }
            }
            NodeKind::Aux => {}
        }
    }
    for &(u, v) in &edge_set {
        let from_gen = matches!(
            graph.node(ids[u]).map(|n| n.kind),
            Some(NodeKind::Generative)
        );
        let to_gen = matches!(
            graph.node(ids[v]).map(|n| n.kind),
            Some(NodeKind::Generative)
        );
        if from_gen && to_gen {
            gg_edges.push((ids[u].to_string(), ids[v].to_string()));
        }
    }

    Drivers {
        risk_hub: risk_hub.map(|(i, _)| ids[i].to_string()),
        anchors,
        gg_edges,
    }
}

/// Betweenness centrality for an unweighted directed graph (Brandes),
/// normalized by (n-1)(n-2).
fn betweenness(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    for source in 0..n {
        // Breadth-first shortest-path counting
        let mut stack: Vec<usize> = Vec::new();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        sigma[source] = 1.0;
        dist[source] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adjacency[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        // Dependency accumulation in reverse finish order
        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for value in &mut centrality {
            *value *= scale;
        }
    }
    centrality
}
