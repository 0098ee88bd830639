use crate::graph::{Graph, NodeKind};
use serde::{Deserialize, Serialize};

/// Qualitative band for a structural entropy score.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl EntropyLevel {
    /// Band thresholds: < 0.30 Low, < 0.60 Moderate, < 0.90 High, else Very High.
    pub fn from_score(score: f64) -> Self {
        if score < 0.30 {
            EntropyLevel::Low
        } else if score < 0.60 {
            EntropyLevel::Moderate
        } else if score < 0.90 {
            EntropyLevel::High
        } else {
            EntropyLevel::VeryHigh
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntropyLevel::Low => "Low",
            EntropyLevel::Moderate => "Moderate",
            EntropyLevel::High => "High",
            EntropyLevel::VeryHigh => "Very High",
        }
    }
}

/// Structural risk metrics computed from topology alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntropyMetrics {
    pub generative_nodes: usize,
    pub deterministic_nodes: usize,
    pub gen_to_gen_edges: usize,
    pub coupling_factor: f64,
    pub entropy_score: f64,
    pub entropy_level: EntropyLevel,
}

/// Structural entropy of a classified graph.
///
/// With G generative and D deterministic nodes (aux nodes excluded) and GG
/// generative-to-generative edges:
///
/// coupling = 1 + sqrt(GG) / G            (1.0 when G = 0)
/// score    = (G / max(1, G + D)) * coupling + 0.1 * GG
///
/// The ratio term measures exposure to non-deterministic steps; the coupling
/// term penalizes chained generative handoffs with square-root damping; the
/// additive GG term separates tightly-coupled small graphs from
/// loosely-coupled large ones. Total on every input, including empty and
/// single-node graphs.
pub fn score(graph: &Graph) -> EntropyMetrics {
    let mut generative = 0usize;
    let mut deterministic = 0usize;
    for node in graph.nodes() {
        match node.kind {
            NodeKind::Generative => generative += 1,
            NodeKind::Deterministic => deterministic += 1,
            NodeKind::Aux => {}
        }
    }

    let is_generative = |id: &str| {
        graph
            .node(id)
            .map(|n| n.kind == NodeKind::Generative)
            .unwrap_or(false)
    };
    let gen_to_gen = graph
        .edges()
        .filter(|&(from, to)| is_generative(from) && is_generative(to))
        .count();

    let coupling_factor = if generative == 0 {
        1.0
    } else {
        1.0 + (gen_to_gen as f64).sqrt() / generative as f64
    };
    let total = (generative + deterministic).max(1);
    let entropy_score =
        (generative as f64 / total as f64) * coupling_factor + 0.1 * gen_to_gen as f64;

    EntropyMetrics {
        generative_nodes: generative,
        deterministic_nodes: deterministic,
        gen_to_gen_edges: gen_to_gen,
        coupling_factor,
        entropy_score,
        entropy_level: EntropyLevel::from_score(entropy_score),
    }
}
