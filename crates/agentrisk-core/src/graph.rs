use crate::error::GraphError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default per-attempt failure probability for generative nodes.
pub const DEFAULT_GENERATIVE_FAILURE_PROB: f64 = 0.12;
/// Default per-attempt failure probability for deterministic nodes.
pub const DEFAULT_DETERMINISTIC_FAILURE_PROB: f64 = 0.02;

/// Identifiers with this prefix are auxiliary bookkeeping nodes, excluded
/// from structural scoring.
pub const AUX_PREFIX: &str = "__";

lazy_static! {
    // Hint vocabulary for model-driven steps, word- or underscore-delimited.
    static ref GEN_HINTS: Regex = Regex::new(
        r"(?i)(?:\b|_)(llm|gpt|model|generate|generator|writer|assistant|agent|supervisor)(?:\b|_)",
    )
    .unwrap();
}

/// Structural classification of a computation step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Generative,
    Deterministic,
    Aux,
}

impl NodeKind {
    /// Classify a node from its identifier and optional display label.
    pub fn infer(id: &str, label: Option<&str>) -> Self {
        if id.starts_with(AUX_PREFIX) {
            return NodeKind::Aux;
        }
        let text = match label {
            Some(label) => format!("{id} {label}"),
            None => id.to_string(),
        };
        if GEN_HINTS.is_match(&text) {
            NodeKind::Generative
        } else {
            NodeKind::Deterministic
        }
    }

    pub fn default_failure_prob(self) -> f64 {
        match self {
            NodeKind::Generative => DEFAULT_GENERATIVE_FAILURE_PROB,
            NodeKind::Deterministic | NodeKind::Aux => DEFAULT_DETERMINISTIC_FAILURE_PROB,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Generative => "generative",
            NodeKind::Deterministic => "deterministic",
            NodeKind::Aux => "aux",
        }
    }
}

/// One computation step plus its simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Outgoing edge targets. Duplicates and self-loops are legal.
    pub edges: Vec<String>,
    pub failure_prob: f64,
    pub max_retries: u32,
    /// Visit budget for this node; `None` means unbounded.
    pub loop_max_iters: Option<u32>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            edges: Vec::new(),
            failure_prob: kind.default_failure_prob(),
            max_retries: 0,
            loop_max_iters: None,
        }
    }

    /// Build a node, classifying it from its identifier.
    pub fn inferred(id: impl Into<String>) -> Self {
        let id = id.into();
        let kind = NodeKind::infer(&id, None);
        Self::new(id, kind)
    }

    pub fn with_edges<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_failure_prob(mut self, p: f64) -> Self {
        self.failure_prob = p;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_loop_cap(mut self, max_iters: u32) -> Self {
        self.loop_max_iters = Some(max_iters);
        self
    }
}

/// Immutable directed graph of computation steps.
///
/// Construction validates every invariant the simulator relies on: at least
/// one node, every edge endpoint present, the start node present, failure
/// probabilities in [0, 1], loop caps at least 1. The simulator never
/// mutates node definitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    start: String,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, start: impl Into<String>) -> Result<Self, GraphError> {
        let start = start.into();
        if nodes.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut by_id = BTreeMap::new();
        for node in nodes {
            if !(0.0..=1.0).contains(&node.failure_prob) {
                return Err(GraphError::FailureProbOutOfRange {
                    node: node.id.clone(),
                    value: node.failure_prob,
                });
            }
            if node.loop_max_iters == Some(0) {
                return Err(GraphError::ZeroLoopCap {
                    node: node.id.clone(),
                });
            }
            by_id.insert(node.id.clone(), node);
        }

        for node in by_id.values() {
            for target in &node.edges {
                if !by_id.contains_key(target) {
                    return Err(GraphError::DanglingEdge {
                        from: node.id.clone(),
                        to: target.clone(),
                    });
                }
            }
        }
        if !by_id.contains_key(&start) {
            return Err(GraphError::MissingStart(start));
        }

        Ok(Self {
            nodes: by_id,
            start,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Flattened (source, target) pairs, duplicates included.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .values()
            .flat_map(|n| n.edges.iter().map(move |t| (n.id.as_str(), t.as_str())))
    }

    pub fn num_edges(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }

    /// Lookup for identifiers already validated as present (start node,
    /// edge targets).
    pub(crate) fn resolved(&self, id: &str) -> &Node {
        self.nodes
            .get(id)
            .expect("node id validated at construction")
    }
}
