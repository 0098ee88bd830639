use crate::graph::{Graph, NodeKind};
use crate::rng::RunRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal disposition of a simulated run. Exactly one holds per run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Success,
    /// A node exhausted its attempts or its loop budget.
    StructuralFailure,
    /// The global step cap fired.
    Timeout,
}

/// One control transfer between consecutive nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub from_kind: NodeKind,
    pub to_kind: NodeKind,
    pub ok: bool,
}

/// Everything observed during one stochastic walk of a graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub disposition: Disposition,
    /// Failed attempts that were followed by another attempt, attributed to
    /// the node being retried.
    pub retries: u32,
    pub steps: usize,
    /// Set whenever any node was visited more than once, independent of
    /// whether a loop budget also fired.
    pub touched_loop: bool,
    pub path: Vec<String>,
    pub handoffs: Vec<Handoff>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.disposition == Disposition::Success
    }

    pub fn timeout(&self) -> bool {
        self.disposition == Disposition::Timeout
    }
}

/// Walk the graph once from its start node, one node visit per step.
///
/// Per step, in order:
/// 1. step cap: past `step_cap` the run times out;
/// 2. loop budget: a node visited beyond its `loop_max_iters` terminates the
///    run as a structural failure; any revisit marks the run loop-touched;
/// 3. attempts: `max_retries + 1` tries, each succeeding with probability
///    `1 - failure_prob`; exhausting them is a structural failure;
/// 4. advancement: a node with no outgoing edges terminates as success,
///    otherwise one edge is chosen uniformly and the handoff recorded.
///
/// Deterministic given the same seed: all draws come from a private stream,
/// so equal inputs produce bit-identical outcomes. Never fails on a valid
/// graph; runs that cannot make progress end via the structural-failure or
/// timeout path.
pub fn simulate(graph: &Graph, step_cap: usize, seed: u64) -> RunOutcome {
    walk(graph, graph.start(), step_cap, seed)
}

/// Walk from an explicit start node instead of the graph's designated one.
/// `None` when `start` is not a node of the graph.
pub fn simulate_from(
    graph: &Graph,
    start: &str,
    step_cap: usize,
    seed: u64,
) -> Option<RunOutcome> {
    graph.node(start)?;
    Some(walk(graph, start, step_cap, seed))
}

fn walk(graph: &Graph, start: &str, step_cap: usize, seed: u64) -> RunOutcome {
    let mut rng = RunRng::new(seed);
    let mut retries: u32 = 0;
    let mut steps: usize = 0;
    let mut visits: HashMap<&str, u32> = HashMap::new();
    let mut touched_loop = false;
    let mut path: Vec<String> = Vec::new();
    let mut handoffs: Vec<Handoff> = Vec::new();

    let mut node = graph.resolved(start);
    loop {
        steps += 1;
        if steps > step_cap {
            return RunOutcome {
                seed,
                disposition: Disposition::Timeout,
                retries,
                steps: step_cap,
                touched_loop,
                path,
                handoffs,
            };
        }

        path.push(node.id.clone());

        // Loop budget
        let seen = visits.entry(node.id.as_str()).or_insert(0);
        *seen += 1;
        if let Some(cap) = node.loop_max_iters {
            if *seen > cap {
                return RunOutcome {
                    seed,
                    disposition: Disposition::StructuralFailure,
                    retries,
                    steps,
                    touched_loop: true,
                    path,
                    handoffs,
                };
            }
        }
        if *seen > 1 {
            touched_loop = true;
        }

        // Attempts + retries
        let mut attempts_left = node.max_retries + 1;
        let mut succeeded = false;
        while attempts_left > 0 {
            if rng.attempt(node.failure_prob) {
                succeeded = true;
                break;
            }
            attempts_left -= 1;
            if attempts_left > 0 {
                retries += 1;
            }
        }
        if !succeeded {
            return RunOutcome {
                seed,
                disposition: Disposition::StructuralFailure,
                retries,
                steps,
                touched_loop,
                path,
                handoffs,
            };
        }

        // Advance
        if node.edges.is_empty() {
            return RunOutcome {
                seed,
                disposition: Disposition::Success,
                retries,
                steps,
                touched_loop,
                path,
                handoffs,
            };
        }
        let next = graph.resolved(&node.edges[rng.choose_edge(node.edges.len())]);
        handoffs.push(Handoff {
            from_kind: node.kind,
            to_kind: next.kind,
            ok: true,
        });
        node = next;
    }
}
