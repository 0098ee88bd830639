use agentrisk_core::{simulate, Disposition, Graph, NodeKind, RunOutcome, RunRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub mod resilience;
pub use resilience::{quadrant, resilience_index, Quadrant};

/// Ensemble configuration for the behavioral pass over one graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnsembleSpec {
    pub runs: usize,
    pub step_cap: usize,
    pub global_seed: u64,
}

impl EnsembleSpec {
    pub fn new(runs: usize, step_cap: usize, global_seed: u64) -> Self {
        Self {
            runs,
            step_cap,
            global_seed,
        }
    }
}

impl Default for EnsembleSpec {
    fn default() -> Self {
        Self {
            runs: 300,
            step_cap: 200,
            global_seed: 42,
        }
    }
}

/// Summary statistics for one graph's run population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub runs: usize,
    pub failure_rate: f64,
    pub avg_retries: f64,
    pub loop_rate: f64,
    pub timeout_rate: f64,
    pub mean_path_len_success: f64,
    pub mean_path_len_failure: f64,
    pub handoff_error_rate: f64,
    pub brittleness_index: f64,
}

impl RunSummary {
    fn zero() -> Self {
        Self {
            runs: 0,
            failure_rate: 0.0,
            avg_retries: 0.0,
            loop_rate: 0.0,
            timeout_rate: 0.0,
            mean_path_len_success: 0.0,
            mean_path_len_failure: 0.0,
            handoff_error_rate: 0.0,
            brittleness_index: 0.0,
        }
    }
}

/// Run the ensemble in parallel across run indices.
///
/// Each run owns a private stream derived from `(global_seed, run_index)`,
/// so the output is byte-identical regardless of thread count; results are
/// collected in run-index order.
pub fn run_ensemble(graph: &Graph, spec: &EnsembleSpec) -> Vec<RunOutcome> {
    (0..spec.runs)
        .into_par_iter()
        .map(|run_id| {
            simulate(
                graph,
                spec.step_cap,
                RunRng::derive_seed(spec.global_seed, run_id as u64),
            )
        })
        .collect()
}

/// Serial equivalent of [`run_ensemble`], used for determinism checks.
pub fn run_ensemble_serial(graph: &Graph, spec: &EnsembleSpec) -> Vec<RunOutcome> {
    (0..spec.runs)
        .map(|run_id| {
            simulate(
                graph,
                spec.step_cap,
                RunRng::derive_seed(spec.global_seed, run_id as u64),
            )
        })
        .collect()
}

/// Reduce a run population to its summary statistics.
///
/// An empty population yields the all-zero summary by convention. The
/// handoff error rate is computed over generative-to-generative handoff
/// events only, and is zero when no such event occurred. The brittleness
/// index caps the retry contribution so pathological retry counts cannot
/// dominate:
///
/// brittleness = 0.6 * failure_rate + 0.2 * loop_rate
///             + 0.2 * min(1, avg_retries / 2)
pub fn summarize(outcomes: &[RunOutcome]) -> RunSummary {
    let n = outcomes.len();
    if n == 0 {
        return RunSummary::zero();
    }

    let failures = outcomes.iter().filter(|o| !o.success()).count();
    let timeouts = outcomes
        .iter()
        .filter(|o| o.disposition == Disposition::Timeout)
        .count();
    let loops = outcomes.iter().filter(|o| o.touched_loop).count();

    let avg_retries = mean(outcomes.iter().map(|o| o.retries as f64));
    let mean_path_len_success = mean(
        outcomes
            .iter()
            .filter(|o| o.success())
            .map(|o| o.steps as f64),
    );
    let mean_path_len_failure = mean(
        outcomes
            .iter()
            .filter(|o| !o.success())
            .map(|o| o.steps as f64),
    );

    let mut gg_total = 0usize;
    let mut gg_errors = 0usize;
    for outcome in outcomes {
        for handoff in &outcome.handoffs {
            if handoff.from_kind == NodeKind::Generative
                && handoff.to_kind == NodeKind::Generative
            {
                gg_total += 1;
                if !handoff.ok {
                    gg_errors += 1;
                }
            }
        }
    }
    let handoff_error_rate = if gg_total == 0 {
        0.0
    } else {
        gg_errors as f64 / gg_total as f64
    };

    let failure_rate = failures as f64 / n as f64;
    let loop_rate = loops as f64 / n as f64;
    let timeout_rate = timeouts as f64 / n as f64;
    let brittleness_index =
        0.6 * failure_rate + 0.2 * loop_rate + 0.2 * (avg_retries / 2.0).min(1.0);

    RunSummary {
        runs: n,
        failure_rate,
        avg_retries,
        loop_rate,
        timeout_rate,
        mean_path_len_success,
        mean_path_len_failure,
        handoff_error_rate,
        brittleness_index,
    }
}

/// Behavioral pass for one graph: simulate, then summarize.
pub fn measure(graph: &Graph, spec: &EnsembleSpec) -> RunSummary {
    summarize(&run_ensemble(graph, spec))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
