use crate::loader::{discover_graphs, graph_stem, load_graph, load_kind_map, KindMap};
use crate::report::{
    read_json, write_json, GraphSummaryRecord, MergedRecord, ResultsDir,
};
use crate::RunManifest;
use agentrisk_core::{find_drivers, score};
use agentrisk_harness::{run_ensemble, summarize, EnsembleSpec, RunSummary};
use agentrisk_stats::{correlate, CorpusPoint, OutcomeMetric};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Parser)]
#[command(name = "agentrisk")]
#[command(about = "Reliability risk analysis for agent-collaboration graphs")]
#[command(long_about = "Structural entropy scoring and seeded stochastic execution \
simulation over directed agent-collaboration graphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate every graph under a directory and write brittleness summaries
    Simulate {
        /// Directory with *.json graphs (recurses)
        #[arg(long)]
        graphs: PathBuf,

        /// Output directory for results
        #[arg(long, default_value = "results")]
        results: PathBuf,

        /// Runs per graph
        #[arg(long, default_value_t = 300)]
        runs: usize,

        /// Global random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Step cap per run
        #[arg(long, default_value_t = 200)]
        step_cap: usize,

        /// Write per-run outcome files (default: summaries only)
        #[arg(long)]
        write_raw: bool,

        /// Directory for raw run files if --write-raw is set
        #[arg(long)]
        raw_dir: Option<PathBuf>,
    },

    /// Score one graph's structural entropy
    Score {
        /// Graph JSON file
        graph: PathBuf,

        /// JSON mapping node_id -> kind, overriding inference
        #[arg(long)]
        kind_map: Option<PathBuf>,

        /// Include the risk hub and anchor analysis
        #[arg(long)]
        drivers: bool,

        /// Also write the metrics to a report file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Merge simulation summaries with entropy metrics and correlate
    Correlate {
        /// Directory with *.json graphs (recurses)
        #[arg(long)]
        graphs: PathBuf,

        /// Results directory written by `simulate`
        #[arg(long, default_value = "results")]
        results: PathBuf,

        /// Outcome series to correlate against the entropy score
        #[arg(long, value_enum, default_value = "brittleness-index")]
        y: OutcomeArg,
    },

    /// Score two graphs side by side
    Compare {
        graph_a: PathBuf,
        graph_b: PathBuf,

        /// Kind map for graph A
        #[arg(long)]
        kind_map_a: Option<PathBuf>,

        /// Kind map for graph B
        #[arg(long)]
        kind_map_b: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OutcomeArg {
    #[value(name = "brittleness-index")]
    BrittlenessIndex,
    #[value(name = "failure-rate")]
    FailureRate,
}

impl From<OutcomeArg> for OutcomeMetric {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::BrittlenessIndex => OutcomeMetric::BrittlenessIndex,
            OutcomeArg::FailureRate => OutcomeMetric::FailureRate,
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_simulate_command(
    graphs: &Path,
    results: &Path,
    runs: usize,
    seed: u64,
    step_cap: usize,
    write_raw: bool,
    raw_dir: Option<&Path>,
) -> Result<()> {
    let t0 = Instant::now();
    let graph_files = discover_graphs(graphs);
    if graph_files.is_empty() {
        bail!("no JSON graphs found under {}", graphs.display());
    }

    let results_dir = ResultsDir::new(results);
    let raw_dir = raw_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| results.join("raw_runs"));
    let spec_template = EnsembleSpec::new(runs, step_cap, seed);

    let mut summaries: BTreeMap<String, RunSummary> = BTreeMap::new();
    for path in &graph_files {
        let stem = graph_stem(path);
        let graph = load_graph(path, &KindMap::new())?;
        let outcomes = run_ensemble(&graph, &spec_template);

        if write_raw {
            for outcome in &outcomes {
                let raw_path = raw_dir.join(format!("{stem}_seed{}.json", outcome.seed));
                write_json(&raw_path, outcome)?;
            }
        }

        let summary = summarize(&outcomes);
        debug!(graph = %stem, failure_rate = summary.failure_rate, "simulated");
        write_json(
            &results_dir.graph_summary(&stem),
            &GraphSummaryRecord {
                graph: path.display().to_string(),
                summary: summary.clone(),
            },
        )?;
        summaries.insert(stem, summary);
    }

    let manifest = RunManifest::new(seed, runs, step_cap, graph_files.len());
    write_json(&results_dir.metadata(), &manifest)?;
    write_json(&results_dir.all_summaries(), &summaries)?;

    println!(
        "[harness] Simulated {} graphs in {:.2}s; output -> {}",
        graph_files.len(),
        t0.elapsed().as_secs_f64(),
        results.display()
    );
    Ok(())
}

pub fn run_score_command(
    graph_path: &Path,
    kind_map: Option<&Path>,
    drivers: bool,
    report: Option<&Path>,
) -> Result<()> {
    let kinds = match kind_map {
        Some(path) => load_kind_map(path)?,
        None => KindMap::new(),
    };
    let graph = load_graph(graph_path, &kinds)?;
    let metrics = score(&graph);

    let mut output = serde_json::to_value(&metrics)?;
    output["graph"] = json!(graph_path.display().to_string());
    if drivers {
        output["drivers"] = serde_json::to_value(find_drivers(&graph))?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    if let Some(report_path) = report {
        write_json(report_path, &output)?;
        println!("Report saved to: {}", report_path.display());
    }
    Ok(())
}

pub fn run_correlate_command(graphs: &Path, results: &Path, y: OutcomeArg) -> Result<()> {
    let results_dir = ResultsDir::new(results);
    let summaries_path = results_dir.all_summaries();
    if !summaries_path.exists() {
        bail!("harness summaries not found; run `agentrisk simulate` first");
    }
    let summaries: BTreeMap<String, RunSummary> = read_json(&summaries_path)?;

    let graph_files = discover_graphs(graphs);
    if graph_files.is_empty() {
        bail!("no JSON graphs found under {}", graphs.display());
    }

    let metric = OutcomeMetric::from(y);
    let mut merged = Vec::new();
    let mut points = Vec::new();
    for path in &graph_files {
        let stem = graph_stem(path);
        let Some(summary) = summaries.get(&stem) else {
            continue;
        };

        let graph = load_graph(path, &KindMap::new())?;
        let entropy = score(&graph);
        let outcome = match metric {
            OutcomeMetric::BrittlenessIndex => summary.brittleness_index,
            OutcomeMetric::FailureRate => summary.failure_rate,
        };
        points.push(CorpusPoint {
            graph: stem.clone(),
            entropy_score: entropy.entropy_score,
            outcome,
        });
        merged.push(MergedRecord::new(
            stem,
            path.display().to_string(),
            summary.clone(),
            entropy,
        ));
    }

    write_json(&results_dir.merged_results(), &merged)?;

    let report = correlate(metric, points);
    write_json(&results_dir.correlation(), &report)?;

    println!("Points:");
    for point in &report.points {
        println!(
            "  {:>20}  entropy={:.3}  y={:.3}",
            point.graph, point.entropy_score, point.outcome
        );
    }
    println!();
    println!("Pearson r = {:.3}", report.pearson);
    println!("Spearman rho = {:.3}", report.spearman);
    println!(
        "Fit: y = {:.3} + {:.3} x",
        report.fit_intercept, report.fit_slope
    );
    Ok(())
}

pub fn run_compare_command(
    graph_a: &Path,
    graph_b: &Path,
    kind_map_a: Option<&Path>,
    kind_map_b: Option<&Path>,
) -> Result<()> {
    let side = |path: &Path, kind_map: Option<&Path>| -> Result<serde_json::Value> {
        let kinds = match kind_map {
            Some(km) => load_kind_map(km)?,
            None => KindMap::new(),
        };
        let graph = load_graph(path, &kinds)?;
        let metrics = score(&graph);
        let drivers = find_drivers(&graph);
        Ok(json!({
            "graph": path.display().to_string(),
            "metrics": metrics,
            "drivers": drivers,
        }))
    };

    let a = side(graph_a, kind_map_a)?;
    let b = side(graph_b, kind_map_b)?;
    let delta = a["metrics"]["entropy_score"].as_f64().unwrap_or(0.0)
        - b["metrics"]["entropy_score"].as_f64().unwrap_or(0.0);

    let comparison = json!({
        "a": a,
        "b": b,
        "entropy_delta_a_minus_b": delta,
    });
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}
