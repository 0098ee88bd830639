use agentrisk_core::EntropyMetrics;
use agentrisk_harness::RunSummary;
use agentrisk_stats::wilson95;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Results directory layout shared by the subcommands:
///
/// <base>/summary/<stem>.summary.json     one per graph
/// <base>/summary/ALL.summaries.json      stem -> summary
/// <base>/summary/metadata.json           run manifest
/// <base>/summary/all_results.json        merged brittleness + entropy
/// <base>/summary/correlation.json        corpus correlation report
#[derive(Clone, Debug)]
pub struct ResultsDir {
    base: PathBuf,
}

impl ResultsDir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.base.join("summary")
    }

    pub fn graph_summary(&self, stem: &str) -> PathBuf {
        self.summary_dir().join(format!("{stem}.summary.json"))
    }

    pub fn all_summaries(&self) -> PathBuf {
        self.summary_dir().join("ALL.summaries.json")
    }

    pub fn metadata(&self) -> PathBuf {
        self.summary_dir().join("metadata.json")
    }

    pub fn merged_results(&self) -> PathBuf {
        self.summary_dir().join("all_results.json")
    }

    pub fn correlation(&self) -> PathBuf {
        self.summary_dir().join("correlation.json")
    }
}

/// Per-graph summary as written to disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphSummaryRecord {
    pub graph: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}

/// One row of the merged corpus report: brittleness summary, Wilson
/// confidence intervals for the observed rates, and entropy metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MergedRecord {
    pub graph: String,
    pub path: String,
    #[serde(flatten)]
    pub summary: RunSummary,
    pub failure_rate_ci95: [f64; 2],
    pub loop_rate_ci95: [f64; 2],
    pub timeout_rate_ci95: [f64; 2],
    pub ci_method: String,
    #[serde(flatten)]
    pub entropy: EntropyMetrics,
}

impl MergedRecord {
    pub fn new(
        graph: String,
        path: String,
        summary: RunSummary,
        entropy: EntropyMetrics,
    ) -> Self {
        let n = summary.runs;
        let failure_ci = wilson95(summary.failure_rate, n);
        let loop_ci = wilson95(summary.loop_rate, n);
        let timeout_ci = wilson95(summary.timeout_rate, n);
        Self {
            graph,
            path,
            summary,
            failure_rate_ci95: [failure_ci.0, failure_ci.1],
            loop_rate_ci95: [loop_ci.0, loop_ci.1],
            timeout_rate_ci95: [timeout_ci.0, timeout_ci.1],
            ci_method: "wilson".to_string(),
            entropy,
        }
    }
}

/// Write a value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}
