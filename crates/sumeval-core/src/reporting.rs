//! Reporting collaborators: chart data, plot artifacts and run reports.
//!
//! The evaluators never render graphics themselves. They build chart data
//! ([`RougeChart`], [`RatingChart`]) and hand it to a [`ScorePlotter`]. The
//! bundled [`JsonPlotArtifacts`] writes that data as JSON next to the
//! requested save path so any charting front end can pick it up.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AggregateScore, Result, RougeMetric};
use crate::orchestrator::{ConfigStatus, EvaluationRun};

/// Suffix for per-configuration ROUGE plots and the cross-model ROUGE comparison.
pub const ROUGE_SUFFIX: &str = "_re";

/// Suffix for manual rating plots.
pub const MANUAL_SUFFIX: &str = "_me";

/// `"Bart Large_cnn"` → `"bart_large_cnn"`.
pub fn slugify(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// `"bart_large_cnn"` → `"BART LARGE CNN"`.
pub fn format_title(label: &str) -> String {
    label.to_uppercase().replace('_', " ")
}

/// Per-example F1 values of one metric plus their mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: RougeMetric,
    pub values: Vec<f64>,
    pub mean: f64,
}

impl MetricSeries {
    pub fn new(metric: RougeMetric, values: Vec<f64>) -> Self {
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        Self {
            metric,
            values,
            mean,
        }
    }
}

/// ROUGE F1 by example index for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RougeChart {
    pub label: String,
    pub title: String,
    pub series: Vec<MetricSeries>,
}

/// One bar of the manual rating distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBar {
    pub value: u8,
    pub name: String,
    pub count: usize,
}

/// Manual rating distribution plus the mean rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChart {
    pub label: String,
    pub title: String,
    pub bars: Vec<RatingBar>,
    pub average: f64,
}

/// Reporting/plotting collaborator. Reads chart data, never scores.
pub trait ScorePlotter: Send + Sync {
    /// Per-example ROUGE chart for one configuration.
    fn plot_rouge(&self, chart: &RougeChart, save_path: Option<&Path>) -> Result<()>;

    /// Manual rating distribution for one configuration.
    fn plot_ratings(&self, chart: &RatingChart, save_path: Option<&Path>) -> Result<()>;

    /// Average ROUGE scores side by side for several configurations.
    fn plot_rouge_comparison(
        &self,
        scores: &[(String, AggregateScore)],
        save_path: Option<&Path>,
    ) -> Result<()>;

    /// Average manual rating side by side for several configurations.
    fn plot_rating_comparison(
        &self,
        averages: &[(String, f64)],
        save_path: Option<&Path>,
    ) -> Result<()>;
}

/// Plotter that only logs what it was asked to draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlotter;

impl ScorePlotter for NoopPlotter {
    fn plot_rouge(&self, chart: &RougeChart, _save_path: Option<&Path>) -> Result<()> {
        info!(event = "plot.rouge", title = %chart.title, series = chart.series.len());
        Ok(())
    }

    fn plot_ratings(&self, chart: &RatingChart, _save_path: Option<&Path>) -> Result<()> {
        info!(event = "plot.ratings", title = %chart.title, average = chart.average);
        Ok(())
    }

    fn plot_rouge_comparison(
        &self,
        scores: &[(String, AggregateScore)],
        _save_path: Option<&Path>,
    ) -> Result<()> {
        info!(event = "plot.rouge_comparison", models = scores.len());
        Ok(())
    }

    fn plot_rating_comparison(
        &self,
        averages: &[(String, f64)],
        _save_path: Option<&Path>,
    ) -> Result<()> {
        info!(event = "plot.rating_comparison", models = averages.len());
        Ok(())
    }
}

/// Writes chart data as pretty JSON: `{path}.json` for ROUGE charts,
/// `{path}_me.json` for rating charts, `{path}_re.json` / `{path}_me.json`
/// for the comparisons. Without a save path nothing is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPlotArtifacts;

#[derive(Serialize)]
struct RougeComparison<'a> {
    title: &'static str,
    metrics: Vec<&'static str>,
    models: Vec<ComparisonEntry<'a>>,
}

#[derive(Serialize)]
struct ComparisonEntry<'a> {
    label: &'a str,
    display: String,
    scores: &'a AggregateScore,
}

#[derive(Serialize)]
struct RatingComparison<'a> {
    title: &'static str,
    models: Vec<(&'a str, f64)>,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    info!(event = "plot.written", path = %path.display());
    Ok(())
}

impl ScorePlotter for JsonPlotArtifacts {
    fn plot_rouge(&self, chart: &RougeChart, save_path: Option<&Path>) -> Result<()> {
        match save_path {
            Some(path) => write_json(&with_suffix(path, ".json"), chart),
            None => NoopPlotter.plot_rouge(chart, None),
        }
    }

    fn plot_ratings(&self, chart: &RatingChart, save_path: Option<&Path>) -> Result<()> {
        match save_path {
            Some(path) => write_json(&with_suffix(path, &format!("{MANUAL_SUFFIX}.json")), chart),
            None => NoopPlotter.plot_ratings(chart, None),
        }
    }

    fn plot_rouge_comparison(
        &self,
        scores: &[(String, AggregateScore)],
        save_path: Option<&Path>,
    ) -> Result<()> {
        let Some(path) = save_path else {
            return NoopPlotter.plot_rouge_comparison(scores, None);
        };
        let data = RougeComparison {
            title: "Average ROUGE Scores by Model",
            metrics: RougeMetric::ALL.iter().map(|m| m.display_name()).collect(),
            models: scores
                .iter()
                .map(|(label, scores)| ComparisonEntry {
                    label,
                    display: format_title(label),
                    scores,
                })
                .collect(),
        };
        write_json(&with_suffix(path, &format!("{ROUGE_SUFFIX}.json")), &data)
    }

    fn plot_rating_comparison(
        &self,
        averages: &[(String, f64)],
        save_path: Option<&Path>,
    ) -> Result<()> {
        let Some(path) = save_path else {
            return NoopPlotter.plot_rating_comparison(averages, None);
        };
        let data = RatingComparison {
            title: "Average Manual Scores by Model",
            models: averages.iter().map(|(l, v)| (l.as_str(), *v)).collect(),
        };
        write_json(&with_suffix(path, &format!("{MANUAL_SUFFIX}.json")), &data)
    }
}

// ── run report ────────────────────────────────────────────────────────────

/// Markdown comparison of every configuration in a run.
pub fn render_run_report_md(run: &EvaluationRun) -> String {
    let mut out = String::new();
    out.push_str("# Summary Evaluation\n\n");
    out.push_str(&format!(
        "- run: `{}`\n- corpus digest: `{}`\n- records: {}\n\n",
        run.run_id, run.corpus_digest, run.corpus_len
    ));

    out.push_str("| Model | ROUGE-1 | ROUGE-2 | ROUGE-L | Valid |\n");
    out.push_str("|---|---|---|---|---|\n");
    for outcome in &run.outcomes {
        if let ConfigStatus::Scored {
            aggregate,
            valid_records,
            total_records,
        } = &outcome.status
        {
            let cell = |m: RougeMetric| {
                aggregate
                    .get(m)
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_else(|| "-".to_string())
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {}/{} |\n",
                format_title(&outcome.label),
                cell(RougeMetric::Rouge1),
                cell(RougeMetric::Rouge2),
                cell(RougeMetric::RougeL),
                valid_records,
                total_records,
            ));
        }
    }

    let omitted: Vec<_> = run
        .outcomes
        .iter()
        .filter(|o| !matches!(o.status, ConfigStatus::Scored { .. }))
        .collect();
    if !omitted.is_empty() {
        out.push_str("\n## Omitted\n");
        for outcome in omitted {
            match &outcome.status {
                ConfigStatus::Skipped { reason } => {
                    out.push_str(&format!("- `{}` skipped: {}\n", outcome.label, reason));
                }
                ConfigStatus::Failed { stage, reason } => {
                    out.push_str(&format!(
                        "- `{}` failed during {}: {}\n",
                        outcome.label, stage, reason
                    ));
                }
                ConfigStatus::Scored { .. } => {}
            }
        }
    }
    out
}

/// Write the run as pretty JSON.
pub fn write_run_report_json(path: &Path, run: &EvaluationRun) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(run).context("serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write the markdown rendering of the run.
pub fn write_run_report_md(path: &Path, run: &EvaluationRun) -> anyhow::Result<()> {
    std::fs::write(path, render_run_report_md(run)).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
