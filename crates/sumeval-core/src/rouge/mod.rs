//! Overlap scoring engine.
//!
//! [`RougeEvaluator`] scores prediction/reference pairs with any subset of
//! ROUGE-1, ROUGE-2 and ROUGE-L, keeps the per-pair F1 rows of the last
//! [`evaluate`](RougeEvaluator::evaluate) call and their per-metric mean.
//! Every call recomputes everything; nothing accumulates across calls.

pub mod scoring;
pub mod tokenize;

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::domain::{AggregateScore, EvalError, Result, RougeMetric, ScoreRow};
use crate::evaluator::{Evaluator, Plot, ReportRender};
use crate::reporting::{format_title, MetricSeries, RougeChart, ScorePlotter};

pub use scoring::Score;
pub use tokenize::{split_sentences, DefaultTokenizer, Tokenizer};

/// Builder for [`RougeEvaluator`].
pub struct RougeEvaluatorBuilder {
    metrics: Vec<String>,
    use_stemmer: bool,
    split_summaries: bool,
    tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl Default for RougeEvaluatorBuilder {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            use_stemmer: true,
            split_summaries: false,
            tokenizer: None,
        }
    }
}

impl RougeEvaluatorBuilder {
    /// Metric identifiers (`rouge1`, `rouge2`, `rougeL`). Empty means all three.
    pub fn metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn use_stemmer(mut self, use_stemmer: bool) -> Self {
        self.use_stemmer = use_stemmer;
        self
    }

    /// Score ROUGE-L at summary level: union-LCS over sentences, the
    /// measure other tools report as `rougeLsum`. The result is still
    /// labelled `rougeL`, so it is not comparable with sentence-agnostic
    /// `rougeL` numbers. ROUGE-1 and ROUGE-2 are unaffected.
    pub fn split_summaries(mut self, split_summaries: bool) -> Self {
        self.split_summaries = split_summaries;
        self
    }

    /// Replace the default tokenizer. Stemming is then up to the tokenizer.
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Fails with [`EvalError::Configuration`] listing every unknown identifier.
    pub fn build(self) -> Result<RougeEvaluator> {
        let mut metrics = Vec::new();
        let mut invalid = Vec::new();
        for id in &self.metrics {
            match id.parse::<RougeMetric>() {
                Ok(metric) if !metrics.contains(&metric) => metrics.push(metric),
                Ok(_) => {}
                Err(_) => invalid.push(id.clone()),
            }
        }
        if !invalid.is_empty() {
            return Err(EvalError::Configuration(format!(
                "Invalid ROUGE types: {invalid:?}"
            )));
        }
        if metrics.is_empty() {
            metrics = RougeMetric::ALL.to_vec();
        }

        let tokenizer = self
            .tokenizer
            .unwrap_or_else(|| Arc::new(DefaultTokenizer::new(self.use_stemmer)));

        Ok(RougeEvaluator {
            metrics,
            use_stemmer: self.use_stemmer,
            split_summaries: self.split_summaries,
            tokenizer,
            scores: Vec::new(),
            aggregate: AggregateScore::default(),
            evaluated: false,
        })
    }
}

/// ROUGE scoring engine with cached results of the last run.
pub struct RougeEvaluator {
    metrics: Vec<RougeMetric>,
    use_stemmer: bool,
    split_summaries: bool,
    tokenizer: Arc<dyn Tokenizer>,
    scores: Vec<ScoreRow>,
    aggregate: AggregateScore,
    evaluated: bool,
}

impl fmt::Debug for RougeEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RougeEvaluator")
            .field("metrics", &self.metrics)
            .field("use_stemmer", &self.use_stemmer)
            .field("split_summaries", &self.split_summaries)
            .field("rows", &self.scores.len())
            .finish()
    }
}

impl Default for RougeEvaluator {
    /// All three metrics, stemming on, no sentence splitting.
    fn default() -> Self {
        Self {
            metrics: RougeMetric::ALL.to_vec(),
            use_stemmer: true,
            split_summaries: false,
            tokenizer: Arc::new(DefaultTokenizer::new(true)),
            scores: Vec::new(),
            aggregate: AggregateScore::default(),
            evaluated: false,
        }
    }
}

impl RougeEvaluator {
    pub fn builder() -> RougeEvaluatorBuilder {
        RougeEvaluatorBuilder::default()
    }

    /// Shorthand for `builder().metrics(metrics).build()`.
    pub fn with_metrics<I, S>(metrics: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().metrics(metrics).build()
    }

    pub fn metrics(&self) -> &[RougeMetric] {
        &self.metrics
    }

    pub fn use_stemmer(&self) -> bool {
        self.use_stemmer
    }

    pub fn split_summaries(&self) -> bool {
        self.split_summaries
    }

    /// Precision/recall/F1 of every configured metric for one pair.
    pub fn score_pair(&self, reference: &str, prediction: &str) -> BTreeMap<RougeMetric, Score> {
        let ref_tokens = self.tokenizer.tokenize(reference);
        let pred_tokens = self.tokenizer.tokenize(prediction);

        self.metrics
            .iter()
            .map(|&metric| {
                let score = match metric {
                    RougeMetric::Rouge1 => scoring::rouge_n(&ref_tokens, &pred_tokens, 1),
                    RougeMetric::Rouge2 => scoring::rouge_n(&ref_tokens, &pred_tokens, 2),
                    RougeMetric::RougeL if self.split_summaries => scoring::rouge_l_summary(
                        &self.sentence_tokens(reference),
                        &self.sentence_tokens(prediction),
                    ),
                    RougeMetric::RougeL => scoring::rouge_l(&ref_tokens, &pred_tokens),
                };
                (metric, score)
            })
            .collect()
    }

    fn sentence_tokens(&self, text: &str) -> Vec<Vec<String>> {
        split_sentences(text)
            .into_iter()
            .map(|s| self.tokenizer.tokenize(s))
            .collect()
    }

    /// Score every pair, replace the cached rows and return the per-metric mean.
    ///
    /// Fails with [`EvalError::LengthMismatch`] when the inputs differ in
    /// length; cached scores are left untouched in that case.
    pub fn evaluate<P, R>(&mut self, predictions: &[P], references: &[R]) -> Result<AggregateScore>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if predictions.len() != references.len() {
            return Err(EvalError::LengthMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }

        let rows: Vec<ScoreRow> = predictions
            .iter()
            .zip(references)
            .map(|(pred, reference)| {
                self.score_pair(reference.as_ref(), pred.as_ref())
                    .into_iter()
                    .map(|(metric, score)| (metric, score.fmeasure))
                    .collect()
            })
            .collect();

        self.aggregate = AggregateScore::from_rows(&self.metrics, &rows);
        self.scores = rows;
        self.evaluated = true;
        Ok(self.aggregate.clone())
    }

    /// Copy of the per-pair rows from the last run.
    pub fn scores(&self) -> Vec<ScoreRow> {
        self.scores.clone()
    }

    /// Copy of the aggregate from the last run.
    pub fn aggregate(&self) -> AggregateScore {
        self.aggregate.clone()
    }

    fn check_scores(&self) -> bool {
        if !self.evaluated {
            warn!("No scores available. Run evaluate() first.");
        }
        self.evaluated
    }

    /// Report for the named metrics (all configured ones when `None`).
    /// Names that are not configured are reported as not supported.
    pub fn render_metrics_report(&self, label: &str, metrics: Option<&[&str]>) -> Option<String> {
        if !self.check_scores() {
            return None;
        }

        let names: Vec<&str> = match metrics {
            Some(names) if !names.is_empty() => names.to_vec(),
            _ => self.metrics.iter().map(|m| m.as_str()).collect(),
        };

        let mut out = String::new();
        let _ = writeln!(out, "ROUGE Evaluation Report - {}", label.to_uppercase());
        for name in names {
            let score = name
                .parse::<RougeMetric>()
                .ok()
                .and_then(|m| self.aggregate.get(m));
            let _ = match score {
                Some(score) => writeln!(out, "{:>7}: {score:.4}", name.to_uppercase()),
                None => writeln!(out, "{:>7}: Not supported", name.to_uppercase()),
            };
        }
        Some(out)
    }

    /// Per-metric series for the named metrics, in canonical metric order.
    /// `None` when nothing has been evaluated or no requested metric is configured.
    pub fn chart(&self, label: &str, metrics: Option<&[&str]>) -> Option<RougeChart> {
        if !self.check_scores() {
            return None;
        }

        let requested: Vec<RougeMetric> = match metrics {
            Some(names) if !names.is_empty() => {
                names.iter().filter_map(|n| n.parse().ok()).collect()
            }
            _ => self.metrics.clone(),
        };

        let series: Vec<MetricSeries> = RougeMetric::ALL
            .iter()
            .copied()
            .filter(|m| requested.contains(m) && self.metrics.contains(m))
            .map(|metric| {
                let values: Vec<f64> = self
                    .scores
                    .iter()
                    .filter_map(|row| row.get(&metric).copied())
                    .collect();
                MetricSeries::new(metric, values)
            })
            .collect();

        if series.is_empty() {
            warn!("No valid metrics to plot.");
            return None;
        }

        Some(RougeChart {
            label: label.to_string(),
            title: format!("{} - ROUGE METRICS", format_title(label)),
            series,
        })
    }

    /// Plot the named metrics through `plotter`. No-ops when there is nothing to plot.
    pub fn plot_metrics(
        &self,
        label: &str,
        metrics: Option<&[&str]>,
        plotter: &dyn ScorePlotter,
        save_path: Option<&Path>,
    ) -> Result<()> {
        match self.chart(label, metrics) {
            Some(chart) => plotter.plot_rouge(&chart, save_path),
            None => Ok(()),
        }
    }
}

impl Evaluator for RougeEvaluator {
    fn score(&mut self, predictions: &[String], references: &[String]) -> Result<AggregateScore> {
        self.evaluate(predictions, references)
    }
}

impl ReportRender for RougeEvaluator {
    fn render_report(&self, label: &str) -> Option<String> {
        self.render_metrics_report(label, None)
    }
}

impl Plot for RougeEvaluator {
    fn plot(
        &self,
        label: &str,
        plotter: &dyn ScorePlotter,
        save_path: Option<&Path>,
    ) -> Result<()> {
        self.plot_metrics(label, None, plotter, save_path)
    }
}
