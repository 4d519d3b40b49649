//! Multi-configuration evaluation runs.
//!
//! [`EvaluationOrchestrator`] runs every configuration over its own copy of
//! the corpus, scores the valid records with a fresh [`RougeEvaluator`] and
//! records one [`ConfigOutcome`] per configuration. A configuration that
//! fails or has nothing to score never stops the others; it is simply left
//! out of [`EvaluationRun::scores`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::digest::compute_digest;
use crate::domain::{AggregateScore, CorpusRecord, EvalError, GenerationParams, Result};
use crate::evaluator::Plot;
use crate::metrics::{Counter, METRICS};
use crate::obs;
use crate::reporting::{slugify, NoopPlotter, ScorePlotter, ROUGE_SUFFIX};
use crate::rouge::RougeEvaluator;
use crate::summarizer::Summarizer;

/// A labelled summarizer evaluated as one unit.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub label: String,
    pub summarizer: Summarizer,
}

impl Configuration {
    pub fn new(label: impl Into<String>, summarizer: Summarizer) -> Self {
        Self {
            label: label.into(),
            summarizer,
        }
    }
}

/// Pipeline stage a configuration failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generation,
    Scoring,
    Plot,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Generation => "generation",
            Stage::Scoring => "scoring",
            Stage::Plot => "plot",
        })
    }
}

/// What happened to one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfigStatus {
    Scored {
        aggregate: AggregateScore,
        valid_records: usize,
        total_records: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOutcome {
    pub label: String,
    /// Digest of the summarizer's default parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_digest: Option<String>,
    #[serde(flatten)]
    pub status: ConfigStatus,
}

impl ConfigOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self.status, ConfigStatus::Scored { .. })
    }
}

/// Typed record of one orchestrated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub corpus_digest: String,
    pub corpus_len: usize,
    pub outcomes: Vec<ConfigOutcome>,
}

impl EvaluationRun {
    /// Label → aggregate for the configurations that were scored.
    pub fn scores(&self) -> BTreeMap<String, AggregateScore> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                ConfigStatus::Scored { aggregate, .. } => {
                    Some((o.label.clone(), aggregate.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> impl Iterator<Item = &ConfigOutcome> {
        self.outcomes.iter().filter(|o| o.is_scored())
    }

    /// Skipped and failed configurations.
    pub fn failures(&self) -> impl Iterator<Item = &ConfigOutcome> {
        self.outcomes.iter().filter(|o| !o.is_scored())
    }
}

/// Runs a fixed, ordered list of configurations over a corpus.
pub struct EvaluationOrchestrator {
    configurations: Vec<Configuration>,
    max_count: Option<usize>,
    results_dir: Option<PathBuf>,
    plotter: Arc<dyn ScorePlotter>,
}

impl fmt::Debug for EvaluationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationOrchestrator")
            .field("configurations", &self.configurations)
            .field("max_count", &self.max_count)
            .field("results_dir", &self.results_dir)
            .finish_non_exhaustive()
    }
}

impl EvaluationOrchestrator {
    /// Fails with [`EvalError::Configuration`] on duplicate labels.
    pub fn new(configurations: Vec<Configuration>) -> Result<Self> {
        let mut seen = HashSet::new();
        for config in &configurations {
            if !seen.insert(config.label.as_str()) {
                return Err(EvalError::Configuration(format!(
                    "duplicate configuration label: {}",
                    config.label
                )));
            }
        }
        Ok(Self {
            configurations,
            max_count: None,
            results_dir: None,
            plotter: Arc::new(NoopPlotter),
        })
    }

    /// Summarize at most `max_count` records per configuration.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Save per-configuration ROUGE plots under `dir`.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    pub fn with_plotter(mut self, plotter: Arc<dyn ScorePlotter>) -> Self {
        self.plotter = plotter;
        self
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Evaluate every configuration in order.
    ///
    /// Only fails when the corpus itself cannot be digested; everything that
    /// goes wrong inside a configuration ends up in its outcome.
    pub async fn run(&self, corpus: &[CorpusRecord]) -> Result<EvaluationRun> {
        let mut run = EvaluationRun {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            corpus_digest: compute_digest(corpus)?,
            corpus_len: corpus.len(),
            outcomes: Vec::with_capacity(self.configurations.len()),
        };

        for config in &self.configurations {
            let status = self
                .run_configuration(config, corpus)
                .instrument(obs::config_span(&config.label))
                .await;
            run.outcomes.push(ConfigOutcome {
                label: config.label.clone(),
                params_digest: compute_digest(config.summarizer.defaults()).ok(),
                status,
            });
        }

        METRICS.flush();
        Ok(run)
    }

    async fn run_configuration(
        &self,
        config: &Configuration,
        corpus: &[CorpusRecord],
    ) -> ConfigStatus {
        let label = config.label.as_str();
        let working: Vec<CorpusRecord> = corpus.to_vec();

        let results = match config
            .summarizer
            .structured_batch_summarize(&working, self.max_count, &GenerationParams::default())
            .await
        {
            Ok(results) => results,
            Err(e) => return failed(label, Stage::Generation, &e),
        };

        let total_records = results.len();
        let mut predictions = Vec::with_capacity(total_records);
        let mut references = Vec::with_capacity(total_records);
        for (idx, record) in results.iter().enumerate() {
            match record.skip_reason() {
                Some(reason) => obs::emit_record_skipped(&record.key(idx), &reason),
                None => {
                    predictions.push(record.summary.as_str());
                    references.push(record.highlights.as_str());
                }
            }
        }

        if predictions.is_empty() {
            let reason = "no valid summaries to evaluate";
            obs::emit_config_skipped(label, reason);
            return ConfigStatus::Skipped {
                reason: reason.to_string(),
            };
        }

        let mut evaluator = RougeEvaluator::default();
        let aggregate = match evaluator.evaluate(&predictions, &references) {
            Ok(aggregate) => aggregate,
            Err(e) => return failed(label, Stage::Scoring, &e),
        };

        let save_path = self
            .results_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}{ROUGE_SUFFIX}", slugify(label))));
        if let Err(e) = evaluator.plot(label, self.plotter.as_ref(), save_path.as_deref()) {
            return failed(label, Stage::Plot, &e);
        }

        let valid_records = predictions.len();
        METRICS.add(Counter::RecordsScored, valid_records as u64);
        obs::emit_config_scored(label, valid_records, total_records, &aggregate);
        ConfigStatus::Scored {
            aggregate,
            valid_records,
            total_records,
        }
    }
}

fn failed(label: &str, stage: Stage, error: &EvalError) -> ConfigStatus {
    obs::emit_config_failed(label, stage.to_string().as_str(), error);
    ConfigStatus::Failed {
        stage,
        reason: error.to_string(),
    }
}

/// Run every configuration over `corpus` and return the aggregate scores of
/// the ones that succeeded, keyed by label.
pub async fn sum_eval(
    corpus: &[CorpusRecord],
    configurations: Vec<Configuration>,
) -> Result<BTreeMap<String, AggregateScore>> {
    let run = EvaluationOrchestrator::new(configurations)?.run(corpus).await?;
    Ok(run.scores())
}
