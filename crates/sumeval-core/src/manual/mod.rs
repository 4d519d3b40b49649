//! Manual (extrinsic) rating of generated summaries.
//!
//! [`ExtrinsicEvaluator`] presents result records to a human reviewer,
//! accepts ratings on the [`ManualScore`] scale keyed by record key and keeps
//! their mean. Presentation and collection are separate steps: `evaluate`
//! only writes the prompts, `submit_scores` ingests the answers.

pub mod scale;

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EvalError, ResultRecord, Result, SkipReason};
use crate::evaluator::{Plot, ReportRender};
use crate::metrics::{Counter, METRICS};
use crate::obs;
use crate::reporting::{format_title, RatingBar, RatingChart, ScorePlotter};

pub use scale::ManualScore;

/// How a submission treats ratings stored by earlier submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Keep earlier ratings; new ratings overwrite per key.
    #[default]
    Merge,
    /// Drop earlier ratings before applying this submission.
    Replace,
}

/// Outcome of one `submit_scores` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    /// Keys whose rating was stored by this call.
    pub accepted: Vec<String>,
    /// Keys left out by this call and why.
    pub skipped: Vec<(String, SkipReason)>,
    /// Mean over every stored rating after this call.
    pub average: f64,
}

/// Collects human ratings for a fixed set of result records.
#[derive(Debug, Clone)]
pub struct ExtrinsicEvaluator {
    records: Vec<ResultRecord>,
    scores: BTreeMap<String, ManualScore>,
    average: f64,
}

impl ExtrinsicEvaluator {
    /// Fails with [`EvalError::Configuration`] when `records` is empty.
    pub fn new(records: Vec<ResultRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(EvalError::Configuration(
                "Articles must be provided.".to_string(),
            ));
        }
        Ok(Self {
            records,
            scores: BTreeMap::new(),
            average: 0.0,
        })
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    fn keyed_records(&self) -> impl Iterator<Item = (String, &ResultRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.key(idx), record))
    }

    /// Write the rating prompt for every record to `out`.
    pub fn evaluate(&self, label: &str, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "Manually evaluating {}...", label.to_uppercase())?;
        for (key, record) in self.keyed_records() {
            writeln!(out, "ID: {key}")?;
            writeln!(out, "Article:\n{}\n", record.article)?;
            writeln!(out, "Highlights:\n{}\n", record.highlights)?;
            writeln!(out, "Summary:\n{}\n", record.summary)?;
            writeln!(out, "How would you rate the summary for {key}?\n")?;
            for score in ManualScore::ALL {
                writeln!(out, "  {score}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Store the valid ratings in `id_to_score` and recompute the mean.
    ///
    /// Records whose rating is missing, not an integer or outside the scale
    /// are skipped with a diagnostic. Keys in `id_to_score` that match no
    /// record are ignored.
    pub fn submit_scores(
        &mut self,
        id_to_score: &HashMap<String, Value>,
        mode: SubmitMode,
    ) -> SubmissionSummary {
        if mode == SubmitMode::Replace {
            self.scores.clear();
        }

        let mut accepted = Vec::new();
        let mut skipped = Vec::new();
        let keyed: Vec<String> = self.keyed_records().map(|(key, _)| key).collect();

        for key in keyed {
            let outcome = match id_to_score.get(&key) {
                None => Err(SkipReason::MissingRating),
                Some(value) => ManualScore::from_json(value),
            };
            match outcome {
                Ok(score) => {
                    self.scores.insert(key.clone(), score);
                    accepted.push(key);
                }
                Err(reason) => {
                    METRICS.inc(Counter::RatingsRejected);
                    obs::emit_rating_rejected(&key, &reason);
                    skipped.push((key, reason));
                }
            }
        }

        self.average = mean(self.scores.values());
        SubmissionSummary {
            accepted,
            skipped,
            average: self.average,
        }
    }

    /// Drop every stored rating.
    pub fn clear(&mut self) {
        self.scores.clear();
        self.average = 0.0;
    }

    /// Copy of the stored ratings.
    pub fn scores(&self) -> BTreeMap<String, ManualScore> {
        self.scores.clone()
    }

    /// Mean of the stored ratings, 0.0 when there are none.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Count per scale point plus the mean.
    pub fn distribution(&self, label: &str) -> RatingChart {
        let bars = ManualScore::ALL
            .iter()
            .map(|&score| RatingBar {
                value: score.value(),
                name: format!("{} - {}", score.name(), score.value()),
                count: self.scores.values().filter(|&&s| s == score).count(),
            })
            .collect();
        RatingChart {
            label: label.to_string(),
            title: format!("{} - Manual Evaluation", format_title(label)),
            bars,
            average: self.average,
        }
    }
}

fn mean<'a>(scores: impl Iterator<Item = &'a ManualScore>) -> f64 {
    let values: Vec<f64> = scores.map(|s| f64::from(s.value())).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl ReportRender for ExtrinsicEvaluator {
    fn render_report(&self, label: &str) -> Option<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{label}");
        for (key, record) in self.keyed_records() {
            let _ = writeln!(out, "ID:\n{key}");
            let _ = writeln!(out, "Article:\n{}", record.article);
            let _ = writeln!(out, "Highlights:\n{}", record.highlights);
            let _ = writeln!(out, "Summary:\n{}", record.summary);
        }
        Some(out)
    }
}

impl Plot for ExtrinsicEvaluator {
    fn plot(
        &self,
        label: &str,
        plotter: &dyn ScorePlotter,
        save_path: Option<&Path>,
    ) -> Result<()> {
        plotter.plot_ratings(&self.distribution(label), save_path)
    }
}
