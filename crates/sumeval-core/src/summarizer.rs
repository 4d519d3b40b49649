//! Batch summarization harness.
//!
//! [`Summarizer`] drives a [`GenerationCapability`] over single texts, lists
//! of texts and corpora, merging its default [`GenerationParams`] with
//! per-call overrides. Records are processed strictly in order and every
//! capability call is awaited before the next one starts.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::capability::GenerationCapability;
use crate::corpus::CorpusSource;
use crate::domain::{GenerationError, GenerationParams, ResultRecord, Result};
use crate::metrics::{Counter, METRICS};
use crate::obs;

/// Pull `[0].summary_text` out of raw capability output.
pub fn extract_summary(output: &Value) -> std::result::Result<String, GenerationError> {
    let items = output.as_array().ok_or_else(|| {
        GenerationError::MalformedOutput("expected an array of generation results".to_string())
    })?;
    let first = items.first().ok_or_else(|| {
        GenerationError::MalformedOutput("capability returned no results".to_string())
    })?;
    first
        .get("summary_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::MalformedOutput(
                "first result has no string `summary_text` field".to_string(),
            )
        })
}

/// Harness around one generation capability and its default parameters.
#[derive(Clone)]
pub struct Summarizer {
    capability: Arc<dyn GenerationCapability>,
    defaults: GenerationParams,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Summarizer {
    /// Harness with the standard defaults (`min_length = 30`, `max_length = 100`).
    pub fn new(capability: Arc<dyn GenerationCapability>) -> Self {
        Self::with_defaults(capability, GenerationParams::standard())
    }

    pub fn with_defaults(
        capability: Arc<dyn GenerationCapability>,
        defaults: GenerationParams,
    ) -> Self {
        Self {
            capability,
            defaults,
        }
    }

    pub fn defaults(&self) -> &GenerationParams {
        &self.defaults
    }

    /// Summarize one text. Call-level `overrides` win over the defaults.
    pub async fn summarize(&self, text: &str, overrides: &GenerationParams) -> Result<String> {
        let params = self.defaults.merged(overrides);
        METRICS.inc(Counter::GenerationCalls);

        let output = match self.capability.generate(text, &params).await {
            Ok(output) => output,
            Err(e) => {
                METRICS.inc(Counter::GenerationFailures);
                return Err(GenerationError::Capability(format!("{e:#}")).into());
            }
        };

        extract_summary(&output).map_err(|e| {
            METRICS.inc(Counter::GenerationFailures);
            e.into()
        })
    }

    /// Summarize each text in order. The first failure aborts the batch.
    pub async fn batch_summarize<S: AsRef<str>>(
        &self,
        texts: &[S],
        overrides: &GenerationParams,
    ) -> Result<Vec<String>> {
        let mut summaries = Vec::with_capacity(texts.len());
        for text in texts {
            summaries.push(self.summarize(text.as_ref(), overrides).await?);
        }
        Ok(summaries)
    }

    /// Summarize the first `min(max_count, len)` records of `corpus` (all of
    /// them when `max_count` is `None`).
    ///
    /// An empty selection returns an empty vector without calling the
    /// capability. A generation failure stops processing and propagates.
    pub async fn structured_batch_summarize<C>(
        &self,
        corpus: &C,
        max_count: Option<usize>,
        overrides: &GenerationParams,
    ) -> Result<Vec<ResultRecord>>
    where
        C: CorpusSource + ?Sized,
    {
        let n = match max_count {
            Some(max) => max.min(corpus.len()),
            None => corpus.len(),
        };
        if n == 0 {
            obs::emit_corpus_empty();
            return Ok(Vec::new());
        }

        obs::emit_summarize_started(n);
        let start = Instant::now();

        let mut records = Vec::with_capacity(n);
        for i in 0..n {
            let record = corpus.record(i);
            let summary = self.summarize(&record.article, overrides).await?;
            records.push(ResultRecord::from_corpus(record, summary));
        }

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        obs::emit_summarize_finished(n, elapsed_ms);
        Ok(records)
    }
}
