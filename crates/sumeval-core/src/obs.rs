//! Structured observability hooks for the evaluation pipeline.
//!
//! Provides a configuration-scoped span guard and emit functions for the
//! pipeline's lifecycle events. Everything is emitted through `tracing`, so
//! the subscriber set up by [`crate::telemetry::init_tracing`] decides where
//! diagnostics end up.

use tracing::{info, warn};

use crate::domain::AggregateScore;

/// RAII guard that enters a span tagged with the configuration label.
///
/// ```ignore
/// let _span = ConfigSpan::enter("bart_large_cnn");
/// // every event below carries config = "bart_large_cnn"
/// ```
pub struct ConfigSpan {
    _span: tracing::span::EnteredSpan,
}

impl ConfigSpan {
    pub fn enter(label: &str) -> Self {
        Self {
            _span: config_span(label).entered(),
        }
    }
}

/// Span tagged with the configuration label, for instrumenting futures.
pub fn config_span(label: &str) -> tracing::Span {
    tracing::info_span!("sumeval.config", config = %label)
}

/// Emit event: summarization of `count` records started.
pub fn emit_summarize_started(count: usize) {
    info!(event = "summarize.started", count = count, "Generating summaries for {count} articles");
}

/// Emit event: summarization finished.
pub fn emit_summarize_finished(count: usize, duration_ms: u64) {
    info!(
        event = "summarize.finished",
        count = count,
        duration_ms = duration_ms,
        "Completed in {duration_ms} ms",
    );
}

/// Emit event: the corpus handed to the harness was empty.
pub fn emit_corpus_empty() {
    info!(event = "corpus.empty", "Corpus is empty.");
}

/// Emit event: a configuration produced an aggregate score.
pub fn emit_config_scored(label: &str, valid: usize, total: usize, aggregate: &AggregateScore) {
    let scores: Vec<String> = aggregate
        .iter()
        .map(|(metric, value)| format!("{metric}={value:.4}"))
        .collect();
    info!(
        event = "config.scored",
        config = %label,
        valid_records = valid,
        total_records = total,
        scores = %scores.join(" "),
    );
}

/// Emit event: a configuration had nothing to score (warning level).
pub fn emit_config_skipped(label: &str, reason: &str) {
    warn!(event = "config.skipped", config = %label, reason = %reason);
}

/// Emit event: a configuration failed and was dropped from the run (warning level).
pub fn emit_config_failed(label: &str, stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "config.failed", config = %label, stage = %stage, error = %error);
}

/// Emit event: a result record was excluded from scoring.
pub fn emit_record_skipped(key: &str, reason: &dyn std::fmt::Display) {
    tracing::debug!(event = "record.skipped", key = %key, reason = %reason);
}

/// Emit event: a manual rating was rejected (warning level).
pub fn emit_rating_rejected(key: &str, reason: &dyn std::fmt::Display) {
    warn!(
        event = "rating.rejected",
        key = %key,
        reason = %reason,
        "Invalid or missing score for ID {key}. Skipping."
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_span_create() {
        let _span = ConfigSpan::enter("lead_3");
        emit_config_skipped("lead_3", "no valid summaries");
    }
}
