//! Observability tests for the evaluation pipeline.
//!
//! These tests check that the structured events carry the fields downstream
//! log processing keys on.

use std::collections::HashMap;
use std::sync::Arc;

use sumeval_core::fakes::{EchoCapability, FailingCapability};
use sumeval_core::obs::{emit_config_failed, emit_rating_rejected, emit_summarize_started};
use sumeval_core::{
    sum_eval, ConfigSpan, Configuration, CorpusRecord, ExtrinsicEvaluator, GenerationParams,
    ResultRecord, SubmitMode, Summarizer,
};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_summarize_started_logs_count() {
    emit_summarize_started(12);
    assert!(logs_contain("summarize.started"));
    assert!(logs_contain("Generating summaries for 12 articles"));
}

#[traced_test]
#[test]
fn test_emit_config_failed_logs_stage() {
    emit_config_failed("bart", "generation", &"connection refused");
    assert!(logs_contain("config.failed"));
    assert!(logs_contain("connection refused"));
}

#[traced_test]
#[test]
fn test_rejected_rating_diagnostic() {
    emit_rating_rejected("a7", &"rating 9 is outside 1-5");
    assert!(logs_contain("Invalid or missing score for ID a7. Skipping."));
}

#[traced_test]
#[test]
fn test_config_span_enter_creates_span() {
    let span = ConfigSpan::enter("lead_3");
    drop(span);
}

#[traced_test]
#[tokio::test]
async fn test_empty_corpus_is_signalled() {
    let summarizer = Summarizer::new(Arc::new(EchoCapability::new()));
    let out = summarizer
        .structured_batch_summarize(&Vec::<CorpusRecord>::new(), None, &GenerationParams::default())
        .await
        .unwrap();
    assert!(out.is_empty());
    assert!(logs_contain("corpus.empty"));
}

#[traced_test]
#[tokio::test]
async fn test_batch_completion_reports_duration() {
    let summarizer = Summarizer::new(Arc::new(EchoCapability::new()));
    let corpus = vec![CorpusRecord::new("1", "A B C", "A B C")];
    summarizer
        .structured_batch_summarize(&corpus, None, &GenerationParams::default())
        .await
        .unwrap();
    assert!(logs_contain("summarize.finished"));
    assert!(logs_contain("duration_ms="));
}

#[traced_test]
#[tokio::test]
async fn test_failed_configuration_is_logged() {
    let corpus = vec![CorpusRecord::new("1", "A B C", "A B C")];
    let configs = vec![Configuration::new(
        "broken",
        Summarizer::new(Arc::new(FailingCapability)),
    )];
    let scores = sum_eval(&corpus, configs).await.unwrap();
    assert!(scores.is_empty());
    assert!(logs_contain("config.failed"));
    assert!(logs_contain("capability unavailable"));
}

#[traced_test]
#[test]
fn test_out_of_range_rating_is_logged() {
    let record = ResultRecord::from_corpus(&CorpusRecord::new("r1", "a", "b"), "c".to_string());
    let mut eval = ExtrinsicEvaluator::new(vec![record]).unwrap();
    let ratings: HashMap<String, serde_json::Value> =
        [("r1".to_string(), serde_json::json!(6))].into_iter().collect();
    eval.submit_scores(&ratings, SubmitMode::Merge);
    assert!(logs_contain("Invalid or missing score for ID r1. Skipping."));
}
