//! Orchestrator isolation tests.

use std::sync::Arc;

use sumeval_core::fakes::{
    EchoCapability, FailingCapability, PlotCall, RecordingPlotter, ScriptedCapability,
};
use sumeval_core::{
    sum_eval, ConfigStatus, Configuration, CorpusRecord, EvaluationOrchestrator, RougeMetric,
    Summarizer,
};

fn echo(label: &str) -> Configuration {
    Configuration::new(label, Summarizer::new(Arc::new(EchoCapability::new())))
}

#[tokio::test]
async fn test_echo_on_identical_reference_scores_one() {
    let corpus = vec![CorpusRecord::new("1", "A B C", "A B C")];
    let scores = sum_eval(&corpus, vec![echo("echo")]).await.unwrap();

    let aggregate = &scores["echo"];
    for metric in RougeMetric::ALL {
        assert_eq!(aggregate.get(metric), Some(1.0), "{metric}");
    }
}

#[tokio::test]
async fn test_failing_configuration_is_omitted() {
    let corpus = vec![CorpusRecord::new("1", "A B C", "A B C")];
    let configs = vec![
        Configuration::new("broken", Summarizer::new(Arc::new(FailingCapability))),
        echo("echo"),
    ];

    let scores = sum_eval(&corpus, configs).await.unwrap();
    assert_eq!(scores.len(), 1);
    assert!(scores.contains_key("echo"));
    assert!(!scores.contains_key("broken"));
}

#[tokio::test]
async fn test_single_failed_call_drops_whole_configuration() {
    let corpus = vec![
        CorpusRecord::new("1", "alpha beta gamma", "alpha beta gamma"),
        CorpusRecord::new("2", "delta epsilon zeta", "delta epsilon zeta"),
        CorpusRecord::new("3", "eta theta iota", "eta theta iota"),
    ];
    let flaky = Arc::new(ScriptedCapability::failing_on(2));
    let configs = vec![
        Configuration::new("flaky", Summarizer::new(flaky.clone())),
        echo("steady"),
    ];

    let run = EvaluationOrchestrator::new(configs)
        .unwrap()
        .run(&corpus)
        .await
        .unwrap();

    // Processing stopped at the failing record.
    assert_eq!(flaky.calls(), 2);
    assert_eq!(run.scores().keys().collect::<Vec<_>>(), vec!["steady"]);
    match &run.outcomes[1].status {
        ConfigStatus::Scored { valid_records, .. } => assert_eq!(*valid_records, 3),
        other => panic!("unexpected status {other:?}"),
    }
}

#[tokio::test]
async fn test_no_valid_summaries_is_skipped() {
    let corpus = vec![CorpusRecord::new("1", "some text", "some text")];
    let configs = vec![Configuration::new(
        "blank",
        Summarizer::new(Arc::new(ScriptedCapability::empty_summary())),
    )];
    let run = EvaluationOrchestrator::new(configs)
        .unwrap()
        .run(&corpus)
        .await
        .unwrap();
    assert!(matches!(run.outcomes[0].status, ConfigStatus::Skipped { .. }));
    assert!(run.scores().is_empty());
}

#[tokio::test]
async fn test_configurations_do_not_share_state() {
    let corpus = vec![
        CorpusRecord::new("1", "the cat sat", "the cat sat"),
        CorpusRecord::new("2", "a dog ran", "the dog ran far"),
    ];
    let alone = sum_eval(&corpus, vec![echo("a")]).await.unwrap();
    let together = sum_eval(&corpus, vec![echo("a"), echo("b")]).await.unwrap();

    assert_eq!(alone["a"], together["a"]);
    assert_eq!(together["a"], together["b"]);
}

#[tokio::test]
async fn test_max_count_and_plot_path() {
    let corpus = vec![
        CorpusRecord::new("1", "one two three", "one two three"),
        CorpusRecord::new("2", "four five six", "four five six"),
    ];
    let plotter = Arc::new(RecordingPlotter::new());
    let run = EvaluationOrchestrator::new(vec![echo("Lead 3")])
        .unwrap()
        .with_max_count(1)
        .with_results_dir("/tmp/sumeval-results")
        .with_plotter(plotter.clone())
        .run(&corpus)
        .await
        .unwrap();

    match &run.outcomes[0].status {
        ConfigStatus::Scored { total_records, .. } => assert_eq!(*total_records, 1),
        other => panic!("unexpected status {other:?}"),
    }

    let calls = plotter.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        PlotCall::Rouge(chart, Some(path)) => {
            assert_eq!(chart.title, "LEAD 3 - ROUGE METRICS");
            assert!(path.ends_with("lead_3_re"));
        }
        other => panic!("unexpected plot call {other:?}"),
    }
}

#[tokio::test]
async fn test_run_records_corpus_digest() {
    let corpus = vec![CorpusRecord::new("1", "A B C", "A B C")];
    let orchestrator = EvaluationOrchestrator::new(vec![echo("echo")]).unwrap();
    let first = orchestrator.run(&corpus).await.unwrap();
    let second = orchestrator.run(&corpus).await.unwrap();

    assert_eq!(first.corpus_digest, second.corpus_digest);
    assert_eq!(first.corpus_digest.len(), 64);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.corpus_len, 1);
    assert!(first.outcomes[0].params_digest.is_some());
}
