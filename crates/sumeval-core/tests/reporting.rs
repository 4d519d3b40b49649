//! Plot artifacts and run reports written to disk.

use std::sync::Arc;

use sumeval_core::fakes::{EchoCapability, FailingCapability};
use sumeval_core::reporting::{
    render_run_report_md, write_run_report_json, write_run_report_md, RougeChart,
};
use sumeval_core::{
    AggregateScore, Configuration, CorpusRecord, EvaluationOrchestrator, EvaluationRun,
    JsonPlotArtifacts, RougeMetric, ScorePlotter, Summarizer,
};

async fn sample_run(results_dir: &std::path::Path) -> EvaluationRun {
    let corpus = vec![
        CorpusRecord::new("1", "the cat sat on the mat", "the cat sat on the mat"),
        CorpusRecord::new("2", "a dog barked loudly", "the dog barked"),
    ];
    let configs = vec![
        Configuration::new("Echo Model", Summarizer::new(Arc::new(EchoCapability::new()))),
        Configuration::new("broken", Summarizer::new(Arc::new(FailingCapability))),
    ];
    EvaluationOrchestrator::new(configs)
        .unwrap()
        .with_results_dir(results_dir)
        .with_plotter(Arc::new(JsonPlotArtifacts))
        .run(&corpus)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_orchestrator_writes_rouge_artifact_per_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let run = sample_run(dir.path()).await;

    let artifact = dir.path().join("echo_model_re.json");
    let chart: RougeChart =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(chart.title, "ECHO MODEL - ROUGE METRICS");
    assert_eq!(chart.series.len(), 3);
    assert_eq!(chart.series[0].values.len(), 2);

    assert!(!dir.path().join("broken_re.json").exists());
    assert_eq!(run.scores().len(), 1);
}

#[tokio::test]
async fn test_run_report_round_trips_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    let run = sample_run(dir.path()).await;

    let json_path = dir.path().join("run.json");
    write_run_report_json(&json_path, &run).unwrap();
    let back: EvaluationRun =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back.run_id, run.run_id);
    assert_eq!(back.scores().keys().collect::<Vec<_>>(), vec!["Echo Model"]);

    let md = render_run_report_md(&run);
    assert!(md.contains("| ECHO MODEL |"));
    assert!(md.contains("2/2"));
    assert!(md.contains("`broken` failed during generation"));

    let md_path = dir.path().join("run.md");
    write_run_report_md(&md_path, &run).unwrap();
    assert_eq!(std::fs::read_to_string(md_path).unwrap(), md);
}

#[test]
fn test_rouge_comparison_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("models");
    let scores: Vec<(String, AggregateScore)> = vec![(
        "lead_3".to_string(),
        [(RougeMetric::Rouge1, 0.4)].into_iter().collect(),
    )];
    JsonPlotArtifacts
        .plot_rouge_comparison(&scores, Some(&base))
        .unwrap();

    let written: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("models_re.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(written["models"][0]["display"], "LEAD 3");
    assert_eq!(written["models"][0]["scores"]["rouge1"], 0.4);
}
