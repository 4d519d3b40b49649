//! SUMEVAL - Summary evaluation CLI
//!
//! The `sumeval` command generates summaries with one or more backends and
//! compares them against reference highlights.
//!
//! ## Commands
//!
//! - `sample`: Print a reproducible random sample of a corpus
//! - `summarize`: Summarize a corpus with one backend into a results file
//! - `score`: ROUGE-score a results file
//! - `run`: Evaluate every configuration of a run config over a corpus
//! - `rate`: Present results for manual rating, or ingest the ratings

mod run_config;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};

use serde_json::Value;
use sumeval_core::obs;
use sumeval_core::reporting::{
    slugify, write_run_report_json, write_run_report_md, MANUAL_SUFFIX, ROUGE_SUFFIX,
};
use sumeval_core::{
    load_records, render_sample, sample, write_jsonl, ConfigSpan, CorpusRecord,
    EvaluationOrchestrator, ExtrinsicEvaluator, GenerationParams, JsonPlotArtifacts, Plot,
    ReportRender, ResultRecord, RougeEvaluator, ScorePlotter, SubmitMode, Summarizer, METRICS,
};

use run_config::{build_capability, BackendSpec, RunConfig};

#[derive(Parser)]
#[command(name = "sumeval")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summary generation and evaluation harness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a reproducible random sample of a corpus
    Sample {
        /// Corpus file (JSON array or JSONL)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Number of records to draw
        #[arg(short = 'k', long, default_value = "3")]
        count: usize,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Truncate each field to this many characters
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Summarize a corpus with one backend and write the results as JSONL
    Summarize {
        /// Corpus file (JSON array or JSONL)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Output results file
        #[arg(short, long)]
        output: PathBuf,

        /// Summarize at most this many records
        #[arg(long)]
        max_count: Option<usize>,

        #[command(flatten)]
        backend: BackendArgs,

        /// Override the default minimum summary length
        #[arg(long)]
        min_length: Option<u32>,

        /// Override the default maximum summary length
        #[arg(long)]
        max_length: Option<u32>,
    },

    /// ROUGE-score a results file
    Score {
        /// Results file (JSON array or JSONL of result records)
        #[arg(short, long)]
        results: PathBuf,

        /// Label used in the report and plot names
        #[arg(short, long, default_value = "model")]
        label: String,

        /// Metrics to compute (rouge1, rouge2, rougeL); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        metrics: Vec<String>,

        /// Disable Porter stemming
        #[arg(long)]
        no_stemmer: bool,

        /// Score ROUGE-L over sentences (summary-level LCS)
        #[arg(long)]
        split_summaries: bool,

        /// Write plot data into this directory
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },

    /// Evaluate every configuration of a run config over a corpus
    Run {
        /// Run configuration file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Corpus file (JSON array or JSONL)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Summarize at most this many records per configuration
        #[arg(long)]
        max_count: Option<usize>,

        /// Directory for plots and the run report
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
    },

    /// Present results for manual rating, or ingest ratings
    Rate {
        /// Results file (JSON array or JSONL of result records)
        #[arg(short, long)]
        results: PathBuf,

        /// Label used in prompts, reports and plot names
        #[arg(short, long, default_value = "model")]
        label: String,

        /// JSON object mapping record key to a 1-5 rating (repeatable);
        /// prompts are printed when omitted
        #[arg(long)]
        ratings: Vec<PathBuf>,

        /// Each ratings file replaces the ratings before it instead of merging
        #[arg(long)]
        replace: bool,

        /// Write the rating distribution into this directory
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },
}

/// Backend selection for single-backend commands.
#[derive(clap::Args)]
struct BackendArgs {
    /// Inference endpoint; the lead baseline is used when unset
    #[arg(long, env = "SUMEVAL_ENDPOINT")]
    endpoint: Option<String>,

    /// Environment variable holding the endpoint's bearer token
    #[arg(long, default_value = "SUMEVAL_API_TOKEN")]
    token_env: String,

    /// Request timeout in seconds
    #[arg(long, env = "SUMEVAL_TIMEOUT_SECONDS")]
    timeout_secs: Option<u64>,

    /// Sentences taken by the lead baseline
    #[arg(long, default_value = "3")]
    lead: usize,
}

impl BackendArgs {
    fn spec(&self) -> BackendSpec {
        match &self.endpoint {
            Some(endpoint) => BackendSpec::Http {
                endpoint: endpoint.clone(),
                token_env: std::env::var(&self.token_env)
                    .is_ok()
                    .then(|| self.token_env.clone()),
                timeout_secs: self.timeout_secs,
            },
            None => BackendSpec::Lead {
                sentences: self.lead,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sumeval_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Sample {
            corpus,
            count,
            seed,
            max_chars,
        } => cmd_sample(&corpus, count, seed, max_chars),
        Commands::Summarize {
            corpus,
            output,
            max_count,
            backend,
            min_length,
            max_length,
        } => {
            let overrides = GenerationParams {
                min_length,
                max_length,
                ..GenerationParams::default()
            };
            cmd_summarize(&corpus, &output, max_count, &backend.spec(), &overrides).await
        }
        Commands::Score {
            results,
            label,
            metrics,
            no_stemmer,
            split_summaries,
            plot_dir,
        } => cmd_score(
            &results,
            &label,
            metrics,
            !no_stemmer,
            split_summaries,
            plot_dir.as_deref(),
        ),
        Commands::Run {
            config,
            corpus,
            max_count,
            results_dir,
        } => cmd_run(&config, &corpus, max_count, &results_dir).await,
        Commands::Rate {
            results,
            label,
            ratings,
            replace,
            plot_dir,
        } => cmd_rate(&results, &label, &ratings, replace, plot_dir.as_deref()),
    }
}

fn load_corpus(path: &Path) -> Result<Vec<CorpusRecord>> {
    let corpus: Vec<CorpusRecord> =
        load_records(path).with_context(|| format!("Failed to load corpus {:?}", path))?;
    info!(path = %path.display(), records = corpus.len(), "corpus loaded");
    Ok(corpus)
}

/// Print a seeded random sample of the corpus
fn cmd_sample(path: &Path, count: usize, seed: u64, max_chars: Option<usize>) -> Result<()> {
    let corpus = load_corpus(path)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let drawn = sample(&corpus, count, &mut rng)?;

    for (i, record) in drawn.iter().enumerate() {
        println!("--- sample {} ---", i + 1);
        print!("{}", render_sample(record, max_chars));
        println!();
    }
    Ok(())
}

/// Summarize a corpus with one backend
async fn cmd_summarize(
    corpus_path: &Path,
    output: &Path,
    max_count: Option<usize>,
    backend: &BackendSpec,
    overrides: &GenerationParams,
) -> Result<()> {
    let corpus = load_corpus(corpus_path)?;
    let summarizer = Summarizer::new(build_capability(backend)?);

    let results = summarizer
        .structured_batch_summarize(&corpus, max_count, overrides)
        .await
        .context("Summarization failed")?;

    write_jsonl(output, &results)?;
    println!("Wrote {} summaries to {}", results.len(), output.display());
    METRICS.flush();
    Ok(())
}

/// Split result records into scorable (prediction, reference) columns.
fn scorable_pairs(results: &[ResultRecord]) -> (Vec<&str>, Vec<&str>) {
    results
        .iter()
        .enumerate()
        .filter(|(idx, record)| match record.skip_reason() {
            Some(reason) => {
                obs::emit_record_skipped(&record.key(*idx), &reason);
                false
            }
            None => true,
        })
        .map(|(_, record)| (record.summary.as_str(), record.highlights.as_str()))
        .unzip()
}

/// ROUGE-score a results file
fn cmd_score(
    results_path: &Path,
    label: &str,
    metrics: Vec<String>,
    use_stemmer: bool,
    split_summaries: bool,
    plot_dir: Option<&Path>,
) -> Result<()> {
    let results: Vec<ResultRecord> = load_records(results_path)
        .with_context(|| format!("Failed to load results {:?}", results_path))?;
    let (predictions, references) = scorable_pairs(&results);
    if predictions.is_empty() {
        anyhow::bail!("No valid summaries to evaluate in {:?}", results_path);
    }

    let mut evaluator = RougeEvaluator::builder()
        .metrics(metrics)
        .use_stemmer(use_stemmer)
        .split_summaries(split_summaries)
        .build()?;
    evaluator.evaluate(&predictions, &references)?;
    evaluator.print_report(label);

    if let Some(dir) = plot_dir {
        let path = dir.join(format!("{}{ROUGE_SUFFIX}", slugify(label)));
        evaluator.plot(label, &JsonPlotArtifacts, Some(&path))?;
    }
    Ok(())
}

/// Evaluate every configuration of a run config
async fn cmd_run(
    config_path: &Path,
    corpus_path: &Path,
    max_count: Option<usize>,
    results_dir: &Path,
) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let corpus = load_corpus(corpus_path)?;

    let mut orchestrator = EvaluationOrchestrator::new(config.build()?)?
        .with_results_dir(results_dir)
        .with_plotter(Arc::new(JsonPlotArtifacts));
    if let Some(max) = max_count {
        orchestrator = orchestrator.with_max_count(max);
    }

    let run = orchestrator.run(&corpus).await?;

    let scores: Vec<_> = run.scores().into_iter().collect();
    for (label, aggregate) in &scores {
        let cells: Vec<String> = aggregate
            .iter()
            .map(|(metric, value)| format!("{}={value:.4}", metric.display_name()))
            .collect();
        println!("{label}: {}", cells.join(" "));
    }
    for outcome in run.failures() {
        println!("{}: omitted", outcome.label);
    }

    JsonPlotArtifacts.plot_rouge_comparison(&scores, Some(&results_dir.join("comparison")))?;
    write_run_report_json(&results_dir.join(format!("run-{}.json", run.run_id)), &run)?;
    write_run_report_md(&results_dir.join(format!("run-{}.md", run.run_id)), &run)?;
    info!(run_id = %run.run_id, dir = %results_dir.display(), "run report written");
    Ok(())
}

/// Values stay raw JSON so one bad rating is skipped rather than failing the file.
fn load_ratings(path: &Path) -> Result<HashMap<String, Value>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read ratings {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse ratings {:?}", path))
}

/// Present results for rating, or ingest ratings
fn cmd_rate(
    results_path: &Path,
    label: &str,
    ratings: &[PathBuf],
    replace: bool,
    plot_dir: Option<&Path>,
) -> Result<()> {
    let _span = ConfigSpan::enter(label);
    let results: Vec<ResultRecord> = load_records(results_path)
        .with_context(|| format!("Failed to load results {:?}", results_path))?;
    let mut evaluator = ExtrinsicEvaluator::new(results)?;

    if ratings.is_empty() {
        let stdout = std::io::stdout();
        evaluator.evaluate(label, &mut stdout.lock())?;
        return Ok(());
    }

    let mode = if replace {
        SubmitMode::Replace
    } else {
        SubmitMode::Merge
    };
    for path in ratings {
        let submission = evaluator.submit_scores(&load_ratings(path)?, mode);
        println!(
            "{}: accepted {} ratings, skipped {}",
            path.display(),
            submission.accepted.len(),
            submission.skipped.len()
        );
    }

    evaluator.print_report(label);
    println!("Average manual score: {:.2}", evaluator.average());

    if let Some(dir) = plot_dir {
        let path = dir.join(slugify(label));
        evaluator.plot(label, &JsonPlotArtifacts, Some(&path))?;
        info!(
            path = %format!("{}{MANUAL_SUFFIX}.json", path.display()),
            "rating distribution written"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_score_metrics_list() {
        let cli = Cli::try_parse_from([
            "sumeval", "score", "--results", "r.jsonl", "--metrics", "rouge1,rougeL",
        ])
        .unwrap();
        match cli.command {
            Commands::Score { metrics, .. } => assert_eq!(metrics, vec!["rouge1", "rougeL"]),
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn test_backend_args_default_to_lead() {
        let args = BackendArgs {
            endpoint: None,
            token_env: "SUMEVAL_API_TOKEN".into(),
            timeout_secs: None,
            lead: 2,
        };
        assert_eq!(args.spec(), BackendSpec::Lead { sentences: 2 });
    }

    #[test]
    fn test_scorable_pairs_filters_empty() {
        let corpus = CorpusRecord::new("1", "a", "ref");
        let results = vec![
            ResultRecord::from_corpus(&corpus, "sum".into()),
            ResultRecord::from_corpus(&corpus, "".into()),
        ];
        let (preds, refs) = scorable_pairs(&results);
        assert_eq!(preds, vec!["sum"]);
        assert_eq!(refs, vec!["ref"]);
    }

    #[tokio::test]
    async fn test_summarize_then_score_with_lead_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write(
            dir.path(),
            "corpus.jsonl",
            "{\"id\":\"a\",\"article\":\"First line. Second line. Third line.\",\"highlights\":\"First line.\"}\n",
        );
        let output = dir.path().join("results.jsonl");

        cmd_summarize(
            &corpus,
            &output,
            None,
            &BackendSpec::Lead { sentences: 1 },
            &GenerationParams::default(),
        )
        .await
        .unwrap();

        let results: Vec<ResultRecord> = load_records(&output).unwrap();
        assert_eq!(results[0].summary, "First line.");

        let plots = dir.path().join("plots");
        cmd_score(&output, "lead_1", vec![], true, false, Some(&plots)).unwrap();
        assert!(plots.join("lead_1_re.json").exists());
    }

    #[tokio::test]
    async fn test_run_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write(
            dir.path(),
            "corpus.json",
            r#"[{"id": 1, "article": "Cats sleep. Dogs bark.", "highlights": "Cats sleep."}]"#,
        );
        let config = write(
            dir.path(),
            "run.json",
            r#"{"configurations": [{"label": "lead_1", "backend": {"type": "lead", "sentences": 1}}]}"#,
        );
        let results_dir = dir.path().join("results");

        cmd_run(&config, &corpus, None, &results_dir).await.unwrap();

        assert!(results_dir.join("lead_1_re.json").exists());
        assert!(results_dir.join("comparison_re.json").exists());
        let reports: Vec<_> = std::fs::read_dir(&results_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("run-"))
            .collect();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_rate_ingests_ratings_and_plots() {
        let dir = tempfile::tempdir().unwrap();
        let results = write(
            dir.path(),
            "results.jsonl",
            "{\"id\":\"a\",\"article\":\"x\",\"highlights\":\"y\",\"summary\":\"z\"}\n",
        );
        let ratings = write(dir.path(), "ratings.json", r#"{"a": 4}"#);
        let plots = dir.path().join("plots");

        cmd_rate(&results, "lead_3", &[ratings], false, Some(&plots)).unwrap();
        assert!(plots.join("lead_3_me.json").exists());
    }

    #[test]
    fn test_score_skips_records_without_text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let results = write(
            dir.path(),
            "results.jsonl",
            concat!(
                "{\"id\":1,\"article\":\"x\",\"highlights\":\"cats sleep\",\"summary\":\"cats sleep\"}\n",
                "{\"id\":2,\"article\":\"x\",\"highlights\":\"dogs bark\",\"summary\":null}\n",
                "{\"id\":3,\"article\":\"x\",\"highlights\":\"birds sing\",\"summary\":42}\n",
            ),
        );

        let loaded: Vec<ResultRecord> = load_records(&results).unwrap();
        let (preds, refs) = scorable_pairs(&loaded);
        assert_eq!(preds, vec!["cats sleep"]);
        assert_eq!(refs, vec!["cats sleep"]);

        let plots = dir.path().join("plots");
        cmd_score(&results, "mixed", vec![], true, false, Some(&plots)).unwrap();
        let chart: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(plots.join("mixed_re.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(chart["series"][0]["values"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_rate_keeps_valid_ratings_beside_malformed_ones() {
        let dir = tempfile::tempdir().unwrap();
        let results = write(
            dir.path(),
            "results.jsonl",
            concat!(
                "{\"id\":\"1\",\"article\":\"x\",\"highlights\":\"y\",\"summary\":\"z\"}\n",
                "{\"id\":\"2\",\"article\":\"x\",\"highlights\":\"y\",\"summary\":\"z\"}\n",
            ),
        );
        let ratings = write(dir.path(), "ratings.json", r#"{"1": 4, "2": "great"}"#);

        let loaded = load_ratings(&ratings).unwrap();
        let results_loaded: Vec<ResultRecord> = load_records(&results).unwrap();
        let mut evaluator = ExtrinsicEvaluator::new(results_loaded).unwrap();
        let submission = evaluator.submit_scores(&loaded, SubmitMode::Merge);
        assert_eq!(submission.accepted, vec!["1"]);
        assert_eq!(evaluator.average(), 4.0);

        let plots = dir.path().join("plots");
        cmd_rate(&results, "lead_3", &[ratings], false, Some(&plots)).unwrap();
        let chart: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(plots.join("lead_3_me.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(chart["average"], 4.0);
    }
}
