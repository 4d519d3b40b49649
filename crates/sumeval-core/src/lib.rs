//! SUMEVAL Core Library
//!
//! Summary generation harness, ROUGE scoring, manual rating and the
//! multi-configuration orchestrator that ties them together.

pub mod capability;
pub mod corpus;
pub mod domain;
pub mod evaluator;
pub mod fakes;
pub mod manual;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod reporting;
pub mod rouge;
pub mod sample;
pub mod summarizer;
pub mod telemetry;

pub use capability::{GenerationCapability, HttpCapability, HttpCapabilityConfig, LeadCapability};
pub use corpus::{load_records, write_jsonl, CorpusSource};
pub use domain::digest::compute_digest;
pub use domain::{
    AggregateScore, CorpusRecord, EvalError, GenerationError, GenerationParams, RecordId,
    Result, ResultRecord, RougeMetric, ScoreRow, SkipReason,
};
pub use evaluator::{Evaluator, Plot, ReportRender};
pub use manual::{ExtrinsicEvaluator, ManualScore, SubmissionSummary, SubmitMode};
pub use orchestrator::{
    sum_eval, ConfigOutcome, ConfigStatus, Configuration, EvaluationOrchestrator, EvaluationRun,
    Stage,
};
pub use reporting::{JsonPlotArtifacts, NoopPlotter, ScorePlotter};
pub use rouge::{RougeEvaluator, RougeEvaluatorBuilder};
pub use sample::{render_sample, sample};
pub use summarizer::Summarizer;

pub use metrics::{Counter, MetricsSnapshot, METRICS};
pub use obs::ConfigSpan;
pub use telemetry::init_tracing;

/// SUMEVAL version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
