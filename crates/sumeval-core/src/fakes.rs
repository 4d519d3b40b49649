//! In-process fakes for the capability and plotter seams (testing only)
//!
//! Provides capabilities with scripted behaviour and plotters that record or
//! reject what they are handed. None of them touch the network or disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::bail;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capability::GenerationCapability;
use crate::domain::{AggregateScore, EvalError, GenerationParams, Result};
use crate::reporting::{RatingChart, RougeChart, ScorePlotter};

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Returns the input text as its summary and remembers the parameters of the
/// last call.
#[derive(Debug, Default)]
pub struct EchoCapability {
    calls: AtomicUsize,
    last_params: Mutex<Option<GenerationParams>>,
}

impl EchoCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_params
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerationCapability for EchoCapability {
    async fn generate(&self, text: &str, params: &GenerationParams) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap_or_else(|e| e.into_inner()) = Some(params.clone());
        Ok(json!([{ "summary_text": text }]))
    }
}

/// Fails every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCapability;

#[async_trait]
impl GenerationCapability for FailingCapability {
    async fn generate(&self, _text: &str, _params: &GenerationParams) -> anyhow::Result<Value> {
        bail!("capability unavailable")
    }
}

#[derive(Debug, Clone, Copy)]
enum Script {
    FailOnCall(usize),
    Malformed,
    EmptySummary,
}

/// Echoes like [`EchoCapability`] except where its script says otherwise.
#[derive(Debug)]
pub struct ScriptedCapability {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedCapability {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the `call`-th call (1-based); echo on every other call.
    pub fn failing_on(call: usize) -> Self {
        Self::with_script(Script::FailOnCall(call))
    }

    /// Return output without a `summary_text` field.
    pub fn malformed() -> Self {
        Self::with_script(Script::Malformed)
    }

    /// Return well-formed output carrying an empty summary.
    pub fn empty_summary() -> Self {
        Self::with_script(Script::EmptySummary)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationCapability for ScriptedCapability {
    async fn generate(&self, text: &str, _params: &GenerationParams) -> anyhow::Result<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script {
            Script::FailOnCall(n) if n == call => bail!("scripted failure on call {call}"),
            Script::FailOnCall(_) => Ok(json!([{ "summary_text": text }])),
            Script::Malformed => Ok(json!([{ "generated_text": text }])),
            Script::EmptySummary => Ok(json!([{ "summary_text": "" }])),
        }
    }
}

// ---------------------------------------------------------------------------
// Plotters
// ---------------------------------------------------------------------------

/// What a [`RecordingPlotter`] was asked to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotCall {
    Rouge(RougeChart, Option<PathBuf>),
    Ratings(RatingChart, Option<PathBuf>),
    RougeComparison(Vec<(String, AggregateScore)>, Option<PathBuf>),
    RatingComparison(Vec<(String, f64)>, Option<PathBuf>),
}

/// Keeps every chart it receives.
#[derive(Debug, Default)]
pub struct RecordingPlotter {
    calls: Mutex<Vec<PlotCall>>,
}

impl RecordingPlotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PlotCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, call: PlotCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        Ok(())
    }
}

impl ScorePlotter for RecordingPlotter {
    fn plot_rouge(&self, chart: &RougeChart, save_path: Option<&Path>) -> Result<()> {
        self.push(PlotCall::Rouge(chart.clone(), save_path.map(Path::to_path_buf)))
    }

    fn plot_ratings(&self, chart: &RatingChart, save_path: Option<&Path>) -> Result<()> {
        self.push(PlotCall::Ratings(chart.clone(), save_path.map(Path::to_path_buf)))
    }

    fn plot_rouge_comparison(
        &self,
        scores: &[(String, AggregateScore)],
        save_path: Option<&Path>,
    ) -> Result<()> {
        self.push(PlotCall::RougeComparison(
            scores.to_vec(),
            save_path.map(Path::to_path_buf),
        ))
    }

    fn plot_rating_comparison(
        &self,
        averages: &[(String, f64)],
        save_path: Option<&Path>,
    ) -> Result<()> {
        self.push(PlotCall::RatingComparison(
            averages.to_vec(),
            save_path.map(Path::to_path_buf),
        ))
    }
}

/// Rejects every plot with [`EvalError::Plot`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPlotter;

impl ScorePlotter for FailingPlotter {
    fn plot_rouge(&self, chart: &RougeChart, _save_path: Option<&Path>) -> Result<()> {
        Err(EvalError::Plot(format!("cannot draw {}", chart.title)))
    }

    fn plot_ratings(&self, chart: &RatingChart, _save_path: Option<&Path>) -> Result<()> {
        Err(EvalError::Plot(format!("cannot draw {}", chart.title)))
    }

    fn plot_rouge_comparison(
        &self,
        _scores: &[(String, AggregateScore)],
        _save_path: Option<&Path>,
    ) -> Result<()> {
        Err(EvalError::Plot("cannot draw comparison".to_string()))
    }

    fn plot_rating_comparison(
        &self,
        _averages: &[(String, f64)],
        _save_path: Option<&Path>,
    ) -> Result<()> {
        Err(EvalError::Plot("cannot draw comparison".to_string()))
    }
}
