//! Capability traits shared by the evaluators.
//!
//! Scoring, report rendering and plotting are separate traits: the ROUGE
//! engine implements all three, the manual-rating aggregator only the latter
//! two.

use std::path::Path;

use crate::domain::{AggregateScore, Result};
use crate::reporting::ScorePlotter;

/// Compute an aggregate over prediction/reference pairs.
pub trait Evaluator {
    fn score(&mut self, predictions: &[String], references: &[String]) -> Result<AggregateScore>;
}

/// Render a plain-text report of what the evaluator currently holds.
pub trait ReportRender {
    /// `None` when there is nothing to report yet.
    fn render_report(&self, label: &str) -> Option<String>;

    /// Print the rendered report to stdout.
    fn print_report(&self, label: &str) {
        if let Some(report) = self.render_report(label) {
            print!("{report}");
        }
    }
}

/// Hand already-computed scores to a plotting collaborator.
pub trait Plot {
    fn plot(&self, label: &str, plotter: &dyn ScorePlotter, save_path: Option<&Path>)
        -> Result<()>;
}
