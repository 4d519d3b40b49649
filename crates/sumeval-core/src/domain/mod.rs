//! Domain models for SUMEVAL.
//!
//! Canonical definitions for the core entities:
//! - `CorpusRecord` / `ResultRecord`: input articles and generated summaries
//! - `GenerationParams`: options forwarded to a generation capability
//! - `RougeMetric`, `ScoreRow`, `AggregateScore`: overlap scores

pub mod digest;
pub mod error;
pub mod params;
pub mod record;
pub mod score;

pub use error::{EvalError, GenerationError, Result};
pub use params::GenerationParams;
pub use record::{CorpusRecord, RecordId, ResultRecord, SkipReason};
pub use score::{AggregateScore, RougeMetric, ScoreRow, UnknownMetric};
