//! Generation capabilities: the backends that turn an article into a summary.
//!
//! A capability is an opaque, possibly slow and possibly failing call. Its raw
//! output mirrors the summarization pipelines it usually wraps:
//!
//! ```json
//! [{ "summary_text": "..." }]
//! ```
//!
//! Only the first element is used. Shape checking happens in
//! [`crate::summarizer::Summarizer`], not here.

pub mod http;
pub mod lead;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::GenerationParams;

pub use http::{HttpCapability, HttpCapabilityConfig};
pub use lead::LeadCapability;

/// A callable that maps input text plus generation parameters to raw output.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    async fn generate(&self, text: &str, params: &GenerationParams) -> anyhow::Result<Value>;
}
