//! HTTP inference endpoint backend.
//!
//! Speaks the request shape used by hosted summarization endpoints:
//! `POST {"inputs": text, "parameters": {...}}`, answered with
//! `[{"summary_text": "..."}]`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::GenerationCapability;
use crate::domain::{EvalError, GenerationParams, Result};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Maximum number of response body characters echoed into error messages.
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`HttpCapability`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpCapabilityConfig {
    /// Full URL of the inference endpoint.
    pub endpoint: String,
    /// Bearer token, if the endpoint needs one.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl HttpCapabilityConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Read `SUMEVAL_ENDPOINT`, `SUMEVAL_API_TOKEN` and `SUMEVAL_TIMEOUT_SECONDS`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("SUMEVAL_ENDPOINT")
            .map_err(|_| EvalError::Configuration("SUMEVAL_ENDPOINT not set".to_string()))?;
        let timeout_secs = std::env::var("SUMEVAL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            endpoint,
            api_token: std::env::var("SUMEVAL_API_TOKEN").ok(),
            timeout_secs,
        })
    }
}

/// Generation capability backed by a remote inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpCapability {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCapability {
    pub fn new(config: &HttpCapabilityConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| EvalError::Configuration("invalid API token format".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .user_agent(concat!("sumeval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EvalError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationCapability for HttpCapability {
    async fn generate(&self, text: &str, params: &GenerationParams) -> anyhow::Result<Value> {
        let body = json!({
            "inputs": text,
            "parameters": params.to_json(),
        });

        debug!(endpoint = %self.endpoint, chars = text.len(), "POST inference request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            anyhow::bail!("endpoint returned {status}: {snippet}");
        }

        response
            .json::<Value>()
            .await
            .context("endpoint returned a non-JSON body")
    }
}
