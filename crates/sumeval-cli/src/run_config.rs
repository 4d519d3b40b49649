//! Run configuration file: the labelled backends an evaluation run compares.
//!
//! ```json
//! {
//!   "configurations": [
//!     { "label": "lead_3", "backend": { "type": "lead", "sentences": 3 } },
//!     {
//!       "label": "bart_large_cnn",
//!       "backend": { "type": "http", "endpoint": "http://localhost:8080/summarize",
//!                    "token_env": "SUMEVAL_API_TOKEN" },
//!       "params": { "max_length": 60, "extra": { "num_beams": 4 } }
//!     }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use sumeval_core::capability::http::DEFAULT_TIMEOUT_SECS;
use sumeval_core::{
    Configuration, GenerationCapability, GenerationParams, HttpCapability, HttpCapabilityConfig,
    LeadCapability, Summarizer,
};

fn default_lead_sentences() -> usize {
    3
}

/// Which capability backs a configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendSpec {
    Lead {
        #[serde(default = "default_lead_sentences")]
        sentences: usize,
    },
    Http {
        endpoint: String,
        /// Name of the environment variable holding the bearer token.
        #[serde(default)]
        token_env: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationSpec {
    pub label: String,
    pub backend: BackendSpec,
    /// Overlaid on the standard harness defaults.
    #[serde(default)]
    pub params: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub configurations: Vec<ConfigurationSpec>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read run config {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("parse run config {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(raw)?;
        anyhow::ensure!(
            !config.configurations.is_empty(),
            "run config lists no configurations"
        );
        Ok(config)
    }

    /// Build one orchestrator configuration per entry, in file order.
    pub fn build(&self) -> Result<Vec<Configuration>> {
        self.configurations
            .iter()
            .map(|spec| -> Result<Configuration> {
                let capability = build_capability(&spec.backend)
                    .with_context(|| format!("configuration {:?}", spec.label))?;
                let defaults = GenerationParams::standard().merged(&spec.params);
                Ok(Configuration::new(
                    spec.label.clone(),
                    Summarizer::with_defaults(capability, defaults),
                ))
            })
            .collect()
    }
}

pub fn build_capability(backend: &BackendSpec) -> Result<Arc<dyn GenerationCapability>> {
    match backend {
        BackendSpec::Lead { sentences } => Ok(Arc::new(LeadCapability::new(*sentences)?)),
        BackendSpec::Http {
            endpoint,
            token_env,
            timeout_secs,
        } => {
            let mut config = HttpCapabilityConfig::new(endpoint.clone())
                .with_timeout_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
            if let Some(var) = token_env {
                let token = std::env::var(var)
                    .with_context(|| format!("token variable {var} is not set"))?;
                config = config.with_token(token);
            }
            Ok(Arc::new(HttpCapability::new(&config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_backends() {
        let config = RunConfig::parse(
            r#"{
                "configurations": [
                    {"label": "lead_3", "backend": {"type": "lead"}},
                    {"label": "remote", "backend": {"type": "http", "endpoint": "http://localhost:1/x", "timeout_secs": 5},
                     "params": {"max_length": 60, "extra": {"num_beams": 4}}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.configurations[0].backend,
            BackendSpec::Lead { sentences: 3 }
        );
        assert_eq!(config.configurations[1].params.max_length, Some(60));

        let built = config.build().unwrap();
        assert_eq!(built.len(), 2);
        assert_eq!(built[0].label, "lead_3");
        assert_eq!(built[1].summarizer.defaults().min_length, Some(30));
        assert_eq!(built[1].summarizer.defaults().max_length, Some(60));
        assert_eq!(built[1].summarizer.defaults().extra["num_beams"], 4);
    }

    #[test]
    fn test_empty_configuration_list_rejected() {
        assert!(RunConfig::parse(r#"{"configurations": []}"#).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let raw = r#"{"configurations": [{"label": "x", "backend": {"type": "gpu"}}]}"#;
        assert!(RunConfig::parse(raw).is_err());
    }

    #[test]
    fn test_zero_lead_sentences_fails_build() {
        let raw =
            r#"{"configurations": [{"label": "x", "backend": {"type": "lead", "sentences": 0}}]}"#;
        let err = RunConfig::parse(raw).unwrap().build().unwrap_err();
        assert!(format!("{err:#}").contains("configuration \"x\""));
    }

    #[test]
    fn test_missing_token_variable_fails_build() {
        let backend = BackendSpec::Http {
            endpoint: "http://localhost:1".into(),
            token_env: Some("SUMEVAL_TEST_TOKEN_THAT_IS_NOT_SET".into()),
            timeout_secs: None,
        };
        assert!(build_capability(&backend).is_err());
    }
}
