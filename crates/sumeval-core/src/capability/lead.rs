//! Lead-N extractive baseline.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::GenerationCapability;
use crate::domain::{EvalError, GenerationParams, Result};
use crate::rouge::split_sentences;

/// Takes the first `sentences` sentences of the article, cut down to
/// `max_length` words when that parameter is set. `min_length` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadCapability {
    sentences: usize,
}

impl LeadCapability {
    pub fn new(sentences: usize) -> Result<Self> {
        if sentences == 0 {
            return Err(EvalError::Configuration(
                "lead baseline needs at least one sentence".to_string(),
            ));
        }
        Ok(Self { sentences })
    }

    pub fn sentences(&self) -> usize {
        self.sentences
    }

    fn lead(&self, text: &str, max_words: Option<usize>) -> String {
        let lead = split_sentences(text)
            .into_iter()
            .take(self.sentences)
            .collect::<Vec<_>>()
            .join(" ");
        match max_words {
            Some(max) => lead.split_whitespace().take(max).collect::<Vec<_>>().join(" "),
            None => lead,
        }
    }
}

#[async_trait]
impl GenerationCapability for LeadCapability {
    async fn generate(&self, text: &str, params: &GenerationParams) -> anyhow::Result<Value> {
        let max_words = params.max_length.map(|m| m as usize);
        Ok(json!([{ "summary_text": self.lead(text, max_words) }]))
    }
}
