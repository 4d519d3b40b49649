//! Corpus and result records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of a corpus record. Corpora in the wild use both string and
/// integer identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// One unit of work: an article and its reference summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub article: String,
    /// Reference summary. Missing, `null` or non-string in the source data
    /// means empty.
    #[serde(default, deserialize_with = "lenient_text")]
    pub highlights: String,
}

impl CorpusRecord {
    pub fn new(
        id: impl Into<RecordId>,
        article: impl Into<String>,
        highlights: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            article: article.into(),
            highlights: highlights.into(),
        }
    }

    /// Key used to address this record: the id, or its position when absent.
    pub fn key(&self, index: usize) -> String {
        record_key(self.id.as_ref(), index)
    }
}

/// A corpus record together with the summary generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub article: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub highlights: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
}

impl ResultRecord {
    /// Extend a corpus record with its generated summary.
    pub fn from_corpus(record: &CorpusRecord, summary: String) -> Self {
        Self {
            id: record.id.clone(),
            article: record.article.clone(),
            highlights: record.highlights.clone(),
            summary,
        }
    }

    pub fn key(&self, index: usize) -> String {
        record_key(self.id.as_ref(), index)
    }

    /// Why this record cannot be scored, if it cannot.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.summary.trim().is_empty() {
            Some(SkipReason::EmptySummary)
        } else if self.highlights.trim().is_empty() {
            Some(SkipReason::EmptyHighlights)
        } else {
            None
        }
    }

    /// Whether both the summary and the reference carry text.
    pub fn is_scorable(&self) -> bool {
        self.skip_reason().is_none()
    }
}

/// Keep string values; anything else loads as empty text so the record is
/// skipped at scoring time instead of failing the whole file.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn record_key(id: Option<&RecordId>, index: usize) -> String {
    match id {
        Some(id) => id.to_string(),
        None => index.to_string(),
    }
}

/// Non-fatal reasons for excluding a record or a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    EmptySummary,
    EmptyHighlights,
    MissingRating,
    RatingOutOfRange { value: i64 },
    /// Submitted value is not an integer; `value` is its JSON text.
    InvalidRating { value: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySummary => f.write_str("summary is missing or empty"),
            Self::EmptyHighlights => f.write_str("highlights are missing or empty"),
            Self::MissingRating => f.write_str("no rating submitted"),
            Self::RatingOutOfRange { value } => write!(f, "rating {value} is outside 1-5"),
            Self::InvalidRating { value } => write!(f, "rating {value} is not an integer"),
        }
    }
}
