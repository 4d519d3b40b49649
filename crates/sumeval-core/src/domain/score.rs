//! Overlap metric identifiers and score containers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The supported lexical-overlap metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RougeMetric {
    /// Unigram overlap.
    #[serde(rename = "rouge1")]
    Rouge1,
    /// Bigram overlap.
    #[serde(rename = "rouge2")]
    Rouge2,
    /// Longest-common-subsequence overlap.
    #[serde(rename = "rougeL")]
    RougeL,
}

impl RougeMetric {
    pub const ALL: [RougeMetric; 3] = [Self::Rouge1, Self::Rouge2, Self::RougeL];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rouge1 => "rouge1",
            Self::Rouge2 => "rouge2",
            Self::RougeL => "rougeL",
        }
    }

    /// Label used in charts, e.g. `ROUGE-1`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Rouge1 => "ROUGE-1",
            Self::Rouge2 => "ROUGE-2",
            Self::RougeL => "ROUGE-L",
        }
    }
}

impl fmt::Display for RougeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a metric identifier is not one of `rouge1`, `rouge2`, `rougeL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ROUGE type: {}", self.0)
    }
}

impl std::error::Error for UnknownMetric {}

impl FromStr for RougeMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rouge1" => Ok(Self::Rouge1),
            "rouge2" => Ok(Self::Rouge2),
            "rougeL" => Ok(Self::RougeL),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}

/// F1 score per metric for one prediction/reference pair.
pub type ScoreRow = BTreeMap<RougeMetric, f64>;

/// Mean of each metric across a batch of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateScore(BTreeMap<RougeMetric, f64>);

impl AggregateScore {
    /// Average `rows` per metric. Metrics with no rows average to 0.0.
    pub fn from_rows(metrics: &[RougeMetric], rows: &[ScoreRow]) -> Self {
        let mut means = BTreeMap::new();
        for &metric in metrics {
            let values: Vec<f64> = rows.iter().filter_map(|r| r.get(&metric).copied()).collect();
            let mean = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            means.insert(metric, mean);
        }
        Self(means)
    }

    pub fn get(&self, metric: RougeMetric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn metrics(&self) -> impl Iterator<Item = RougeMetric> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RougeMetric, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(RougeMetric, f64)> for AggregateScore {
    fn from_iter<I: IntoIterator<Item = (RougeMetric, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
