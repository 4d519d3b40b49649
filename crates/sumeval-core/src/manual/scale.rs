//! The 5-point manual rating scale.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::SkipReason;

/// Human quality rating of a generated summary, worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum ManualScore {
    Poor = 1,
    Fair = 2,
    Good = 3,
    AsGoodAsHighlights = 4,
    BetterThanHighlights = 5,
}

impl ManualScore {
    pub const ALL: [ManualScore; 5] = [
        Self::Poor,
        Self::Fair,
        Self::Good,
        Self::AsGoodAsHighlights,
        Self::BetterThanHighlights,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// `None` for anything outside 1..=5.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Poor),
            2 => Some(Self::Fair),
            3 => Some(Self::Good),
            4 => Some(Self::AsGoodAsHighlights),
            5 => Some(Self::BetterThanHighlights),
            _ => None,
        }
    }

    /// Classify one submitted rating as read from a ratings file.
    pub fn from_json(value: &Value) -> Result<Self, SkipReason> {
        match value.as_i64() {
            Some(n) => Self::from_value(n).ok_or(SkipReason::RatingOutOfRange { value: n }),
            None => Err(SkipReason::InvalidRating {
                value: value.to_string(),
            }),
        }
    }

    /// Human-readable name, e.g. `As Good As Highlights`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::AsGoodAsHighlights => "As Good As Highlights",
            Self::BetterThanHighlights => "Better Than Highlights",
        }
    }
}

impl fmt::Display for ManualScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.value(), self.name())
    }
}

impl TryFrom<i64> for ManualScore {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("rating {value} is outside 1-5"))
    }
}

impl From<ManualScore> for i64 {
    fn from(score: ManualScore) -> Self {
        score.value() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_values_and_names() {
        let values: Vec<u8> = ManualScore::ALL.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(ManualScore::BetterThanHighlights.to_string(), "5. Better Than Highlights");
    }

    #[test]
    fn test_from_value_range() {
        assert_eq!(ManualScore::from_value(3), Some(ManualScore::Good));
        assert_eq!(ManualScore::from_value(0), None);
        assert_eq!(ManualScore::from_value(6), None);
        assert_eq!(ManualScore::from_value(-1), None);
    }

    #[test]
    fn test_from_json_classifies_submissions() {
        use serde_json::json;

        assert_eq!(ManualScore::from_json(&json!(5)), Ok(ManualScore::BetterThanHighlights));
        assert_eq!(
            ManualScore::from_json(&json!(9)),
            Err(SkipReason::RatingOutOfRange { value: 9 })
        );
        assert_eq!(
            ManualScore::from_json(&json!(2.0)),
            Err(SkipReason::InvalidRating {
                value: "2.0".to_string()
            })
        );
        assert!(matches!(
            ManualScore::from_json(&json!(null)),
            Err(SkipReason::InvalidRating { .. })
        ));
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&ManualScore::Fair).unwrap(), "2");
        let back: ManualScore = serde_json::from_str("4").unwrap();
        assert_eq!(back, ManualScore::AsGoodAsHighlights);
        assert!(serde_json::from_str::<ManualScore>("9").is_err());
    }
}
