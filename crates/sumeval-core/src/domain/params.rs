//! Generation parameters passed through to a capability.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Minimum summary length used when a harness is built without defaults.
pub const DEFAULT_MIN_LENGTH: u32 = 30;

/// Maximum summary length used when a harness is built without defaults.
pub const DEFAULT_MAX_LENGTH: u32 = 100;

/// Options understood by the harness, plus an opaque `extra` map for
/// capability-specific settings.
///
/// Two layers exist: harness defaults and per-call overrides. [`merged`]
/// combines them key by key, with the override winning. The merge is shallow;
/// nested objects inside `extra` are replaced, never combined.
///
/// [`merged`]: GenerationParams::merged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl GenerationParams {
    /// The harness defaults: `min_length = 30`, `max_length = 100`.
    pub fn standard() -> Self {
        Self {
            min_length: Some(DEFAULT_MIN_LENGTH),
            max_length: Some(DEFAULT_MAX_LENGTH),
            extra: Map::new(),
        }
    }

    pub fn with_min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Add a capability-specific option.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Overlay `overrides` on top of `self`.
    pub fn merged(&self, overrides: &GenerationParams) -> GenerationParams {
        let mut extra = self.extra.clone();
        for (key, value) in &overrides.extra {
            extra.insert(key.clone(), value.clone());
        }
        GenerationParams {
            min_length: overrides.min_length.or(self.min_length),
            max_length: overrides.max_length.or(self.max_length),
            extra,
        }
    }

    /// Flatten into a single JSON object, as sent to inference endpoints.
    ///
    /// Typed fields take precedence over same-named keys in `extra`.
    pub fn to_json(&self) -> Value {
        let mut out = self.extra.clone();
        if let Some(min) = self.min_length {
            out.insert("min_length".to_string(), Value::from(min));
        }
        if let Some(max) = self.max_length {
            out.insert("max_length".to_string(), Value::from(max));
        }
        Value::Object(out)
    }
}
