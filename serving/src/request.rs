use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feature name to value mapping of one prediction.
///
/// Values are kept as raw JSON so that non-numeric values can be reported
/// per key instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest(BTreeMap<String, Value>);

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a numeric feature.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Value::from(value));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for PredictionRequest {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<(String, f64)> for PredictionRequest {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: f64,
}

/// Description of the model currently served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub key: String,
    pub generation: u64,
    pub algorithm: String,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub held_out_r2: f64,
    pub trained_at: DateTime<Utc>,
}
