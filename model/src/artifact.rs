use std::collections::HashSet;

use artifacts::Artifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LinearRegression, ModelErr, Result};

/// Version of the serialized layout written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Algorithm identifier of `LinearRegression`.
pub const LINEAR_REGRESSION: &str = "linear_regression";

/// Information about the training run that produced a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub held_out_r2: f64,
    pub test_fraction: f64,
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// The persisted form of a trained model.
///
/// `feature_columns` is part of the contract: inference must build feature
/// vectors in exactly this order, `coefficients[i]` weights `feature_columns[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub algorithm: String,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub metadata: ModelMetadata,
}

impl ModelArtifact {
    /// Creates a new `ModelArtifact` for a fitted linear model.
    ///
    /// # Arguments
    /// * `model` - The fitted model.
    /// * `feature_columns` - Feature names in the order the model was fitted with.
    /// * `target_column` - The name of the predicted column.
    /// * `metadata` - Details of the training run.
    ///
    /// # Returns
    /// `ModelErr::Corrupt` if the parts are inconsistent.
    pub fn new(
        model: &LinearRegression,
        feature_columns: Vec<String>,
        target_column: impl Into<String>,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        let artifact = Self {
            format_version: FORMAT_VERSION,
            algorithm: LINEAR_REGRESSION.to_string(),
            feature_columns,
            target_column: target_column.into(),
            coefficients: model.coefficients().to_vec(),
            intercept: model.intercept(),
            metadata,
        };

        artifact.validate()?;
        Ok(artifact)
    }

    /// Rebuilds the fitted model.
    pub fn model(&self) -> LinearRegression {
        LinearRegression::new(self.coefficients.clone(), self.intercept)
    }

    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| -> Result<()> { Err(ModelErr::Corrupt(msg)) };

        if self.format_version != FORMAT_VERSION {
            return corrupt(format!("unsupported format version {}", self.format_version));
        }
        if self.algorithm != LINEAR_REGRESSION {
            return corrupt(format!("unsupported algorithm {:?}", self.algorithm));
        }
        if self.coefficients.len() != self.feature_columns.len() {
            return corrupt(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_columns.len()
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_columns {
            if name.is_empty() || !seen.insert(name.as_str()) {
                return corrupt(format!("empty or duplicate feature column {name:?}"));
            }
        }
        if seen.contains(self.target_column.as_str()) {
            return corrupt(format!("target {:?} listed as a feature", self.target_column));
        }

        let finite = self
            .coefficients
            .iter()
            .chain([&self.intercept, &self.metadata.held_out_r2])
            .all(|v| v.is_finite());
        if !finite {
            return corrupt("non-finite parameters".into());
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;
        serde_json::to_vec_pretty(self).map_err(|e| ModelErr::Corrupt(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: Self =
            serde_json::from_slice(bytes).map_err(|e| ModelErr::Corrupt(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }
}

impl Artifact for ModelArtifact {
    type Error = ModelErr;

    fn encode(&self) -> Result<Vec<u8>> {
        self.to_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}
