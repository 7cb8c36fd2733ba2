use crate::{PipelineErr, Result};

pub const DEFAULT_DATASET: &str = "housing";
pub const DEFAULT_DROP_COLUMN: &str = "ocean_proximity";
pub const DEFAULT_TARGET: &str = "median_house_value";
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Settings of the preprocessing transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    drop_columns: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            drop_columns: vec![DEFAULT_DROP_COLUMN.to_string()],
        }
    }
}

impl PreprocessConfig {
    /// Creates a new `PreprocessConfig`.
    ///
    /// # Arguments
    /// * `drop_columns` - Non-predictive columns removed from every row.
    pub fn new(drop_columns: Vec<String>) -> Result<Self> {
        if drop_columns.iter().any(String::is_empty) {
            return Err(PipelineErr::InvalidConfig("empty drop column name".into()));
        }

        Ok(Self { drop_columns })
    }

    pub fn drop_columns(&self) -> &[String] {
        &self.drop_columns
    }
}

/// Settings of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    target_column: String,
    test_fraction: f64,
    seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET.to_string(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainConfig {
    /// Creates a new `TrainConfig`.
    ///
    /// # Arguments
    /// * `target_column` - The predicted column.
    /// * `test_fraction` - Share of held-out rows, strictly between 0 and 1.
    /// * `seed` - Seed of the train/test shuffle.
    pub fn new(target_column: impl Into<String>, test_fraction: f64, seed: u64) -> Result<Self> {
        let target_column = target_column.into();

        if target_column.is_empty() {
            return Err(PipelineErr::InvalidConfig("empty target column".into()));
        }
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PipelineErr::InvalidConfig(format!(
                "test fraction must be in (0, 1), got {test_fraction}"
            )));
        }

        Ok(Self {
            target_column,
            test_fraction,
            seed,
        })
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
