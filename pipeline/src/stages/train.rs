use artifacts::{ArtifactClient, ArtifactKey};
use chrono::Utc;
use log::info;
use model::{LinearRegression, ModelArtifact, ModelMetadata, metrics};
use ndarray::{Array1, Array2};

use crate::{PipelineErr, Result, Table, TrainConfig, split::train_test_split};

/// Held-out rows needed for a meaningful score.
const MIN_TEST_ROWS: usize = 2;

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub key: ArtifactKey,
    pub held_out_r2: f64,
    pub rmse: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_columns: Vec<String>,
}

/// Fits a model on `processed/<name>` and stores it as `models/<name>`.
pub struct TrainStage {
    client: ArtifactClient,
    config: TrainConfig,
}

/// Design matrix and targets of one partition.
struct Partition {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Partition {
    fn gather(features: &[Vec<f64>], target: &[f64], rows: &[usize]) -> Self {
        let x = Array2::from_shape_fn((rows.len(), features.len()), |(r, c)| features[c][rows[r]]);
        let y = rows.iter().map(|&r| target[r]).collect();
        Self { x, y }
    }
}

impl TrainStage {
    pub fn new(client: ArtifactClient, config: TrainConfig) -> Self {
        Self { client, config }
    }

    /// Trains on the processed dataset and uploads the model.
    ///
    /// The model is uploaded with a single put, only after both the fit and
    /// the held-out score succeeded.
    ///
    /// # Returns
    /// `ArtifactMissing` if `processed/<name>` is absent, `InsufficientData`
    /// or `NumericalInstability` if no valid model can be produced.
    pub async fn run(&self, name: &str) -> Result<TrainReport> {
        let input = ArtifactKey::processed(name);
        info!(key:% = input, seed = self.config.seed(); "training model");

        let table: Table = self.client.get_artifact(&input).await?;
        let (artifact, rmse) = self.fit(&table)?;

        let key = ArtifactKey::model(name);
        self.client.put_artifact(&key, &artifact).await?;

        let report = TrainReport {
            key,
            held_out_r2: artifact.metadata.held_out_r2,
            rmse,
            train_rows: artifact.metadata.train_rows,
            test_rows: artifact.metadata.test_rows,
            feature_columns: artifact.feature_columns,
        };

        info!(
            key:% = report.key,
            r2 = report.held_out_r2,
            rmse = report.rmse;
            "model stored"
        );
        Ok(report)
    }

    /// Fits and scores a model without touching the store.
    ///
    /// # Returns
    /// The model artifact and the held-out root mean squared error.
    pub fn fit(&self, table: &Table) -> Result<(ModelArtifact, f64)> {
        let target_name = self.config.target_column();
        let target_idx = table.column_index(target_name).ok_or_else(|| {
            PipelineErr::SchemaMismatch(format!("target column {target_name:?} not present"))
        })?;

        let (feature_idx, feature_columns): (Vec<usize>, Vec<String>) = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target_idx)
            .map(|(idx, name)| (idx, name.clone()))
            .unzip();

        if feature_columns.is_empty() {
            return Err(PipelineErr::SchemaMismatch("no feature columns".into()));
        }

        let features = feature_idx
            .iter()
            .map(|&idx| table.numeric_column(idx))
            .collect::<Result<Vec<_>>>()?;
        let target = table.numeric_column(target_idx)?;

        let split = train_test_split(table.len(), self.config.test_fraction(), self.config.seed());
        if split.test.len() < MIN_TEST_ROWS {
            return Err(PipelineErr::InsufficientData(format!(
                "{} held-out rows, need at least {MIN_TEST_ROWS}",
                split.test.len()
            )));
        }
        if split.train.len() <= feature_columns.len() {
            return Err(PipelineErr::InsufficientData(format!(
                "{} training rows for {} features",
                split.train.len(),
                feature_columns.len()
            )));
        }

        let train = Partition::gather(&features, &target, &split.train);
        let test = Partition::gather(&features, &target, &split.test);

        let model = LinearRegression::fit(train.x.view(), train.y.view())?;
        let predictions = model.predict(test.x.view())?;

        let score = metrics::r2_score(test.y.view(), predictions.view())?;
        let rmse = metrics::rmse(test.y.view(), predictions.view())?;
        if !score.is_finite() || !rmse.is_finite() {
            return Err(PipelineErr::NumericalInstability(format!(
                "held-out score is not finite: r2={score} rmse={rmse}"
            )));
        }

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            held_out_r2: score,
            test_fraction: self.config.test_fraction(),
            seed: self.config.seed(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        };

        let artifact = ModelArtifact::new(&model, feature_columns, target_name, metadata)?;
        Ok((artifact, rmse))
    }
}
