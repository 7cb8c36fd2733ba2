use artifacts::{ArtifactClient, ArtifactKey};
use log::info;

use crate::{PreprocessConfig, Result, Table};

/// Summary of a preprocessing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessReport {
    pub key: ArtifactKey,
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped: Vec<String>,
    pub columns: Vec<String>,
}

/// Cleans `raw/<name>` into `processed/<name>`.
pub struct PreprocessStage {
    client: ArtifactClient,
    config: PreprocessConfig,
}

impl PreprocessStage {
    pub fn new(client: ArtifactClient, config: PreprocessConfig) -> Self {
        Self { client, config }
    }

    /// Downloads the raw dataset, applies `transform` and uploads the result.
    ///
    /// # Returns
    /// `ArtifactMissing` if `raw/<name>` is absent, `SchemaMismatch` if a
    /// column to drop isn't in the dataset.
    pub async fn run(&self, name: &str) -> Result<PreprocessReport> {
        let raw_key = ArtifactKey::raw(name);
        info!(key:% = raw_key; "preprocessing raw dataset");

        let raw: Table = self.client.get_artifact(&raw_key).await?;
        let rows_in = raw.len();
        let processed = transform(raw, &self.config)?;

        let key = ArtifactKey::processed(name);
        self.client.put_artifact(&key, &processed).await?;

        let report = PreprocessReport {
            key,
            rows_in,
            rows_out: processed.len(),
            dropped: self.config.drop_columns().to_vec(),
            columns: processed.columns().to_vec(),
        };

        info!(
            key:% = report.key,
            rows_in = report.rows_in,
            rows_out = report.rows_out;
            "processed dataset stored"
        );
        Ok(report)
    }
}

/// Drops every row with a missing value, then the configured columns.
///
/// The transform only depends on its input, encoding the output of equal
/// inputs always yields equal bytes.
pub fn transform(table: Table, config: &PreprocessConfig) -> Result<Table> {
    table.drop_incomplete_rows().drop_columns(config.drop_columns())
}
