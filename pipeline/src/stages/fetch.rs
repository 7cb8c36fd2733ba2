use artifacts::{ArtifactClient, ArtifactKey};
use log::info;

use crate::{DataSource, PipelineErr, Result, Table};

/// Summary of a fetch run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub key: ArtifactKey,
    pub rows: usize,
    pub columns: usize,
    pub incomplete_rows: usize,
    pub bytes: usize,
}

/// Ingests a dataset from a `DataSource` into `raw/<name>`.
pub struct FetchStage {
    client: ArtifactClient,
    source: Box<dyn DataSource>,
}

impl FetchStage {
    /// Creates a new `FetchStage`.
    ///
    /// # Arguments
    /// * `client` - The artifact store the raw dataset is written to.
    /// * `source` - Where the dataset is read from.
    pub fn new(client: ArtifactClient, source: impl DataSource + 'static) -> Self {
        Self {
            client,
            source: Box::new(source),
        }
    }

    /// Reads the whole dataset, validates it and stores it in one put.
    ///
    /// Nothing is written unless the complete snapshot was read and parsed.
    pub async fn run(&self, name: &str) -> Result<FetchReport> {
        let origin = self.source.origin();
        info!(dataset = name, origin = origin.as_str(); "fetching raw dataset");

        let bytes = self.source.fetch().await?;
        let table = Table::from_csv(&bytes)?;
        if table.is_empty() {
            return Err(PipelineErr::malformed(origin, "dataset has no rows"));
        }

        let key = ArtifactKey::raw(name);
        let written = self.client.put_artifact(&key, &table).await?;

        let report = FetchReport {
            key,
            rows: table.len(),
            columns: table.columns().len(),
            incomplete_rows: table.incomplete_rows(),
            bytes: written,
        };

        info!(
            key:% = report.key,
            rows = report.rows,
            incomplete_rows = report.incomplete_rows;
            "raw dataset stored"
        );
        Ok(report)
    }
}
