use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use reqwest::Client;

use crate::{PipelineErr, Result};

/// The California housing dataset.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/ageron/handson-ml2/master/datasets/housing/housing.csv";

/// Where the fetch stage reads raw dataset bytes from.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// A human readable origin, used in logs and errors.
    fn origin(&self) -> String;

    /// Reads the complete dataset.
    ///
    /// # Returns
    /// `SourceUnavailable` if the source can't be read.
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Downloads the dataset over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    /// Creates a new `HttpSource`.
    ///
    /// # Arguments
    /// * `url` - The dataset location.
    /// * `timeout` - Timeout of the whole download.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineErr::SourceUnavailable {
                origin: url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { url, client })
    }

    fn unavailable(&self, reason: impl ToString) -> PipelineErr {
        PipelineErr::SourceUnavailable {
            origin: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn origin(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if !resp.status().is_success() {
            return Err(self.unavailable(format!("status {}", resp.status())));
        }

        let bytes = resp.bytes().await.map_err(|e| self.unavailable(e))?;
        Ok(bytes.to_vec())
    }
}

/// Reads the dataset from a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| PipelineErr::SourceUnavailable {
                origin: self.origin(),
                reason: e.to_string(),
            })
    }
}

/// A fixed in-memory dataset, for fixtures and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    bytes: Vec<u8>,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn origin(&self) -> String {
        format!("static:{}", self.label)
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_source_unavailable() {
        let source = FileSource::new("/nonexistent/housing.csv");
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.code(), "SourceUnavailable");
    }

    #[tokio::test]
    async fn unreachable_url_is_source_unavailable() {
        let source = HttpSource::new("http://127.0.0.1:9/housing.csv", Duration::from_secs(1)).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.code(), "SourceUnavailable");
    }

    #[tokio::test]
    async fn static_source_returns_its_bytes() {
        let source = StaticSource::new("fixture", "a,b\n1,2\n");
        assert_eq!(source.fetch().await.unwrap(), b"a,b\n1,2\n");
        assert_eq!(source.origin(), "static:fixture");
    }
}
