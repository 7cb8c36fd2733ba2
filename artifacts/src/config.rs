use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, ValueEnum};

use crate::{ArtifactStore, FsStore, MemoryStore, Result, S3Store};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_BUCKET: &str = "house-price-data";

/// Which backend holds the artifacts.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    Fs { root: PathBuf },
    S3 {
        endpoint: String,
        bucket: String,
        timeout: Duration,
    },
}

impl StoreConfig {
    /// Builds the configured backend.
    ///
    /// # Returns
    /// A shared store handle or `BackendUnavailable` if it can't be opened.
    pub async fn connect(&self) -> Result<Arc<dyn ArtifactStore>> {
        let store: Arc<dyn ArtifactStore> = match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Fs { root } => Arc::new(FsStore::open(root.clone()).await?),
            StoreConfig::S3 {
                endpoint,
                bucket,
                timeout,
            } => Arc::new(S3Store::new(endpoint, bucket.clone(), *timeout).await),
        };

        log::info!("using {} artifact store", store.backend());
        Ok(store)
    }
}

/// Backends selectable from the command line. The in-memory store is only
/// reachable through `StoreConfig::Memory`, since nothing outlives the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Fs,
    S3,
}

/// Command line / environment selection of the artifact store.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Artifact store backend.
    #[arg(long = "store", env = "ARTIFACT_STORE", value_enum, default_value_t = Backend::Fs)]
    pub backend: Backend,

    /// Root directory of the filesystem backend.
    #[arg(long, env = "ARTIFACT_ROOT", default_value = "./artifacts")]
    pub root: PathBuf,

    /// Endpoint of the S3-compatible backend.
    #[arg(long, env = "S3_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bucket of the S3-compatible backend.
    #[arg(long, env = "S3_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Request timeout for remote backends, in seconds.
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl StoreArgs {
    pub fn config(&self) -> StoreConfig {
        match self.backend {
            Backend::Fs => StoreConfig::Fs {
                root: self.root.clone(),
            },
            Backend::S3 => StoreConfig::S3 {
                endpoint: self.endpoint.clone(),
                bucket: self.bucket.clone(),
                timeout: Duration::from_secs(self.timeout_secs.max(1)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        store: StoreArgs,
    }

    #[test]
    fn s3_args_build_s3_config() {
        let cli = Cli::parse_from(["test", "--store", "s3", "--bucket", "models", "--timeout-secs", "0"]);

        match cli.store.config() {
            StoreConfig::S3 {
                endpoint,
                bucket,
                timeout,
            } => {
                assert_eq!(endpoint, DEFAULT_ENDPOINT);
                assert_eq!(bucket, "models");
                assert_eq!(timeout, Duration::from_secs(1));
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn memory_backend_is_not_selectable() {
        assert!(Cli::try_parse_from(["test", "--store", "memory"]).is_err());

        let cli = Cli::parse_from(["test"]);
        assert_eq!(cli.store.backend, Backend::Fs);
    }

    #[tokio::test]
    async fn memory_config_connects() {
        let store = StoreConfig::Memory.connect().await.unwrap();
        assert_eq!(store.backend(), "memory");
    }
}
