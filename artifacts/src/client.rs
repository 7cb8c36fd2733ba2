use std::{fmt::Display, sync::Arc};

use log::debug;

use crate::{ArtifactKey, ArtifactKind, ArtifactStore, Result, StoreErr};

/// A value with a stable serialized form that can be stored as an artifact.
pub trait Artifact: Sized {
    type Error: Display;

    fn encode(&self) -> std::result::Result<Vec<u8>, Self::Error>;

    fn decode(bytes: &[u8]) -> std::result::Result<Self, Self::Error>;
}

/// Typed access to an `ArtifactStore` through logical keys.
///
/// Every call is a single independent request to the backend, the client
/// holds no state besides the store handle and performs no caching.
#[derive(Debug, Clone)]
pub struct ArtifactClient {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactClient {
    /// Creates a new `ArtifactClient`.
    ///
    /// # Arguments
    /// * `store` - The backend every request is forwarded to.
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub async fn put_bytes(&self, key: &ArtifactKey, bytes: Vec<u8>) -> Result<()> {
        let path = key.path();
        let len = bytes.len();
        self.store.put(&path, bytes).await?;
        debug!(backend = self.store.backend(), key = path.as_str(), bytes = len; "artifact stored");
        Ok(())
    }

    pub async fn get_bytes(&self, key: &ArtifactKey) -> Result<Vec<u8>> {
        let path = key.path();
        let bytes = self.store.get(&path).await?;
        debug!(backend = self.store.backend(), key = path.as_str(), bytes = bytes.len(); "artifact read");
        Ok(bytes)
    }

    pub async fn exists(&self, key: &ArtifactKey) -> Result<bool> {
        self.store.exists(&key.path()).await
    }

    /// Lists the artifacts of one kind.
    ///
    /// Keys under the prefix that don't parse as an `ArtifactKey` are skipped.
    pub async fn list(&self, kind: ArtifactKind) -> Result<Vec<ArtifactKey>> {
        let keys = self.store.list(kind.prefix()).await?;
        Ok(keys.iter().filter_map(|key| ArtifactKey::parse(key)).collect())
    }

    /// Encodes `artifact` and stores it under `key` in a single put.
    ///
    /// # Returns
    /// The amount of bytes written.
    pub async fn put_artifact<A: Artifact>(&self, key: &ArtifactKey, artifact: &A) -> Result<usize> {
        let bytes = artifact.encode().map_err(|e| StoreErr::Corrupt {
            key: key.path(),
            reason: format!("encode failed: {e}"),
        })?;
        let len = bytes.len();
        self.put_bytes(key, bytes).await?;
        Ok(len)
    }

    /// Reads and decodes the artifact stored under `key`.
    ///
    /// # Returns
    /// `StoreErr::Corrupt` if the stored bytes don't decode.
    pub async fn get_artifact<A: Artifact>(&self, key: &ArtifactKey) -> Result<A> {
        let bytes = self.get_bytes(key).await?;
        A::decode(&bytes).map_err(|e| StoreErr::Corrupt {
            key: key.path(),
            reason: e.to_string(),
        })
    }
}
