use std::fmt::Debug;

use async_trait::async_trait;

use crate::Result;

/// A key/value blob store.
///
/// Keys are opaque strings, implementations must not interpret them beyond
/// mapping them onto their own storage.
#[async_trait]
pub trait ArtifactStore: Debug + Send + Sync {
    /// A short backend name used in logs and errors.
    fn backend(&self) -> &'static str;

    /// Stores `bytes` under `key`, replacing any previous value.
    ///
    /// The write must be atomic: readers either see the previous value,
    /// nothing, or the complete new value.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Returns the bytes stored under `key`.
    ///
    /// # Returns
    /// `StoreErr::NotFound` if the key is absent.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Checks whether `key` holds a value.
    ///
    /// Absence is `Ok(false)`, only backend failures are errors.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Lists every key starting with `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}
