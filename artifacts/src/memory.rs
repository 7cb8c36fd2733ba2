use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{ArtifactStore, Result, StoreErr};

const BACKEND: &str = "memory";

/// An in-process artifact store.
///
/// Objects are kept as shared immutable buffers, a `put` swaps the whole
/// buffer under the write lock so readers never see a partial value.
///
/// Availability can be switched off to simulate an unreachable backend.
#[derive(Debug)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Arc<[u8]>>>,
    readable: AtomicBool,
    writable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            readable: AtomicBool::new(true),
            writable: AtomicBool::new(true),
        }
    }

    /// Makes every operation fail with `BackendUnavailable` while `false`.
    pub fn set_available(&self, available: bool) {
        self.readable.store(available, Ordering::Release);
        self.writable.store(available, Ordering::Release);
    }

    /// Makes only `put` fail with `BackendUnavailable` while `false`.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::Release);
    }

    fn check_readable(&self) -> Result<()> {
        if self.readable.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreErr::unavailable(BACKEND, "store is offline"))
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.writable.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreErr::unavailable(BACKEND, "store rejects writes"))
        }
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.check_writable()?;
        self.objects.write().insert(key.to_string(), Arc::from(bytes));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.check_readable()?;
        self.objects
            .read()
            .get(key)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| StoreErr::NotFound {
                key: key.to_string(),
            })
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_readable()?;
        Ok(self.objects.read().contains_key(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.check_readable()?;
        let keys = self
            .objects
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        Ok(keys)
    }
}
