use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use tokio::{fs, io::AsyncWriteExt};

use crate::{ArtifactStore, Result, StoreErr};

const BACKEND: &str = "fs";
const TMP_SUFFIX: &str = ".tmp";

/// A directory-backed artifact store, one file per key.
///
/// Keys map to relative paths by splitting on `/`. Writes go to a hidden
/// sibling file which is then renamed over the target, so a crashed write
/// never leaves a partial object under the real key.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Arguments
    /// * `root` - The bucket directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreErr::unavailable(BACKEND, format!("{}: {e}", root.display())))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to its file path.
    ///
    /// # Returns
    /// `StoreErr::InvalidKey` for keys that would escape the root or collide
    /// with temporary files.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let invalid = |reason| StoreErr::InvalidKey {
            key: key.to_string(),
            reason,
        };

        if key.is_empty() {
            return Err(invalid("empty key"));
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == ".." {
                return Err(invalid("empty or parent segment"));
            }
            if segment.starts_with('.') {
                return Err(invalid("hidden segment"));
            }
            path.push(segment);
        }

        Ok(path)
    }

    /// Whether `e` means nothing is stored under the key. A directory at the
    /// key, or a file where a parent directory should be, counts as absent.
    fn is_absent(e: &io::Error) -> bool {
        matches!(
            e.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::IsADirectory | io::ErrorKind::NotADirectory
        )
    }

    fn io_err(key: &str, e: io::Error) -> StoreErr {
        if Self::is_absent(&e) {
            return StoreErr::NotFound {
                key: key.to_string(),
            };
        }
        StoreErr::unavailable(BACKEND, format!("{key}: {e}"))
    }

    async fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).await?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{file_name}.{:016x}{TMP_SUFFIX}", rand::random::<u64>()));

        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            fs::rename(&tmp, path).await
        }
        .await;

        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }

        written
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        Self::write_atomically(&path, &bytes)
            .await
            .map_err(|e| StoreErr::unavailable(BACKEND, format!("{key}: {e}")))?;

        debug!(key = key, bytes = bytes.len(); "object written");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        let meta = fs::metadata(&path).await.map_err(|e| Self::io_err(key, e))?;
        if !meta.is_file() {
            return Err(StoreErr::NotFound {
                key: key.to_string(),
            });
        }

        fs::read(&path).await.map_err(|e| Self::io_err(key, e))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if Self::is_absent(&e) => Ok(false),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, rel)) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreErr::unavailable(BACKEND, e)),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreErr::unavailable(BACKEND, e))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }

                let key = format!("{rel}{name}");
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StoreErr::unavailable(BACKEND, e))?;

                if file_type.is_dir() {
                    pending.push((entry.path(), format!("{key}/")));
                } else if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
