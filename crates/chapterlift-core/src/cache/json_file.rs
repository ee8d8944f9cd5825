//! Content store persisted as a JSON object on disk.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::ContentStore;
use crate::error::CacheError;

/// `{ "<hash>": "<url>", ... }` kept in memory and rewritten on every put.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash mid-write leaves the previous map intact.
pub struct JsonFileContentStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileContentStore {
    /// Open the store, loading existing entries. A missing file is an empty
    /// store; parent directories are created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Loaded {} cached URLs from {:?}", entries.len(), path);
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for JsonFileContentStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn get(&self, hash: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(hash).cloned())
    }

    async fn put(&self, hash: &str, url: &str) -> Result<(), CacheError> {
        // Held across the write so concurrent puts hit the disk in order.
        let mut entries = self.entries.lock().await;
        if entries.get(hash).map(String::as_str) == Some(url) {
            return Ok(());
        }
        entries.insert(hash.to_string(), url.to_string());
        self.persist(&entries).await
    }
}
