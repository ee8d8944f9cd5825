//! File-system object store: one directory per bucket.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{ObjectInfo, ObjectStore};
use crate::error::StorageError;

/// Stores objects as flat files under `<root>/<bucket>/`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        Self {
            dir: root.as_ref().join(bucket),
        }
    }

    /// Directory holding the bucket's objects.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys are flat file names.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if matches!(key, "" | "." | "..") || key.contains(['/', '\\']) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _size: u64,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified_at = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64);
            objects.push(ObjectInfo {
                key: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                modified_at,
            });
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            let path = self.object_path(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Deleted {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "chapters");

        assert!(store.list().await.unwrap().is_empty());

        store.put("2_b.jpg", vec![1, 2], 2, "image/jpeg").await.unwrap();
        store.put("1_a.jpg", vec![1], 1, "image/jpeg").await.unwrap();

        let listed = store.list().await.unwrap();
        let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["1_a.jpg", "2_b.jpg"]);
        assert_eq!(listed[1].size, 2);
        assert!(listed[0].modified_at.is_some());

        store
            .delete(&["1_a.jpg".to_string(), "never_there.jpg".to_string()])
            .await
            .unwrap();
        let keys: Vec<_> = store.list().await.unwrap().into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["2_b.jpg"]);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "chapters");

        store.put("a.jpg", vec![1, 2, 3], 3, "image/jpeg").await.unwrap();
        store.put("a.jpg", vec![9], 1, "image/jpeg").await.unwrap();
        assert_eq!(std::fs::read(store.dir().join("a.jpg")).unwrap(), vec![9]);
    }

    #[tokio::test]
    async fn test_path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "chapters");

        for key in ["", "../x.jpg", "sub/x.jpg", "..", "a\\b.jpg"] {
            let err = store.put(key, vec![1], 1, "image/jpeg").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {key:?}");
        }
    }
}
