//! In-process content store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::ContentStore;
use crate::error::CacheError;

/// Content store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded hashes.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, hash: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(hash).cloned())
    }

    async fn put(&self, hash: &str, url: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(hash.to_string(), url.to_string());
        Ok(())
    }
}
