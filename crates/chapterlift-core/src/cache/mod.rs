//! Dedup cache: fingerprint to public URL.
//!
//! The cache is a performance optimization, never a correctness requirement.
//! Lookup errors read as misses and record errors are handed back for the
//! caller to log; neither can fail a page.

mod json_file;
mod memory;

pub use json_file::JsonFileContentStore;
pub use memory::MemoryContentStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CacheError;
use crate::types::Fingerprint;

/// Persistent key-value store backing the dedup cache.
///
/// Implementations synchronize themselves; concurrent `put`s of the same
/// hash are last-writer-wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the URL recorded for a hash, if any.
    async fn get(&self, hash: &str) -> Result<Option<String>, CacheError>;

    /// Record (or overwrite) the URL for a hash.
    async fn put(&self, hash: &str, url: &str) -> Result<(), CacheError>;
}

/// Thin client over a [`ContentStore`] with soft-failure semantics.
#[derive(Clone)]
pub struct DedupCache {
    store: Option<Arc<dyn ContentStore>>,
}

impl DedupCache {
    /// Cache backed by the given store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Cache that never hits and never records.
    pub fn disabled() -> Self {
        Self { store: None }
    }

    /// Whether a backing store is attached.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Look up a previously issued URL.
    ///
    /// Returns `None` on a miss and also when the store fails.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(fingerprint.as_str()).await {
            Ok(found) => found.filter(|url| !url.is_empty()),
            Err(e) => {
                tracing::warn!(
                    "Dedup lookup failed in {} store, treating as miss: {e}",
                    store.name()
                );
                None
            }
        }
    }

    /// Record the URL for a fingerprint. Best-effort.
    pub async fn record(&self, fingerprint: &Fingerprint, url: &str) -> Result<(), CacheError> {
        match &self.store {
            Some(store) => store.put(fingerprint.as_str(), url).await,
            None => Ok(()),
        }
    }
}
