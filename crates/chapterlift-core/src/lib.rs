//! Chapterlift Core - batch transform-and-upload pipeline for manga chapters.
//!
//! Takes an ordered list of page files, shrinks and re-encodes each one,
//! uploads it to an object store and returns the public URLs in input
//! order. Identical pages are uploaded once and reused through a
//! content-hash cache.
//!
//! ```text
//! Read → Hash → Dedup lookup → Transform → Upload → Record → links[i]
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use chapterlift_core::{Chapterlift, Config, SourceItem};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> chapterlift_core::Result<()> {
//!     let lift = Chapterlift::new(Config::load()?).await?;
//!     let items = SourceItem::from_paths(["01.png", "02.png"]);
//!     let result = lift
//!         .run(&CancellationToken::new(), items, lift.transform_config(), |_| {})
//!         .await;
//!     println!("{:?}", result.links);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use cache::{ContentStore, DedupCache, JsonFileContentStore, MemoryContentStore};
pub use config::Config;
pub use error::{
    CacheError, ChapterliftError, ConfigError, PipelineError, PipelineResult, Result,
    StorageError,
};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{BatchScheduler, ChapterDiscovery, Hasher, ImageTransformer, SchedulerOptions};
pub use storage::{ObjectInfo, ObjectStore, ObjectStoreFactory, RemoteUploader};
pub use types::{
    BatchResult, Fingerprint, ProcessedAsset, ProgressEvent, SourceItem, TransformConfig,
    UploadOutcome,
};

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A scheduler wired to the configured object store and dedup cache.
pub struct Chapterlift {
    config: Config,
    store: Arc<dyn ObjectStore>,
    scheduler: BatchScheduler,
}

impl Chapterlift {
    /// Build the storage backend and cache named in `config`.
    ///
    /// A cache file that cannot be opened disables dedup for this instance
    /// instead of failing it.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Chapterlift v{}", VERSION);

        let store = ObjectStoreFactory::create(&config.storage).await?;
        let public_base = ObjectStoreFactory::public_base(&config.storage)?;

        let cache = if config.cache.enabled {
            let path = config.cache.resolved_path();
            tracing::debug!("Dedup cache: {:?}", path);
            match JsonFileContentStore::open(path.clone()).await {
                Ok(store) => DedupCache::new(Arc::new(store)),
                Err(e) => {
                    tracing::warn!("Ignoring dedup cache {:?}: {e}", path);
                    DedupCache::disabled()
                }
            }
        } else {
            DedupCache::disabled()
        };

        let scheduler = BatchScheduler::new(
            ImageTransformer::new(),
            cache,
            RemoteUploader::new(store.clone(), public_base),
            SchedulerOptions {
                workers: config.processing.worker_limit(),
                simulate_delay: Duration::from_millis(config.transform.simulate_delay_ms),
            },
        );

        Ok(Self {
            config,
            store,
            scheduler,
        })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured object store, for listing and deleting.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Per-batch transform settings seeded from the config file.
    pub fn transform_config(&self) -> TransformConfig {
        self.config.transform.to_transform_config()
    }

    /// Run one batch. See [`BatchScheduler::run`].
    pub async fn run<F>(
        &self,
        cancel: &CancellationToken,
        items: Vec<SourceItem>,
        config: TransformConfig,
        on_progress: F,
    ) -> BatchResult
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.scheduler.run(cancel, items, config, on_progress).await
    }
}
