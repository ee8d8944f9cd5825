//! Object storage: where encoded pages end up and how their public URL is
//! formed.

mod local;
mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::StorageConfig;
use crate::error::{PipelineError, PipelineResult, StorageError};
use crate::types::ProcessedAsset;

/// One stored object as reported by [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    /// Last modification, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
}

/// Bucket-scoped blob store.
///
/// Implementations are shared across tasks and must be safe for concurrent
/// use.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Store `data` under `key`, replacing any existing object.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        size: u64,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// List every object in the bucket.
    async fn list(&self) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Delete objects by key. Missing keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<(), StorageError>;
}

/// Creates object stores from configuration.
pub struct ObjectStoreFactory;

impl ObjectStoreFactory {
    /// Build the backend named in `config.backend`.
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
        match config.backend.as_str() {
            "s3" | "r2" => Ok(Arc::new(S3ObjectStore::from_config(config).await?)),
            "local" => Ok(Arc::new(LocalObjectStore::new(
                config.local_root(),
                &config.bucket,
            ))),
            other => Err(StorageError::Config(format!(
                "unknown storage backend '{other}'"
            ))),
        }
    }

    /// Public base URL for the configured backend.
    ///
    /// The local backend falls back to a `file://` URL of its bucket
    /// directory; remote backends require an explicit base.
    pub fn public_base(config: &StorageConfig) -> Result<String, StorageError> {
        if !config.public_base.is_empty() {
            return Ok(config.public_base.clone());
        }
        match config.backend.as_str() {
            "local" => Ok(format!(
                "file://{}",
                config.local_root().join(&config.bucket).display()
            )),
            _ => Err(StorageError::Config(
                "public_base (or PUBLIC_DOMAIN) must be set for remote storage".to_string(),
            )),
        }
    }
}

/// Uploads processed assets and turns keys into public URLs.
#[derive(Clone)]
pub struct RemoteUploader {
    store: Arc<dyn ObjectStore>,
    public_base: String,
}

impl RemoteUploader {
    pub fn new(store: Arc<dyn ObjectStore>, public_base: impl Into<String>) -> Self {
        Self {
            store,
            public_base: public_base.into(),
        }
    }

    /// Public URL for an object key: `<base>/<key>` with exactly one slash.
    pub fn compose_url(&self, key: &str) -> String {
        let base = self.public_base.trim_end_matches('/');
        if base.is_empty() {
            return key.to_string();
        }
        format!("{base}/{key}")
    }

    /// Store the asset and return its URL.
    ///
    /// `source` is only used to report failures. Abandons the request when
    /// `cancel` fires.
    pub async fn upload(
        &self,
        asset: ProcessedAsset,
        source: &Path,
        cancel: &CancellationToken,
    ) -> PipelineResult<String> {
        let key = asset.output_name;
        let put = self
            .store
            .put(&key, asset.bytes, asset.size, ProcessedAsset::CONTENT_TYPE);

        let stored = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            res = put => res,
        };

        match stored {
            Ok(()) => {
                tracing::debug!("Stored {} ({} bytes) in {}", key, asset.size, self.store.name());
                Ok(self.compose_url(&key))
            }
            Err(e) => Err(PipelineError::Upload {
                path: source.to_path_buf(),
                key,
                message: e.to_string(),
            }),
        }
    }
}
