//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::TransformConfig;

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of pages processed concurrently (0 = one per logical CPU)
    pub parallel_workers: usize,

    /// File extensions picked up when scanning a chapter directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 0,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

impl ProcessingConfig {
    /// Resolve the admission bound, expanding 0 to the available parallelism.
    pub fn worker_limit(&self) -> usize {
        if self.parallel_workers > 0 {
            return self.parallel_workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Default page transform settings.
///
/// These seed the per-batch [`TransformConfig`]; CLI flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Shrink pages wider than `max_dimension`
    pub resize: bool,

    /// Target width in pixels for oversized pages
    pub max_dimension: u32,

    /// JPEG quality (1-100)
    pub quality: u8,

    /// Skip real work and return synthetic URLs
    pub simulate: bool,

    /// Per-page delay in simulate mode
    pub simulate_delay_ms: u64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            resize: true,
            max_dimension: 1600,
            quality: 80,
            simulate: false,
            simulate_delay_ms: 100,
        }
    }
}

impl TransformSettings {
    /// Build the immutable per-batch transform value.
    pub fn to_transform_config(&self) -> TransformConfig {
        TransformConfig {
            resize_enabled: self.resize,
            max_dimension: self.max_dimension,
            quality: self.quality,
            simulate_only: self.simulate,
        }
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend name: "s3" (any S3-compatible service, including R2) or "local"
    pub backend: String,

    /// Bucket that receives uploaded pages
    pub bucket: String,

    /// Public base URL that objects are served from
    pub public_base: String,

    /// S3 endpoint URL (derived from `account_id` for R2 when empty)
    pub endpoint: String,

    /// Cloudflare account ID (R2)
    pub account_id: String,

    /// Signing region ("auto" for R2)
    pub region: String,

    /// Access key ID (supports ${ENV_VAR} syntax)
    pub access_key: String,

    /// Secret access key (supports ${ENV_VAR} syntax)
    pub secret_key: String,

    /// Root directory of the local backend
    pub local_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            bucket: "chapters".to_string(),
            public_base: String::new(),
            endpoint: String::new(),
            account_id: String::new(),
            region: "auto".to_string(),
            access_key: "${R2_ACCESS_KEY}".to_string(),
            secret_key: "${R2_SECRET_KEY}".to_string(),
            local_dir: "~/.chapterlift/objects".to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve the S3 endpoint, deriving the R2 endpoint from the account ID.
    pub fn resolved_endpoint(&self) -> Option<String> {
        if !self.endpoint.is_empty() {
            return Some(self.endpoint.trim_end_matches('/').to_string());
        }
        if !self.account_id.is_empty() {
            return Some(format!(
                "https://{}.r2.cloudflarestorage.com",
                self.account_id
            ));
        }
        None
    }

    /// Get the local backend root with `~` expanded.
    pub fn local_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.local_dir).into_owned())
    }
}

/// Dedup cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse URLs of previously uploaded identical pages
    pub enabled: bool,

    /// JSON file holding the content-hash to URL map
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.chapterlift/cache.json".to_string(),
        }
    }
}

impl CacheConfig {
    /// Get the cache file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
