//! Error types for the Chapterlift transform-and-upload pipeline.
//!
//! Per-item errors are organized by stage so a failed page can be reported
//! with its source path and a readable reason. Adapter errors (object store,
//! content store) have their own enums and are folded into the per-item
//! taxonomy at the task boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Chapterlift operations.
#[derive(Error, Debug)]
pub enum ChapterliftError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Content store errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-item pipeline errors, organized by stage.
///
/// Everything except `Cancelled` is soft: it fails one page, never the batch.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file could not be read
    #[error("Read error for {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Bytes are not a valid or supported raster image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Re-encoding to the target format failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The object store rejected the object or the network failed
    #[error("Upload error for {path} (key {key}): {message}")]
    Upload {
        path: PathBuf,
        key: String,
        message: String,
    },

    /// Content store lookup or record failed (always swallowed by callers)
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The batch-wide cancellation token fired
    #[error("Upload cancelled")]
    Cancelled,
}

/// Object store adapter errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The remote service returned an error or could not be reached
    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },

    /// Local backend file-system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The object key cannot be stored by this backend
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// The backend is missing required settings
    #[error("Storage misconfigured: {0}")]
    Config(String),
}

impl StorageError {
    /// Build a `Request` error from any displayable service error.
    pub fn request(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Request {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

/// Content store adapter errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Chapterlift results.
pub type Result<T> = std::result::Result<T, ChapterliftError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mentions_path() {
        let err = PipelineError::Read {
            path: PathBuf::from("/chapter/02.png"),
            message: "No such file or directory".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/chapter/02.png"));
        assert!(text.contains("Read error"));
    }

    #[test]
    fn test_upload_error_names_source_and_key() {
        let err = PipelineError::Upload {
            path: PathBuf::from("/chapter/03.png"),
            key: "1760000000000000000_03.jpg".to_string(),
            message: "403 Forbidden".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Upload error for /chapter/03.png"));
        assert!(text.contains("1760000000000000000_03.jpg"));
    }

    #[test]
    fn test_storage_request_helper() {
        let err = StorageError::request("PutObject", "503 Slow Down");
        assert_eq!(err.to_string(), "PutObject failed: 503 Slow Down");
    }

    #[test]
    fn test_cache_error_converts_into_pipeline_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = CacheError::from(io).into();
        assert!(matches!(err, PipelineError::Cache(_)));
    }
}
