//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Storage backends understood by `ObjectStoreFactory`.
pub(crate) const KNOWN_BACKENDS: &[&str] = &["s3", "r2", "local"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.transform.quality == 0 || self.transform.quality > 100 {
            return Err(ConfigError::ValidationError(
                "transform.quality must be between 1 and 100".into(),
            ));
        }
        if self.transform.resize && self.transform.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "transform.max_dimension must be > 0 when transform.resize is on".into(),
            ));
        }
        if !KNOWN_BACKENDS.contains(&self.storage.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "storage.backend must be one of {}, got '{}'",
                KNOWN_BACKENDS.join(", "),
                self.storage.backend
            )));
        }
        if self.storage.bucket.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.bucket must not be empty".into(),
            ));
        }
        if self.cache.enabled && self.cache.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.path must not be empty when the cache is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_quality_out_of_range() {
        let mut config = Config::default();
        config.transform.quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("transform.quality"));

        config.transform.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_dimension_with_resize() {
        let mut config = Config::default();
        config.transform.max_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_dimension"));

        config.transform.resize = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "ftp".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.backend"));
    }

    #[test]
    fn test_validate_rejects_empty_bucket() {
        let mut config = Config::default();
        config.storage.bucket.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }
}
