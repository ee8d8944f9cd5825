//! Configuration management for Chapterlift.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults, then storage credentials are overridden from the environment.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables that override `[storage]` keys after the file is read.
const ENV_OVERRIDES: &[&str] = &[
    "R2_ACCOUNT_ID",
    "R2_ACCESS_KEY",
    "R2_SECRET_KEY",
    "BUCKET_NAME",
    "PUBLIC_DOMAIN",
];

/// Root configuration structure for Chapterlift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Processing settings
    pub processing: ProcessingConfig,

    /// Default page transform settings
    pub transform: TransformSettings,

    /// Object storage settings
    pub storage: StorageConfig,

    /// Dedup cache settings
    pub cache: CacheConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration (plus environment overrides) if the file
    /// doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides(|name| std::env::var(name).ok());
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.chapterlift.chapterlift/config.toml
    /// - Linux: ~/.config/chapterlift/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\chapterlift\config\config.toml
    ///
    /// Falls back to ~/.chapterlift/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "chapterlift", "chapterlift")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".chapterlift").join("config.toml")
            })
    }

    /// Apply storage overrides from the environment.
    ///
    /// `lookup` is injected so tests don't have to mutate process state.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in ENV_OVERRIDES {
            let Some(value) = lookup(name).filter(|v| !v.is_empty()) else {
                continue;
            };
            tracing::debug!("Config override from ${name}");
            match *name {
                "R2_ACCOUNT_ID" => self.storage.account_id = value,
                "R2_ACCESS_KEY" => self.storage.access_key = value,
                "R2_SECRET_KEY" => self.storage.secret_key = value,
                "BUCKET_NAME" => self.storage.bucket = value,
                "PUBLIC_DOMAIN" => self.storage.public_base = value,
                _ => {}
            }
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
