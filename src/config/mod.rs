//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::fetch::FetcherConfig;
use crate::parse_duration;
use crate::view::DEFAULT_PAGE_SIZE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where benchmark data comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Local directory or http(s) URL holding `index.json`
    #[serde(default = "default_base")]
    pub base: String,

    /// Cache for remote data
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// How long cached remote files stay fresh (e.g. "1h", "30m")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Artifact retrievals in flight at once
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_base() -> String {
    "./benchmarks".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_cache_ttl() -> String {
    "1h".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    8
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            cache_dir: default_cache_dir(),
            cache_ttl: default_cache_ttl(),
            timeout_seconds: default_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl DataConfig {
    /// Whether `base` points at a remote data root.
    pub fn is_remote(&self) -> bool {
        let base = self.base.trim();
        base.starts_with("http://") || base.starts_with("https://")
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        parse_duration(&self.cache_ttl)
    }

    /// Settings for the caching fetcher behind a remote data root.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let defaults = FetcherConfig::default();
        FetcherConfig {
            cache_dir: self.cache_dir.clone(),
            cache_ttl: self.cache_ttl().unwrap_or(defaults.cache_ttl),
            timeout: Duration::from_secs(self.timeout_seconds),
            ..defaults
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Front-end files served for non-API paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

/// Dashboard presentation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.base.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Data base must not be empty".to_string(),
            ));
        }

        if self.data.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.data.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_fetches must be greater than 0".to_string(),
            ));
        }

        if self.data.cache_ttl().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid cache_ttl: {}",
                self.data.cache_ttl
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.view.default_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "default_page_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
