//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section has
//! defaults, so a missing file falls back to built-in settings. Environment
//! variables override file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::ankr::{AnkrConfig, DEFAULT_RPC_URL, MAX_PAGE_SIZE};
use crate::adapters::snapshot_store::DEFAULT_SNAPSHOT_DIR;
use crate::domain::Chain;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/onchain-monitor.toml";

/// Upper bound for `ankr.max_retries`
pub const MAX_RETRIES: u32 = 10;

/// Main configuration structure matching onchain-monitor.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ankr: AnkrSection,
    #[serde(default)]
    pub snapshot: SnapshotSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Ankr API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnkrSection {
    /// Multichain RPC endpoint
    pub rpc_url: String,
    /// API key (empty = public endpoint)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub retry_base_delay_ms: u64,
    /// Holders per page for full snapshots (max 10000)
    pub page_size: u32,
}

impl Default for AnkrSection {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AnkrSection {
    /// Get API key with environment variable fallback
    /// Checks ANKR_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("ANKR_API_KEY").ok().filter(|k| !k.trim().is_empty())
    }

    /// Get RPC URL with environment variable override
    pub fn get_rpc_url(&self) -> String {
        std::env::var("ANKR_RPC_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.rpc_url.clone())
    }

    /// Client configuration with env overrides applied
    pub fn client_config(&self) -> AnkrConfig {
        AnkrConfig {
            rpc_url: self.get_rpc_url(),
            api_key: self.get_api_key(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            page_size: self.page_size,
        }
    }
}

/// Snapshot output section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotSection {
    /// Directory for snapshot files (~ is expanded)
    pub dir: String,
    /// Chain used when none is given on the command line
    pub default_chain: String,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            dir: DEFAULT_SNAPSHOT_DIR.to_string(),
            default_chain: Chain::default().to_string(),
        }
    }
}

impl SnapshotSection {
    /// Snapshot directory with SNAPSHOT_DIR override and ~ expansion
    pub fn get_dir(&self) -> PathBuf {
        let dir = std::env::var("SNAPSHOT_DIR")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.dir.clone());
        PathBuf::from(shellexpand::tilde(&dir).to_string())
    }

    /// Parsed default chain (validated at load time)
    pub fn default_chain(&self) -> Chain {
        self.default_chain.parse().unwrap_or_default()
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file instead of stderr
    pub log_to_file: bool,
    /// Log file path
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
            log_file: "logs/onchain_monitor.log".to_string(),
        }
    }
}

impl LoggingSection {
    /// Level with LOG_LEVEL env override
    pub fn get_level(&self) -> String {
        std::env::var("LOG_LEVEL")
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.level.clone())
            .to_lowercase()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, using defaults when the file does not exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config file at {}, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ankr.rpc_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if self.ankr.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.ankr.max_retries == 0 || self.ankr.max_retries > MAX_RETRIES {
            return Err(ConfigError::ValidationError(format!(
                "max_retries must be 1-{}, got {}",
                MAX_RETRIES, self.ankr.max_retries
            )));
        }

        if self.ankr.page_size == 0 || self.ankr.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "page_size must be 1-{}, got {}",
                MAX_PAGE_SIZE, self.ankr.page_size
            )));
        }

        if self.snapshot.dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "snapshot dir cannot be empty".to_string(),
            ));
        }

        if let Err(e) = self.snapshot.default_chain.parse::<Chain>() {
            return Err(ConfigError::ValidationError(format!(
                "default_chain: {} (supported: {})",
                e,
                Chain::supported_list()
            )));
        }

        Ok(())
    }
}
