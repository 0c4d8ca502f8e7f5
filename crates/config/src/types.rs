//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModcheckConfig {
    /// Bundled rule tables
    #[serde(default)]
    pub rules: RulesConfig,

    /// Remote refresh
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

/// Paths of the bundled tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Weight table shipped with the deployment
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,

    /// Substitution table shipped with the deployment
    #[serde(default = "default_substitutions_path")]
    pub substitutions_path: PathBuf,
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("data/valacdos.txt")
}

fn default_substitutions_path() -> PathBuf {
    PathBuf::from("data/scsubtab.txt")
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            weights_path: default_weights_path(),
            substitutions_path: default_substitutions_path(),
        }
    }
}

/// Remote refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Enable periodic refresh
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between scheduled refreshes
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Timeout per remote document in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Weight table URL
    #[serde(default)]
    pub weights_url: Option<String>,

    /// Substitution table URL
    #[serde(default)]
    pub substitutions_url: Option<String>,
}

fn default_interval() -> u64 {
    30 * 24 * 60 * 60
}

fn default_timeout() -> u64 {
    30
}

impl RefreshConfig {
    /// Interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-document timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval(),
            timeout_secs: default_timeout(),
            weights_url: None,
            substitutions_url: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
