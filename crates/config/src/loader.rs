//! Configuration loader

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::types::ModcheckConfig;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("config file not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration loader
pub struct ConfigLoader {
    config: Arc<ModcheckConfig>,
}

impl ConfigLoader {
    /// Create loader with default configuration
    pub fn new() -> Self {
        Self {
            config: Arc::new(ModcheckConfig::default()),
        }
    }

    /// Load configuration from file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let loader = Self::load_str(&content)?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(loader)
    }

    /// Load configuration from string
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: ModcheckConfig = toml::from_str(content)?;
        Self::validate(&config)?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Get configuration
    #[inline]
    pub fn get(&self) -> Arc<ModcheckConfig> {
        Arc::clone(&self.config)
    }

    /// Validate configuration
    fn validate(config: &ModcheckConfig) -> Result<(), ConfigError> {
        let refresh = &config.refresh;

        if refresh.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh.interval_secs must be positive".to_string(),
            ));
        }

        if refresh.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh.timeout_secs must be positive".to_string(),
            ));
        }

        if refresh.enabled {
            for (name, url) in [
                ("weights_url", &refresh.weights_url),
                ("substitutions_url", &refresh.substitutions_url),
            ] {
                if url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::Validation(format!(
                        "refresh is enabled but refresh.{} is not set",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_string() {
        let config_str = r#"
[refresh]
enabled = true
interval_secs = 3600
weights_url = "https://rules.example.com/valacdos.txt"
substitutions_url = "https://rules.example.com/scsubtab.txt"

[log]
level = "debug"
"#;

        let loader = ConfigLoader::load_str(config_str).unwrap();
        let config = loader.get();

        assert!(config.refresh.enabled);
        assert_eq!(config.refresh.interval_secs, 3600);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_validation_missing_url() {
        let config_str = r#"
[refresh]
enabled = true
weights_url = "https://rules.example.com/valacdos.txt"
"#;

        let result = ConfigLoader::load_str(config_str);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_zero_interval() {
        let result = ConfigLoader::load_str("[refresh]\ninterval_secs = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_urls_optional_when_disabled() {
        let loader = ConfigLoader::load_str("[refresh]\nenabled = false\n").unwrap();
        assert!(loader.get().refresh.weights_url.is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rules]\nweights_path = \"/tmp/w.txt\"").unwrap();

        let loader = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(
            loader.get().rules.weights_path,
            std::path::PathBuf::from("/tmp/w.txt")
        );

        let missing = ConfigLoader::load_file("/nonexistent/modcheck.toml");
        assert!(matches!(missing, Err(ConfigError::NotFound(_))));
    }
}
