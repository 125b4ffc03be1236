//! Miner configuration
//!
//! Read from `--config <path>` or `<config_dir>/blake3dcr/config.json`.
//! Every field is optional in the file; command-line flags override it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Miner tuning knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Worker threads (`None` = one per CPU)
    pub threads: Option<usize>,
    /// Nonces claimed by a worker at a time
    pub batch_size: u32,
    /// Seconds between progress reports
    pub report_interval_secs: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: None,
            batch_size: 65_536,
            report_interval_secs: 5,
        }
    }
}

impl MinerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load `path` if given, else the default location if present, else defaults
    #[cfg(feature = "cli")]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = default_config_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Resolved worker count
    pub fn thread_count(&self) -> usize {
        match self.threads {
            Some(n) => n.max(1),
            #[cfg(feature = "cli")]
            None => num_cpus::get(),
            #[cfg(not(feature = "cli"))]
            None => 1,
        }
    }
}

/// Default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blake3dcr")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = MinerConfig::from_json(r#"{"threads": 3}"#).unwrap();
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.batch_size, 65_536);
        assert_eq!(config.report_interval_secs, 5);
        assert_eq!(config.thread_count(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            MinerConfig::from_json(r#"{"threads": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MinerConfig::from_json(r#"{"batch_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MinerConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"batch_size": 1024, "report_interval_secs": 1}"#).unwrap();

        let config = MinerConfig::load(&path).unwrap();
        assert_eq!(config.batch_size, 1024);
        assert_eq!(config.report_interval_secs, 1);
        assert_eq!(config.threads, None);

        assert!(matches!(
            MinerConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::FileError(_))
        ));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(MinerConfig::load_or_default(Some(&missing)).is_err());
        assert!(default_config_path().ends_with("blake3dcr/config.json"));
    }
}
