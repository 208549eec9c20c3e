//! CLI configuration (`~/.ember/config.toml`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CliError;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Gas given to `ember run` when `--gas` is absent
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Fork used by `ember run` when `--fork` is absent
    #[serde(default = "default_fork")]
    pub fork: String,
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_gas_limit() -> u64 {
    10_000_000
}

fn default_fork() -> String {
    "Cancun".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gas_limit: default_gas_limit(),
            fork: default_fork(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ember"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load config from `path`
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = Self::config_path()
            .ok_or_else(|| CliError::Config("cannot determine home directory".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
