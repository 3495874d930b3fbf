//! Application configuration
//!
//! Settings live in a TOML file in the user's config directory:
//! - Linux: ~/.config/pulmoscan/config.toml
//! - macOS: ~/Library/Application Support/pulmoscan/config.toml
//! - Windows: %APPDATA%\pulmoscan\config.toml
//!
//! Every field is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const CONFIG_DIR_NAME: &str = "pulmoscan";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that may occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the inference service (hosts /health and /predict/)
    pub inference_url: String,
    /// Base URL of the static asset host (hosts /samples and /assets)
    pub asset_url: String,
    /// Path of the training metrics table on the asset host
    pub metrics_path: String,
    /// Seconds between liveness probes
    pub health_interval_secs: u64,
    /// Upper bound for a single liveness probe
    pub probe_timeout_secs: u64,
    /// How long each staging label stays on screen
    pub stage_dwell_ms: u64,
    /// Bundled sample images offered in the sample picker
    pub samples: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inference_url: "http://127.0.0.1:8000".to_string(),
            asset_url: "http://localhost:5173".to_string(),
            metrics_path: "/assets/results.csv".to_string(),
            health_interval_secs: 30,
            probe_timeout_secs: 5,
            stage_dwell_ms: 1000,
            samples: [
                "normal_1.jpg",
                "normal_2.jpg",
                "lung_opacity_1.jpg",
                "lung_opacity_2.jpg",
                "pneumonia_1.jpg",
                "pneumonia_2.jpg",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        }
    }
}

impl AppConfig {
    /// Where the config file is expected, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!("📁 Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.normalized().validate()
    }

    /// Strip trailing slashes so endpoint paths can be appended verbatim
    fn normalized(mut self) -> Self {
        self.inference_url = self.inference_url.trim_end_matches('/').to_string();
        self.asset_url = self.asset_url.trim_end_matches('/').to_string();
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.health_interval_secs == 0 {
            return Err(ConfigError::Invalid("health_interval_secs must be positive"));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid("probe_timeout_secs must be positive"));
        }
        if self.stage_dwell_ms == 0 {
            return Err(ConfigError::Invalid("stage_dwell_ms must be positive"));
        }
        Ok(self)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn stage_dwell(&self) -> Duration {
        Duration::from_millis(self.stage_dwell_ms)
    }
}
