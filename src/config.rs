//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/car-rental/config.toml` by default,
//! `RENTAL_CONFIG` or `--config` to override).
//! Every section and field has a default, so a partial file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{DraftCheck, ReservationPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default config location: `~/.config/car-rental/config.toml`, falling back
/// to the working directory when no home directory is known.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("car-rental").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub reservations: ReservationsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.reservations;
        if r.min_days == 0 {
            return Err(ConfigError::Invalid(
                "reservations.min_days must be at least 1".into(),
            ));
        }
        if r.min_days > r.max_days {
            return Err(ConfigError::Invalid(format!(
                "reservations.min_days ({}) exceeds max_days ({})",
                r.min_days, r.max_days
            )));
        }
        if r.draft_retention_hours == 0 {
            return Err(ConfigError::Invalid(
                "reservations.draft_retention_hours must be positive".into(),
            ));
        }
        if r.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "reservations.sweep_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ── Sections ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding `cars.json` and `orders.json`
    pub data_dir: PathBuf,
    /// Insert the default fleet when the catalogue is empty
    pub seed_catalogue: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
            seed_catalogue: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationsConfig {
    pub draft_retention_hours: u32,
    pub sweep_interval_secs: u64,
    pub min_days: u32,
    pub max_days: u32,
    pub draft_check: DraftCheck,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            draft_retention_hours: 24,
            sweep_interval_secs: 3600,
            min_days: 1,
            max_days: 30,
            draft_check: DraftCheck::Confirmed,
        }
    }
}

impl ReservationsConfig {
    pub fn policy(&self) -> ReservationPolicy {
        ReservationPolicy {
            min_days: self.min_days,
            max_days: self.max_days,
            draft_retention: chrono::Duration::hours(i64::from(self.draft_retention_hours)),
            draft_check: self.draft_check,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error; `RUST_LOG` takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
