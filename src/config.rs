//! Application configuration, loaded from YAML at startup.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{ReferencePaths, SourcePaths};
use crate::ingest::ReconcileRules;
use crate::views::ViewSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/vitrack.yaml";
pub const CONFIG_PATH_ENV: &str = "VITRACK_CONFIG";
pub const BIND_ENV: &str = "VITRACK_BIND";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    pub sources: SourcePaths,
    pub reference: ReferencePaths,
    pub reconcile: ReconcileRules,
    pub views: ViewSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            log_level: "info".to_string(),
            sources: SourcePaths::default(),
            reference: ReferencePaths::default(),
            reconcile: ReconcileRules::default(),
            views: ViewSettings::default(),
        }
    }
}

impl AppConfig {
    /// The file named by `VITRACK_CONFIG` (which must exist), else `config/vitrack.yaml` when
    /// present, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_path(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::from_path(DEFAULT_CONFIG_PATH);
        }
        Ok(Self::default())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// `VITRACK_BIND` wins over the configured address.
    pub fn bind_addr(&self) -> String {
        env::var(BIND_ENV).unwrap_or_else(|_| self.bind.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "log_level: debug\nviews:\n  window_length: 14\nsources:\n  us_counties: null\n",
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.views.window_length, 14);
        assert_eq!(config.views.min_population, 1_000_000.0);
        assert_eq!(config.sources.us_counties, None);
        assert!(config.sources.us_states.is_some());
        assert_eq!(config.reconcile, ReconcileRules::default());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
