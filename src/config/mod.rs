//! Configuration management for dashstate
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use dashstate::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DASHSTATE__<section>__<key>`
//!
//! Examples:
//! - `DASHSTATE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `DASHSTATE__DASHBOARD__INTERVAL_SECS=0`
//! - `DASHSTATE__TRANSPORT__BASE_URL=https://notifiarr.com`
//!
//! The website API key is read from `DASHSTATE_API_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/dashstate.toml`.
//! This can be overridden using the `DASHSTATE_CONFIG` environment variable.
//! Instances are arrays of tables:
//!
//! ```toml
//! [[apps.sonarr]]
//! name = "Sonarr"
//! url = "http://sonarr:8989"
//! api_key = "..."
//! ```

mod models;
mod sources;
mod validation;

pub use models::{
    AppInstance, AppsConfig, Config, DashboardConfig, DelugeInstance, QbitInstance,
    SabnzbdInstance, ServerConfig, StarrInstance, TransportConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Secrets are not read from the environment.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:5454"

[dashboard]
interval_secs = 600
timeout_secs = 30

[transport]
base_url = "https://notifiarr.com/"
timeout_secs = 15

[[apps.radarr]]
name = "Radarr"
url = "http://radarr:7878"
api_key = "r"

[[apps.sonarr]]
name = "Sonarr"
url = "http://sonarr:8989"
api_key = "s"
timeout_secs = 90

[[apps.readarr]]
name = "Readarr"
url = "http://readarr:8787"
api_key = "b"

[[apps.lidarr]]
name = "Lidarr"
url = "http://lidarr:8686"
api_key = "l"

[[apps.qbit]]
name = "qBit"
url = "http://qbit:8080"
username = "admin"
password = "pw"

[[apps.deluge]]
name = "Deluge"
url = "http://deluge:8112"
password = "deluge"

[[apps.sabnzbd]]
name = "SAB"
url = "http://sab:8080"
api_key = "k"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.dashboard.interval().as_secs(), 600);
        assert_eq!(config.transport.base_url, "https://notifiarr.com");
        assert_eq!(config.transport.timeout().as_secs(), 15);
        assert_eq!(config.apps.instances().len(), 7);

        let fallback = config.dashboard.timeout();
        assert_eq!(config.apps.sonarr[0].timeout(fallback).as_secs(), 90);
        assert_eq!(config.apps.radarr[0].timeout(fallback).as_secs(), 30);
    }

    #[test]
    fn test_validation_catches_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[[apps.sabnzbd]]
name = "SAB"
url = "http://sab:8080"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MissingApiKey { .. })
        ));
    }
}
