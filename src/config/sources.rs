use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "DASHSTATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/dashstate.toml";
const API_KEY_ENV_VAR: &str = "DASHSTATE_API_KEY";
const ENV_PREFIX: &str = "DASHSTATE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, env::var(API_KEY_ENV_VAR).ok());

    Ok(config)
}

/// The website API key comes from the environment, never from the file.
pub(super) fn load_secrets(config: &mut Config, api_key: Option<String>) {
    if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
        config.transport.api_key = key.trim().to_string();
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment overrides"
        );
    }

    // DASHSTATE__DASHBOARD__INTERVAL_SECS -> dashboard.interval_secs
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let mut config: Config = builder.build()?.try_deserialize()?;
    config.apps.trim_urls();
    config.transport.base_url = config.transport.base_url.trim().trim_end_matches('/').to_string();

    Ok(config)
}
