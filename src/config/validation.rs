use super::models::{AppInstance, Config};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{family} instance {index} has invalid url '{url}', expected http:// or https://")]
    InvalidAppUrl {
        family: &'static str,
        index: usize,
        url: String,
    },

    #[error("{family} instance {index} ({name}) has a url but no api_key")]
    MissingApiKey {
        family: &'static str,
        index: usize,
        name: String,
    },

    #[error("Transport base_url '{0}' must start with http:// or https://")]
    InvalidTransportUrl(String),

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_transport(config)?;
    validate_timeouts(config)?;
    validate_apps(config)?;
    Ok(())
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn validate_transport(config: &Config) -> Result<(), ValidationError> {
    let base_url = &config.transport.base_url;
    if !base_url.is_empty() && !is_http(base_url) {
        return Err(ValidationError::InvalidTransportUrl(base_url.clone()));
    }
    Ok(())
}

fn validate_timeouts(config: &Config) -> Result<(), ValidationError> {
    if config.dashboard.timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "dashboard.timeout_secs".to_string(),
        });
    }

    if config.transport.timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "transport.timeout_secs".to_string(),
        });
    }

    for (family, index, app) in config.apps.instances() {
        if app.timeout_secs() == Some(0) {
            return Err(ValidationError::ZeroTimeout {
                field: format!("apps.{family}[{index}].timeout_secs"),
            });
        }
    }

    Ok(())
}

/// Instances with an empty url are disabled and skip the checks.
fn validate_apps(config: &Config) -> Result<(), ValidationError> {
    for (family, index, app) in config.apps.instances() {
        let url = app.url();
        if url.is_empty() {
            continue;
        }

        if !is_http(url) {
            return Err(ValidationError::InvalidAppUrl {
                family,
                index,
                url: url.to_string(),
            });
        }

        if app.api_key().is_some_and(|key| key.trim().is_empty()) {
            return Err(ValidationError::MissingApiKey {
                family,
                index,
                name: app.name().to_string(),
            });
        }
    }

    Ok(())
}
