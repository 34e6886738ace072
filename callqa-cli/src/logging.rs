//! Tracing subscriber setup.

use crate::error::CliError;
use callqa_core::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set, otherwise the configured directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, CliError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| CliError::Logging(format!("invalid filter {:?}: {}", config.filter, e))),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
pub fn init(config: &LoggingConfig) -> Result<(), CliError> {
    let filter = env_filter(config)?;
    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!(filter = %config.filter, json = config.json, "logging initialized");
    Ok(())
}
