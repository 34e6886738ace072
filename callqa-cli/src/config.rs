//! Configuration loading for the `callqa` command.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use callqa_core::QaConfig;
use std::path::Path;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "CALLQA_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CALLQA_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] callqa_core::ConfigError),
}

/// Load and validate the config file at `path`.
///
/// # Arguments
/// * `path` - Resolved from `--config` or [`CONFIG_ENV`] by the argument parser
pub fn load(path: Option<&Path>) -> Result<QaConfig, ConfigError> {
    let path = path.ok_or(ConfigError::MissingConfigPath)?;
    let contents = std::fs::read_to_string(path)?;
    from_toml(&contents)
}

pub fn from_toml(contents: &str) -> Result<QaConfig, ConfigError> {
    let config: QaConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[backend]
api_base_url = "http://localhost:8000"
request_timeout_ms = 30000

[coaching]
threshold = 75.0
risk_taxonomy = ["keyword", "legal", "fraud"]

[rollup]
recent_limit = 10

[logging]
filter = "callqa=info"
json = false
"#;

    #[test]
    fn test_parses_valid_config() {
        let config = from_toml(VALID).unwrap();
        assert_eq!(config.backend.api_base_url, "http://localhost:8000");
        assert_eq!(config.coaching.threshold, 75.0);
        assert!(config.coaching.is_risk_type("LEGAL"));
        assert_eq!(config.rollup.recent_limit, 10);
        assert_eq!(config.rollup.failure_limit, None);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_threshold_is_required() {
        let without_threshold = VALID.replace("threshold = 75.0\n", "");
        assert!(matches!(
            from_toml(&without_threshold),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let extra = VALID.replace("[rollup]\n", "[rollup]\nwindow_days = 7\n");
        assert!(matches!(from_toml(&extra), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let bad = VALID.replace("threshold = 75.0", "threshold = 140.0");
        assert!(matches!(from_toml(&bad), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_path() {
        assert!(matches!(load(None), Err(ConfigError::MissingConfigPath)));
    }

    #[test]
    fn test_unreadable_path() {
        let err = load(Some(Path::new("/nonexistent/callqa.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
