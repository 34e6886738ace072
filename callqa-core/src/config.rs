//! Configuration types
//!
//! Loaded configuration files carry every value explicitly; the `Default`
//! impls below exist for library callers building options in code.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Risk types treated as critical when no taxonomy is configured in code.
pub const DEFAULT_RISK_TAXONOMY: &[&str] = &[
    "keyword",
    "legal",
    "compliance",
    "fraud",
    "abuse",
    "escalation",
];

/// Number of calls listed in a rollup's recent-calls summary.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Analyzer backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
}

/// Which calls are routed to supervisors, and how they are categorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoachingPolicy {
    /// Calls with a final score strictly below this need coaching
    pub threshold: f64,
    /// Risk types (case-insensitive) that put a call in the Risk category
    pub risk_taxonomy: Vec<String>,
}

impl CoachingPolicy {
    /// Policy with the given threshold and the built-in risk taxonomy.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            risk_taxonomy: DEFAULT_RISK_TAXONOMY
                .iter()
                .map(|entry| entry.to_string())
                .collect(),
        }
    }

    pub fn with_taxonomy<I, S>(mut self, taxonomy: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.risk_taxonomy = taxonomy.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_risk_type(&self, risk_type: &str) -> bool {
        let needle = risk_type.trim();
        self.risk_taxonomy
            .iter()
            .any(|entry| entry.trim().eq_ignore_ascii_case(needle))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "coaching.threshold".to_string(),
                value: self.threshold.to_string(),
                reason: "threshold must be between 0 and 100".to_string(),
            });
        }
        if let Some(blank) = self.risk_taxonomy.iter().find(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "coaching.risk_taxonomy".to_string(),
                value: format!("{:?}", blank),
                reason: "risk types must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

/// Rollup output limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollupOptions {
    pub recent_limit: usize,
    /// Cap on common failures reported; absent means uncapped
    #[serde(default)]
    pub failure_limit: Option<usize>,
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            failure_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    pub json: bool,
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QaConfig {
    pub backend: BackendConfig,
    pub coaching: CoachingPolicy,
    pub rollup: RollupOptions,
    pub logging: LoggingConfig,
}

impl QaConfig {
    /// Validate that all configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.api_base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "backend.api_base_url".to_string(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.api_base_url".to_string(),
                value: base_url.to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        if self.backend.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.request_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "request_timeout_ms must be greater than 0".to_string(),
            });
        }

        self.coaching.validate()?;

        if self.rollup.recent_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rollup.recent_limit".to_string(),
                value: "0".to_string(),
                reason: "recent_limit must be greater than 0".to_string(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "logging.filter".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> QaConfig {
        QaConfig {
            backend: BackendConfig {
                api_base_url: "http://localhost:8000".to_string(),
                request_timeout_ms: 30_000,
            },
            coaching: CoachingPolicy::new(75.0),
            rollup: RollupOptions::default(),
            logging: LoggingConfig {
                filter: "callqa=info".to_string(),
                json: false,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = valid();
        config.backend.api_base_url = "ftp://example".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "backend.api_base_url"
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = valid();
        config.backend.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let mut config = valid();
        config.coaching.threshold = 120.0;
        assert!(config.validate().is_err());
        config.coaching.threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_risk_type() {
        let policy = CoachingPolicy::new(70.0).with_taxonomy(["legal", " "]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_risk_type_matching_is_case_insensitive() {
        let policy = CoachingPolicy::new(70.0).with_taxonomy(["Legal", "fraud "]);
        assert!(policy.is_risk_type("legal"));
        assert!(policy.is_risk_type(" FRAUD"));
        assert!(!policy.is_risk_type("tone"));
    }
}
