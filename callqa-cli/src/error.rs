//! Error types for the CLI.

use crate::config::ConfigError;
use callqa_core::QaError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Qa(#[from] QaError),
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
