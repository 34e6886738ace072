//! Error types for CallQA operations

use crate::SopId;
use thiserror::Error;

/// Rubric editing errors. Raised at the mutation point; the model is left unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RubricError {
    #[error("Section already exists: {name}")]
    DuplicateSection { name: String },

    #[error("Section not found: {name}")]
    UnknownSection { name: String },

    #[error("Section name must not be empty")]
    EmptySectionName,

    #[error("Invalid weight for section {section}: {weight} (must be a finite number >= 0)")]
    InvalidWeight { section: String, weight: f64 },

    #[error("Step index {index} out of range for section {section} ({len} steps)")]
    IndexOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },
}

/// Failures reading data from the analyzer backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Backend reported an error from {endpoint}: {message}")]
    Backend { endpoint: String, message: String },

    #[error("Malformed payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Analyzer backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Rubric processing failed: {message}")]
    Processing { message: String },

    #[error("Policy upload failed: {message}")]
    PolicyUpload { message: String },

    #[error("Suggestion generation failed: {message}")]
    Suggestion { message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Rubric store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("SOP not found: {sop_id}")]
    NotFound { sop_id: SopId },

    #[error("Insert failed for SOP {name}: {reason}")]
    InsertFailed { name: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all CallQA errors.
#[derive(Debug, Clone, Error)]
pub enum QaError {
    #[error("Rubric error: {0}")]
    Rubric(#[from] RubricError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<FetchError> for QaError {
    fn from(err: FetchError) -> Self {
        QaError::Backend(BackendError::Fetch(err))
    }
}

/// Result type alias for CallQA operations.
pub type QaResult<T> = Result<T, QaError>;

/// Result type alias for rubric editing.
pub type RubricResult<T> = Result<T, RubricError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_error_display_duplicate() {
        let err = RubricError::DuplicateSection {
            name: "Greeting".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("already exists"));
        assert!(msg.contains("Greeting"));
    }

    #[test]
    fn test_rubric_error_display_index() {
        let err = RubricError::IndexOutOfRange {
            section: "Closing".to_string(),
            index: 4,
            len: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Closing"));
        assert!(msg.contains('4'));
        assert!(msg.contains("2 steps"));
    }

    #[test]
    fn test_fetch_error_display_status() {
        let err = FetchError::Status {
            endpoint: "/insights".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/insights"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            sop_id: SopId::new("sop-3"),
        };
        assert!(format!("{}", err).contains("sop-3"));
    }

    #[test]
    fn test_qa_error_from_variants() {
        let rubric = QaError::from(RubricError::EmptySectionName);
        assert!(matches!(rubric, QaError::Rubric(_)));

        let backend = QaError::from(BackendError::Processing {
            message: "boom".to_string(),
        });
        assert!(matches!(backend, QaError::Backend(_)));

        let storage = QaError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, QaError::Storage(_)));

        let config = QaError::from(ConfigError::MissingRequired {
            field: "coaching.threshold".to_string(),
        });
        assert!(matches!(config, QaError::Config(_)));

        let fetch = QaError::from(FetchError::Malformed {
            endpoint: "/call/1".to_string(),
            reason: "missing field".to_string(),
        });
        assert!(matches!(fetch, QaError::Backend(BackendError::Fetch(_))));
    }
}
