//! Analyzer wire types and response interpretation.
//!
//! The analyzer reports many failures inside a 200 response, either as
//! `{"status": "error", "message": ...}` or as `{"error": ...}`, so every body is
//! inspected before it is trusted.

use callqa_core::{
    BackendError, FetchError, PolicyReceipt, QaResult, RubricModel, SopId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ENDPOINTS
// ============================================================================

pub const PROCESS_PATH: &str = "/process-sop-intents";
pub const UPLOAD_PATH: &str = "/upload-policy";
pub const SUGGESTION_PATH: &str = "/generate-sop-suggestion";
pub const INSIGHTS_PATH: &str = "/insights";
pub const CALLS_PATH: &str = "/calls";
pub const CALL_PATH: &str = "/call";
pub const COACHING_PATH: &str = "/coaching-needs";

pub const STATUS_SUCCESS: &str = "success";

// ============================================================================
// REQUEST / RESPONSE BODIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessResponse {
    pub status: String,
    #[serde(default)]
    pub processed_rules: Option<RubricModel>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sop_id: Option<SopId>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
}

// ============================================================================
// INTERPRETATION
// ============================================================================

/// Decode a read payload, surfacing an `error` field as a backend error.
pub fn decode_payload<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, FetchError> {
    if let Some(message) = error_field(&value) {
        return Err(FetchError::Backend {
            endpoint: endpoint.to_string(),
            message,
        });
    }
    serde_json::from_value(value).map_err(|e| FetchError::Malformed {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Turn a processing response into the rubric to persist.
pub fn interpret_processing(value: Value) -> QaResult<RubricModel> {
    if let Some(message) = error_field(&value) {
        return Err(BackendError::Processing { message }.into());
    }
    let response: ProcessResponse =
        serde_json::from_value(value).map_err(|e| BackendError::Processing {
            message: format!("unreadable response: {}", e),
        })?;
    if response.status != STATUS_SUCCESS {
        return Err(BackendError::Processing {
            message: response
                .message
                .unwrap_or_else(|| format!("status `{}`", response.status)),
        }
        .into());
    }
    response.processed_rules.ok_or_else(|| {
        BackendError::Processing {
            message: "response carried no processed_rules".to_string(),
        }
        .into()
    })
}

/// Turn an upload response into a receipt.
///
/// The backend echoes the filename it stored; if it does not, the submitted name is used.
pub fn interpret_upload(value: Value, sop_id: &SopId, submitted: &str) -> QaResult<PolicyReceipt> {
    if let Some(message) = error_field(&value) {
        return Err(BackendError::PolicyUpload { message }.into());
    }
    let response: UploadResponse =
        serde_json::from_value(value).map_err(|e| BackendError::PolicyUpload {
            message: format!("unreadable response: {}", e),
        })?;
    if response.status != STATUS_SUCCESS {
        return Err(BackendError::PolicyUpload {
            message: response
                .message
                .unwrap_or_else(|| format!("status `{}`", response.status)),
        }
        .into());
    }
    Ok(PolicyReceipt {
        sop_id: response.sop_id.unwrap_or_else(|| sop_id.clone()),
        filename: response.filename.unwrap_or_else(|| submitted.to_string()),
    })
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callqa_core::{EvaluationResult, QaError};
    use serde_json::json;

    #[test]
    fn test_decode_payload_error_field() {
        let err = decode_payload::<EvaluationResult>("/call/x", json!({"error": "Call not found"}))
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Backend {
                endpoint: "/call/x".to_string(),
                message: "Call not found".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_payload_malformed() {
        let err = decode_payload::<EvaluationResult>("/call/x", json!({"call_id": "x"}))
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn test_null_error_field_is_ignored() {
        let value = json!({"error": null, "text": "ok"});
        assert!(error_field(&value).is_none());
    }

    #[test]
    fn test_interpret_processing_success() {
        let value = json!({
            "status": "success",
            "processed_rules": {
                "sop_rules": {"Greeting": {"weight": 10, "steps": [
                    {"text": "Greet", "internal_intent": "greet_customer"}
                ]}},
                "sentiments": {"positive": [], "negative": [], "risk_keywords": []}
            }
        });
        let model = interpret_processing(value).unwrap();
        assert!(model.section("Greeting").unwrap().steps[0].has_intent());
    }

    #[test]
    fn test_interpret_processing_error_status() {
        let err = interpret_processing(json!({"status": "error", "message": "LLM down"}))
            .unwrap_err();
        match err {
            QaError::Backend(BackendError::Processing { message }) => {
                assert_eq!(message, "LLM down")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_interpret_processing_missing_rules() {
        assert!(interpret_processing(json!({"status": "success"})).is_err());
    }

    #[test]
    fn test_interpret_upload() {
        let sop_id = SopId::new("sop-1");
        let receipt = interpret_upload(
            json!({"status": "success", "message": "ok", "filename": "policy.pdf"}),
            &sop_id,
            "local.pdf",
        )
        .unwrap();
        assert_eq!(receipt.filename, "policy.pdf");
        assert_eq!(receipt.sop_id, sop_id);

        let fallback = interpret_upload(json!({"status": "success"}), &sop_id, "local.pdf").unwrap();
        assert_eq!(fallback.filename, "local.pdf");

        let err = interpret_upload(json!({"status": "error", "message": "disk full"}), &sop_id, "a")
            .unwrap_err();
        assert!(matches!(
            err,
            QaError::Backend(BackendError::PolicyUpload { .. })
        ));
    }

    #[test]
    fn test_region_query_serialization() {
        let all = serde_json::to_value(RegionQuery { region: None }).unwrap();
        assert_eq!(all, json!({}));
        let named = serde_json::to_value(RegionQuery {
            region: Some("EMEA"),
        })
        .unwrap();
        assert_eq!(named, json!({"region": "EMEA"}));
    }
}
