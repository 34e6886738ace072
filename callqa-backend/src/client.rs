//! HTTP client for the analyzer service.

use crate::types::{
    decode_payload, interpret_processing, interpret_upload, RegionQuery, SuggestionRequest,
    CALLS_PATH, CALL_PATH, COACHING_PATH, INSIGHTS_PATH, PROCESS_PATH, SUGGESTION_PATH,
    UPLOAD_PATH,
};
use crate::{EvaluationSource, InsightSource, PolicyUploader, RubricProcessor, SuggestionGenerator};
use async_trait::async_trait;
use callqa_core::{
    BackendConfig, BackendError, CallId, CoachingItem, ConfigError, EvaluationResult, FetchError,
    InsightRollup, PolicyDocument, PolicyReceipt, QaResult, RegionFilter, RubricModel, SopId,
    StepSuggestion,
};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to the analyzer over HTTP. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    client: reqwest::Client,
    base: Url,
}

impl AnalyzerClient {
    pub fn new(config: &BackendConfig) -> QaResult<Self> {
        let base = Url::parse(config.api_base_url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "backend.api_base_url".to_string(),
            value: config.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "backend.api_base_url".to_string(),
                value: config.api_base_url.clone(),
                reason: "not a base URL".to_string(),
            }
            .into());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "backend".to_string(),
                value: config.api_base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_value<Q>(&self, endpoint: &str, url: Url, query: Option<&Q>) -> Result<Value, FetchError>
    where
        Q: Serialize + ?Sized,
    {
        debug!(endpoint, "GET");
        let mut request = self.client.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        self.read_body(endpoint, response).await
    }

    async fn post_value<B>(&self, endpoint: &str, body: &B) -> Result<Value, FetchError>
    where
        B: Serialize + ?Sized,
    {
        debug!(endpoint, "POST");
        let url = self.url(&[segment(endpoint)]);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        self.read_body(endpoint, response).await
    }

    async fn read_body(&self, endpoint: &str, response: reqwest::Response) -> Result<Value, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "analyzer returned error status");
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response.json::<Value>().await.map_err(|e| FetchError::Malformed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

fn segment(path: &str) -> &str {
    path.trim_start_matches('/')
}

fn transport(endpoint: &str, err: reqwest::Error) -> FetchError {
    warn!(endpoint, error = %err, "analyzer request failed");
    FetchError::Transport {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl RubricProcessor for AnalyzerClient {
    async fn process(&self, rules: &RubricModel) -> QaResult<RubricModel> {
        let value = self
            .post_value(PROCESS_PATH, rules)
            .await
            .map_err(|e| BackendError::Processing {
                message: e.to_string(),
            })?;
        interpret_processing(value)
    }
}

#[async_trait]
impl PolicyUploader for AnalyzerClient {
    async fn upload(&self, sop_id: &SopId, document: &PolicyDocument) -> QaResult<PolicyReceipt> {
        debug!(sop_id = %sop_id, filename = %document.filename, "uploading policy");
        let part = Part::bytes(document.bytes.clone()).file_name(document.filename.clone());
        let form = Form::new()
            .text("sop_id", sop_id.to_string())
            .part("file", part);

        let upload_failed = |e: FetchError| BackendError::PolicyUpload {
            message: e.to_string(),
        };
        let response = self
            .client
            .post(self.url(&[segment(UPLOAD_PATH)]))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_failed(transport(UPLOAD_PATH, e)))?;
        let value = self
            .read_body(UPLOAD_PATH, response)
            .await
            .map_err(upload_failed)?;
        interpret_upload(value, sop_id, &document.filename)
    }
}

#[async_trait]
impl SuggestionGenerator for AnalyzerClient {
    async fn suggest(&self, step_text: &str) -> QaResult<StepSuggestion> {
        let value = self
            .post_value(SUGGESTION_PATH, &SuggestionRequest { text: step_text })
            .await
            .map_err(|e| BackendError::Suggestion {
                message: e.to_string(),
            })?;
        decode_payload(SUGGESTION_PATH, value).map_err(|e| {
            BackendError::Suggestion {
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl EvaluationSource for AnalyzerClient {
    async fn fetch_evaluation(&self, call_id: &CallId) -> QaResult<EvaluationResult> {
        let endpoint = format!("{}/{}", CALL_PATH, call_id);
        let url = self.url(&[segment(CALL_PATH), call_id.as_str()]);
        let value = self.get_value::<()>(&endpoint, url, None).await?;
        Ok(decode_payload(&endpoint, value)?)
    }

    async fn list_evaluations(&self, region: &RegionFilter) -> QaResult<Vec<EvaluationResult>> {
        let query = RegionQuery {
            region: region.as_query(),
        };
        let url = self.url(&[segment(CALLS_PATH)]);
        let value = self.get_value(CALLS_PATH, url, Some(&query)).await?;
        Ok(decode_payload(CALLS_PATH, value)?)
    }
}

#[async_trait]
impl InsightSource for AnalyzerClient {
    async fn fetch_rollup(&self, region: &RegionFilter) -> QaResult<InsightRollup> {
        let query = RegionQuery {
            region: region.as_query(),
        };
        let url = self.url(&[segment(INSIGHTS_PATH)]);
        let value = self.get_value(INSIGHTS_PATH, url, Some(&query)).await?;
        Ok(decode_payload(INSIGHTS_PATH, value)?)
    }

    async fn fetch_coaching_needs(&self) -> QaResult<Vec<CoachingItem>> {
        let url = self.url(&[segment(COACHING_PATH)]);
        let value = self.get_value::<()>(COACHING_PATH, url, None).await?;
        Ok(decode_payload(COACHING_PATH, value)?)
    }
}
