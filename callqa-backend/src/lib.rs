//! CallQA Backend - Analyzer Collaborators
//!
//! Traits for the external analyzer service (rubric processing, policy upload,
//! suggestion generation, evaluation and insight fetches) plus an HTTP client
//! implementing all of them. Everything above this crate talks to the traits,
//! so tests swap in mocks without a network.

pub mod client;
pub mod types;

pub use client::AnalyzerClient;

use async_trait::async_trait;
use callqa_core::{
    CallId, CoachingItem, EvaluationResult, InsightRollup, PolicyDocument, PolicyReceipt,
    QaResult, RegionFilter, RubricModel, SopId, StepSuggestion,
};

// ============================================================================
// RUBRIC COLLABORATORS
// ============================================================================

/// Fills in `internal_intent` for steps that lack one.
#[async_trait]
pub trait RubricProcessor: Send + Sync {
    /// Process a rubric.
    ///
    /// # Returns
    /// * `Ok(RubricModel)` - The processed rubric, to be persisted as-is
    /// * `Err(QaError::Backend(BackendError::Processing))` - If the backend
    ///   rejected the rubric or could not be reached
    async fn process(&self, rules: &RubricModel) -> QaResult<RubricModel>;
}

/// Accepts the policy document tied to a rubric.
#[async_trait]
pub trait PolicyUploader: Send + Sync {
    /// Upload a policy document for `sop_id`.
    ///
    /// # Returns
    /// * `Ok(PolicyReceipt)` - The stored file reference
    /// * `Err(QaError::Backend(BackendError::PolicyUpload))` - On any failure
    async fn upload(&self, sop_id: &SopId, document: &PolicyDocument) -> QaResult<PolicyReceipt>;
}

/// Generates an intent label and example phrasing for step text.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn suggest(&self, step_text: &str) -> QaResult<StepSuggestion>;
}

// ============================================================================
// READ COLLABORATORS
// ============================================================================

/// Source of per-call evaluations.
#[async_trait]
pub trait EvaluationSource: Send + Sync {
    async fn fetch_evaluation(&self, call_id: &CallId) -> QaResult<EvaluationResult>;

    /// Evaluations for a region, as stored by the backend.
    async fn list_evaluations(&self, region: &RegionFilter) -> QaResult<Vec<EvaluationResult>>;
}

/// Source of backend-computed aggregates.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn fetch_rollup(&self, region: &RegionFilter) -> QaResult<InsightRollup>;

    async fn fetch_coaching_needs(&self) -> QaResult<Vec<CoachingItem>>;
}
