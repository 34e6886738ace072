//! CallQA Test Utilities
//!
//! Shared test infrastructure for the CallQA workspace:
//! - Mock analyzer collaborators
//! - Proptest generators for evaluations and rubrics
//! - Fixtures and builders for common scenarios

pub use fixtures::*;
pub use generators::*;

use async_trait::async_trait;
use callqa_backend::{
    EvaluationSource, PolicyUploader, RubricProcessor, SuggestionGenerator,
};
use callqa_core::{
    BackendError, CallId, EvaluationResult, FetchError, PolicyDocument, PolicyReceipt, QaResult,
    RegionFilter, RubricModel, SopId, StepSuggestion,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

/// Derive an intent label from step text: lowercase words joined by `_`.
pub fn intent_from_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Mock rubric processor. Fills missing intents, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MockRubricProcessor {
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
    last_input: Arc<Mutex<Option<RubricModel>>>,
}

impl MockRubricProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A processor that rejects every rubric with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<RubricModel> {
        self.last_input.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl RubricProcessor for MockRubricProcessor {
    async fn process(&self, rules: &RubricModel) -> QaResult<RubricModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_input.lock() {
            *guard = Some(rules.clone());
        }
        if let Some(message) = &self.failure {
            return Err(BackendError::Processing {
                message: message.clone(),
            }
            .into());
        }

        let mut processed = rules.clone();
        for (_, section) in processed.sop_rules.iter_mut() {
            for step in section.steps.iter_mut().filter(|step| !step.has_intent()) {
                step.internal_intent = Some(intent_from_text(&step.text));
            }
        }
        Ok(processed)
    }
}

/// Mock policy uploader. Records every upload attempt.
#[derive(Debug, Clone, Default)]
pub struct MockPolicyUploader {
    failure: Option<String>,
    uploads: Arc<Mutex<Vec<(SopId, String)>>>,
}

impl MockPolicyUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// `(sop_id, filename)` pairs in upload order, failed attempts included.
    pub fn uploads(&self) -> Vec<(SopId, String)> {
        self.uploads
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PolicyUploader for MockPolicyUploader {
    async fn upload(&self, sop_id: &SopId, document: &PolicyDocument) -> QaResult<PolicyReceipt> {
        if let Ok(mut guard) = self.uploads.lock() {
            guard.push((sop_id.clone(), document.filename.clone()));
        }
        if let Some(message) = &self.failure {
            return Err(BackendError::PolicyUpload {
                message: message.clone(),
            }
            .into());
        }
        Ok(PolicyReceipt {
            sop_id: sop_id.clone(),
            filename: document.filename.clone(),
        })
    }
}

/// Mock suggestion generator echoing the step text as phrasing.
#[derive(Debug, Clone, Default)]
pub struct MockSuggestionGenerator;

#[async_trait]
impl SuggestionGenerator for MockSuggestionGenerator {
    async fn suggest(&self, step_text: &str) -> QaResult<StepSuggestion> {
        if step_text.trim().is_empty() {
            return Err(BackendError::Suggestion {
                message: "No text provided".to_string(),
            }
            .into());
        }
        Ok(StepSuggestion {
            intent: intent_from_text(step_text),
            suggestion: format!("Let me {}.", step_text.trim().to_lowercase()),
        })
    }
}

/// In-memory evaluation source over a fixed list of results.
#[derive(Debug, Clone, Default)]
pub struct MockEvaluationSource {
    results: Vec<EvaluationResult>,
}

impl MockEvaluationSource {
    pub fn new(results: Vec<EvaluationResult>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl EvaluationSource for MockEvaluationSource {
    async fn fetch_evaluation(&self, call_id: &CallId) -> QaResult<EvaluationResult> {
        self.results
            .iter()
            .find(|result| &result.call_id == call_id)
            .cloned()
            .ok_or_else(|| {
                FetchError::Backend {
                    endpoint: format!("/call/{}", call_id),
                    message: "Call not found".to_string(),
                }
                .into()
            })
    }

    async fn list_evaluations(&self, region: &RegionFilter) -> QaResult<Vec<EvaluationResult>> {
        Ok(self
            .results
            .iter()
            .filter(|result| region.matches(result))
            .cloned()
            .collect())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::fixtures::base_time;
    use callqa_core::{
        CallId, CallMetadata, DetectedRisk, Evaluation, EvaluationResult, Resolution,
        RubricModel, Scoring, Section, SectionMap, SectionVerdict, Step, StepStatus,
        StepVerdict, Timestamp,
    };
    use chrono::Duration;
    use proptest::prelude::*;

    /// Section names evaluations draw from, so names repeat across calls.
    pub const SECTION_POOL: &[&str] = &["Greeting", "Verification", "Hold", "Resolution", "Closing"];

    /// Step texts evaluations draw from, so failures repeat across calls.
    pub const STEP_POOL: &[&str] = &[
        "Greet the customer",
        "Ask for date of birth",
        "Confirm address",
        "Offer further help",
        "Summarize the call",
    ];

    pub const REGION_POOL: &[&str] = &["EMEA", "APAC", "NA"];

    pub fn arb_step_status() -> impl Strategy<Value = StepStatus> {
        prop_oneof![
            Just(StepStatus::Pass),
            Just(StepStatus::Partial),
            Just(StepStatus::Fail),
        ]
    }

    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (0i64..10_000).prop_map(|minutes| base_time() + Duration::minutes(minutes))
    }

    pub fn arb_step_verdict() -> impl Strategy<Value = StepVerdict> {
        (prop::sample::select(STEP_POOL), arb_step_status(), 0.0f64..=1.0)
            .prop_map(|(step, status, confidence)| StepVerdict::new(step, status, confidence))
    }

    /// Scores are multiples of 0.5 and maxima whole numbers, so sums are exact.
    pub fn arb_section_verdict() -> impl Strategy<Value = SectionVerdict> {
        (0u32..=20, prop::collection::vec(arb_step_verdict(), 0..5)).prop_flat_map(
            |(max, steps)| {
                (0u32..=max * 2).prop_map(move |halves| SectionVerdict {
                    score: f64::from(halves) / 2.0,
                    max_score: f64::from(max),
                    steps: steps.clone(),
                })
            },
        )
    }

    pub fn arb_risk() -> impl Strategy<Value = DetectedRisk> {
        (
            prop::sample::select(vec!["keyword", "legal", "tone", "fraud"]),
            prop::sample::select(vec!["lawsuit", "cancel", "raised voice", "chargeback"]),
        )
            .prop_map(|(risk_type, description)| DetectedRisk::new(risk_type, description))
    }

    pub fn arb_section_map() -> impl Strategy<Value = SectionMap<SectionVerdict>> {
        prop::sample::subsequence(SECTION_POOL.to_vec(), 0..=SECTION_POOL.len()).prop_flat_map(
            |names| {
                prop::collection::vec(arb_section_verdict(), names.len()).prop_map(move |verdicts| {
                    names
                        .iter()
                        .map(|name| name.to_string())
                        .zip(verdicts)
                        .collect::<SectionMap<SectionVerdict>>()
                })
            },
        )
    }

    pub fn arb_evaluation() -> impl Strategy<Value = EvaluationResult> {
        (
            0u32..100_000,
            arb_timestamp(),
            prop::option::of(prop::sample::select(REGION_POOL)),
            0.0f64..=100.0,
            0.0f64..3_600.0,
            arb_section_map(),
            prop::collection::vec(arb_risk(), 0..3),
        )
            .prop_map(
                |(id, timestamp, region, final_score, duration, sections, risks)| {
                    EvaluationResult {
                        call_id: CallId::new(format!("call-{}", id)),
                        timestamp,
                        metadata: CallMetadata {
                            duration,
                            region: region.map(str::to_string),
                            ..CallMetadata::default()
                        },
                        transcript: Vec::new(),
                        evaluation: Evaluation {
                            sop_adherence: sections,
                            resolution: Resolution {
                                status: "PASS".to_string(),
                                reason: String::new(),
                            },
                            risks_detected: risks,
                            scoring: Scoring {
                                final_score,
                                grade: String::new(),
                                total_score: None,
                                percentage: None,
                                avg_sentiment: None,
                            },
                        },
                        coaching_insights: Vec::new(),
                        supervisor_alerts: Vec::new(),
                    }
                },
            )
    }

    /// A batch of evaluations with distinct call ids.
    pub fn arb_evaluations(max: usize) -> impl Strategy<Value = Vec<EvaluationResult>> {
        prop::collection::vec(arb_evaluation(), 0..=max).prop_map(|mut results| {
            for (index, result) in results.iter_mut().enumerate() {
                result.call_id = CallId::new(format!("call-{}", index));
            }
            results
        })
    }

    pub fn arb_step() -> impl Strategy<Value = Step> {
        (
            prop_oneof![Just(String::new()), prop::sample::select(STEP_POOL).prop_map(str::to_string)],
            prop::option::of("[a-z_]{1,12}"),
        )
            .prop_map(|(text, intent)| Step {
                text,
                suggestion: None,
                internal_intent: intent,
            })
    }

    pub fn arb_rubric_model() -> impl Strategy<Value = RubricModel> {
        prop::sample::subsequence(SECTION_POOL.to_vec(), 0..=SECTION_POOL.len()).prop_flat_map(
            |names| {
                prop::collection::vec(
                    (0.0f64..50.0, prop::collection::vec(arb_step(), 0..4)),
                    names.len(),
                )
                .prop_map(move |sections| {
                    let mut model = RubricModel::new();
                    for (name, (weight, steps)) in names.iter().zip(sections) {
                        model
                            .sop_rules
                            .insert(*name, Section { weight, steps });
                    }
                    model
                })
            },
        )
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use callqa_core::{
        CallId, CallMetadata, DetectedRisk, Evaluation, EvaluationResult, OwnerId, Resolution,
        RubricModel, Scoring, Section, SectionVerdict, SopDefinition, SopId, Step, StepStatus,
        StepVerdict, Timestamp,
    };
    use chrono::{Duration, TimeZone, Utc};

    /// 2024-01-01T09:00:00Z, the reference instant fixtures are placed around.
    pub fn base_time() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// A step verdict with a confidence typical for its status.
    pub fn verdict(step: &str, status: StepStatus) -> StepVerdict {
        let confidence = match status {
            StepStatus::Pass => 0.9,
            StepStatus::Partial => 0.5,
            StepStatus::Fail => 0.1,
        };
        StepVerdict::new(step, status, confidence)
    }

    /// Builder for evaluation results.
    #[derive(Debug, Clone)]
    pub struct EvaluationBuilder {
        result: EvaluationResult,
    }

    impl EvaluationBuilder {
        pub fn new(call_id: &str) -> Self {
            Self {
                result: EvaluationResult {
                    call_id: CallId::new(call_id),
                    timestamp: base_time(),
                    metadata: CallMetadata {
                        duration: 180.0,
                        ..CallMetadata::default()
                    },
                    transcript: Vec::new(),
                    evaluation: Evaluation {
                        sop_adherence: Default::default(),
                        resolution: Resolution {
                            status: "PASS".to_string(),
                            reason: String::new(),
                        },
                        risks_detected: Vec::new(),
                        scoring: Scoring {
                            final_score: 0.0,
                            grade: String::new(),
                            total_score: None,
                            percentage: None,
                            avg_sentiment: None,
                        },
                    },
                    coaching_insights: Vec::new(),
                    supervisor_alerts: Vec::new(),
                },
            }
        }

        pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
            self.result.timestamp = timestamp;
            self
        }

        /// Place the call `minutes` after [`base_time`].
        pub fn at_minute(self, minutes: i64) -> Self {
            self.timestamp(base_time() + Duration::minutes(minutes))
        }

        pub fn region(mut self, region: &str) -> Self {
            self.result.metadata.region = Some(region.to_string());
            self
        }

        pub fn duration(mut self, seconds: f64) -> Self {
            self.result.metadata.duration = seconds;
            self
        }

        pub fn final_score(mut self, score: f64) -> Self {
            self.result.evaluation.scoring.final_score = score;
            self
        }

        pub fn grade(mut self, grade: &str) -> Self {
            self.result.evaluation.scoring.grade = grade.to_string();
            self
        }

        pub fn section(mut self, name: &str, score: f64, max_score: f64, steps: Vec<StepVerdict>) -> Self {
            self.result.evaluation.sop_adherence.insert(
                name,
                SectionVerdict {
                    score,
                    max_score,
                    steps,
                },
            );
            self
        }

        pub fn risk(mut self, risk_type: &str, description: &str) -> Self {
            self.result
                .evaluation
                .risks_detected
                .push(DetectedRisk::new(risk_type, description));
            self
        }

        pub fn build(self) -> EvaluationResult {
            self.result
        }
    }

    /// Starter rubric plus two more sections, with a mix of processed and new steps.
    pub fn sample_rubric() -> RubricModel {
        let mut model = RubricModel::starter();
        model.sop_rules.insert(
            "Verification",
            Section::new(20.0)
                .with_step(Step::new("Ask for date of birth").with_intent("verify_dob"))
                .with_step(Step::new("Confirm address")),
        );
        model.sop_rules.insert(
            "Closing",
            Section::new(5.0).with_step(Step::new("Offer further help")),
        );
        model
    }

    pub fn sample_sop(owner: &str, name: &str) -> SopDefinition {
        SopDefinition {
            id: SopId::generate(),
            owner: OwnerId::new(owner),
            name: name.to_string(),
            rules: sample_rubric(),
            policy_filename: None,
            created_at: base_time(),
            updated_at: base_time(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
