//! Evaluation result types, as produced by the analyzer backend for one call

use crate::serde_helpers::{flexible_score, flexible_timestamp};
use crate::{CallId, SectionMap, StepStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Verdict for one rubric step in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepVerdict {
    pub step: String,
    pub status: StepStatus,
    /// Matcher confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    /// Offset into the call, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl StepVerdict {
    pub fn new(step: impl Into<String>, status: StepStatus, confidence: f64) -> Self {
        Self {
            step: step.into(),
            status,
            confidence,
            reason: None,
            suggestion: None,
            matched_text: None,
            timestamp: None,
        }
    }
}

/// Per-section scoring for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionVerdict {
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub steps: Vec<StepVerdict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub status: String,
    #[serde(default)]
    pub reason: String,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.status.eq_ignore_ascii_case("PASS")
    }
}

/// A risk the analyzer flagged in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRisk {
    #[serde(rename = "type")]
    pub risk_type: String,
    #[serde(alias = "risk")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
}

impl DetectedRisk {
    pub fn new(risk_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            risk_type: risk_type.into(),
            description: description.into(),
            source_text: None,
            detection_method: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    /// Declared overall score, 0..=100
    #[serde(with = "flexible_score")]
    pub final_score: f64,
    #[serde(default)]
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub sop_adherence: SectionMap<SectionVerdict>,
    pub resolution: Resolution,
    #[serde(default)]
    pub risks_detected: Vec<DetectedRisk>,
    pub scoring: Scoring,
}

/// One diarized transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Seconds of audio that were analyzed
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trimmed_duration: Option<f64>,
    #[serde(default)]
    pub is_long_call: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Full evaluation of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub call_id: CallId,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub metadata: CallMetadata,
    #[serde(default)]
    pub transcript: Vec<Utterance>,
    pub evaluation: Evaluation,
    #[serde(default)]
    pub coaching_insights: Vec<String>,
    #[serde(default)]
    pub supervisor_alerts: Vec<String>,
}

impl EvaluationResult {
    pub fn final_score(&self) -> f64 {
        self.evaluation.scoring.final_score
    }

    pub fn sections(&self) -> &SectionMap<SectionVerdict> {
        &self.evaluation.sop_adherence
    }

    pub fn risks(&self) -> &[DetectedRisk] {
        &self.evaluation.risks_detected
    }

    pub fn has_risks(&self) -> bool {
        !self.evaluation.risks_detected.is_empty()
    }

    pub fn region(&self) -> Option<&str> {
        self.metadata.region.as_deref()
    }

    /// Step texts that did not pass, in section then step order.
    pub fn failed_steps(&self) -> impl Iterator<Item = &str> {
        self.evaluation
            .sop_adherence
            .values()
            .flat_map(|section| section.steps.iter())
            .filter(|verdict| !verdict.status.is_pass())
            .map(|verdict| verdict.step.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "call_id": "c-100",
        "timestamp": "2024-06-02T14:30:00.500000",
        "metadata": {"duration": 312.5, "language": "en", "is_long_call": false, "region": "EMEA"},
        "transcript": [{"speaker": "Agent", "start": 0.0, "end": 2.1, "text": "Hello"}],
        "evaluation": {
            "sop_adherence": {
                "Greeting": {"score": 10, "max_score": 10, "steps": [
                    {"step": "Greet", "status": "PASS", "confidence": 0.93, "reason": "matched", "timestamp": null}
                ]},
                "Verification": {"score": 2.5, "max_score": 5, "steps": [
                    {"step": "Ask DOB", "status": "PARTIAL", "confidence": 0.4},
                    {"step": "Ask address", "status": "FAIL", "confidence": 0.1}
                ]}
            },
            "resolution": {"status": "PASS", "reason": "resolved"},
            "risks_detected": [{"type": "keyword", "risk": "lawsuit", "detection_method": "exact_match"}],
            "scoring": {"final_score": "85%", "grade": "A"}
        },
        "coaching_insights": ["Focus on Verification"],
        "supervisor_alerts": []
    }"#;

    #[test]
    fn test_decode_backend_payload() {
        let result: EvaluationResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(result.call_id, CallId::new("c-100"));
        assert_eq!(result.final_score(), 85.0);
        assert_eq!(result.region(), Some("EMEA"));
        assert!(result.evaluation.resolution.is_resolved());
        assert_eq!(result.risks()[0].description, "lawsuit");
        assert_eq!(result.risks()[0].risk_type, "keyword");
        let sections: Vec<&str> = result.sections().keys().collect();
        assert_eq!(sections, vec!["Greeting", "Verification"]);
        let failed: Vec<&str> = result.failed_steps().collect();
        assert_eq!(failed, vec!["Ask DOB", "Ask address"]);
    }

    #[test]
    fn test_missing_scoring_is_malformed() {
        let json = r#"{
            "call_id": "c-1",
            "timestamp": "2024-06-02T14:30:00Z",
            "evaluation": {"sop_adherence": {}, "resolution": {"status": "FAIL"}}
        }"#;
        assert!(serde_json::from_str::<EvaluationResult>(json).is_err());
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let json = SAMPLE.replace("\"PARTIAL\"", "\"MAYBE\"");
        assert!(serde_json::from_str::<EvaluationResult>(&json).is_err());
    }
}
