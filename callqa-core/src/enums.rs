//! Enum types shared across CallQA crates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict the analyzer assigns to a single rubric step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Pass,
    Partial,
    Fail,
}

impl StepStatus {
    /// Credit earned toward a section score.
    pub fn credit(self) -> f64 {
        match self {
            StepStatus::Pass => 1.0,
            StepStatus::Partial => 0.5,
            StepStatus::Fail => 0.0,
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, StepStatus::Pass)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pass => "PASS",
            StepStatus::Partial => "PARTIAL",
            StepStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade derived from an adherence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display band for an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreBand {
    High,
    Med,
    Low,
}

/// Why a call was routed to a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoachingCategory {
    /// A detected risk matched the configured taxonomy
    Risk,
    /// Final score fell below the coaching threshold
    Performance,
    /// Anything else that still qualified
    Technical,
}

impl CoachingCategory {
    /// Tag written into the coaching item's tag list.
    pub fn tag(self) -> &'static str {
        match self {
            CoachingCategory::Risk => "Critical Risk",
            CoachingCategory::Performance => "Performance",
            CoachingCategory::Technical => "Technical",
        }
    }
}

impl fmt::Display for CoachingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CoachingCategory::Risk => "Risk",
            CoachingCategory::Performance => "Performance",
            CoachingCategory::Technical => "Technical",
        };
        f.write_str(label)
    }
}

/// Editable field of a rubric step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Text,
    Suggestion,
    InternalIntent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_wire_names() {
        let parsed: Vec<StepStatus> =
            serde_json::from_str(r#"["PASS","PARTIAL","FAIL"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![StepStatus::Pass, StepStatus::Partial, StepStatus::Fail]
        );
        assert_eq!(
            serde_json::to_string(&StepStatus::Partial).unwrap(),
            "\"PARTIAL\""
        );
    }

    #[test]
    fn test_step_status_rejects_lowercase() {
        assert!(serde_json::from_str::<StepStatus>("\"pass\"").is_err());
    }

    #[test]
    fn test_grade_a_plus_wire_name() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(Grade::APlus.to_string(), "A+");
    }

    #[test]
    fn test_coaching_tags() {
        assert!(CoachingCategory::Risk.tag().contains("Risk"));
        assert!(CoachingCategory::Performance.tag().contains("Performance"));
        assert_eq!(CoachingCategory::Technical.to_string(), "Technical");
    }
}
