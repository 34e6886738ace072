//! CallQA Scoring - Score Aggregation
//!
//! Derives display metrics from a single [`EvaluationResult`]: overall adherence,
//! step status counts, confidence percentages, grades and coaching notes.
//! The per-section scores are taken as reported; nothing here re-scores a call.

use callqa_core::{EvaluationResult, Grade, SectionMap, SectionVerdict, StepStatus, StepVerdict};
use serde::{Deserialize, Serialize};

/// Sections scoring below this fraction of their maximum are flagged.
pub const LOW_ADHERENCE_RATIO: f64 = 0.5;

/// Average sentiment below this raises a frustration alert.
pub const FRUSTRATION_SENTIMENT: f64 = -0.5;

/// Note emitted when no step failed anywhere.
pub const ALL_CLEAR_NOTE: &str = "Great job! No major SOP violations detected.";

// ============================================================================
// NUMERIC HELPERS
// ============================================================================

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// ADHERENCE
// ============================================================================

/// Overall adherence as a whole percentage.
///
/// Sums reported section scores over the sum of positive maxima. Returns 0 when
/// there is no positive maximum or the ratio is not a finite non-negative number.
pub fn overall_adherence(result: &EvaluationResult) -> u32 {
    adherence_of(result.sections())
}

/// Same as [`overall_adherence`], over a bare section map.
pub fn adherence_of(sections: &SectionMap<SectionVerdict>) -> u32 {
    let earned: f64 = sections.values().map(|section| section.score).sum();
    let possible: f64 = sections
        .values()
        .map(|section| section.max_score)
        .filter(|max| *max > 0.0)
        .sum();
    if possible <= 0.0 {
        return 0;
    }
    let percent = earned / possible * 100.0;
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    percent.round() as u32
}

/// Sections whose reported score is below half their maximum, in rubric order.
pub fn low_adherence_sections(result: &EvaluationResult) -> Vec<&str> {
    result
        .sections()
        .iter()
        .filter(|(_, section)| {
            section.max_score > 0.0 && section.score < section.max_score * LOW_ADHERENCE_RATIO
        })
        .map(|(name, _)| name)
        .collect()
}

// ============================================================================
// STEP COUNTS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCounts {
    pub pass: usize,
    pub partial: usize,
    pub fail: usize,
}

impl StepCounts {
    pub fn total(&self) -> usize {
        self.pass + self.partial + self.fail
    }

    fn record(&mut self, status: StepStatus) {
        match status {
            StepStatus::Pass => self.pass += 1,
            StepStatus::Partial => self.partial += 1,
            StepStatus::Fail => self.fail += 1,
        }
    }
}

pub fn count_steps(steps: &[StepVerdict]) -> StepCounts {
    let mut counts = StepCounts::default();
    for verdict in steps {
        counts.record(verdict.status);
    }
    counts
}

/// Counts for one section, or `None` if the result has no such section.
pub fn step_counts(result: &EvaluationResult, section: &str) -> Option<StepCounts> {
    result
        .sections()
        .get(section)
        .map(|verdict| count_steps(&verdict.steps))
}

pub fn total_step_counts(result: &EvaluationResult) -> StepCounts {
    let mut counts = StepCounts::default();
    for section in result.sections().values() {
        for verdict in &section.steps {
            counts.record(verdict.status);
        }
    }
    counts
}

// ============================================================================
// CONFIDENCE, GRADES, SECTION SCORES
// ============================================================================

/// Matcher confidence as a whole percentage; out-of-range input is clamped to [0, 1].
pub fn confidence_percent(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn grade_for(percentage: f64) -> Grade {
    match percentage {
        p if p >= 90.0 => Grade::APlus,
        p if p >= 80.0 => Grade::A,
        p if p >= 70.0 => Grade::B,
        p if p >= 50.0 => Grade::C,
        _ => Grade::D,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub score: f64,
    pub max_score: f64,
}

/// Score a section from its step statuses: full credit for a pass, half for a partial.
///
/// # Arguments
/// * `statuses` - One status per rubric step
/// * `weight` - Section weight, which is also its maximum score
pub fn section_score(statuses: &[StepStatus], weight: f64) -> SectionScore {
    let score = if statuses.is_empty() {
        0.0
    } else {
        let earned: f64 = statuses.iter().map(|status| status.credit()).sum();
        round_to(earned / statuses.len() as f64 * weight, 2)
    };
    SectionScore {
        score,
        max_score: weight,
    }
}

// ============================================================================
// COACHING NOTES & REPORT
// ============================================================================

/// One note per section with failed steps, in rubric order.
pub fn coaching_notes(result: &EvaluationResult) -> Vec<String> {
    let notes: Vec<String> = result
        .sections()
        .iter()
        .filter_map(|(name, section)| {
            let missing: Vec<&str> = section
                .steps
                .iter()
                .filter(|verdict| verdict.status == StepStatus::Fail)
                .map(|verdict| verdict.step.as_str())
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(format!("Focus on {}: Missing {}", name, missing.join(", ")))
            }
        })
        .collect();

    if notes.is_empty() {
        vec![ALL_CLEAR_NOTE.to_string()]
    } else {
        notes
    }
}

/// Alerts for a supervisor: detected risks, customer frustration, weak sections.
pub fn supervisor_alerts(result: &EvaluationResult) -> Vec<String> {
    let mut alerts = Vec::new();
    if result.has_risks() {
        let risks: Vec<&str> = result
            .risks()
            .iter()
            .map(|risk| risk.description.as_str())
            .collect();
        alerts.push(format!("Critical risks detected: {}", risks.join(", ")));
    }
    let sentiment = result.evaluation.scoring.avg_sentiment.unwrap_or(0.0);
    if sentiment < FRUSTRATION_SENTIMENT {
        alerts.push("High customer frustration detected.".to_string());
    }
    let weak = low_adherence_sections(result);
    if !weak.is_empty() {
        alerts.push(format!("Low SOP adherence in: {}", weak.join(", ")));
    }
    alerts
}

/// Everything a call-detail view shows in its score header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceReport {
    pub adherence: u32,
    pub adherence_grade: Grade,
    /// Score as declared by the backend
    pub declared_score: f64,
    pub declared_grade: String,
    pub counts: StepCounts,
    pub low_sections: Vec<String>,
}

pub fn adherence_report(result: &EvaluationResult) -> AdherenceReport {
    let adherence = overall_adherence(result);
    AdherenceReport {
        adherence,
        adherence_grade: grade_for(f64::from(adherence)),
        declared_score: result.final_score(),
        declared_grade: result.evaluation.scoring.grade.clone(),
        counts: total_step_counts(result),
        low_sections: low_adherence_sections(result)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
