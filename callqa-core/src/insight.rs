//! Rollup and coaching shapes

use crate::serde_helpers::{flexible_score, flexible_timestamp};
use crate::{CallId, CoachingCategory, EvaluationResult, Timestamp};
use serde::{Deserialize, Serialize};

/// Label used when no region filter is applied.
pub const ALL_REGIONS_LABEL: &str = "All Regions";

/// Region used on coaching items for calls without region metadata.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Which calls a rollup covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Named(String),
}

impl RegionFilter {
    /// Build a filter from optional user input; blank or "All" selects everything.
    pub fn from_option(region: Option<&str>) -> Self {
        match region.map(str::trim) {
            None | Some("") => RegionFilter::All,
            Some(name) if name.eq_ignore_ascii_case("all") => RegionFilter::All,
            Some(name) => RegionFilter::Named(name.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionFilter::All => ALL_REGIONS_LABEL,
            RegionFilter::Named(name) => name,
        }
    }

    /// Query-string value sent to the backend, if any.
    pub fn as_query(&self) -> Option<&str> {
        match self {
            RegionFilter::All => None,
            RegionFilter::Named(name) => Some(name),
        }
    }

    pub fn matches(&self, result: &EvaluationResult) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Named(name) => result.region() == Some(name.as_str()),
        }
    }
}

/// How often a step failed across the calls in a rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentCall {
    pub call_id: CallId,
    #[serde(with = "flexible_timestamp")]
    pub date: Timestamp,
    #[serde(with = "flexible_score")]
    pub score: f64,
}

/// Aggregate view over a set of evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRollup {
    pub region: String,
    pub total_calls: usize,
    pub average_score: f64,
    pub sop_pass_rate: f64,
    #[serde(default)]
    pub common_sop_failures: Vec<StepFailure>,
    #[serde(default)]
    pub recent_calls_summary: Vec<RecentCall>,
}

/// A call routed to a supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingItem {
    pub call_id: CallId,
    #[serde(with = "flexible_timestamp")]
    pub date: Timestamp,
    pub problem_title: String,
    #[serde(with = "flexible_score")]
    pub score: f64,
    pub region: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A coaching item together with the category it is listed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingEntry {
    pub category: CoachingCategory,
    #[serde(flatten)]
    pub item: CoachingItem,
}
