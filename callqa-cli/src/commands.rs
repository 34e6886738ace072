//! Command implementations, written against the collaborator traits so they
//! run the same over the HTTP client and over in-memory sources.

use callqa_backend::{EvaluationSource, InsightSource};
use callqa_core::{
    CallId, CoachingEntry, CoachingPolicy, InsightRollup, QaResult, RegionFilter, RollupOptions,
    ScoreBand,
};
use callqa_scoring::{adherence_report, coaching_notes, supervisor_alerts, AdherenceReport};
use serde::Serialize;
use tracing::info;

/// Call detail: the score header plus derived notes and alerts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallReport {
    pub call_id: CallId,
    pub region: Option<String>,
    pub report: AdherenceReport,
    pub coaching_notes: Vec<String>,
    pub supervisor_alerts: Vec<String>,
}

/// Rollup with its score band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupView {
    #[serde(flatten)]
    pub rollup: InsightRollup,
    pub band: ScoreBand,
}

pub async fn call_report(source: &dyn EvaluationSource, call_id: &CallId) -> QaResult<CallReport> {
    let result = source.fetch_evaluation(call_id).await?;
    Ok(CallReport {
        call_id: result.call_id.clone(),
        region: result.region().map(str::to_string),
        report: adherence_report(&result),
        coaching_notes: coaching_notes(&result),
        supervisor_alerts: supervisor_alerts(&result),
    })
}

/// Rollup computed locally from the evaluation list.
pub async fn local_rollup(
    source: &dyn EvaluationSource,
    region: &RegionFilter,
    options: &RollupOptions,
) -> QaResult<RollupView> {
    let results = source.list_evaluations(region).await?;
    info!(region = region.label(), calls = results.len(), "computing rollup");
    let rollup = callqa_insights::rollup(&results, region, options);
    Ok(with_band(rollup))
}

/// Rollup as computed by the analyzer backend.
pub async fn remote_rollup(source: &dyn InsightSource, region: &RegionFilter) -> QaResult<RollupView> {
    let rollup = source.fetch_rollup(region).await?;
    Ok(with_band(rollup))
}

pub async fn local_coaching(
    source: &dyn EvaluationSource,
    policy: &CoachingPolicy,
) -> QaResult<Vec<CoachingEntry>> {
    let results = source.list_evaluations(&RegionFilter::All).await?;
    let entries = callqa_insights::select(&results, policy);
    info!(calls = results.len(), selected = entries.len(), "coaching selection done");
    Ok(entries)
}

pub async fn remote_coaching(source: &dyn InsightSource) -> QaResult<Vec<CoachingEntry>> {
    let items = source.fetch_coaching_needs().await?;
    Ok(callqa_insights::label_listing(items))
}

fn with_band(rollup: InsightRollup) -> RollupView {
    let band = callqa_insights::score_band(rollup.average_score);
    RollupView { rollup, band }
}
