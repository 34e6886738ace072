//! Region rollup over evaluation results.

use callqa_core::{
    EvaluationResult, InsightRollup, RecentCall, RegionFilter, RollupOptions, ScoreBand,
    StepFailure,
};
use callqa_scoring::round_to;
use std::collections::{HashMap, HashSet};

/// Averages at or above this are shown as high.
pub const HIGH_BAND_MIN: f64 = 80.0;
/// Averages at or above this (and below high) are shown as medium.
pub const MED_BAND_MIN: f64 = 60.0;

pub fn filter_region<'a>(
    results: &'a [EvaluationResult],
    region: &RegionFilter,
) -> Vec<&'a EvaluationResult> {
    results
        .iter()
        .filter(|result| region.matches(result))
        .collect()
}

/// Mean declared final score, rounded to two decimals. 0 for no calls.
pub fn average_score<'a, I>(calls: I) -> f64
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let (count, total) = calls
        .into_iter()
        .fold((0usize, 0.0f64), |(count, total), call| {
            (count + 1, total + call.final_score())
        });
    if count == 0 {
        return 0.0;
    }
    round_to(total / count as f64, 2)
}

/// Share of step entries (one per section/step pair per call) that passed, as a
/// percentage rounded to two decimals. 0 when there are no entries.
pub fn sop_pass_rate<'a, I>(calls: I) -> f64
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let mut entries = 0usize;
    let mut passed = 0usize;
    for call in calls {
        for section in call.sections().values() {
            for verdict in &section.steps {
                entries += 1;
                if verdict.status.is_pass() {
                    passed += 1;
                }
            }
        }
    }
    if entries == 0 {
        return 0.0;
    }
    round_to(passed as f64 / entries as f64 * 100.0, 2)
}

/// Steps that failed or were partial, counted at most once per call.
///
/// Ordered by count descending; ties keep first-seen order. The percentage is
/// relative to the number of calls, rounded to one decimal.
///
/// # Arguments
/// * `calls` - Calls to scan
/// * `limit` - Maximum number of entries returned, `None` for all
pub fn common_failures<'a, I>(calls: I, limit: Option<usize>) -> Vec<StepFailure>
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let mut order: Vec<(&'a str, usize)> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut total_calls = 0usize;

    for call in calls {
        total_calls += 1;
        let mut seen: HashSet<&'a str> = HashSet::new();
        for step in call.failed_steps() {
            if !seen.insert(step) {
                continue;
            }
            match slots.get(step) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    slots.insert(step, order.len());
                    order.push((step, 1));
                }
            }
        }
    }

    if total_calls == 0 {
        return Vec::new();
    }

    // sort_by is stable, so equal counts stay in first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    let limit = limit.unwrap_or(order.len());
    order
        .into_iter()
        .take(limit)
        .map(|(step, count)| StepFailure {
            step: step.to_string(),
            count,
            percentage: round_to(count as f64 / total_calls as f64 * 100.0, 1),
        })
        .collect()
}

/// Newest `limit` calls, timestamp descending; equal timestamps keep input order.
pub fn recent_calls<'a, I>(calls: I, limit: usize) -> Vec<RecentCall>
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let mut calls: Vec<&EvaluationResult> = calls.into_iter().collect();
    calls.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    calls
        .into_iter()
        .take(limit)
        .map(|call| RecentCall {
            call_id: call.call_id.clone(),
            date: call.timestamp,
            score: call.final_score(),
        })
        .collect()
}

/// Build the dashboard rollup for one region.
pub fn rollup(
    results: &[EvaluationResult],
    region: &RegionFilter,
    options: &RollupOptions,
) -> InsightRollup {
    let selected = filter_region(results, region);
    InsightRollup {
        region: region.label().to_string(),
        total_calls: selected.len(),
        average_score: average_score(selected.iter().copied()),
        sop_pass_rate: sop_pass_rate(selected.iter().copied()),
        common_sop_failures: common_failures(selected.iter().copied(), options.failure_limit),
        recent_calls_summary: recent_calls(selected.iter().copied(), options.recent_limit),
    }
}

pub fn score_band(score: f64) -> ScoreBand {
    if score >= HIGH_BAND_MIN {
        ScoreBand::High
    } else if score >= MED_BAND_MIN {
        ScoreBand::Med
    } else {
        ScoreBand::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callqa_core::{StepStatus::*, ALL_REGIONS_LABEL};
    use callqa_test_utils::{verdict, EvaluationBuilder};

    fn calls() -> Vec<EvaluationResult> {
        vec![
            EvaluationBuilder::new("c-1")
                .at_minute(10)
                .region("EMEA")
                .final_score(80.0)
                .section(
                    "Verification",
                    5.0,
                    10.0,
                    vec![verdict("Ask DOB", Fail), verdict("Ask address", Pass)],
                )
                .build(),
            EvaluationBuilder::new("c-2")
                .at_minute(30)
                .region("APAC")
                .final_score(65.5)
                .section(
                    "Verification",
                    2.5,
                    10.0,
                    vec![verdict("Ask DOB", Partial), verdict("Ask address", Fail)],
                )
                .section("Closing", 0.0, 5.0, vec![verdict("Ask DOB", Fail)])
                .build(),
            EvaluationBuilder::new("c-3")
                .at_minute(20)
                .region("EMEA")
                .final_score(90.25)
                .section("Closing", 5.0, 5.0, vec![verdict("Thank", Pass)])
                .build(),
        ]
    }

    #[test]
    fn test_average_score() {
        let calls = calls();
        // (80 + 65.5 + 90.25) / 3 = 78.5833...
        assert_eq!(average_score(&calls), 78.58);
        assert_eq!(average_score(&Vec::<EvaluationResult>::new()), 0.0);
    }

    #[test]
    fn test_sop_pass_rate_counts_entries() {
        let calls = calls();
        // 6 entries, 2 passes
        assert_eq!(sop_pass_rate(&calls), 33.33);
        let empty = EvaluationBuilder::new("c-empty").build();
        assert_eq!(sop_pass_rate([&empty]), 0.0);
    }

    #[test]
    fn test_common_failures_once_per_call() {
        let calls = calls();
        let failures = common_failures(&calls, None);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].step, "Ask DOB");
        assert_eq!(failures[0].count, 2);
        assert_eq!(failures[0].percentage, 66.7);
        assert_eq!(failures[1].step, "Ask address");
        assert_eq!(failures[1].count, 1);
        assert_eq!(failures[1].percentage, 33.3);
    }

    #[test]
    fn test_common_failures_tie_keeps_first_seen() {
        let calls = vec![
            EvaluationBuilder::new("a")
                .section("S", 0.0, 1.0, vec![verdict("Zulu", Fail), verdict("Alpha", Fail)])
                .build(),
        ];
        let failures = common_failures(&calls, None);
        let steps: Vec<&str> = failures.iter().map(|f| f.step.as_str()).collect();
        assert_eq!(steps, vec!["Zulu", "Alpha"]);
        assert_eq!(common_failures(&calls, Some(1)).len(), 1);
    }

    #[test]
    fn test_recent_calls_descending() {
        let calls = calls();
        let recent = recent_calls(&calls, 2);
        let ids: Vec<&str> = recent.iter().map(|c| c.call_id.as_str()).collect();
        assert_eq!(ids, vec!["c-2", "c-3"]);
        assert_eq!(recent[0].score, 65.5);
    }

    #[test]
    fn test_recent_calls_ties_keep_input_order() {
        let calls = vec![
            EvaluationBuilder::new("first").at_minute(5).build(),
            EvaluationBuilder::new("second").at_minute(5).build(),
        ];
        let ids: Vec<String> = recent_calls(&calls, 10)
            .into_iter()
            .map(|c| c.call_id.to_string())
            .collect();
        assert_eq!(ids, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_rollup_region_filter() {
        let calls = calls();
        let emea = rollup(
            &calls,
            &RegionFilter::Named("EMEA".to_string()),
            &RollupOptions::default(),
        );
        assert_eq!(emea.region, "EMEA");
        assert_eq!(emea.total_calls, 2);
        assert_eq!(emea.average_score, 85.13);
        assert_eq!(emea.recent_calls_summary[0].call_id.as_str(), "c-3");

        let all = rollup(&calls, &RegionFilter::All, &RollupOptions::default());
        assert_eq!(all.region, ALL_REGIONS_LABEL);
        assert_eq!(all.total_calls, 3);
    }

    #[test]
    fn test_rollup_unknown_region_is_empty() {
        let empty = rollup(
            &calls(),
            &RegionFilter::Named("LATAM".to_string()),
            &RollupOptions::default(),
        );
        assert_eq!(empty.total_calls, 0);
        assert_eq!(empty.average_score, 0.0);
        assert_eq!(empty.sop_pass_rate, 0.0);
        assert!(empty.common_sop_failures.is_empty());
        assert!(empty.recent_calls_summary.is_empty());
    }

    #[test]
    fn test_score_band() {
        assert_eq!(score_band(80.0), ScoreBand::High);
        assert_eq!(score_band(79.99), ScoreBand::Med);
        assert_eq!(score_band(60.0), ScoreBand::Med);
        assert_eq!(score_band(59.0), ScoreBand::Low);
    }
}
