//! Coaching selection: which calls a supervisor should review, and why.

use callqa_core::{
    CoachingCategory, CoachingEntry, CoachingItem, CoachingPolicy, DetectedRisk,
    EvaluationResult, StepStatus, UNKNOWN_REGION,
};

/// Tag used on technical items that have concrete step failures.
pub const SOP_VIOLATION_TAG: &str = "SOP Violation";

pub fn qualifies(result: &EvaluationResult, policy: &CoachingPolicy) -> bool {
    result.final_score() < policy.threshold || result.has_risks()
}

/// Category for a qualifying call, `None` when the call does not need coaching.
///
/// Risk wins over Performance, which wins over Technical.
pub fn categorize(result: &EvaluationResult, policy: &CoachingPolicy) -> Option<CoachingCategory> {
    if !qualifies(result, policy) {
        return None;
    }
    if taxonomy_risk(result, policy).is_some() {
        Some(CoachingCategory::Risk)
    } else if result.final_score() < policy.threshold {
        Some(CoachingCategory::Performance)
    } else {
        Some(CoachingCategory::Technical)
    }
}

/// Select calls needing coaching, in input order.
pub fn select(results: &[EvaluationResult], policy: &CoachingPolicy) -> Vec<CoachingEntry> {
    results
        .iter()
        .filter_map(|result| {
            categorize(result, policy).map(|category| CoachingEntry {
                category,
                item: coaching_item(result, category, policy),
            })
        })
        .collect()
}

/// Categorize an already-built coaching list by each item's first tag.
pub fn label_listing(items: Vec<CoachingItem>) -> Vec<CoachingEntry> {
    items
        .into_iter()
        .map(|item| CoachingEntry {
            category: category_from_tags(&item.tags),
            item,
        })
        .collect()
}

fn category_from_tags(tags: &[String]) -> CoachingCategory {
    match tags.first() {
        Some(tag) if tag.contains("Risk") => CoachingCategory::Risk,
        Some(tag) if tag.contains("Performance") => CoachingCategory::Performance,
        _ => CoachingCategory::Technical,
    }
}

fn taxonomy_risk<'a>(result: &'a EvaluationResult, policy: &CoachingPolicy) -> Option<&'a DetectedRisk> {
    result
        .risks()
        .iter()
        .find(|risk| policy.is_risk_type(&risk.risk_type))
}

fn coaching_item(
    result: &EvaluationResult,
    category: CoachingCategory,
    policy: &CoachingPolicy,
) -> CoachingItem {
    let (problem_title, tag) = match category {
        CoachingCategory::Risk => {
            let description = taxonomy_risk(result, policy)
                .map(|risk| risk.description.as_str())
                .unwrap_or_default();
            (format!("Risk Detected: {}", description), category.tag())
        }
        CoachingCategory::Performance => (
            format!("Low Performance ({}%)", result.final_score().trunc() as i64),
            category.tag(),
        ),
        CoachingCategory::Technical => technical_title(result),
    };

    CoachingItem {
        call_id: result.call_id.clone(),
        date: result.timestamp,
        problem_title,
        score: result.final_score(),
        region: result.region().unwrap_or(UNKNOWN_REGION).to_string(),
        duration: result.metadata.duration,
        tags: vec![tag.to_string()],
    }
}

fn technical_title(result: &EvaluationResult) -> (String, &'static str) {
    let failures: Vec<&str> = result
        .sections()
        .values()
        .flat_map(|section| section.steps.iter())
        .filter(|verdict| verdict.status == StepStatus::Fail)
        .map(|verdict| verdict.step.as_str())
        .collect();

    match failures.split_first() {
        Some((first, rest)) if rest.is_empty() => {
            (format!("SOP Violation: {}", first), SOP_VIOLATION_TAG)
        }
        Some((first, rest)) => (
            format!("SOP Violation: {} (+{} more)", first, rest.len()),
            SOP_VIOLATION_TAG,
        ),
        None => match result.risks().first() {
            Some(risk) => (
                format!("Needs Review: {}", risk.description),
                CoachingCategory::Technical.tag(),
            ),
            None => ("Needs Review".to_string(), CoachingCategory::Technical.tag()),
        },
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use callqa_test_utils::arb_evaluations;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_selection_matches_qualification(
            results in arb_evaluations(12),
            threshold in 0.0f64..=100.0,
        ) {
            let policy = CoachingPolicy::new(threshold);
            let entries = select(&results, &policy);
            let expected: Vec<&str> = results
                .iter()
                .filter(|r| r.final_score() < threshold || r.has_risks())
                .map(|r| r.call_id.as_str())
                .collect();
            let selected: Vec<&str> = entries.iter().map(|e| e.item.call_id.as_str()).collect();
            prop_assert_eq!(selected, expected);
        }

        #[test]
        fn prop_performance_only_below_threshold(
            results in arb_evaluations(12),
            threshold in 0.0f64..=100.0,
        ) {
            let policy = CoachingPolicy::new(threshold);
            for entry in select(&results, &policy) {
                if entry.category == CoachingCategory::Performance {
                    prop_assert!(entry.item.score < threshold);
                }
            }
        }
    }
}
