//! CallQA Rubric - Rubric Editing
//!
//! Pure operations over [`RubricModel`]. Every operation takes the current model
//! and returns a new one, or a [`RubricError`] with the input left untouched, so
//! a failed edit can never leave a half-applied rubric behind.

use callqa_core::{
    RubricError, RubricModel, RubricResult, Section, Step, StepField, StepSuggestion,
    DEFAULT_SECTION_WEIGHT,
};
use tracing::debug;

// ============================================================================
// SECTION OPERATIONS
// ============================================================================

/// Append a new, empty section with the default weight.
///
/// # Arguments
/// * `model` - Current rubric
/// * `name` - Section name, must be non-blank and not already present
pub fn add_section(model: &RubricModel, name: &str) -> RubricResult<RubricModel> {
    if name.trim().is_empty() {
        return Err(RubricError::EmptySectionName);
    }
    if model.sop_rules.contains_key(name) {
        return Err(RubricError::DuplicateSection {
            name: name.to_string(),
        });
    }

    let mut next = model.clone();
    next.sop_rules
        .insert(name, Section::new(DEFAULT_SECTION_WEIGHT));
    debug!(section = name, "section added");
    Ok(next)
}

/// Rename a section, keeping its position, weight and steps.
///
/// Renaming to the same name or to a blank name is a no-op. Any per-section
/// results keyed by the old name are stale afterwards; the caller decides how
/// to invalidate them.
pub fn rename_section(
    model: &RubricModel,
    old_name: &str,
    new_name: &str,
) -> RubricResult<RubricModel> {
    if new_name == old_name || new_name.trim().is_empty() {
        return Ok(model.clone());
    }
    if !model.sop_rules.contains_key(old_name) {
        return Err(RubricError::UnknownSection {
            name: old_name.to_string(),
        });
    }
    if model.sop_rules.contains_key(new_name) {
        return Err(RubricError::DuplicateSection {
            name: new_name.to_string(),
        });
    }

    let mut next = model.clone();
    next.sop_rules.rename(old_name, new_name);
    debug!(from = old_name, to = new_name, "section renamed");
    Ok(next)
}

/// Remove a section and all of its steps. Callers confirm with the user first.
pub fn delete_section(model: &RubricModel, name: &str) -> RubricResult<RubricModel> {
    let mut next = model.clone();
    if next.sop_rules.remove(name).is_none() {
        return Err(RubricError::UnknownSection {
            name: name.to_string(),
        });
    }
    debug!(section = name, "section deleted");
    Ok(next)
}

/// Set a section weight. Weights must be finite and non-negative.
pub fn set_weight(model: &RubricModel, name: &str, weight: f64) -> RubricResult<RubricModel> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(RubricError::InvalidWeight {
            section: name.to_string(),
            weight,
        });
    }
    let mut next = model.clone();
    section_mut(&mut next, name)?.weight = weight;
    Ok(next)
}

// ============================================================================
// STEP OPERATIONS
// ============================================================================

/// Append a blank draft step to a section.
pub fn add_step(model: &RubricModel, section: &str) -> RubricResult<RubricModel> {
    let mut next = model.clone();
    section_mut(&mut next, section)?.steps.push(Step::default());
    Ok(next)
}

/// Remove the step at `index`, shifting later steps up.
pub fn remove_step(model: &RubricModel, section: &str, index: usize) -> RubricResult<RubricModel> {
    let mut next = model.clone();
    let target = section_mut(&mut next, section)?;
    check_index(section, target, index)?;
    target.steps.remove(index);
    Ok(next)
}

/// Replace one field of one step.
pub fn edit_step(
    model: &RubricModel,
    section: &str,
    index: usize,
    field: StepField,
    value: impl Into<String>,
) -> RubricResult<RubricModel> {
    let mut next = model.clone();
    let step = step_mut(&mut next, section, index)?;
    let value = value.into();
    match field {
        StepField::Text => step.text = value,
        StepField::Suggestion => step.suggestion = Some(value),
        StepField::InternalIntent => step.internal_intent = Some(value),
    }
    Ok(next)
}

/// Write a generated intent and phrasing into a step.
pub fn apply_suggestion(
    model: &RubricModel,
    section: &str,
    index: usize,
    suggestion: &StepSuggestion,
) -> RubricResult<RubricModel> {
    let mut next = model.clone();
    let step = step_mut(&mut next, section, index)?;
    step.internal_intent = Some(suggestion.intent.clone());
    step.suggestion = Some(suggestion.suggestion.clone());
    Ok(next)
}

// ============================================================================
// PERSISTENCE PREPARATION
// ============================================================================

/// Drop draft (blank-text) steps. Sections themselves are kept even when emptied.
pub fn promote_steps(model: &RubricModel) -> RubricModel {
    let mut next = model.clone();
    let mut dropped = 0usize;
    for (_, section) in next.sop_rules.iter_mut() {
        let before = section.steps.len();
        section.steps.retain(|step| !step.is_draft());
        dropped += before - section.steps.len();
    }
    if dropped > 0 {
        debug!(dropped, "draft steps dropped before persistence");
    }
    next
}

/// Locations `(section, index)` of non-draft steps still lacking an intent label.
pub fn steps_missing_intent(model: &RubricModel) -> Vec<(String, usize)> {
    model
        .sop_rules
        .iter()
        .flat_map(|(name, section)| {
            section
                .steps
                .iter()
                .enumerate()
                .filter(|(_, step)| !step.is_draft() && !step.has_intent())
                .map(move |(index, _)| (name.to_string(), index))
        })
        .collect()
}

// ============================================================================
// HELPERS
// ============================================================================

fn section_mut<'a>(model: &'a mut RubricModel, name: &str) -> RubricResult<&'a mut Section> {
    model
        .sop_rules
        .get_mut(name)
        .ok_or_else(|| RubricError::UnknownSection {
            name: name.to_string(),
        })
}

fn step_mut<'a>(
    model: &'a mut RubricModel,
    section: &str,
    index: usize,
) -> RubricResult<&'a mut Step> {
    let target = section_mut(model, section)?;
    check_index(section, target, index)?;
    Ok(&mut target.steps[index])
}

fn check_index(section: &str, target: &Section, index: usize) -> RubricResult<()> {
    if index >= target.steps.len() {
        return Err(RubricError::IndexOutOfRange {
            section: section.to_string(),
            index,
            len: target.steps.len(),
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_model() -> impl Strategy<Value = RubricModel> {
        prop::collection::vec(("[A-Za-z]{1,8}", 0.0f64..100.0, 0usize..4), 0..6).prop_map(
            |sections| {
                let mut model = RubricModel::new();
                for (name, weight, steps) in sections {
                    let mut section = Section::new(weight);
                    for i in 0..steps {
                        section.steps.push(Step::new(format!("{} step {}", name, i)));
                    }
                    model.sop_rules.insert(name, section);
                }
                model
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Failed edits leave the model untouched; successful ones keep names unique.
        #[test]
        fn prop_add_section_keeps_names_unique(model in arb_model(), name in "[A-Za-z]{1,8}") {
            match add_section(&model, &name) {
                Ok(next) => {
                    prop_assert!(!model.sop_rules.contains_key(&name));
                    prop_assert_eq!(next.sop_rules.len(), model.sop_rules.len() + 1);
                    prop_assert_eq!(next.section_names().last(), Some(name.as_str()));
                }
                Err(err) => {
                    prop_assert!(model.sop_rules.contains_key(&name));
                    prop_assert_eq!(err, RubricError::DuplicateSection { name: name.clone() });
                }
            }
        }

        #[test]
        fn prop_rename_preserves_order_and_count(model in arb_model(), new_name in "[a-z]{1,8}") {
            let Some(old_name) = model.section_names().next().map(str::to_string) else {
                return Ok(());
            };
            match rename_section(&model, &old_name, &new_name) {
                Ok(next) => {
                    prop_assert_eq!(next.sop_rules.len(), model.sop_rules.len());
                    prop_assert_eq!(next.section(&new_name), model.section(&old_name));
                    prop_assert_eq!(next.section_names().next(), Some(new_name.as_str()));
                }
                Err(_) => prop_assert!(model.sop_rules.contains_key(&new_name)),
            }
        }

        #[test]
        fn prop_delete_leaves_others_identical(model in arb_model()) {
            let names: Vec<String> = model.section_names().map(str::to_string).collect();
            for name in &names {
                let next = delete_section(&model, name).unwrap();
                prop_assert_eq!(next.sop_rules.len(), names.len() - 1);
                for other in names.iter().filter(|other| *other != name) {
                    prop_assert_eq!(next.section(other), model.section(other));
                }
            }
        }

        #[test]
        fn prop_promote_is_idempotent(model in arb_model()) {
            let once = promote_steps(&model);
            prop_assert_eq!(promote_steps(&once), once);
        }
    }
}
