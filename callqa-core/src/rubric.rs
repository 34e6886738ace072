//! Rubric (SOP) model types

use crate::{OwnerId, SectionMap, SopId, Timestamp};
use serde::{Deserialize, Serialize};

/// Weight given to a freshly added section.
pub const DEFAULT_SECTION_WEIGHT: f64 = 10.0;

/// One expected agent behavior inside a section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    /// Human-readable description; blank means the step is still a draft
    #[serde(default)]
    pub text: String,
    /// Example phrasing the agent could use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Intent label the analyzer uses for matching, filled by processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_intent: Option<String>,
}

impl Step {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.internal_intent = Some(intent.into());
        self
    }

    /// A draft has no text yet and is dropped before persistence.
    pub fn is_draft(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn has_intent(&self) -> bool {
        self.internal_intent
            .as_deref()
            .map(|intent| !intent.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A named, weighted group of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub weight: f64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Section {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_WEIGHT)
    }
}

/// Keyword lists the analyzer uses for tone and risk detection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub risk_keywords: Vec<String>,
}

/// A rubric: ordered sections plus sentiment configuration.
///
/// Serializes to exactly the body the analyzer's processing endpoint expects:
/// `{"sop_rules": {...}, "sentiments": {...}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RubricModel {
    #[serde(default)]
    pub sop_rules: SectionMap<Section>,
    #[serde(default)]
    pub sentiments: SentimentConfig,
}

impl RubricModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starter rubric handed to a user creating their first SOP.
    pub fn starter() -> Self {
        let mut sop_rules = SectionMap::new();
        sop_rules.insert(
            "Greeting",
            Section::new(DEFAULT_SECTION_WEIGHT).with_step(
                Step::new("Greet the customer").with_suggestion("Hello, thank you for calling."),
            ),
        );
        Self {
            sop_rules,
            sentiments: SentimentConfig {
                positive: vec!["thank you".to_string(), "great".to_string()],
                negative: vec!["bad".to_string(), "terrible".to_string()],
                risk_keywords: vec!["cancel".to_string(), "lawsuit".to_string()],
            },
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sop_rules.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sop_rules.keys()
    }

    /// Total number of steps across all sections.
    pub fn step_count(&self) -> usize {
        self.sop_rules.values().map(|section| section.steps.len()).sum()
    }
}

/// A persisted rubric document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SopDefinition {
    pub id: SopId,
    #[serde(rename = "userId")]
    pub owner: OwnerId,
    pub name: String,
    pub rules: RubricModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_filename: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Policy document chosen for upload alongside a rubric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PolicyDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Confirmation of a policy upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyReceipt {
    pub sop_id: SopId,
    pub filename: String,
}

/// Backend-generated intent and phrasing for a step's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSuggestion {
    pub intent: String,
    pub suggestion: String,
}
