//! Rubric editing session.
//!
//! Holds the working copy of one rubric next to its last-saved document and
//! drives the save workflow: upload the pending policy, promote draft steps,
//! have the analyzer fill in intents, then persist. A failed save never
//! touches the working copy.

use crate::RubricStore;
use callqa_backend::{PolicyUploader, RubricProcessor, SuggestionGenerator};
use callqa_core::{
    OwnerId, PolicyDocument, QaError, QaResult, RubricError, RubricModel, RubricResult,
    SopDefinition, SopId, StorageError,
};
use callqa_rubric::{apply_suggestion, promote_steps, rename_section};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Dismissible message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// The session stays editable after this notice
    pub still_usable: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            still_usable: true,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            still_usable: true,
        }
    }

    pub fn from_error(err: &QaError) -> Self {
        Self::error(err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Collaborators a session needs.
#[derive(Clone)]
pub struct RubricServices {
    pub store: Arc<dyn RubricStore>,
    pub processor: Arc<dyn RubricProcessor>,
    pub uploader: Arc<dyn PolicyUploader>,
    pub suggestions: Arc<dyn SuggestionGenerator>,
}

impl std::fmt::Debug for RubricServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RubricServices").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct RubricSession {
    services: RubricServices,
    saved: SopDefinition,
    working: RubricModel,
    pending_policy: Option<PolicyDocument>,
    notice: Option<Notice>,
    stale_sections: Vec<String>,
}

impl RubricSession {
    /// Create a new rubric for `owner`, seeded with the starter template.
    pub async fn create(services: RubricServices, owner: &OwnerId, name: &str) -> QaResult<Self> {
        let sop = services
            .store
            .create(owner, name, RubricModel::starter())
            .await?;
        info!(sop_id = %sop.id, "rubric session started on new rubric");
        Ok(Self::from_definition(services, sop))
    }

    pub async fn open(services: RubricServices, owner: &OwnerId, id: &SopId) -> QaResult<Self> {
        let sop = services
            .store
            .get(owner, id)
            .await?
            .ok_or_else(|| StorageError::NotFound { sop_id: id.clone() })?;
        Ok(Self::from_definition(services, sop))
    }

    pub fn from_definition(services: RubricServices, saved: SopDefinition) -> Self {
        Self {
            services,
            working: saved.rules.clone(),
            saved,
            pending_policy: None,
            notice: None,
            stale_sections: Vec::new(),
        }
    }

    pub fn id(&self) -> &SopId {
        &self.saved.id
    }

    pub fn working(&self) -> &RubricModel {
        &self.working
    }

    pub fn saved(&self) -> &SopDefinition {
        &self.saved
    }

    /// Working copy differs from the last-saved rules, or a policy file is pending.
    pub fn is_dirty(&self) -> bool {
        self.working != self.saved.rules || self.pending_policy.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Section names whose per-section results no longer line up after a rename.
    pub fn stale_sections(&self) -> &[String] {
        &self.stale_sections
    }

    pub fn pending_policy(&self) -> Option<&PolicyDocument> {
        self.pending_policy.as_ref()
    }

    // ========================================================================
    // EDITING
    // ========================================================================

    /// Apply an editor operation to the working copy.
    ///
    /// On error the working copy is unchanged and the error is also kept as the
    /// current notice.
    pub fn edit<F>(&mut self, op: F) -> RubricResult<()>
    where
        F: FnOnce(&RubricModel) -> RubricResult<RubricModel>,
    {
        match op(&self.working) {
            Ok(next) => {
                self.working = next;
                Ok(())
            }
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Rename a section and mark its old name stale.
    pub fn rename_section(&mut self, old_name: &str, new_name: &str) -> RubricResult<()> {
        let before = self.working.sop_rules.len();
        let existed = self.working.sop_rules.contains_key(old_name);
        self.edit(|model| rename_section(model, old_name, new_name))?;
        let renamed = existed
            && self.working.sop_rules.len() == before
            && !self.working.sop_rules.contains_key(old_name);
        if renamed && !self.stale_sections.iter().any(|name| name == old_name) {
            self.stale_sections.push(old_name.to_string());
        }
        Ok(())
    }

    /// Ask the suggestion generator for a step's intent and phrasing and apply it.
    pub async fn suggest_step(&mut self, section: &str, index: usize) -> QaResult<()> {
        let text = self
            .working
            .section(section)
            .ok_or_else(|| RubricError::UnknownSection {
                name: section.to_string(),
            })?
            .steps
            .get(index)
            .map(|step| step.text.clone())
            .ok_or_else(|| RubricError::IndexOutOfRange {
                section: section.to_string(),
                index,
                len: self
                    .working
                    .section(section)
                    .map(|s| s.steps.len())
                    .unwrap_or(0),
            })?;

        let outcome = self.services.suggestions.suggest(&text).await;
        match outcome {
            Ok(suggestion) => {
                self.edit(|model| apply_suggestion(model, section, index, &suggestion))?;
                Ok(())
            }
            Err(err) => {
                warn!(section, index, error = %err, "step suggestion failed");
                self.notice = Some(Notice::from_error(&err));
                Err(err)
            }
        }
    }

    pub fn select_policy_file(&mut self, document: PolicyDocument) {
        self.pending_policy = Some(document);
    }

    pub fn clear_policy_file(&mut self) {
        self.pending_policy = None;
    }

    /// Drop unsaved edits and any pending policy file.
    pub fn discard_changes(&mut self) {
        self.working = self.saved.rules.clone();
        self.pending_policy = None;
        self.stale_sections.clear();
    }

    // ========================================================================
    // SAVE WORKFLOW
    // ========================================================================

    /// Upload the pending policy (if any), process and persist the working copy.
    ///
    /// # Returns
    /// * `Ok(())` - The processed rubric is now both working copy and saved document
    /// * `Err(Notice)` - What went wrong; the working copy is untouched
    pub async fn save(&mut self) -> Result<(), Notice> {
        match self.run_save().await {
            Ok(()) => {
                let notice = Notice::success("Rubric saved and processed");
                self.notice = Some(notice);
                Ok(())
            }
            Err(err) => {
                warn!(sop_id = %self.saved.id, error = %err, "rubric save failed");
                let notice = Notice::from_error(&err);
                self.notice = Some(notice.clone());
                Err(notice)
            }
        }
    }

    async fn run_save(&mut self) -> QaResult<()> {
        let owner = self.saved.owner.clone();
        let sop_id = self.saved.id.clone();

        if let Some(document) = &self.pending_policy {
            info!(sop_id = %sop_id, filename = %document.filename, "uploading policy document");
            let receipt = self.services.uploader.upload(&sop_id, document).await?;
            let updated = self
                .services
                .store
                .set_policy_reference(&owner, &sop_id, &receipt.filename)
                .await?;
            self.saved.policy_filename = updated.policy_filename;
            self.saved.updated_at = updated.updated_at;
            self.pending_policy = None;
        }

        let candidate = promote_steps(&self.working);
        let processed = self.services.processor.process(&candidate).await?;
        let stored = self
            .services
            .store
            .update_rules(&owner, &sop_id, processed.clone())
            .await?;

        info!(sop_id = %sop_id, steps = processed.step_count(), "rubric persisted");
        self.working = processed;
        self.saved = stored;
        self.stale_sections.clear();
        Ok(())
    }

    /// Delete the rubric this session edits.
    pub async fn delete(self) -> QaResult<()> {
        self.services
            .store
            .delete(&self.saved.owner, &self.saved.id)
            .await
    }
}
