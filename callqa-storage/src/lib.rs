//! CallQA Storage - Rubric Persistence
//!
//! The [`RubricStore`] trait is the document-store boundary for SOP rubrics.
//! Every operation is scoped to an explicit owner; a rubric owned by someone
//! else is indistinguishable from a missing one.

pub mod session;

pub use session::{Notice, NoticeLevel, RubricServices, RubricSession};

use async_trait::async_trait;
use callqa_core::{
    OwnerId, QaResult, RubricModel, SopDefinition, SopId, StorageError,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

// ============================================================================
// STORE TRAIT
// ============================================================================

#[async_trait]
pub trait RubricStore: Send + Sync {
    /// Create a rubric document for `owner`.
    ///
    /// # Returns
    /// * `Ok(SopDefinition)` - The stored document with its generated id
    /// * `Err(QaError::Storage(StorageError::InsertFailed))` - If `name` is blank
    async fn create(&self, owner: &OwnerId, name: &str, rules: RubricModel) -> QaResult<SopDefinition>;

    async fn get(&self, owner: &OwnerId, id: &SopId) -> QaResult<Option<SopDefinition>>;

    /// All rubrics of `owner`, oldest first.
    async fn list(&self, owner: &OwnerId) -> QaResult<Vec<SopDefinition>>;

    /// Replace the rules of an existing rubric.
    async fn update_rules(&self, owner: &OwnerId, id: &SopId, rules: RubricModel) -> QaResult<SopDefinition>;

    /// Record the uploaded policy document's filename.
    async fn set_policy_reference(&self, owner: &OwnerId, id: &SopId, filename: &str) -> QaResult<SopDefinition>;

    async fn delete(&self, owner: &OwnerId, id: &SopId) -> QaResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory rubric store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRubricStore {
    sops: Arc<RwLock<HashMap<SopId, SopDefinition>>>,
}

impl InMemoryRubricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rubrics across all owners.
    pub fn len(&self) -> QaResult<usize> {
        let sops = self.sops.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(sops.len())
    }

    pub fn is_empty(&self) -> QaResult<bool> {
        Ok(self.len()? == 0)
    }

    fn modify<F>(&self, owner: &OwnerId, id: &SopId, apply: F) -> QaResult<SopDefinition>
    where
        F: FnOnce(&mut SopDefinition),
    {
        let mut sops = self.sops.write().map_err(|_| StorageError::LockPoisoned)?;
        let sop = sops
            .get_mut(id)
            .filter(|sop| &sop.owner == owner)
            .ok_or_else(|| StorageError::NotFound { sop_id: id.clone() })?;
        apply(sop);
        sop.updated_at = Utc::now();
        Ok(sop.clone())
    }
}

#[async_trait]
impl RubricStore for InMemoryRubricStore {
    async fn create(&self, owner: &OwnerId, name: &str, rules: RubricModel) -> QaResult<SopDefinition> {
        if name.trim().is_empty() {
            return Err(StorageError::InsertFailed {
                name: name.to_string(),
                reason: "name must not be empty".to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let sop = SopDefinition {
            id: SopId::generate(),
            owner: owner.clone(),
            name: name.to_string(),
            rules,
            policy_filename: None,
            created_at: now,
            updated_at: now,
        };

        let mut sops = self.sops.write().map_err(|_| StorageError::LockPoisoned)?;
        if sops.contains_key(&sop.id) {
            return Err(StorageError::InsertFailed {
                name: name.to_string(),
                reason: "already exists".to_string(),
            }
            .into());
        }
        sops.insert(sop.id.clone(), sop.clone());
        debug!(sop_id = %sop.id, owner = %owner, "rubric created");
        Ok(sop)
    }

    async fn get(&self, owner: &OwnerId, id: &SopId) -> QaResult<Option<SopDefinition>> {
        let sops = self.sops.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(sops.get(id).filter(|sop| &sop.owner == owner).cloned())
    }

    async fn list(&self, owner: &OwnerId) -> QaResult<Vec<SopDefinition>> {
        let sops = self.sops.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut owned: Vec<SopDefinition> = sops
            .values()
            .filter(|sop| &sop.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn update_rules(&self, owner: &OwnerId, id: &SopId, rules: RubricModel) -> QaResult<SopDefinition> {
        self.modify(owner, id, |sop| sop.rules = rules)
    }

    async fn set_policy_reference(&self, owner: &OwnerId, id: &SopId, filename: &str) -> QaResult<SopDefinition> {
        self.modify(owner, id, |sop| sop.policy_filename = Some(filename.to_string()))
    }

    async fn delete(&self, owner: &OwnerId, id: &SopId) -> QaResult<()> {
        let mut sops = self.sops.write().map_err(|_| StorageError::LockPoisoned)?;
        let owned = sops.get(id).map(|sop| &sop.owner == owner).unwrap_or(false);
        if !owned {
            return Err(StorageError::NotFound { sop_id: id.clone() }.into());
        }
        sops.remove(id);
        debug!(sop_id = %id, "rubric deleted");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use callqa_core::QaError;
    use callqa_test_utils::sample_rubric;

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryRubricStore::new();
        let sop = store
            .create(&owner("u1"), "Billing", sample_rubric())
            .await
            .unwrap();
        assert_eq!(sop.name, "Billing");
        assert_eq!(store.len().unwrap(), 1);

        let fetched = store.get(&owner("u1"), &sop.id).await.unwrap();
        assert_eq!(fetched, Some(sop));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let store = InMemoryRubricStore::new();
        let err = store
            .create(&owner("u1"), "  ", RubricModel::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QaError::Storage(StorageError::InsertFailed { .. })
        ));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = InMemoryRubricStore::new();
        let sop = store
            .create(&owner("u1"), "Billing", sample_rubric())
            .await
            .unwrap();

        assert_eq!(store.get(&owner("u2"), &sop.id).await.unwrap(), None);
        assert!(store.list(&owner("u2")).await.unwrap().is_empty());
        assert!(matches!(
            store.update_rules(&owner("u2"), &sop.id, RubricModel::new()).await,
            Err(QaError::Storage(StorageError::NotFound { .. }))
        ));
        assert!(store.delete(&owner("u2"), &sop.id).await.is_err());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let store = InMemoryRubricStore::new();
        let first = store.create(&owner("u1"), "First", RubricModel::new()).await.unwrap();
        let second = store.create(&owner("u1"), "Second", RubricModel::new()).await.unwrap();
        store.create(&owner("u2"), "Other", RubricModel::new()).await.unwrap();

        let listed: Vec<SopId> = store
            .list(&owner("u1"))
            .await
            .unwrap()
            .into_iter()
            .map(|sop| sop.id)
            .collect();
        assert_eq!(listed, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_update_rules_and_policy_reference() {
        let store = InMemoryRubricStore::new();
        let sop = store
            .create(&owner("u1"), "Billing", RubricModel::new())
            .await
            .unwrap();

        let updated = store
            .update_rules(&owner("u1"), &sop.id, sample_rubric())
            .await
            .unwrap();
        assert_eq!(updated.rules, sample_rubric());
        assert!(updated.updated_at >= sop.updated_at);

        let with_policy = store
            .set_policy_reference(&owner("u1"), &sop.id, "refunds.pdf")
            .await
            .unwrap();
        assert_eq!(with_policy.policy_filename.as_deref(), Some("refunds.pdf"));
        assert_eq!(with_policy.rules, sample_rubric());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryRubricStore::new();
        let sop = store
            .create(&owner("u1"), "Billing", RubricModel::new())
            .await
            .unwrap();
        store.delete(&owner("u1"), &sop.id).await.unwrap();
        assert_eq!(store.get(&owner("u1"), &sop.id).await.unwrap(), None);
        assert!(matches!(
            store.delete(&owner("u1"), &sop.id).await,
            Err(QaError::Storage(StorageError::NotFound { .. }))
        ));
    }
}
