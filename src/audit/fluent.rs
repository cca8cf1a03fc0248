//! Audit entry builder
//!
//! An audit is drafted in stages: the entity key is assigned first, then the
//! change is computed, and only then can the draft be finalized into an
//! entry. Each stage is a distinct type, so calling a step out of order does
//! not compile.
//!
//! # Example
//!
//! ```rust,ignore
//! let finalized = service
//!     .draft()
//!     .with_key(order_id)
//!     .with_changes_for(&uow.entry(&order))?
//!     .with_description("Order shipped")
//!     .with_user_id("alice")
//!     .finalize()?;
//!
//! finalized.write()?;
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::detection::{ChangeDetector, DetectedChange};
use super::writer::AuditWriter;
use crate::error::{AuditError, AuditResult};
use crate::models::entry::check_snapshots;
use crate::models::{AuditEntry, ChangeType};
use crate::tracking::TrackedEntity;

/// Progress of an audit through the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStage {
    Draft,
    KeyAssigned,
    ChangesComputed,
    Finalized,
}

impl fmt::Display for AuditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::KeyAssigned => write!(f, "key assigned"),
            Self::ChangesComputed => write!(f, "changes computed"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker for the states an `AuditDraft` can be in
pub trait DraftState: sealed::Sealed {
    const STAGE: AuditStage;
}

/// Nothing assigned yet
#[derive(Debug)]
pub struct Draft;

/// The entity key is known
#[derive(Debug)]
pub struct KeyAssigned<K> {
    entity_id: K,
}

/// The entity key and the change are known
#[derive(Debug)]
pub struct ChangesComputed<K> {
    entity_id: K,
    change: DetectedChange,
}

impl sealed::Sealed for Draft {}
impl<K> sealed::Sealed for KeyAssigned<K> {}
impl<K> sealed::Sealed for ChangesComputed<K> {}

impl DraftState for Draft {
    const STAGE: AuditStage = AuditStage::Draft;
}

impl<K> DraftState for KeyAssigned<K> {
    const STAGE: AuditStage = AuditStage::KeyAssigned;
}

impl<K> DraftState for ChangesComputed<K> {
    const STAGE: AuditStage = AuditStage::ChangesComputed;
}

/// An audit that has not been finalized yet
///
/// Every step consumes the draft and returns it in the next stage. An entry
/// can only be finalized once its key and changes are known:
///
/// ```
/// use entity_audit::audit::{AuditService, ChangeDetectionService};
/// use entity_audit::models::ChangeType;
/// use entity_audit::storage::AuditTable;
/// use entity_audit::tracking::{EntityModel, UnitOfWork};
///
/// let uow = UnitOfWork::new(EntityModel::new());
/// let table = AuditTable::<i64>::new();
/// let detector = ChangeDetectionService::default();
/// let service = AuditService::new(&table, &detector, &uow);
///
/// let audit = service
///     .draft()
///     .with_description("imported")
///     .with_key(7)
///     .with_known_change(ChangeType::Insert, None, Some("{}".into()))?
///     .finalize()?;
/// audit.write()?;
/// assert_eq!(table.staged()?.len(), 1);
/// # Ok::<(), entity_audit::AuditError>(())
/// ```
///
/// A draft without computed changes cannot be finalized:
///
/// ```compile_fail
/// use entity_audit::audit::{AuditService, ChangeDetectionService};
/// use entity_audit::models::ChangeType;
/// use entity_audit::storage::AuditTable;
/// use entity_audit::tracking::{EntityModel, UnitOfWork};
///
/// let uow = UnitOfWork::new(EntityModel::new());
/// let table = AuditTable::<i64>::new();
/// let detector = ChangeDetectionService::default();
/// let service = AuditService::new(&table, &detector, &uow);
///
/// let audit = service.draft().with_description("imported").with_key(7).finalize();
/// ```
///
/// Nor can it be written directly:
///
/// ```compile_fail
/// use entity_audit::audit::{AuditService, ChangeDetectionService};
/// use entity_audit::models::ChangeType;
/// use entity_audit::storage::AuditTable;
/// use entity_audit::tracking::{EntityModel, UnitOfWork};
///
/// let uow = UnitOfWork::new(EntityModel::new());
/// let table = AuditTable::<i64>::new();
/// let detector = ChangeDetectionService::default();
/// let service = AuditService::new(&table, &detector, &uow);
///
/// service.draft().with_description("imported").write();
/// ```
///
/// Once finalized, the description and actor are fixed:
///
/// ```compile_fail
/// use entity_audit::audit::{AuditService, ChangeDetectionService};
/// use entity_audit::models::ChangeType;
/// use entity_audit::storage::AuditTable;
/// use entity_audit::tracking::{EntityModel, UnitOfWork};
///
/// let uow = UnitOfWork::new(EntityModel::new());
/// let table = AuditTable::<i64>::new();
/// let detector = ChangeDetectionService::default();
/// let service = AuditService::new(&table, &detector, &uow);
///
/// let audit = service
///     .draft()
///     .with_description("imported")
///     .with_key(7)
///     .with_known_change(ChangeType::Insert, None, Some("{}".into()))
///     .unwrap()
///     .finalize()
///     .unwrap()
///     .with_description("changed later");
/// ```
pub struct AuditDraft<'a, K, S> {
    writer: AuditWriter<'a, K>,
    detector: &'a dyn ChangeDetector,
    description: Option<String>,
    user_id: Option<String>,
    audited_on: DateTime<Utc>,
    state: S,
}

impl<'a, K, S: DraftState> AuditDraft<'a, K, S> {
    /// Current stage
    pub fn stage(&self) -> AuditStage {
        S::STAGE
    }

    /// Set the actor responsible for the change
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the description of the operation
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn audited_on(&self) -> DateTime<Utc> {
        self.audited_on
    }

    fn advance<T>(self, next: impl FnOnce(S) -> T) -> AuditDraft<'a, K, T> {
        AuditDraft {
            writer: self.writer,
            detector: self.detector,
            description: self.description,
            user_id: self.user_id,
            audited_on: self.audited_on,
            state: next(self.state),
        }
    }
}

impl<'a, K> AuditDraft<'a, K, Draft> {
    pub(crate) fn new(
        writer: AuditWriter<'a, K>,
        detector: &'a dyn ChangeDetector,
        audited_on: DateTime<Utc>,
    ) -> Self {
        Self {
            writer,
            detector,
            description: None,
            user_id: None,
            audited_on,
            state: Draft,
        }
    }

    /// Assign the key of the audited entity
    pub fn with_key(self, entity_id: K) -> AuditDraft<'a, K, KeyAssigned<K>> {
        self.advance(|_| KeyAssigned { entity_id })
    }
}

impl<'a, K> AuditDraft<'a, K, KeyAssigned<K>> {
    pub fn entity_id(&self) -> &K {
        &self.state.entity_id
    }

    /// Detect the change on a tracked entity
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the entity is not tracked.
    pub fn with_changes_for(
        self,
        entity: &dyn TrackedEntity,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        let change = self.detector.detect(entity)?;
        Ok(self.advance(|key| ChangesComputed {
            entity_id: key.entity_id,
            change,
        }))
    }

    /// Record a change the caller already knows
    ///
    /// # Errors
    ///
    /// Returns a validation error if the snapshots do not match the change
    /// type.
    pub fn with_known_change(
        self,
        change_type: ChangeType,
        before: Option<String>,
        after: Option<String>,
    ) -> AuditResult<AuditDraft<'a, K, ChangesComputed<K>>> {
        check_snapshots(change_type, before.is_some(), after.is_some())?;

        Ok(self.advance(|key| ChangesComputed {
            entity_id: key.entity_id,
            change: DetectedChange {
                change_type,
                before,
                after,
            },
        }))
    }
}

impl<'a, K> AuditDraft<'a, K, ChangesComputed<K>> {
    pub fn entity_id(&self) -> &K {
        &self.state.entity_id
    }

    pub fn change_type(&self) -> ChangeType {
        self.state.change.change_type
    }

    pub fn before(&self) -> Option<&str> {
        self.state.change.before.as_deref()
    }

    pub fn after(&self) -> Option<&str> {
        self.state.change.after.as_deref()
    }

    /// Turn the draft into an entry
    ///
    /// # Errors
    ///
    /// Returns a missing-argument error if no description was set, or a
    /// validation error if it is blank.
    pub fn finalize(self) -> AuditResult<FinalizedAudit<'a, K>> {
        let description = self
            .description
            .ok_or(AuditError::MissingArgument("description"))?;

        let ChangesComputed { entity_id, change } = self.state;
        let mut entry = AuditEntry::new(
            entity_id,
            change.change_type,
            change.before,
            change.after,
            self.audited_on,
        );
        entry.description = description;
        entry.user_id = self.user_id;
        entry.validate()?;

        Ok(FinalizedAudit {
            writer: self.writer,
            entry,
        })
    }
}

impl<K: fmt::Debug, S: DraftState + fmt::Debug> fmt::Debug for AuditDraft<'_, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditDraft")
            .field("stage", &S::STAGE)
            .field("description", &self.description)
            .field("user_id", &self.user_id)
            .field("audited_on", &self.audited_on)
            .field("state", &self.state)
            .finish()
    }
}

/// A complete audit entry, ready to be written
pub struct FinalizedAudit<'a, K> {
    writer: AuditWriter<'a, K>,
    entry: AuditEntry<K>,
}

impl<'a, K> FinalizedAudit<'a, K> {
    pub fn stage(&self) -> AuditStage {
        AuditStage::Finalized
    }

    /// Read-only view of the entry
    pub fn entry(&self) -> &AuditEntry<K> {
        &self.entry
    }

    /// Take the entry without writing it
    pub fn into_entry(self) -> AuditEntry<K> {
        self.entry
    }
}

impl<K: fmt::Debug> fmt::Debug for FinalizedAudit<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizedAudit").field("entry", &self.entry).finish()
    }
}

impl<K: Serialize> FinalizedAudit<'_, K> {
    /// Stage the entry on the writer's sink
    pub fn write(self) -> AuditResult<()> {
        self.writer.write(self.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ChangeDetectionService;
    use crate::storage::AuditTable;
    use crate::tracking::{DynamicEntity, EntityModel, UnitOfWork};
    use chrono::TimeZone;
    use serde_json::json;

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_chain() {
        let table = AuditTable::<String>::new();
        let detector = ChangeDetectionService::default();
        let mut uow = UnitOfWork::new(EntityModel::new().entity("Order"));
        let order = DynamicEntity::from_value("Order", json!({"Id": "o-1", "Total": 5})).unwrap();
        uow.add(&order).unwrap();

        let draft = AuditDraft::new(AuditWriter::new(&table), &detector, when());
        assert_eq!(draft.stage(), AuditStage::Draft);

        let draft = draft.with_user_id("alice").with_key("o-1".to_string());
        assert_eq!(draft.stage(), AuditStage::KeyAssigned);

        let draft = draft.with_changes_for(&uow.entry(&order)).unwrap();
        assert_eq!(draft.stage(), AuditStage::ChangesComputed);
        assert_eq!(draft.change_type(), ChangeType::Insert);

        let finalized = draft.with_description("Order placed").finalize().unwrap();
        let entry = finalized.entry();
        assert_eq!(entry.entity_id, "o-1");
        assert_eq!(entry.user_id.as_deref(), Some("alice"));
        assert_eq!(entry.audited_on, when());
        assert_eq!(entry.entity_before_json, None);
        assert_eq!(entry.entity_after_json.as_deref(), Some(r#"{"Id":"o-1","Total":5}"#));

        finalized.write().unwrap();
        assert_eq!(table.staged().unwrap().len(), 1);
    }

    #[test]
    fn test_finalize_requires_description() {
        let table = AuditTable::<i64>::new();
        let detector = ChangeDetectionService::default();

        let err = AuditDraft::new(AuditWriter::new(&table), &detector, when())
            .with_key(1)
            .with_known_change(ChangeType::Delete, Some("{}".into()), None)
            .unwrap()
            .finalize()
            .unwrap_err();

        assert!(matches!(err, AuditError::MissingArgument("description")));
    }

    #[test]
    fn test_known_change_checks_snapshots() {
        let table = AuditTable::<i64>::new();
        let detector = ChangeDetectionService::default();

        let result = AuditDraft::new(AuditWriter::new(&table), &detector, when())
            .with_key(1)
            .with_known_change(ChangeType::Insert, Some("{}".into()), None);

        assert!(result.is_err());
    }

    #[test]
    fn test_untracked_entity_fails_changes() {
        let table = AuditTable::<i64>::new();
        let detector = ChangeDetectionService::default();
        let uow = UnitOfWork::new(EntityModel::new().entity("Order"));
        let order = DynamicEntity::from_value("Order", json!({"Id": 1})).unwrap();

        let err = AuditDraft::new(AuditWriter::new(&table), &detector, when())
            .with_key(1)
            .with_changes_for(&uow.entry(&order))
            .unwrap_err();

        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_into_entry_does_not_write() {
        let table = AuditTable::<i64>::new();
        let detector = ChangeDetectionService::default();

        let entry = AuditDraft::new(AuditWriter::new(&table), &detector, when())
            .with_description("imported")
            .with_key(9)
            .with_known_change(ChangeType::Update, Some("{}".into()), Some("{}".into()))
            .unwrap()
            .finalize()
            .unwrap()
            .into_entry();

        assert_eq!(entry.entity_id, 9);
        assert_eq!(entry.description, "imported");
        assert!(table.staged().unwrap().is_empty());
    }
}
