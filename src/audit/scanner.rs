//! Property change scanning
//!
//! Classifies a tracked entity's change and lists the properties whose
//! values differ between the original and current snapshots.

use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::models::ChangeType;
use crate::tracking::{EntityState, PropertyEntry, TrackedEntity};

/// One property whose value changed
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedField {
    /// Property name
    pub name: String,
    /// Original value (may be null)
    pub before: Value,
    /// Current value (may be null)
    pub after: Value,
}

/// Map a lifecycle state to the change it represents
pub fn change_type_for(state: EntityState) -> Option<ChangeType> {
    match state {
        EntityState::Added => Some(ChangeType::Insert),
        EntityState::Deleted => Some(ChangeType::Delete),
        EntityState::Modified | EntityState::Unchanged => Some(ChangeType::Update),
        EntityState::Detached => None,
    }
}

/// Classify the change applied to an entity
///
/// # Errors
///
/// Returns an invalid-state error if the entity is not tracked.
pub fn classify(entity: &dyn TrackedEntity) -> AuditResult<ChangeType> {
    change_type_for(entity.state()).ok_or_else(|| AuditError::not_tracked(entity.entity_type()))
}

/// List the changed properties of a tracked entity, in declaration order
///
/// A property counts as changed when the tracker flags it as modified, or
/// when its original and current values differ. The tracker's flag can be
/// missing for changes it has not detected yet, hence the value comparison.
/// Properties that are null on both sides are never reported.
///
/// # Errors
///
/// Returns an invalid-state error if the entity is not tracked.
pub fn diff(entity: &dyn TrackedEntity) -> AuditResult<Vec<ChangedField>> {
    classify(entity)?;

    Ok(entity
        .properties()
        .into_iter()
        .filter(has_changed)
        .map(|property| ChangedField {
            name: property.name,
            before: property.original_value,
            after: property.current_value,
        })
        .collect())
}

fn has_changed(property: &PropertyEntry) -> bool {
    if property.original_value.is_null() && property.current_value.is_null() {
        return false;
    }

    property.is_modified || property.original_value != property.current_value
}
