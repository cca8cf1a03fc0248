//! Change detection service
//!
//! Combines the scanner and the serializer into the single step the entry
//! builder needs: what kind of change happened, and how it is recorded.

use std::rc::Rc;

use super::scanner::{self, ChangedField};
use super::serializer::{ChangeSerializer, SerializerSettings};
use crate::error::AuditResult;
use crate::models::ChangeType;
use crate::tracking::{Entity, EntityEntry, TrackedEntity, UnitOfWork};

/// The change detected on one entity, ready to go on an audit entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedChange {
    pub change_type: ChangeType,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Something that can classify and snapshot a tracked entity
pub trait ChangeDetector {
    fn detect(&self, entity: &dyn TrackedEntity) -> AuditResult<DetectedChange>;
}

/// Service for detecting and serializing entity changes
#[derive(Debug, Clone, Default)]
pub struct ChangeDetectionService {
    serializer: ChangeSerializer,
}

impl ChangeDetectionService {
    /// Create a new change detection service
    pub fn new(settings: SerializerSettings) -> Self {
        Self {
            serializer: ChangeSerializer::new(settings),
        }
    }

    /// Get the underlying serializer
    pub fn serializer(&self) -> &ChangeSerializer {
        &self.serializer
    }

    /// Look up the tracking entry for an entity
    pub fn entry<'u, T: Entity>(&self, uow: &'u UnitOfWork, entity: &Rc<T>) -> EntityEntry<'u> {
        uow.entry(entity)
    }

    /// Classify the change applied to an entity
    pub fn change_type(&self, entity: &dyn TrackedEntity) -> AuditResult<ChangeType> {
        scanner::classify(entity)
    }

    /// List the changed properties of an entity
    pub fn changed_fields(&self, entity: &dyn TrackedEntity) -> AuditResult<Vec<ChangedField>> {
        scanner::diff(entity)
    }

    /// Serialize the before/after snapshots for a given change type
    pub fn serialize_entity_changes(
        &self,
        change_type: ChangeType,
        entity: &dyn TrackedEntity,
    ) -> AuditResult<(Option<String>, Option<String>)> {
        self.serializer.serialize_entity_changes(change_type, entity)
    }
}

impl ChangeDetector for ChangeDetectionService {
    fn detect(&self, entity: &dyn TrackedEntity) -> AuditResult<DetectedChange> {
        let change_type = self.change_type(entity)?;
        let (before, after) = self.serialize_entity_changes(change_type, entity)?;
        Ok(DetectedChange {
            change_type,
            before,
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{DynamicEntity, EntityModel};
    use serde_json::json;

    fn setup() -> (UnitOfWork, ChangeDetectionService) {
        (
            UnitOfWork::new(EntityModel::new().entity("Customer")),
            ChangeDetectionService::default(),
        )
    }

    #[test]
    fn test_detect_insert() {
        let (mut uow, service) = setup();
        let customer = DynamicEntity::from_value("Customer", json!({"Id": 1, "Name": "Ann"})).unwrap();
        uow.add(&customer).unwrap();

        let change = service.detect(&service.entry(&uow, &customer)).unwrap();
        assert_eq!(change.change_type, ChangeType::Insert);
        assert_eq!(change.before, None);
        assert_eq!(change.after.as_deref(), Some(r#"{"Id":1,"Name":"Ann"}"#));
    }

    #[test]
    fn test_detect_update_with_unflagged_change() {
        let (mut uow, service) = setup();
        let customer = DynamicEntity::from_value("Customer", json!({"Id": 1, "Name": "Ann", "Email": null})).unwrap();
        uow.attach(&customer).unwrap();
        customer.set("Name", json!("Anna"));

        let change = service.detect(&uow.entry(&customer)).unwrap();
        assert_eq!(change.change_type, ChangeType::Update);
        assert_eq!(change.before.as_deref(), Some(r#"{"Name":"Ann"}"#));
        assert_eq!(change.after.as_deref(), Some(r#"{"Name":"Anna"}"#));
    }

    #[test]
    fn test_detect_unchanged_gives_empty_delta() {
        let (mut uow, service) = setup();
        let customer = DynamicEntity::from_value("Customer", json!({"Id": 1})).unwrap();
        uow.attach(&customer).unwrap();

        let change = service.detect(&uow.entry(&customer)).unwrap();
        assert_eq!(change.change_type, ChangeType::Update);
        assert_eq!(change.before.as_deref(), Some("{}"));
        assert_eq!(change.after.as_deref(), Some("{}"));
    }

    #[test]
    fn test_detect_delete() {
        let (mut uow, service) = setup();
        let customer = DynamicEntity::from_value("Customer", json!({"Id": 1})).unwrap();
        uow.attach(&customer).unwrap();
        uow.remove(&customer).unwrap();

        let change = service.detect(&uow.entry(&customer)).unwrap();
        assert_eq!(change.change_type, ChangeType::Delete);
        assert_eq!(change.before.as_deref(), Some(r#"{"Id":1}"#));
        assert!(change.after.is_none());
    }

    #[test]
    fn test_detect_detached_fails() {
        let (uow, service) = setup();
        let customer = DynamicEntity::from_value("Customer", json!({"Id": 1})).unwrap();

        let err = service.detect(&uow.entry(&customer)).unwrap_err();
        assert!(err.is_invalid_state());
    }
}
