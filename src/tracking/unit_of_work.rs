//! In-memory unit of work
//!
//! Tracks shared (`Rc`) entities together with the property values they had
//! when they were attached, so that original and current values can be
//! compared until the changes are saved.
//!
//! Entities carry their own interior mutability; the unit of work only reads
//! them. It is not thread-safe and is meant to be owned by one caller.

use std::collections::HashSet;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use super::graph::{node_id, GraphNode, Member, NodeRef};
use super::metadata::{EntityModel, EntityTypeMetadata, MappingModel};
use super::state::{EntityState, PropertyEntry, TrackedEntity};
use crate::error::{AuditError, AuditResult};

/// A domain object that can be tracked by a `UnitOfWork`
pub trait Entity: GraphNode + 'static {
    /// Name of the mapped entity type
    fn entity_type(&self) -> &str;

    /// Scalar property values in declaration order
    ///
    /// Defaults to the value members of the entity's graph node.
    fn property_values(&self) -> Vec<(String, Value)> {
        self.members()
            .into_iter()
            .filter_map(|(name, member)| match member {
                Member::Value(value) => Some((name, value)),
                _ => None,
            })
            .collect()
    }
}

struct Tracked {
    id: usize,
    entity: Rc<dyn Entity>,
    node: NodeRef,
    state: EntityState,
    original: Vec<(String, Value)>,
    modified: HashSet<String>,
}

impl Tracked {
    fn new<T: Entity>(entity: &Rc<T>, state: EntityState) -> Self {
        Self {
            id: node_id(&**entity),
            original: entity.property_values(),
            entity: entity.clone(),
            node: entity.clone(),
            state,
            modified: HashSet::new(),
        }
    }

    fn original_value(&self, name: &str) -> Value {
        self.original
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null)
    }
}

/// Tracks entity changes pending the next save
pub struct UnitOfWork {
    model: EntityModel,
    tracked: Vec<Tracked>,
}

impl UnitOfWork {
    /// Create a unit of work over the given mapping model
    pub fn new(model: EntityModel) -> Self {
        Self {
            model,
            tracked: Vec::new(),
        }
    }

    /// Get the mapping model
    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    fn position<T: Entity>(&self, entity: &Rc<T>) -> Option<usize> {
        let id = node_id(&**entity);
        self.tracked.iter().position(|t| t.id == id)
    }

    fn tracked_mut<T: Entity>(&mut self, entity: &Rc<T>) -> AuditResult<&mut Tracked> {
        match self.position(entity) {
            Some(i) => Ok(&mut self.tracked[i]),
            None => Err(AuditError::not_tracked(entity.entity_type())),
        }
    }

    /// Start tracking a new entity, to be inserted on save
    pub fn add<T: Entity>(&mut self, entity: &Rc<T>) -> AuditResult<()> {
        self.track(entity, EntityState::Added)
    }

    /// Start tracking an existing entity as unchanged
    pub fn attach<T: Entity>(&mut self, entity: &Rc<T>) -> AuditResult<()> {
        self.track(entity, EntityState::Unchanged)
    }

    fn track<T: Entity>(&mut self, entity: &Rc<T>, state: EntityState) -> AuditResult<()> {
        if let Some(i) = self.position(entity) {
            return Err(AuditError::InvalidState(format!(
                "{} entity is already tracked as {}",
                entity.entity_type(),
                self.tracked[i].state
            )));
        }

        debug!(entity_type = entity.entity_type(), %state, "tracking entity");
        self.tracked.push(Tracked::new(entity, state));
        Ok(())
    }

    /// Mark an entity for deletion
    ///
    /// Untracked entities are attached as deleted; added entities are simply
    /// no longer tracked.
    pub fn remove<T: Entity>(&mut self, entity: &Rc<T>) -> AuditResult<()> {
        match self.position(entity) {
            None => self.track(entity, EntityState::Deleted),
            Some(i) if self.tracked[i].state == EntityState::Added => {
                self.tracked.remove(i);
                Ok(())
            }
            Some(i) => {
                self.tracked[i].state = EntityState::Deleted;
                Ok(())
            }
        }
    }

    /// Stop tracking an entity
    pub fn detach<T: Entity>(&mut self, entity: &Rc<T>) {
        if let Some(i) = self.position(entity) {
            self.tracked.remove(i);
        }
    }

    /// Flag a property as modified
    pub fn mark_modified<T: Entity>(&mut self, entity: &Rc<T>, property: &str) -> AuditResult<()> {
        let known = entity.property_values().iter().any(|(name, _)| name == property);
        if !known {
            return Err(AuditError::Validation(format!(
                "{} has no property '{}'",
                entity.entity_type(),
                property
            )));
        }

        let tracked = self.tracked_mut(entity)?;
        tracked.modified.insert(property.to_string());
        if tracked.state == EntityState::Unchanged {
            tracked.state = EntityState::Modified;
        }
        Ok(())
    }

    /// Compare every unchanged or modified entity against its original
    /// values and flag the properties that differ
    pub fn detect_changes(&mut self) {
        for tracked in &mut self.tracked {
            if !matches!(tracked.state, EntityState::Unchanged | EntityState::Modified) {
                continue;
            }

            for (name, current) in tracked.entity.property_values() {
                if tracked.original_value(&name) != current {
                    tracked.modified.insert(name);
                }
            }

            if !tracked.modified.is_empty() {
                tracked.state = EntityState::Modified;
            }
        }
    }

    /// Accept all pending changes
    ///
    /// Deleted entities stop being tracked; everything else becomes unchanged
    /// with its current values as the new originals. Returns the number of
    /// entities that were added, modified or deleted.
    pub fn save_changes(&mut self) -> usize {
        self.detect_changes();

        let affected = self
            .tracked
            .iter()
            .filter(|t| t.state != EntityState::Unchanged)
            .count();

        self.tracked.retain(|t| t.state != EntityState::Deleted);
        for tracked in &mut self.tracked {
            tracked.original = tracked.entity.property_values();
            tracked.modified.clear();
            tracked.state = EntityState::Unchanged;
        }

        debug!(affected, tracked = self.tracked.len(), "changes saved");
        affected
    }

    /// Get the tracking handle for an entity
    ///
    /// Entities unknown to this unit of work get a detached handle.
    pub fn entry<T: Entity>(&self, entity: &Rc<T>) -> EntityEntry<'_> {
        match self.position(entity) {
            Some(i) => EntityEntry::tracked(&self.tracked[i]),
            None => EntityEntry {
                entity: entity.clone(),
                node: entity.clone(),
                tracked: None,
            },
        }
    }

    /// Handles for every tracked entity, in tracking order
    pub fn entries(&self) -> Vec<EntityEntry<'_>> {
        self.tracked.iter().map(EntityEntry::tracked).collect()
    }
}

impl MappingModel for UnitOfWork {
    fn find_entity_type(&self, entity_type: &str) -> Option<&EntityTypeMetadata> {
        self.model.find_entity_type(entity_type)
    }
}

/// Tracking handle for one entity
///
/// Property values are read live from the entity on every call.
pub struct EntityEntry<'a> {
    entity: Rc<dyn Entity>,
    node: NodeRef,
    tracked: Option<&'a Tracked>,
}

impl<'a> EntityEntry<'a> {
    fn tracked(tracked: &'a Tracked) -> Self {
        Self {
            entity: tracked.entity.clone(),
            node: tracked.node.clone(),
            tracked: Some(tracked),
        }
    }
}

impl TrackedEntity for EntityEntry<'_> {
    fn entity_type(&self) -> &str {
        self.entity.entity_type()
    }

    fn state(&self) -> EntityState {
        self.tracked.map_or(EntityState::Detached, |t| t.state)
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        self.entity
            .property_values()
            .into_iter()
            .map(|(name, current)| match self.tracked {
                Some(tracked) => {
                    let original = tracked.original_value(&name);
                    let is_modified = tracked.modified.contains(&name);
                    PropertyEntry::new(name, original, current, is_modified)
                }
                None => PropertyEntry::new(name, current.clone(), current, false),
            })
            .collect()
    }

    fn graph(&self) -> &dyn GraphNode {
        &*self.node
    }
}
