//! Tracked entity state
//!
//! Describes what a unit of work knows about one entity: its lifecycle state
//! and, per property, the value it was loaded with and the value it has now.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::graph::GraphNode;

/// Lifecycle state of an entity within a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    /// New entity, inserted on the next save
    Added,
    /// Tracked entity with at least one property flagged as modified
    Modified,
    /// Tracked entity with no flagged modifications
    Unchanged,
    /// Tracked entity, removed on the next save
    Deleted,
    /// Not tracked by the unit of work
    Detached,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityState::Added => write!(f, "Added"),
            EntityState::Modified => write!(f, "Modified"),
            EntityState::Unchanged => write!(f, "Unchanged"),
            EntityState::Deleted => write!(f, "Deleted"),
            EntityState::Detached => write!(f, "Detached"),
        }
    }
}

/// One property of a tracked entity
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    /// Property name as declared by the entity
    pub name: String,
    /// Value when the entity was attached or last saved
    pub original_value: Value,
    /// Live value
    pub current_value: Value,
    /// Modified flag as reported by the tracker. Not always reliable.
    pub is_modified: bool,
}

impl PropertyEntry {
    /// Create a property entry
    pub fn new(
        name: impl Into<String>,
        original_value: Value,
        current_value: Value,
        is_modified: bool,
    ) -> Self {
        Self {
            name: name.into(),
            original_value,
            current_value,
            is_modified,
        }
    }
}

/// Handle over an entity under change tracking
pub trait TrackedEntity {
    /// Name of the entity's mapped type
    fn entity_type(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> EntityState;

    /// Properties in declaration order
    fn properties(&self) -> Vec<PropertyEntry>;

    /// The entity itself, as the root of its object graph
    fn graph(&self) -> &dyn GraphNode;

    /// Look up one property by name
    fn property(&self, name: &str) -> Option<PropertyEntry> {
        self.properties().into_iter().find(|p| p.name == name)
    }
}
