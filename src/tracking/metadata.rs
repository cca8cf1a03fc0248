//! Mapping metadata
//!
//! Declares, per entity type, which properties form the primary key. Types
//! registered without an explicit key use the conventional `Id` property.

use std::collections::HashMap;

use crate::error::{AuditError, AuditResult};

/// Name of the key property assumed when none is declared
pub const CONVENTIONAL_KEY: &str = "Id";

/// Describes one primary-key field of an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Property name, matched case-sensitively
    pub name: String,
    /// Position within the key, starting at 0
    pub position: usize,
}

/// Metadata for one mapped entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypeMetadata {
    name: String,
    primary_key: Vec<FieldDescriptor>,
}

impl EntityTypeMetadata {
    fn new(name: &str, key_fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            primary_key: key_fields
                .iter()
                .enumerate()
                .map(|(position, field)| FieldDescriptor {
                    name: field.to_string(),
                    position,
                })
                .collect(),
        }
    }

    /// Mapped type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary-key fields in declaration order
    pub fn primary_key(&self) -> &[FieldDescriptor] {
        &self.primary_key
    }

    /// Whether the key spans more than one field
    pub fn has_composite_key(&self) -> bool {
        self.primary_key.len() > 1
    }
}

/// Source of primary-key metadata
pub trait MappingModel {
    /// Find the metadata for an entity type
    fn find_entity_type(&self, entity_type: &str) -> Option<&EntityTypeMetadata>;

    /// Primary-key fields of an entity type, in declaration order
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the type is not mapped.
    fn primary_key_fields(&self, entity_type: &str) -> AuditResult<&[FieldDescriptor]> {
        self.find_entity_type(entity_type)
            .map(EntityTypeMetadata::primary_key)
            .ok_or_else(|| {
                AuditError::InvalidState(format!("{} is not a mapped entity type", entity_type))
            })
    }
}

/// In-memory registry of entity type metadata
#[derive(Debug, Clone, Default)]
pub struct EntityModel {
    types: HashMap<String, EntityTypeMetadata>,
}

impl EntityModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type keyed by its conventional `Id` property
    pub fn entity(mut self, entity_type: &str) -> Self {
        self.types.insert(
            entity_type.to_string(),
            EntityTypeMetadata::new(entity_type, &[CONVENTIONAL_KEY]),
        );
        self
    }

    /// Register a type with an explicit (possibly composite) key
    ///
    /// # Errors
    ///
    /// Returns a validation error if no key fields are given or a field is
    /// listed twice.
    pub fn has_key(mut self, entity_type: &str, key_fields: &[&str]) -> AuditResult<Self> {
        if key_fields.is_empty() {
            return Err(AuditError::Validation(format!(
                "{} must declare at least one key field",
                entity_type
            )));
        }

        for (i, field) in key_fields.iter().enumerate() {
            if key_fields[..i].contains(field) {
                return Err(AuditError::Validation(format!(
                    "{} declares key field '{}' more than once",
                    entity_type, field
                )));
            }
        }

        self.types.insert(
            entity_type.to_string(),
            EntityTypeMetadata::new(entity_type, key_fields),
        );
        Ok(self)
    }

    /// Number of mapped types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are mapped
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl MappingModel for EntityModel {
    fn find_entity_type(&self, entity_type: &str) -> Option<&EntityTypeMetadata> {
        self.types.get(entity_type)
    }
}
