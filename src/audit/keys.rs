//! Entity key extraction
//!
//! Resolves the primary key of a tracked entity from the mapping metadata
//! and the entity's current property values. Keys are read fresh on every
//! call.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::models::{EntityKey, KeyBag};
use crate::tracking::{FieldDescriptor, MappingModel, TrackedEntity};

/// Extracts entity keys using a mapping model
#[derive(Clone, Copy)]
pub struct EntityKeyExtractor<'m> {
    model: &'m dyn MappingModel,
}

impl<'m> EntityKeyExtractor<'m> {
    /// Create an extractor over a mapping model
    pub fn new(model: &'m dyn MappingModel) -> Self {
        Self { model }
    }

    /// Primary-key fields of an entity type, in declaration order
    pub fn primary_key_fields(&self, entity_type: &str) -> AuditResult<&'m [FieldDescriptor]> {
        self.model.primary_key_fields(entity_type)
    }

    /// Extract the key in whichever shape the entity type declares
    pub fn extract_key(&self, entity: &dyn TrackedEntity) -> AuditResult<EntityKey> {
        let fields = self.primary_key_fields(entity.entity_type())?;
        if fields.len() == 1 {
            Ok(EntityKey::Scalar(current_value(entity, &fields[0])?))
        } else {
            Ok(EntityKey::Composite(key_bag(entity, fields)?))
        }
    }

    /// Extract a single-field key as `K`
    ///
    /// A composite key is still returned when `K` is a map-shaped type such
    /// as `KeyBag`, `serde_json::Value` or `EntityKey`.
    ///
    /// # Errors
    ///
    /// - Unsupported-operation if the entity type has a composite key and `K`
    ///   cannot hold a map
    /// - Cast error if the key value cannot be represented as `K`
    pub fn extract_scalar_key<K: DeserializeOwned>(&self, entity: &dyn TrackedEntity) -> AuditResult<K> {
        let fields = self.primary_key_fields(entity.entity_type())?;
        if fields.len() != 1 {
            if accepts_map::<K>() {
                return self.extract_composite_key(entity);
            }
            return Err(AuditError::Unsupported(format!(
                "{} has a composite key of {} fields; {} cannot hold it",
                entity.entity_type(),
                fields.len(),
                std::any::type_name::<K>()
            )));
        }

        let field = &fields[0];
        let value = current_value(entity, field)?;
        serde_json::from_value(value.clone()).map_err(|e| {
            AuditError::Cast(format!(
                "key field '{}' value {} cannot be read as {}: {}",
                field.name,
                value,
                std::any::type_name::<K>(),
                e
            ))
        })
    }

    /// Extract a composite key as `K`
    ///
    /// With `K = KeyBag` every key field is copied by name. Any other `K` is
    /// filled from the bag by case-sensitive field name; bag fields `K` does
    /// not declare are ignored. Fields of `K` the key does not carry must be
    /// `Option` or `#[serde(default)]`; see
    /// [`extract_composite_key_or_default`](Self::extract_composite_key_or_default)
    /// for types that only implement `Default`.
    ///
    /// # Errors
    ///
    /// - Unsupported-operation if the entity type has a single-field key, or
    ///   `K` cannot hold a map
    /// - Cast error if the bag cannot be represented as `K`
    pub fn extract_composite_key<K: DeserializeOwned>(&self, entity: &dyn TrackedEntity) -> AuditResult<K> {
        let bag = self.composite_bag::<K>(entity)?;
        read_bag(entity, Value::Object(bag))
    }

    /// Extract a composite key into a `K` starting from `K::default()`
    ///
    /// Key fields overwrite the matching fields of the default value; every
    /// other field keeps its default.
    pub fn extract_composite_key_or_default<K>(&self, entity: &dyn TrackedEntity) -> AuditResult<K>
    where
        K: DeserializeOwned + Serialize + Default,
    {
        let bag = self.composite_bag::<K>(entity)?;
        let mut merged = match serde_json::to_value(K::default())? {
            Value::Object(map) => map,
            _ => KeyBag::new(),
        };
        merged.extend(bag);
        read_bag(entity, Value::Object(merged))
    }

    fn composite_bag<K: DeserializeOwned>(&self, entity: &dyn TrackedEntity) -> AuditResult<KeyBag> {
        let fields = self.primary_key_fields(entity.entity_type())?;
        if fields.len() < 2 {
            return Err(AuditError::Unsupported(format!(
                "{} has a single-field key; extract it as a scalar key",
                entity.entity_type()
            )));
        }
        if !accepts_map::<K>() {
            return Err(AuditError::Unsupported(format!(
                "{} has a composite key of {} fields; {} cannot hold it",
                entity.entity_type(),
                fields.len(),
                std::any::type_name::<K>()
            )));
        }

        key_bag(entity, fields)
    }

    /// Extract the key as `K`, choosing the scalar or composite path from the
    /// number of declared key fields
    pub fn key_of<K: DeserializeOwned>(&self, entity: &dyn TrackedEntity) -> AuditResult<K> {
        let fields = self.primary_key_fields(entity.entity_type())?;
        if fields.len() == 1 {
            self.extract_scalar_key(entity)
        } else {
            self.extract_composite_key(entity)
        }
    }
}

/// Whether `K` deserializes from a JSON object at all
///
/// Structs that merely miss fields of an empty object still count.
fn accepts_map<K: DeserializeOwned>() -> bool {
    match serde_json::from_value::<K>(Value::Object(KeyBag::new())) {
        Ok(_) => true,
        Err(e) => !e.to_string().starts_with("invalid type: map"),
    }
}

fn read_bag<K: DeserializeOwned>(entity: &dyn TrackedEntity, bag: Value) -> AuditResult<K> {
    serde_json::from_value(bag).map_err(|e| {
        AuditError::Cast(format!(
            "{} key cannot be read as {}: {}",
            entity.entity_type(),
            std::any::type_name::<K>(),
            e
        ))
    })
}

fn current_value(entity: &dyn TrackedEntity, field: &FieldDescriptor) -> AuditResult<Value> {
    entity
        .property(&field.name)
        .map(|p| p.current_value)
        .ok_or_else(|| {
            AuditError::InvalidState(format!(
                "{} has no key property '{}'",
                entity.entity_type(),
                field.name
            ))
        })
}

fn key_bag(entity: &dyn TrackedEntity, fields: &[FieldDescriptor]) -> AuditResult<KeyBag> {
    let properties = entity.properties();
    let mut bag = KeyBag::new();

    for field in fields {
        let value = properties
            .iter()
            .find(|p| p.name == field.name)
            .map(|p| p.current_value.clone())
            .ok_or_else(|| {
                AuditError::InvalidState(format!(
                    "{} has no key property '{}'",
                    entity.entity_type(),
                    field.name
                ))
            })?;
        bag.insert(field.name.clone(), value);
    }

    Ok(bag)
}
