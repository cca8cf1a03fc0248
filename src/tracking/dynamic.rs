//! JSON-backed entities
//!
//! `DynamicEntity` lets snapshots that only exist as JSON objects (files,
//! messages) go through the same tracking and auditing path as typed
//! entities.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::graph::{GraphNode, Member};
use super::unit_of_work::Entity;
use crate::error::{AuditError, AuditResult};

/// An entity whose properties are the fields of a JSON object
#[derive(Debug)]
pub struct DynamicEntity {
    entity_type: String,
    fields: RefCell<Map<String, Value>>,
}

impl DynamicEntity {
    /// Create an entity from an object map
    pub fn new(entity_type: impl Into<String>, fields: Map<String, Value>) -> Rc<Self> {
        Rc::new(Self {
            entity_type: entity_type.into(),
            fields: RefCell::new(fields),
        })
    }

    /// Create an entity from a JSON value, which must be an object
    pub fn from_value(entity_type: impl Into<String>, value: Value) -> AuditResult<Rc<Self>> {
        let entity_type = entity_type.into();
        match value {
            Value::Object(fields) => Ok(Self::new(entity_type, fields)),
            other => Err(AuditError::Validation(format!(
                "{} snapshot must be a JSON object, got {}",
                entity_type,
                json_kind(&other)
            ))),
        }
    }

    /// Current value of a field (null if absent)
    pub fn get(&self, name: &str) -> Value {
        self.fields.borrow().get(name).cloned().unwrap_or(Value::Null)
    }

    /// Set a field, appending it if it is new
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(name.into(), value);
    }

    /// Replace every field with the values of another snapshot
    ///
    /// Fields missing from `next` are kept and set to null so the property
    /// list stays stable.
    pub fn replace_with(&self, next: &Map<String, Value>) {
        let mut fields = self.fields.borrow_mut();
        for value in fields.values_mut() {
            *value = Value::Null;
        }
        for (name, value) in next {
            fields.insert(name.clone(), value.clone());
        }
    }

    /// Copy of the current fields
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields.borrow().clone()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl GraphNode for DynamicEntity {
    fn members(&self) -> Vec<(String, Member)> {
        self.fields
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), Member::Value(value.clone())))
            .collect()
    }
}

impl Entity for DynamicEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }
}
