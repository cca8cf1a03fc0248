//! Entity key values
//!
//! A key is either the value of the single primary-key field, or a bag of
//! `field name -> value` pairs when the entity has a composite key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered `field name -> value` map used for composite keys
pub type KeyBag = serde_json::Map<String, Value>;

/// A resolved entity key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    /// One key field per declared primary-key field, in declaration order
    Composite(KeyBag),
    /// The value of the only primary-key field
    Scalar(Value),
}

impl EntityKey {
    /// Get the scalar value, if this is a single-field key
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            EntityKey::Scalar(value) => Some(value),
            EntityKey::Composite(_) => None,
        }
    }

    /// Get the field bag, if this is a composite key
    pub fn as_composite(&self) -> Option<&KeyBag> {
        match self {
            EntityKey::Composite(bag) => Some(bag),
            EntityKey::Scalar(_) => None,
        }
    }

    /// Check if this is a composite key
    pub fn is_composite(&self) -> bool {
        matches!(self, EntityKey::Composite(_))
    }

    /// Convert into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            EntityKey::Scalar(value) => value,
            EntityKey::Composite(bag) => Value::Object(bag),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Scalar(Value::String(s)) => write!(f, "{}", s),
            EntityKey::Scalar(value) => write!(f, "{}", value),
            EntityKey::Composite(bag) => {
                let parts: Vec<String> = bag
                    .iter()
                    .map(|(name, value)| match value {
                        Value::String(s) => format!("{}={}", name, s),
                        other => format!("{}={}", name, other),
                    })
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}
