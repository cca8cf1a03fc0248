//! Audited operation types
//!
//! The numeric codes are the values stored for the change type column and
//! are part of the persisted format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// The kind of change an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Entity was inserted
    Insert = 0,
    /// Entity was updated (possibly with no changed fields)
    Update = 1,
    /// Entity was deleted
    Delete = 2,
}

impl ChangeType {
    /// All change types in code order
    pub const ALL: [ChangeType; 3] = [ChangeType::Insert, ChangeType::Update, ChangeType::Delete];

    /// Stored numeric code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether entries of this type carry a "before" snapshot
    pub fn has_before(self) -> bool {
        matches!(self, ChangeType::Update | ChangeType::Delete)
    }

    /// Whether entries of this type carry an "after" snapshot
    pub fn has_after(self) -> bool {
        matches!(self, ChangeType::Insert | ChangeType::Update)
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Insert => write!(f, "INSERT"),
            ChangeType::Update => write!(f, "UPDATE"),
            ChangeType::Delete => write!(f, "DELETE"),
        }
    }
}

impl TryFrom<i32> for ChangeType {
    type Error = AuditError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ChangeType::Insert),
            1 => Ok(ChangeType::Update),
            2 => Ok(ChangeType::Delete),
            other => Err(AuditError::change_type_out_of_range(other)),
        }
    }
}

impl FromStr for ChangeType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insert" | "create" => Ok(ChangeType::Insert),
            "update" => Ok(ChangeType::Update),
            "delete" => Ok(ChangeType::Delete),
            _ => Err(AuditError::change_type_out_of_range(s)),
        }
    }
}
