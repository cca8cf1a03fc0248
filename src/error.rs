//! Custom error types for entity-audit
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions. Every failure in the auditing core is a
//! precondition violation and is returned to the immediate caller.

use thiserror::Error;

/// The main error type for entity-audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Entity is not tracked, or tracked in a state that cannot be audited
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Key extraction requested in a shape the entity's key cannot take
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A key value cannot be represented as the requested type
    #[error("Invalid cast: {0}")]
    Cast(String),

    /// A value outside a known enumeration
    #[error("{name} is out of range: {value}")]
    OutOfRange { name: &'static str, value: String },

    /// A required collaborator or argument was not supplied
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A stored record was not found
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An audit entry failed its shape checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuditError {
    /// Create an out-of-range error for a change type value
    pub fn change_type_out_of_range(value: impl ToString) -> Self {
        Self::OutOfRange {
            name: "change_type",
            value: value.to_string(),
        }
    }

    /// Create an invalid-state error for an entity that is not tracked
    pub fn not_tracked(entity_type: &str) -> Self {
        Self::InvalidState(format!("{} entity is not tracked", entity_type))
    }

    /// Create a not-found error for a stored audit entry
    pub fn audit_entry_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "Audit entry",
            identifier: id.to_string(),
        }
    }

    /// Check if this is an invalid-state error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Check if this is a cast error
    pub fn is_cast(&self) -> bool {
        matches!(self, Self::Cast(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for entity-audit operations
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuditError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_out_of_range_names_value() {
        let err = AuditError::change_type_out_of_range(5);
        assert_eq!(err.to_string(), "change_type is out of range: 5");
    }

    #[test]
    fn test_not_tracked_error() {
        let err = AuditError::not_tracked("Order");
        assert_eq!(err.to_string(), "Invalid state: Order entity is not tracked");
        assert!(err.is_invalid_state());
        assert!(!err.is_cast());
    }

    #[test]
    fn test_not_found() {
        let err = AuditError::audit_entry_not_found(42);
        assert_eq!(err.to_string(), "Audit entry not found: 42");
    }

    #[test]
    fn test_missing_argument() {
        let err = AuditError::MissingArgument("writer");
        assert_eq!(err.to_string(), "Missing required argument: writer");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let audit_err: AuditError = io_err.into();
        assert!(matches!(audit_err, AuditError::Io(_)));
    }
}
