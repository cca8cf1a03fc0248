//! Audit entry data structure
//!
//! Defines the record that is handed to a persistence sink once an audit
//! has been built and finalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::change_type::ChangeType;
use crate::error::{AuditError, AuditResult};

/// A single audit entry
///
/// Records one detected change on an entity, correlated to the entity by
/// `entity_id`. The snapshot columns hold JSON text: the whole entity for
/// inserts and deletes, the changed fields only for updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry<K> {
    /// Identity assigned by the store (0 until persisted)
    #[serde(default)]
    pub id: i64,

    /// Type of change recorded
    #[serde(rename = "type")]
    pub change_type: ChangeType,

    /// Free-text description of the operation
    pub description: String,

    /// When the audit was taken (UTC)
    pub audited_on: DateTime<Utc>,

    /// Actor responsible for the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Key of the audited entity
    pub entity_id: K,

    /// Entity (or changed fields) before the change, for updates/deletes
    #[serde(default)]
    pub entity_before_json: Option<String>,

    /// Entity (or changed fields) after the change, for inserts/updates
    #[serde(default)]
    pub entity_after_json: Option<String>,
}

impl<K> AuditEntry<K> {
    /// Create an entry with the given key and change data
    pub fn new(
        entity_id: K,
        change_type: ChangeType,
        entity_before_json: Option<String>,
        entity_after_json: Option<String>,
        audited_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            change_type,
            description: String::new(),
            audited_on,
            user_id: None,
            entity_id,
            entity_before_json,
            entity_after_json,
        }
    }

    /// Whether the store has assigned an identity yet
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// Check the snapshot columns match the change type and a description is set
    pub fn validate(&self) -> AuditResult<()> {
        if self.description.trim().is_empty() {
            return Err(AuditError::Validation(
                "Audit entry description cannot be empty".into(),
            ));
        }

        check_snapshots(
            self.change_type,
            self.entity_before_json.is_some(),
            self.entity_after_json.is_some(),
        )
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String
    where
        K: Serialize,
    {
        let key = serde_json::to_string(&self.entity_id).unwrap_or_default();
        let mut output = format!(
            "[{}] #{} {} {} {}",
            self.audited_on.format("%Y-%m-%d %H:%M:%S UTC"),
            self.id,
            self.change_type,
            key,
            self.description
        );

        if let Some(user) = &self.user_id {
            output.push_str(&format!(" (by {})", user));
        }

        output
    }
}

/// Check which snapshot sides are present for a change type
pub(crate) fn check_snapshots(
    change_type: ChangeType,
    has_before: bool,
    has_after: bool,
) -> AuditResult<()> {
    if has_before != change_type.has_before() || has_after != change_type.has_after() {
        return Err(AuditError::Validation(format!(
            "{} entry must have before={} and after={}",
            change_type,
            change_type.has_before(),
            change_type.has_after()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(change_type: ChangeType, before: Option<&str>, after: Option<&str>) -> AuditEntry<String> {
        let mut entry = AuditEntry::new(
            "abc".to_string(),
            change_type,
            before.map(String::from),
            after.map(String::from),
            Utc::now(),
        );
        entry.description = "Test".into();
        entry
    }

    #[test]
    fn test_valid_shapes() {
        assert!(entry(ChangeType::Insert, None, Some("{}")).validate().is_ok());
        assert!(entry(ChangeType::Delete, Some("{}"), None).validate().is_ok());
        assert!(entry(ChangeType::Update, Some("{}"), Some("{}")).validate().is_ok());
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(entry(ChangeType::Insert, Some("{}"), Some("{}")).validate().is_err());
        assert!(entry(ChangeType::Delete, None, None).validate().is_err());
        assert!(entry(ChangeType::Update, None, Some("{}")).validate().is_err());
    }

    #[test]
    fn test_description_required() {
        let mut e = entry(ChangeType::Insert, None, Some("{}"));
        e.description = "  ".into();
        assert!(matches!(e.validate(), Err(AuditError::Validation(_))));
    }

    #[test]
    fn test_serialization() {
        let e = entry(ChangeType::Update, Some(r#"{"Name":"a"}"#), Some(r#"{"Name":"b"}"#));
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"type\":\"update\""));

        let deserialized: AuditEntry<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, e);
        assert!(!deserialized.is_persisted());
    }

    #[test]
    fn test_human_readable_format() {
        let mut e = entry(ChangeType::Delete, Some("{}"), None);
        e.id = 3;
        e.user_id = Some("user-1".into());

        let formatted = e.format_human_readable();
        assert!(formatted.contains("#3"));
        assert!(formatted.contains("DELETE"));
        assert!(formatted.contains("\"abc\""));
        assert!(formatted.contains("by user-1"));
    }
}
