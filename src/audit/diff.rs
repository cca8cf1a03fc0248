//! Readable summaries of stored audit entries
//!
//! Compares the before/after JSON of an entry field by field. Nested objects
//! are walked with dotted paths; arrays are summarized by length unless
//! they have the same length, in which case changed elements are listed by
//! index.

use std::fmt;

use serde_json::Value;

use crate::error::AuditResult;
use crate::models::AuditEntry;

const MAX_STRING_CHARS: usize = 50;

/// One field that differs between the two snapshots of an entry
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Dotted path of the field, `items[2].name` style
    pub path: String,
    /// Value before the change (None if the field was added)
    pub before: Option<Value>,
    /// Value after the change (None if the field was removed)
    pub after: Option<Value>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before = self.before.as_ref().map_or("(added)".to_string(), format_value);
        let after = self.after.as_ref().map_or("(removed)".to_string(), format_value);
        write!(f, "{}: {} -> {}", self.path, before, after)
    }
}

/// List the field changes recorded on an entry
///
/// Inserts list every field as added and deletes every field as removed.
pub fn entry_changes<K>(entry: &AuditEntry<K>) -> AuditResult<Vec<FieldChange>> {
    let before = parse(entry.entity_before_json.as_deref())?;
    let after = parse(entry.entity_after_json.as_deref())?;

    let mut changes = Vec::new();
    compare(before.as_ref(), after.as_ref(), "", &mut changes);
    Ok(changes)
}

/// One-line summary of an entry's changes, or None if nothing changed
pub fn summarize<K>(entry: &AuditEntry<K>) -> AuditResult<Option<String>> {
    let changes = entry_changes(entry)?;
    if changes.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    ))
}

fn parse(text: Option<&str>) -> AuditResult<Option<Value>> {
    text.map(serde_json::from_str::<Value>).transpose().map_err(Into::into)
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn compare(before: Option<&Value>, after: Option<&Value>, path: &str, out: &mut Vec<FieldChange>) {
    match (before, after) {
        (Some(Value::Object(b)), Some(Value::Object(a))) => {
            for (key, before_val) in b {
                compare(Some(before_val), a.get(key), &join(path, key), out);
            }
            for (key, after_val) in a {
                if !b.contains_key(key) {
                    compare(None, Some(after_val), &join(path, key), out);
                }
            }
        }
        (Some(Value::Object(b)), None) if path.is_empty() => {
            for (key, value) in b {
                out.push(FieldChange {
                    path: key.clone(),
                    before: Some(value.clone()),
                    after: None,
                });
            }
        }
        (None, Some(Value::Object(a))) if path.is_empty() => {
            for (key, value) in a {
                out.push(FieldChange {
                    path: key.clone(),
                    before: None,
                    after: Some(value.clone()),
                });
            }
        }
        (Some(Value::Array(b)), Some(Value::Array(a))) if b.len() == a.len() => {
            for (i, (before_item, after_item)) in b.iter().zip(a).enumerate() {
                compare(Some(before_item), Some(after_item), &format!("{}[{}]", path, i), out);
            }
        }
        (before, after) => {
            if before != after {
                out.push(FieldChange {
                    path: path.to_string(),
                    before: before.cloned(),
                    after: after.cloned(),
                });
            }
        }
    }
}

/// Format a JSON value for display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > MAX_STRING_CHARS {
                let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeType;
    use chrono::Utc;
    use serde_json::json;

    fn entry(change_type: ChangeType, before: Option<Value>, after: Option<Value>) -> AuditEntry<i32> {
        AuditEntry::new(
            1,
            change_type,
            before.map(|v| v.to_string()),
            after.map(|v| v.to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn test_update_summary() {
        let entry = entry(
            ChangeType::Update,
            Some(json!({"Name": "Old", "Balance": 1000})),
            Some(json!({"Name": "New", "Balance": 1500})),
        );

        let summary = summarize(&entry).unwrap().unwrap();
        assert_eq!(summary, "Name: \"Old\" -> \"New\", Balance: 1000 -> 1500");
    }

    #[test]
    fn test_empty_update_has_no_summary() {
        let entry = entry(ChangeType::Update, Some(json!({})), Some(json!({})));
        assert!(summarize(&entry).unwrap().is_none());
    }

    #[test]
    fn test_insert_lists_added_fields() {
        let entry = entry(ChangeType::Insert, None, Some(json!({"Id": 1, "Active": true})));

        let changes = entry_changes(&entry).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].to_string(), "Id: (added) -> 1");
        assert_eq!(changes[1].to_string(), "Active: (added) -> true");
    }

    #[test]
    fn test_delete_lists_removed_fields() {
        let entry = entry(ChangeType::Delete, Some(json!({"Id": 1})), None);

        let changes = entry_changes(&entry).unwrap();
        assert_eq!(changes[0].to_string(), "Id: 1 -> (removed)");
    }

    #[test]
    fn test_nested_and_array_paths() {
        let entry = entry(
            ChangeType::Update,
            Some(json!({"Address": {"City": "Oslo"}, "Tags": ["a", "b"], "Lines": [1]})),
            Some(json!({"Address": {"City": "Bergen"}, "Tags": ["a", "c"], "Lines": [1, 2]})),
        );

        let paths: Vec<_> = entry_changes(&entry)
            .unwrap()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "Address.City: \"Oslo\" -> \"Bergen\"",
                "Tags[1]: \"b\" -> \"c\"",
                "Lines: [1 items] -> [2 items]",
            ]
        );
    }

    #[test]
    fn test_null_to_value() {
        let entry = entry(ChangeType::Update, Some(json!({"Email": null})), Some(json!({"Email": "x"})));
        assert_eq!(summarize(&entry).unwrap().unwrap(), "Email: null -> \"x\"");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut entry = entry(ChangeType::Update, Some(json!({})), Some(json!({})));
        entry.entity_after_json = Some("{not json".into());
        assert!(entry_changes(&entry).is_err());
    }

    #[test]
    fn test_long_string_truncation_is_char_safe() {
        let long = "å".repeat(80);
        let formatted = format_value(&json!(long));
        assert!(formatted.ends_with("...\""));
        assert_eq!(formatted.chars().count(), MAX_STRING_CHARS - 3 + 5);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");
    }
}
