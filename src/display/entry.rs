//! Audit entry display formatting
//!
//! Formats audit entries for terminal output in table and detail views.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::diff::entry_changes;
use crate::error::AuditResult;
use crate::models::AuditEntry;

const MAX_DESCRIPTION_CHARS: usize = 40;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Audited On")]
    audited_on: String,
    #[tabled(rename = "Type")]
    change_type: String,
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn key_text<K: Serialize>(key: &K) -> AuditResult<String> {
    Ok(match serde_json::to_value(key)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Format a list of entries as a table
pub fn format_entry_list<K: Serialize>(entries: &[AuditEntry<K>]) -> AuditResult<String> {
    if entries.is_empty() {
        return Ok("No audit entries found.".to_string());
    }

    let rows = entries
        .iter()
        .map(|entry| -> AuditResult<EntryRow> {
            Ok(EntryRow {
                id: entry.id,
                audited_on: entry.audited_on.format("%Y-%m-%d %H:%M:%S").to_string(),
                change_type: entry.change_type.to_string(),
                entity_id: key_text(&entry.entity_id)?,
                user_id: entry.user_id.clone().unwrap_or_else(|| "-".to_string()),
                description: truncate(&entry.description, MAX_DESCRIPTION_CHARS),
            })
        })
        .collect::<AuditResult<Vec<_>>>()?;

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    Ok(format!("{}\n\nTotal: {} entries", table, entries.len()))
}

/// Format one entry with its field-level changes
pub fn format_entry_details<K: Serialize>(entry: &AuditEntry<K>) -> AuditResult<String> {
    let mut output = String::new();
    output.push_str(&format!("Audit entry #{}\n", entry.id));
    output.push_str(&format!("  Type:        {}\n", entry.change_type));
    output.push_str(&format!("  Entity:      {}\n", key_text(&entry.entity_id)?));
    output.push_str(&format!(
        "  Audited on:  {}\n",
        entry.audited_on.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(user) = &entry.user_id {
        output.push_str(&format!("  User:        {}\n", user));
    }
    output.push_str(&format!("  Description: {}\n", entry.description));

    let changes = entry_changes(entry)?;
    if changes.is_empty() {
        output.push_str("\nNo field changes recorded.\n");
    } else {
        output.push_str("\nChanges:\n");
        for change in changes {
            output.push_str(&format!("  {}\n", change));
        }
    }

    Ok(output)
}
