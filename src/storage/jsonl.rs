//! Append-only audit log
//!
//! Each entry is written as a single JSON line (JSONL) and flushed
//! immediately. Ids are assigned on append, one more than the number of
//! entries already in the file.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::audit::AuditSink;
use crate::error::{AuditError, AuditResult};
use crate::models::AuditEntry;

/// Audit sink backed by a JSON-lines file
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    log_path: PathBuf,
}

impl JsonlAuditSink {
    /// Create a sink that appends to the given file
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    fn open_append(&self) -> AuditResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))
    }

    fn lines(&self) -> AuditResult<Vec<(usize, String)>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut lines = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if !line.trim().is_empty() {
                lines.push((index + 1, line));
            }
        }
        Ok(lines)
    }

    /// Append entries, assigning each the next id
    ///
    /// Returns the entries as written.
    pub fn append<K: Serialize>(
        &self,
        entries: impl IntoIterator<Item = AuditEntry<K>>,
    ) -> AuditResult<Vec<AuditEntry<K>>> {
        let mut next_id = self.entry_count()? as i64 + 1;
        let mut file = self.open_append()?;
        let mut written = Vec::new();

        for mut entry in entries {
            entry.id = next_id;
            next_id += 1;

            let json = serde_json::to_string(&entry)
                .map_err(|e| AuditError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            writeln!(file, "{}", json)
                .map_err(|e| AuditError::Io(format!("Failed to write audit entry: {}", e)))?;
            written.push(entry);
        }

        file.flush()
            .map_err(|e| AuditError::Io(format!("Failed to flush audit log: {}", e)))?;

        debug!(count = written.len(), path = %self.log_path.display(), "appended audit entries");
        Ok(written)
    }

    /// Read every entry, oldest first
    pub fn read_all<K: DeserializeOwned>(&self) -> AuditResult<Vec<AuditEntry<K>>> {
        self.lines()?
            .into_iter()
            .map(|(line_num, line)| {
                serde_json::from_str::<AuditEntry<K>>(&line).map_err(|e| {
                    AuditError::Json(format!(
                        "Failed to parse audit entry at line {}: {}",
                        line_num, e
                    ))
                })
            })
            .collect()
    }

    /// Read the most recent `count` entries, oldest first
    pub fn read_recent<K: DeserializeOwned>(&self, count: usize) -> AuditResult<Vec<AuditEntry<K>>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Find an entry by id
    pub fn find<K: DeserializeOwned>(&self, id: i64) -> AuditResult<Option<AuditEntry<K>>> {
        Ok(self.read_all()?.into_iter().find(|e: &AuditEntry<K>| e.id == id))
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> AuditResult<usize> {
        Ok(self.lines()?.len())
    }

    /// Whether the log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Path to the log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl<K: Serialize> AuditSink<K> for JsonlAuditSink {
    fn add(&self, entry: AuditEntry<K>) -> AuditResult<()> {
        self.append(std::iter::once(entry)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeType, EntityKey};
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    fn entry(key: i64) -> AuditEntry<i64> {
        let mut entry = AuditEntry::new(key, ChangeType::Insert, None, Some(format!(r#"{{"Id":{}}}"#, key)), Utc::now());
        entry.description = format!("created {}", key);
        entry
    }

    fn sink() -> (TempDir, JsonlAuditSink) {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlAuditSink::new(temp_dir.path().join("audit.log"));
        (temp_dir, sink)
    }

    #[test]
    fn test_add_and_read_back() {
        let (_temp_dir, sink) = sink();
        assert!(!sink.exists());

        sink.add(entry(10)).unwrap();
        sink.add(entry(20)).unwrap();

        let entries: Vec<AuditEntry<i64>> = sink.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[1].id, 2);
        assert_eq!(entries[1].entity_id, 20);
        assert_eq!(sink.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_entries_are_json_lines() {
        let (_temp_dir, sink) = sink();
        sink.add(entry(1)).unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["type"], json!("insert"));
        assert_eq!(line["entity_id"], json!(1));
        assert_eq!(line["entity_before_json"], json!(null));
    }

    #[test]
    fn test_read_recent_and_find() {
        let (_temp_dir, sink) = sink();
        sink.append((1..=5).map(entry)).unwrap();

        let recent: Vec<AuditEntry<i64>> = sink.read_recent(2).unwrap();
        let keys: Vec<_> = recent.iter().map(|e| e.entity_id).collect();
        assert_eq!(keys, vec![4, 5]);

        let found: Option<AuditEntry<i64>> = sink.find(3).unwrap();
        assert_eq!(found.unwrap().entity_id, 3);
    }

    #[test]
    fn test_read_as_entity_key() {
        let (_temp_dir, sink) = sink();
        sink.add(entry(7)).unwrap();

        let entries: Vec<AuditEntry<EntityKey>> = sink.read_all().unwrap();
        assert_eq!(entries[0].entity_id, EntityKey::Scalar(json!(7)));
    }

    #[test]
    fn test_corrupt_line_reports_line_number() {
        let (_temp_dir, sink) = sink();
        sink.add(entry(1)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(sink.path())
            .unwrap()
            .write_all(b"{oops\n")
            .unwrap();

        let err = sink.read_all::<i64>().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
