//! JSON file helpers
//!
//! Writes go to a sibling temp file that is synced and then renamed over
//! the target, so a reader sees either the old or the new content.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AuditError, AuditResult};

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> AuditError {
    AuditError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> AuditResult<T> {
    let file = File::open(path).map_err(|e| storage_error("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Read JSON from a file, or `T::default()` if it does not exist
pub fn read_json<T, P>(path: P) -> AuditResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        parse_file(path)
    } else {
        Ok(T::default())
    }
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> AuditResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(AuditError::Storage(format!("File not found: {}", path.display())));
    }
    parse_file(path)
}

/// Write pretty-printed JSON to a file atomically, creating parent
/// directories as needed
pub fn write_json_atomic<T, P>(path: P, data: &T) -> AuditResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| storage_error("create", &temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_error("serialize", path, e))?;
    writer
        .flush()
        .map_err(|e| storage_error("flush", &temp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_error("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("replace", path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Sample {
        name: String,
        depth: Option<usize>,
    }

    fn sample() -> Sample {
        Sample {
            name: "audit".into(),
            depth: Some(3),
        }
    }

    #[test]
    fn test_missing_file_reads_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Sample = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("sample.json");

        write_json_atomic(&path, &sample()).unwrap();

        assert!(!temp_dir.path().join("nested").join("sample.json.tmp").exists());
        let loaded: Sample = read_json_required(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_required_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_json_required::<Sample, _>(temp_dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, AuditError::Storage(_)));
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let err = read_json::<Sample, _>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
