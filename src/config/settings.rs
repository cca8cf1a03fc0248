//! User settings for entity-audit
//!
//! Stored as `config.json` in the base directory. Every field has a
//! default, so older or partial files still load.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::audit::SerializerSettings;
use crate::error::{AuditError, AuditResult};
use crate::storage::write_json_atomic;

/// Current settings schema version
pub const SCHEMA_VERSION: u32 = 1;

/// User settings for entity-audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Snapshot serialization options
    #[serde(default)]
    pub serializer: SerializerSettings,

    /// Audit log file, relative to the base directory unless absolute
    #[serde(default = "default_audit_log_file")]
    pub audit_log_file: String,

    /// Actor recorded on entries when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user_id: Option<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_audit_log_file() -> String {
    "audit.log".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            serializer: SerializerSettings::default(),
            audit_log_file: default_audit_log_file(),
            default_user_id: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if no file exists yet
    ///
    /// Defaults are not written; call `save` to persist them.
    pub fn load_or_create(paths: &AuditPaths) -> AuditResult<Self> {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| AuditError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| AuditError::Config(format!("Failed to parse settings file: {}", e)))?;

        if settings.schema_version > SCHEMA_VERSION {
            return Err(AuditError::Config(format!(
                "Settings schema version {} is newer than supported version {}",
                settings.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> AuditResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Full path of the audit log
    pub fn audit_log_path(&self, paths: &AuditPaths) -> PathBuf {
        paths.resolve(&self.audit_log_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, SCHEMA_VERSION);
        assert_eq!(settings.audit_log_file, "audit.log");
        assert_eq!(settings.serializer.max_depth, None);
        assert!(settings.default_user_id.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path());

        let mut settings = Settings::default();
        settings.serializer.max_depth = Some(2);
        settings.default_user_id = Some("ops".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path());
        std::fs::write(paths.settings_file(), r#"{"audit_log_file": "changes.jsonl"}"#).unwrap();

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings.audit_log_file, "changes.jsonl");
        assert_eq!(settings.audit_log_path(&paths), temp_dir.path().join("changes.jsonl"));
        assert!(!settings.serializer.pretty);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path());
        std::fs::write(paths.settings_file(), r#"{"schema_version": 99}"#).unwrap();

        assert!(matches!(Settings::load_or_create(&paths), Err(AuditError::Config(_))));
    }
}
