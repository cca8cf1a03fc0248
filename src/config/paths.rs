//! Path management for entity-audit
//!
//! ## Path Resolution Order
//!
//! 1. `ENTITY_AUDIT_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `entity-audit`, as reported by
//!    `directories` (`~/.config/entity-audit` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{AuditError, AuditResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ENTITY_AUDIT_DATA_DIR";

/// Manages the paths used by entity-audit
#[derive(Debug, Clone)]
pub struct AuditPaths {
    base_dir: PathBuf,
}

impl AuditPaths {
    /// Resolve the base directory
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no override is set and the platform
    /// has no home directory.
    pub fn new() -> AuditResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "entity-audit")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    AuditError::Config("Could not determine a configuration directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Resolve a file name relative to the base directory
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(file)
    }

    /// Create the base directory if it does not exist
    pub fn ensure_directories(&self) -> AuditResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AuditError::Io(format!("Failed to create base directory: {}", e)))
    }

    /// Whether a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
