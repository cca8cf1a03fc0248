//! Configuration module for entity-audit
//!
//! This module provides:
//! - base directory resolution with an environment override
//! - user settings persistence

pub mod paths;
pub mod settings;

pub use paths::{AuditPaths, DATA_DIR_ENV};
pub use settings::Settings;
