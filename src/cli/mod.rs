//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the audit service and sinks.

pub mod log;
pub mod record;

pub use log::{handle_log_command, LogCommands};
pub use record::{handle_record_command, RecordArgs};
