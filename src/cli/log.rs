//! Audit log CLI commands

use clap::Subcommand;

use crate::config::{AuditPaths, Settings};
use crate::display::{format_entry_details, format_entry_list};
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditEntry, EntityKey};
use crate::storage::JsonlAuditSink;

/// Audit log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// List the most recent entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one entry with its field changes
    Show {
        /// Entry ID
        id: i64,
    },
}

/// Handle a log command
pub fn handle_log_command(paths: &AuditPaths, settings: &Settings, cmd: LogCommands) -> AuditResult<()> {
    let sink = JsonlAuditSink::new(settings.audit_log_path(paths));

    match cmd {
        LogCommands::List { limit } => {
            let entries: Vec<AuditEntry<EntityKey>> = sink.read_recent(limit)?;
            println!("{}", format_entry_list(&entries)?);
        }
        LogCommands::Show { id } => {
            let entry: AuditEntry<EntityKey> = sink
                .find(id)?
                .ok_or_else(|| AuditError::audit_entry_not_found(id))?;
            print!("{}", format_entry_details(&entry)?);
        }
    }

    Ok(())
}
