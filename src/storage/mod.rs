//! Persistence sinks and file helpers
//!
//! Provides the two audit sinks shipped with the crate, an in-memory table
//! with staged commits and an append-only JSON-lines log, plus the atomic
//! JSON file helpers used by configuration.

pub mod file_io;
pub mod jsonl;
pub mod table;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use jsonl::JsonlAuditSink;
pub use table::AuditTable;
