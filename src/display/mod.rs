//! Terminal output formatting
//!
//! Formats stored audit entries for the CLI.

pub mod entry;

pub use entry::{format_entry_details, format_entry_list};
