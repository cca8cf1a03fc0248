//! Core data models for entity-audit
//!
//! This module contains the records the auditing core produces: the change
//! type classification, entity keys and the audit entry itself.

pub mod change_type;
pub mod entry;
pub mod key;

pub use change_type::ChangeType;
pub use entry::AuditEntry;
pub use key::{EntityKey, KeyBag};
