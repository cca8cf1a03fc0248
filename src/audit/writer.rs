//! Audit writer
//!
//! Hands finished entries to a persistence sink. The sink only stages the
//! row; committing it is up to the caller.

use serde::Serialize;
use tracing::debug;

use crate::error::AuditResult;
use crate::models::AuditEntry;

/// Destination for audit entries
pub trait AuditSink<K> {
    /// Stage a new entry
    fn add(&self, entry: AuditEntry<K>) -> AuditResult<()>;
}

/// Validates entries and passes them to a sink
pub struct AuditWriter<'s, K> {
    sink: &'s dyn AuditSink<K>,
}

impl<K> Clone for AuditWriter<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for AuditWriter<'_, K> {}

impl<'s, K: Serialize> AuditWriter<'s, K> {
    /// Create a writer over a sink
    pub fn new(sink: &'s dyn AuditSink<K>) -> Self {
        Self { sink }
    }

    /// Validate an entry and stage it on the sink
    pub fn write(&self, entry: AuditEntry<K>) -> AuditResult<()> {
        entry.validate()?;

        debug!(
            change_type = %entry.change_type,
            entity_id = %serde_json::to_string(&entry.entity_id)?,
            "staging audit entry"
        );
        self.sink.add(entry)
    }
}
