//! In-memory audit table
//!
//! Entries added to the table are staged until `commit`, which assigns each
//! one the next identity value and moves it to the committed rows.

use std::sync::RwLock;

use tracing::debug;

use crate::audit::AuditSink;
use crate::error::{AuditError, AuditResult};
use crate::models::AuditEntry;

/// Table of audit entries keyed by `K`
#[derive(Debug)]
pub struct AuditTable<K> {
    staged: RwLock<Vec<AuditEntry<K>>>,
    rows: RwLock<Vec<AuditEntry<K>>>,
}

impl<K> Default for AuditTable<K> {
    fn default() -> Self {
        Self {
            staged: RwLock::new(Vec::new()),
            rows: RwLock::new(Vec::new()),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> AuditError {
    AuditError::Storage(format!("Failed to acquire audit table lock: {}", e))
}

impl<K: Clone> AuditTable<K> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries waiting for the next commit
    pub fn staged(&self) -> AuditResult<Vec<AuditEntry<K>>> {
        Ok(self.staged.read().map_err(lock_error)?.clone())
    }

    /// Committed entries in commit order
    pub fn rows(&self) -> AuditResult<Vec<AuditEntry<K>>> {
        Ok(self.rows.read().map_err(lock_error)?.clone())
    }

    /// Find a committed entry by id
    pub fn find(&self, id: i64) -> AuditResult<Option<AuditEntry<K>>> {
        let rows = self.rows.read().map_err(lock_error)?;
        Ok(rows.iter().find(|e| e.id == id).cloned())
    }

    /// Commit every staged entry, returning how many were committed
    pub fn commit(&self) -> AuditResult<usize> {
        let mut staged = self.staged.write().map_err(lock_error)?;
        let mut rows = self.rows.write().map_err(lock_error)?;

        let mut next_id = rows.last().map_or(0, |e| e.id) + 1;
        let count = staged.len();
        for mut entry in staged.drain(..) {
            entry.id = next_id;
            next_id += 1;
            rows.push(entry);
        }

        debug!(count, "committed audit entries");
        Ok(count)
    }

    /// Drop every staged entry
    pub fn discard(&self) -> AuditResult<usize> {
        let mut staged = self.staged.write().map_err(lock_error)?;
        let count = staged.len();
        staged.clear();
        Ok(count)
    }
}

impl<K> AuditSink<K> for AuditTable<K> {
    fn add(&self, entry: AuditEntry<K>) -> AuditResult<()> {
        self.staged.write().map_err(lock_error)?.push(entry);
        Ok(())
    }
}
