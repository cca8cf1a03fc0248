//! Change auditing for tracked entities
//!
//! Turns the state of a tracked entity into an audit entry and hands it to a
//! persistence sink.
//!
//! # Architecture
//!
//! - `scanner`: classifies the change and lists the changed properties
//! - `serializer`: renders before/after snapshots, tolerating cyclic graphs
//! - `keys`: resolves the entity key from the mapping model
//! - `detection`: combines scanning and serialization
//! - `fluent`: the staged entry builder (`AuditDraft` → `FinalizedAudit`)
//! - `service`: `AuditService`, the entry point tying the above together
//! - `writer`: validates entries and stages them on an `AuditSink`
//! - `diff`: readable summaries of stored entries
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::audit::{AuditService, ChangeDetectionService};
//! use entity_audit::storage::AuditTable;
//!
//! let table = AuditTable::<String>::new();
//! let detector = ChangeDetectionService::default();
//! let service = AuditService::new(&table, &detector, &uow);
//!
//! service
//!     .generate_entry(&uow.entry(&order))?
//!     .with_description("Order shipped")
//!     .finalize()?
//!     .write()?;
//!
//! table.commit()?;
//! ```

pub mod detection;
pub mod diff;
pub mod fluent;
pub mod keys;
pub mod scanner;
pub mod serializer;
pub mod service;
pub mod writer;

pub use detection::{ChangeDetectionService, ChangeDetector, DetectedChange};
pub use diff::{entry_changes, summarize, FieldChange};
pub use fluent::{AuditDraft, AuditStage, ChangesComputed, Draft, FinalizedAudit, KeyAssigned};
pub use keys::EntityKeyExtractor;
pub use scanner::{classify, diff as changed_fields, ChangedField};
pub use serializer::{ChangeSerializer, SerializerSettings};
pub use service::{AuditFactory, AuditService, AuditServiceBuilder};
pub use writer::{AuditSink, AuditWriter};
