//! entity-audit - change auditing on top of a unit of work
//!
//! Given an entity tracked by a unit of work, this library decides whether
//! it was inserted, updated or deleted, snapshots the relevant values as
//! JSON and records them as an audit entry keyed by the entity's primary
//! key.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `tracking`: unit of work, tracked-entity traits and mapping metadata
//! - `audit`: change detection, serialization, key extraction and the
//!   entry builder
//! - `models`: audit entries, change types and entity keys
//! - `storage`: audit sinks and JSON file helpers
//! - `config`: path resolution and user settings
//! - `error`: custom error types
//! - `logging`: subscriber setup for binaries
//! - `cli`, `display`: the `entity-audit` command line
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::audit::{AuditService, ChangeDetectionService};
//! use entity_audit::storage::AuditTable;
//! use entity_audit::tracking::{DynamicEntity, EntityModel, UnitOfWork};
//!
//! let mut uow = UnitOfWork::new(EntityModel::new().entity("Order"));
//! let order = DynamicEntity::from_value("Order", json!({"Id": 1, "Status": "open"}))?;
//! uow.attach(&order)?;
//! order.set("Status", json!("shipped"));
//!
//! let table = AuditTable::<i64>::new();
//! let detector = ChangeDetectionService::default();
//! AuditService::new(&table, &detector, &uow)
//!     .generate_entry(&uow.entry(&order))?
//!     .with_description("Order shipped")
//!     .finalize()?
//!     .write()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod tracking;

pub use error::{AuditError, AuditResult};
