//! Change tracking collaborators
//!
//! The auditing core consumes tracked entities, mapping metadata and object
//! graphs through the traits defined here. An in-memory unit of work is
//! provided as the reference implementation.
//!
//! # Architecture
//!
//! - `TrackedEntity`: lifecycle state plus original/current value per property
//! - `GraphNode`: members of an object graph, used for whole-entity snapshots
//! - `MappingModel`: primary-key metadata per entity type
//! - `UnitOfWork`: tracks `Rc` entities and hands out `EntityEntry` handles
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::tracking::{EntityModel, UnitOfWork};
//!
//! let model = EntityModel::new().entity("Order");
//! let mut uow = UnitOfWork::new(model);
//! uow.attach(&order)?;
//! order.set_status("shipped");
//!
//! let entry = uow.entry(&order);
//! ```

mod dynamic;
mod graph;
mod metadata;
mod state;
mod unit_of_work;

pub use dynamic::DynamicEntity;
pub use graph::{node_id, GraphNode, Member, NodeRef};
pub use metadata::{EntityModel, EntityTypeMetadata, FieldDescriptor, MappingModel};
pub use state::{EntityState, PropertyEntry, TrackedEntity};
pub use unit_of_work::{Entity, EntityEntry, UnitOfWork};
