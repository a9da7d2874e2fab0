//! Core record model for softrow.
//!
//! Defines the plain data types every softrow crate depends on:
//! - [`EntitySchema`]: an entity type's primary key, typed columns and dependents
//! - [`Record`] / [`RecordId`]: a row and its key
//! - [`Conditions`]: the read-conditions tree (fields plus `AND`/`OR`/`NOT` groups)
//! - [`ReadQuery`] / [`DeleteRequest`]: read and delete specifications
//! - [`DeleteHooks`]: optional callbacks around single-record deletes
//!
//! Nothing here performs I/O. Stores live in `softrow-storage`, deletion
//! semantics in `softrow-deletion`.

mod conditions;
mod handler;
mod query;
mod record;
mod schema;

pub use conditions::{Conditions, FieldRef, Group, Operator};
pub use handler::DeleteHooks;
pub use query::{DeleteRequest, DeleteTarget, Order, ReadQuery};
pub use record::{Record, RecordId};
pub use schema::{Column, ColumnType, Dependent, EntitySchema};
