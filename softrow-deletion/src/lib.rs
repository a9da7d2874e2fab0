//! Soft deletion for softrow.
//!
//! Instead of removing rows, deletes of a soft-deletable entity type set a
//! flag or timestamp column, and reads hide those rows unless asked not to.
//!
//! # Architecture
//!
//! - [`DeletionPolicy`] decides which column means "deleted", whether it is a
//!   boolean flag or a nullable timestamp, and what predicate and mutation
//!   follow from that
//! - [`Interceptor`] hooks the read and delete paths of one entity type and
//!   holds its read mode ([`ReadMode`])
//! - [`Repository`] is the access layer: each registered entity type holds an
//!   optional interceptor, and everything else (cascades, hooks, physical
//!   deletes) stays with the repository
//! - [`AccessLayer`] is the surface the interceptor calls back into
//!
//! ```no_run
//! use softrow_deletion::{AccessLayer, DeletionConfig, Repository};
//! use softrow_model::{Column, EntitySchema, ReadQuery, Record};
//! use softrow_storage::MemoryStore;
//!
//! # fn main() -> softrow_deletion::DeletionResult<()> {
//! let mut repo = Repository::new(MemoryStore::new());
//! repo.register(EntitySchema::new("posts").column(Column::boolean("deleted")))?;
//! repo.attach_soft_delete("posts", DeletionConfig::default())?;
//!
//! let id = repo.insert("posts", Record::new(1))?;
//! repo.delete("posts", Some(&id), true)?;
//! assert!(repo.find("posts", ReadQuery::new())?.is_empty());
//! # Ok(())
//! # }
//! ```

mod access;
mod config;
mod error;
mod interceptor;
mod policy;
mod repository;

pub use access::AccessLayer;
pub use config::{DeletionConfig, SoftDeleteConfig};
pub use error::{DeletionError, DeletionResult};
pub use interceptor::{Interceptor, ReadMode};
pub use policy::{DeletionKind, DeletionPolicy, FieldMutation, TIMESTAMP_FORMAT};
pub use repository::Repository;
