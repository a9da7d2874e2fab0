//! Record storage layer for softrow.
//!
//! Provides the physical record-access API that deletion semantics are
//! layered on top of.
//!
//! # Architecture
//!
//! - [`RecordStore`] is the backend-neutral surface: schema metadata,
//!   reads with conditions, single-field updates and physical deletes
//! - [`MemoryStore`] evaluates conditions in process, rows in insertion order
//! - [`SqliteStore`] keeps one SQLite table per entity type and compiles
//!   conditions to parameterised SQL
//!
//! Both backends agree on condition semantics: `null` is IS NULL, arrays are
//! IN lists, and a null column never satisfies a scalar comparison.

mod compare;
mod error;
mod memory;
mod sql;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::RecordStore;
