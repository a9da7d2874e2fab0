use crate::StorageResult;
use serde_json::Value;
use softrow_model::{ColumnType, Conditions, EntitySchema, ReadQuery, Record, RecordId};

/// Physical record access, keyed by entity-type name.
///
/// Nothing here knows about soft deletion: `delete` and `delete_where`
/// remove rows for good. Deletion semantics are layered on top by
/// `softrow-deletion`.
pub trait RecordStore: Send + Sync {
    /// Creates storage for an entity type, or updates the schema of an
    /// existing one. Existing rows are kept.
    fn create_entity(&self, schema: EntitySchema) -> StorageResult<()>;

    /// Returns the schema an entity type was created with.
    fn schema(&self, entity_type: &str) -> StorageResult<EntitySchema>;

    /// Declared type of a column, or `None` if the entity has no such column.
    fn column_type(&self, entity_type: &str, field: &str) -> StorageResult<Option<ColumnType>>;

    /// Inserts a record. Omitted columns take their default value.
    fn insert(&self, entity_type: &str, record: Record) -> StorageResult<RecordId>;

    /// Returns the records matching `query`, in order.
    fn read(&self, entity_type: &str, query: &ReadQuery) -> StorageResult<Vec<Record>>;

    /// Updates a single column of one record. Returns `false` if no record
    /// has that id.
    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> StorageResult<bool>;

    /// Physically removes one record. Returns `false` if no record has that id.
    fn delete(&self, entity_type: &str, id: &RecordId) -> StorageResult<bool>;

    /// Physically removes every record matching `conditions`.
    fn delete_where(&self, entity_type: &str, conditions: &Conditions) -> StorageResult<usize>;
}
