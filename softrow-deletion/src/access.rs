use crate::DeletionResult;
use serde_json::Value;
use softrow_model::{ColumnType, ReadQuery, Record, RecordId};

/// The record-access surface the interceptor calls back into.
///
/// `find` and `delete` are the routed operations: calling them re-enters
/// whatever deletion semantics the entity type has attached. `save_field`
/// and `column_type` go straight to storage.
pub trait AccessLayer {
    /// Primary key column of an entity type.
    fn primary_key(&self, entity_type: &str) -> DeletionResult<String>;

    /// Declared type of a column, `None` if the column does not exist.
    fn column_type(&self, entity_type: &str, field: &str) -> DeletionResult<Option<ColumnType>>;

    fn find(&self, entity_type: &str, query: ReadQuery) -> DeletionResult<Vec<Record>>;

    /// Partial update of a single column. `false` if no record has that id.
    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> DeletionResult<bool>;

    /// Deletes one record: the explicit id, or else the selected record.
    fn delete(&self, entity_type: &str, id: Option<&RecordId>, cascade: bool)
    -> DeletionResult<bool>;

    /// Deletes the dependents of a record, the way a cascading delete would.
    fn delete_dependent(&self, entity_type: &str, id: &RecordId, cascade: bool)
    -> DeletionResult<()>;
}
