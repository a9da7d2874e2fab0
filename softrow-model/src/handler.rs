use crate::RecordId;

/// Optional per-entity-type callbacks fired around every single-record
/// delete, soft or physical.
///
/// Most entity types do NOT need this. Deletes work without any hooks.
///
/// Implement it if you need:
/// - A veto (e.g. refuse to delete a record that is still referenced)
/// - Side effects after a delete (e.g. invalidating a cache entry)
pub trait DeleteHooks: Send + Sync {
    /// Called before a record is deleted.
    /// Return `false` to veto the delete; the delete then reports failure.
    fn before_delete(&self, entity_type: &str, id: &RecordId, cascade: bool) -> bool {
        let _ = (entity_type, id, cascade);
        true
    }

    /// Called after a record was deleted successfully.
    fn after_delete(&self, entity_type: &str, id: &RecordId) {
        let _ = (entity_type, id);
    }
}
