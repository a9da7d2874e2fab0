//! Error types for the deletion layer.

use softrow_model::ColumnType;
use softrow_storage::StorageError;
use thiserror::Error;

/// Result type for deletion operations.
pub type DeletionResult<T> = Result<T, DeletionError>;

/// Errors that can occur while reading or deleting through the deletion layer.
#[derive(Debug, Error)]
pub enum DeletionError {
    /// The configured deletion field does not exist on the entity type.
    #[error("deletion field {field} does not exist on {entity_type}")]
    UnknownField { entity_type: String, field: String },

    /// The configured deletion field is neither a boolean nor a datetime column.
    #[error("deletion field {field} on {entity_type} has unsupported type {column_type:?}")]
    UnsupportedColumnType {
        entity_type: String,
        field: String,
        column_type: ColumnType,
    },

    /// The caller asked for something that is never done implicitly.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity type was never registered with the repository.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure from the underlying store, passed through unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
