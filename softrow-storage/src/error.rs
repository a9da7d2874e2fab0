//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity type was never created in this store.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// Column does not exist on the entity type.
    #[error("unknown column {column} on {entity_type}")]
    UnknownColumn { entity_type: String, column: String },

    /// Condition key or value the store cannot evaluate.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// A record with this primary key already exists.
    #[error("duplicate id {id} for {entity_type}")]
    DuplicateId { entity_type: String, id: String },

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl StorageError {
    pub(crate) fn unknown_column(entity_type: &str, column: &str) -> Self {
        Self::UnknownColumn {
            entity_type: entity_type.into(),
            column: column.into(),
        }
    }
}
