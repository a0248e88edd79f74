//! Database error types
//!
//! Errors that can occur during database operations, with PostgreSQL
//! error-code classification and a lossless mapping into the posting
//! engine's store error.

use thiserror::Error;

use domain_posting::StoreError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
            || matches!(self, DatabaseError::SqlError(sqlx::Error::RowNotFound))
    }

    /// Classifies a raw sqlx error by its PostgreSQL error code
    ///
    /// - 23505: unique violation
    /// - 23503: foreign key violation
    /// - 23514: check violation
    pub fn from_sqlx(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_error) = error {
            if let Some(code) = db_error.code() {
                return match code.as_ref() {
                    "23505" => DatabaseError::DuplicateEntry(db_error.message().to_string()),
                    "23503" => DatabaseError::ForeignKeyViolation(db_error.message().to_string()),
                    "23514" => DatabaseError::ConstraintViolation(db_error.message().to_string()),
                    _ => DatabaseError::SqlError(error),
                };
            }
        }
        DatabaseError::SqlError(error)
    }
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => StoreError::NotFound {
                entity: "record",
                id: message,
            },
            DatabaseError::DuplicateEntry(message)
            | DatabaseError::ForeignKeyViolation(message)
            | DatabaseError::ConstraintViolation(message) => StoreError::Conflict { message },
            DatabaseError::ConnectionFailed(message) => StoreError::Connection {
                message,
                source: None,
            },
            other => StoreError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
