//! Database error types
//!
//! Errors raised by repositories, and their translation into the
//! `PortError` every domain port speaks.

use core_kernel::PortError;
use thiserror::Error;

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

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped to a domain value
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("RateEntry", "RATE-123");
    /// assert!(error.to_string().contains("RateEntry"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    pub fn duplicate(entity: &str, field: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!(
            "{} with {} '{}' already exists",
            entity, field, value
        ))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
            || matches!(self, DatabaseError::SqlError(sqlx::Error::RowNotFound))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            *self.classified(),
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            *self.classified(),
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Resolves a raw SQL error into its specific variant
    fn classified(&self) -> std::borrow::Cow<'_, DatabaseError> {
        match self {
            DatabaseError::SqlError(e) => std::borrow::Cow::Owned(DatabaseError::from(e)),
            other => std::borrow::Cow::Borrowed(other),
        }
    }
}

impl Clone for DatabaseError {
    fn clone(&self) -> Self {
        match self {
            DatabaseError::ConnectionFailed(m) => DatabaseError::ConnectionFailed(m.clone()),
            DatabaseError::QueryFailed(m) => DatabaseError::QueryFailed(m.clone()),
            DatabaseError::NotFound(m) => DatabaseError::NotFound(m.clone()),
            DatabaseError::DuplicateEntry(m) => DatabaseError::DuplicateEntry(m.clone()),
            DatabaseError::ForeignKeyViolation(m) => DatabaseError::ForeignKeyViolation(m.clone()),
            DatabaseError::ConstraintViolation(m) => DatabaseError::ConstraintViolation(m.clone()),
            DatabaseError::TransactionFailed(m) => DatabaseError::TransactionFailed(m.clone()),
            DatabaseError::MigrationFailed(m) => DatabaseError::MigrationFailed(m.clone()),
            DatabaseError::SerializationError(m) => DatabaseError::SerializationError(m.clone()),
            DatabaseError::PoolExhausted => DatabaseError::PoolExhausted,
            DatabaseError::SqlError(e) => DatabaseError::from(e),
        }
    }
}

/// Maps SQLx errors to specific variants by PostgreSQL error code
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                        "23503" => {
                            DatabaseError::ForeignKeyViolation(db_err.message().to_string())
                        }
                        "23514" => {
                            DatabaseError::ConstraintViolation(db_err.message().to_string())
                        }
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error.classified().into_owned() {
            DatabaseError::NotFound(msg) => PortError::NotFound {
                entity_type: "Record".to_string(),
                id: msg,
            },
            DatabaseError::DuplicateEntry(msg) => PortError::conflict(msg),
            DatabaseError::ForeignKeyViolation(msg) | DatabaseError::ConstraintViolation(msg) => {
                PortError::validation(msg)
            }
            DatabaseError::ConnectionFailed(msg) => PortError::connection(msg),
            DatabaseError::PoolExhausted => PortError::connection("Connection pool exhausted"),
            DatabaseError::SerializationError(msg) => PortError::transformation(msg),
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_port_not_found() {
        let port: PortError = DatabaseError::not_found("RateEntry", "RATE-1").into();
        assert!(port.is_not_found());

        let port: PortError = DatabaseError::SqlError(sqlx::Error::RowNotFound).into();
        assert!(port.is_not_found());
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let port: PortError = DatabaseError::duplicate("Admin", "username", "root").into();
        assert!(port.is_conflict());
    }

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let error = DatabaseError::SqlError(sqlx::Error::PoolTimedOut);
        assert!(error.is_connection_error());
        assert!(matches!(PortError::from(error), PortError::Connection { .. }));
    }

    #[test]
    fn test_serialization_maps_to_transformation() {
        let port: PortError = DatabaseError::SerializationError("bad month".into()).into();
        assert!(matches!(port, PortError::Transformation { .. }));
    }
}
