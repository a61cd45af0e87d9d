//! Custom error types for the common library
//!
//! This module defines the persistence error taxonomy shared by the API
//! service and the forecast worker.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error ({context}): {source}")]
    Query {
        context: String,
        #[source]
        source: SqlxError,
    },

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// The value handed to the adapter has nothing to persist
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No row matched the lookup
    #[error("No {table} row matched")]
    NotFound { table: &'static str },

    /// A unique index rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key rejected the write or delete
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
}

impl DatabaseError {
    /// Wrap a driver error with a short contextual prefix.
    ///
    /// Unique and foreign-key violations are lifted into their own variants
    /// so callers can react to them without string matching.
    pub fn query(context: impl Into<String>, source: SqlxError) -> Self {
        if let SqlxError::Database(db) = &source {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return DatabaseError::UniqueViolation { constraint };
            }
            if db.is_foreign_key_violation() {
                return DatabaseError::ForeignKeyViolation { constraint };
            }
        }

        DatabaseError::Query {
            context: context.into(),
            source,
        }
    }

    /// True when the error means the row already exists
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation { .. })
    }

    /// True when the lookup found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_keep_their_context() {
        let err = DatabaseError::query("insert into users", SqlxError::RowNotFound);
        assert!(!err.is_unique_violation());
        assert!(err.to_string().contains("insert into users"));
    }

    #[test]
    fn not_found_names_the_table() {
        let err = DatabaseError::NotFound { table: "symptoms" };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No symptoms row matched");
    }

    #[test]
    fn foreign_key_violation_is_not_a_duplicate() {
        let err = DatabaseError::ForeignKeyViolation {
            constraint: "monitorings_symptom_id_fkey".to_string(),
        };
        assert!(!err.is_unique_violation());
        assert!(err.to_string().contains("monitorings_symptom_id_fkey"));
    }
}
