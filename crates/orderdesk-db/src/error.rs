//! # Database Errors
//!
//! One error type for every repository call. Pricing and lifecycle
//! rejections raised inside a transaction travel as [`DbError::Domain`] so
//! the API can still answer 422 or 409 instead of 500.
//!
//! ```text
//!  sqlx::Error ──┐
//!                ├──► DbError ──► ApiError (status + code)
//!  CoreError ────┘
//! ```

use orderdesk_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A version-checked write matched no row: another request moved the
    /// order first.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// An order line or order points at a missing item, discount or tax.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored decimal or enum column did not parse.
    #[error("Corrupt value in {column}: '{value}'")]
    CorruptData { column: String, value: String },

    /// Rolled back by a pricing, lifecycle or validation rule.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Opening the file failed, or the pool is closed or saturated.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::ConnectionFailed("pool timed out".to_string()),
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: DbError = CoreError::unknown("Item", "abc").into();
        assert_eq!(err.to_string(), "Item not found: abc");
        assert!(matches!(
            err,
            DbError::Domain(CoreError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_validation_wraps_into_domain() {
        let err: DbError = ValidationError::Required {
            field: "items".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[test]
    fn test_pool_errors_map_to_connection_failed() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.to_string(), "Connection failed: pool is closed");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
