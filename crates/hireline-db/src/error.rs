//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rejected by constraint: {0}")]
    Constraint(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Classify a failed INSERT/UPDATE, turning constraint violations into typed errors.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DbError::Duplicate(what.to_string());
            }
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return DbError::Constraint(format!("{} ({})", what, constraint));
            }
        }
        DbError::Database(err)
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
