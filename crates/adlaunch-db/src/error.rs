//! # Store Errors
//!
//! ```text
//!  sqlx::Error ──► DbError ──► SyncError::Store        (engine callers)
//!                     │
//!                     └─ StateConflict ──► SyncError::SyncInProgress
//! ```
//!
//! Constraint failures are split out of the SQLite message so tests and
//! callers can tell a broken parent link from a broken creation invariant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Row id reused within a table.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Parent row missing, e.g. a keyword inserted under an unknown ad group.
    #[error("Parent link violated: {0}")]
    ForeignKeyViolation(String),

    /// `remote_id` and `creation_status` disagree, or an enum column holds
    /// text outside its set.
    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    /// A guarded creation-status write matched no row in the expected state.
    #[error("{entity} {id} is not {expected}")]
    StateConflict {
        entity: String,
        id: String,
        expected: String,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A JSON asset list could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Timed out waiting for a pooled connection")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn conflict(
        entity: impl Into<String>,
        id: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        DbError::StateConflict {
            entity: entity.into(),
            id: id.into(),
            expected: expected.into(),
        }
    }

    /// Whether the write broke a schema constraint rather than failing to run.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::Duplicate(_) | DbError::ForeignKeyViolation(_) | DbError::CheckViolation(_)
        )
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::Duplicate(columns.to_string())
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg)
                } else {
                    DbError::QueryFailed(msg)
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
