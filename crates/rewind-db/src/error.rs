//! Database error types for rewind-db.

use rewind_core::StoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Primary result code of every SQLite constraint failure.
const SQLITE_CONSTRAINT: std::ffi::c_int = 19;

impl DatabaseError {
    /// Whether this is a UNIQUE constraint violation.
    ///
    /// Local failures carry the SQLite result code. Remote ones only carry
    /// the message text.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::LibSql(libsql::Error::SqliteFailure(code, message)) => {
                code & 0xff == SQLITE_CONSTRAINT && message.contains("UNIQUE")
            }
            Self::LibSql(e) => e.to_string().contains("UNIQUE constraint failed"),
            _ => false,
        }
    }
}


impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Other(e) => Self::Other(e),
            other => Self::Backend(other.to_string()),
        }
    }
}
