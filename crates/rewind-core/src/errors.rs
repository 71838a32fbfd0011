//! Cross-backend error type.
//!
//! Both storage backends surface failures as `StoreError`. Backend-specific
//! errors (`DatabaseError`, `LakeError`) live in their crates and convert into
//! this type at the [`crate::store::AuditStore`] boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Required storage configuration is missing or invalid. Never retried.
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    /// A stored payload could not be parsed.
    #[error("Malformed audit payload at '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend rejected a read, write or delete.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A concurrent writer took the same version. Retry the whole write.
    #[error("Version {version} already taken for {subject_type}#{subject_id:?}")]
    VersionConflict {
        subject_type: String,
        subject_id: Option<i64>,
        version: u32,
    },

    /// Modify or delete could not locate the record at its storage location.
    #[error("Audit record not found at '{key}'")]
    RecordNotFound { key: String },

    /// The criteria cannot be evaluated by this backend.
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
