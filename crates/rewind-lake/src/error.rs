//! Lake error types.

use rewind_core::StoreError;

/// Errors from the object-storage audit store.
#[derive(Debug, thiserror::Error)]
pub enum LakeError {
    /// The object store rejected a call.
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// A resolved key is not a valid object path.
    #[error("Invalid object key: {0}")]
    Path(#[from] object_store::path::Error),

    /// Bucket or credentials are missing, or the client could not be built.
    #[error("Lake not configured: {0}")]
    NotConfigured(String),

    /// A blob did not parse as a sequence of audit records.
    #[error("Malformed blob at '{key}': {source}")]
    Blob {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record to modify or delete is not in its blob.
    #[error("Record not found in '{0}'")]
    RecordNotFound(String),
}

impl From<LakeError> for StoreError {
    fn from(err: LakeError) -> Self {
        match err {
            LakeError::NotConfigured(msg) => Self::Configuration(msg),
            LakeError::Blob { key, source } => Self::Parse { key, source },
            LakeError::RecordNotFound(key) => Self::RecordNotFound { key },
            other => Self::Backend(other.to_string()),
        }
    }
}
