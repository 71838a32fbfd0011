//! Audit service error types.

use rewind_config::ConfigError;
use rewind_core::{AuditAction, EntityRef, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Undo is only defined for create, update and destroy.
    #[error("Cannot undo a '{0}' audit")]
    InvalidAction(AuditAction),

    /// The live subject an operation needs does not exist.
    #[error("Subject not found: {0}")]
    SubjectNotFound(EntityRef),

    /// A record's change payload could not be decoded.
    #[error("Undecodable changes: {0}")]
    Changes(#[from] serde_json::Error),
}
