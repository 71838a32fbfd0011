//! Shared test utilities for rewind-audit unit tests.

use std::sync::Arc;

use rewind_config::GeneralConfig;
use rewind_db::RewindDb;

use crate::service::AuditLog;

/// Audit log over an in-memory relational store.
pub async fn memory_log() -> AuditLog {
    let db = RewindDb::open_local(":memory:").await.unwrap();
    AuditLog::new(Arc::new(db), GeneralConfig::default())
}
