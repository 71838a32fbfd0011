//! Backend selection.
//!
//! The storage mechanism is read once from configuration and the matching
//! store is shared as `Arc<dyn AuditStore>`. Nothing downstream branches on
//! the backend.

use std::sync::Arc;

use rewind_config::StorageConfig;
use rewind_core::{AuditStore, StorageMechanism, StoreError};
use rewind_db::RewindDb;
use rewind_lake::RewindLake;

/// Open the store `config` selects.
///
/// # Errors
///
/// Returns `StoreError::Configuration` when the object store is selected
/// without bucket and credentials, and `StoreError::Backend` when the
/// relational database cannot be opened.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn AuditStore>, StoreError> {
    let store: Arc<dyn AuditStore> = match config.mechanism {
        StorageMechanism::Relational => Arc::new(RewindDb::open(&config.database).await?),
        StorageMechanism::ObjectStore => Arc::new(RewindLake::from_options(&config.options)?),
    };
    tracing::info!(mechanism = %config.mechanism, "audit store opened");
    Ok(store)
}
