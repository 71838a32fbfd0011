//! # rewind-lake
//!
//! Object-storage audit store. Each subject (or associated entity) owns one
//! blob of JSON records under a predictable key, see [`keys`]. Writes read the
//! whole blob, append, and overwrite it.
//!
//! Backed by any `object_store::ObjectStore`: Amazon S3 (or an S3-compatible
//! endpoint) in production, `InMemory` when `stub_responses` is set and in
//! tests.
//!
//! Concurrent writers to the same blob race; the last writer wins. There is
//! no locking and no conditional put.

pub mod blob;
pub mod error;
pub mod keys;
mod store;

use std::sync::Arc;

use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use rewind_config::StorageOptions;
use rewind_core::{AuditContext, AuditRecord, EntityRef, RecordUpdate};

pub use error::LakeError;
pub use keys::{KeyBase, KeyLayout};

/// Object-storage audit store handle.
pub struct RewindLake {
    store: Arc<dyn ObjectStore>,
    layout: KeyLayout,
    stubbed: bool,
}

impl RewindLake {
    /// Build the store from `[storage.options]`.
    ///
    /// Bucket and both credentials are required even when `stub_responses`
    /// is set, so a stubbed configuration is also a valid real one.
    ///
    /// # Errors
    ///
    /// Returns `LakeError::NotConfigured` when required options are missing
    /// or the S3 client cannot be built.
    pub fn from_options(options: &StorageOptions) -> Result<Self, LakeError> {
        options
            .require_configured()
            .map_err(|e| LakeError::NotConfigured(e.to_string()))?;

        let layout = KeyLayout::from_options(options);
        if options.stub_responses {
            tracing::debug!(bucket = %options.bucket, "object store stubbed in memory");
            return Ok(Self {
                store: Arc::new(InMemory::new()),
                layout,
                stubbed: true,
            });
        }

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&options.bucket)
            .with_region(&options.region)
            .with_access_key_id(&options.access_key)
            .with_secret_access_key(&options.secret_key);
        if !options.endpoint.is_empty() {
            builder = builder
                .with_endpoint(&options.endpoint)
                .with_allow_http(options.endpoint.starts_with("http://"));
        }
        let s3 = builder
            .build()
            .map_err(|e| LakeError::NotConfigured(format!("S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(s3),
            layout,
            stubbed: false,
        })
    }

    /// In-memory store with the given layout.
    #[must_use]
    pub fn in_memory(layout: KeyLayout) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            layout,
            stubbed: true,
        }
    }

    /// Wrap an existing object store.
    #[must_use]
    pub fn with_store(store: Arc<dyn ObjectStore>, layout: KeyLayout) -> Self {
        Self {
            store,
            layout,
            stubbed: false,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Whether calls are served from memory instead of the network.
    #[must_use]
    pub const fn is_stubbed(&self) -> bool {
        self.stubbed
    }

    /// Key of the blob `record` belongs in.
    #[must_use]
    pub fn resolve_key(&self, record: &AuditRecord) -> String {
        self.layout.resolve_key(record)
    }

    /// Records in the blob at `key`, optionally only those of `subject`.
    ///
    /// A missing blob reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` if the fetch fails or the blob is malformed.
    pub async fn read(
        &self,
        key: &str,
        subject: Option<&EntityRef>,
    ) -> Result<Vec<AuditRecord>, LakeError> {
        let path = Path::parse(key)?;
        let bytes = match self.store.get(&path).await {
            Ok(result) => result.bytes().await?,
            Err(object_store::Error::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = blob::decode(key, &bytes)?;
        if let Some(subject) = subject {
            records.retain(|r| r.is_for(subject));
        }
        Ok(records)
    }

    /// Whether a blob exists at `key`.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` for failures other than not-found.
    pub async fn exists(&self, key: &str) -> Result<bool, LakeError> {
        match self.store.head(&Path::parse(key)?).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Append `record` to its blob with the next version of its subject.
    ///
    /// The version is one past the highest version of the same subject in
    /// the target blob and, for an associated record, in the subject's own
    /// blob as well.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` if the blob cannot be read or written.
    pub async fn write(
        &self,
        mut record: AuditRecord,
        ctx: &AuditContext,
    ) -> Result<AuditRecord, LakeError> {
        record.stamp(ctx);
        record.id = None;

        let subject = record.subject();
        let key = self.resolve_key(&record);
        let mut records = self.read(&key, None).await?;
        let mut latest = records
            .iter()
            .filter(|r| r.is_for(&subject))
            .map(|r| r.version)
            .max()
            .unwrap_or(0);
        if record.associated().is_some() {
            let own_key = self.layout.key_for(KeyBase::Auditable, &subject);
            let own = self.read(&own_key, Some(&subject)).await?;
            latest = own.iter().map(|r| r.version).fold(latest, u32::max);
        }
        record.version = latest + 1;

        records.push(record.clone());
        self.put_blob(&key, &records).await?;
        Ok(record)
    }

    /// Apply `update` to `record`, relocating it when its associated entity
    /// changes. Version and `created_at` are kept.
    ///
    /// # Errors
    ///
    /// Returns `LakeError::RecordNotFound` when `record` is not in its blob.
    pub async fn modify(
        &self,
        record: &AuditRecord,
        update: &RecordUpdate,
    ) -> Result<AuditRecord, LakeError> {
        let mut updated = record.clone();
        update.apply_to(&mut updated);
        updated.id = None;

        if update.moves_location(record) {
            self.remove(record).await?;
            let key = self.resolve_key(&updated);
            let mut records = self.read(&key, None).await?;
            records.push(updated.clone());
            self.put_blob(&key, &records).await?;
            tracing::debug!(
                from = %self.resolve_key(record),
                to = %key,
                "audit record relocated"
            );
            return Ok(updated);
        }

        let key = self.resolve_key(record);
        let mut records = self.read(&key, None).await?;
        let slot = records
            .iter_mut()
            .find(|r| same_record(r, record))
            .ok_or_else(|| LakeError::RecordNotFound(key.clone()))?;
        *slot = updated.clone();
        self.put_blob(&key, &records).await?;
        Ok(updated)
    }

    /// Remove `record` from its blob, deleting the object once it is empty.
    ///
    /// # Errors
    ///
    /// Returns `LakeError::RecordNotFound` when `record` is not in its blob.
    pub async fn remove(&self, record: &AuditRecord) -> Result<(), LakeError> {
        let key = self.resolve_key(record);
        let mut records = self.read(&key, None).await?;
        let idx = records
            .iter()
            .position(|r| same_record(r, record))
            .ok_or_else(|| LakeError::RecordNotFound(key.clone()))?;
        records.remove(idx);

        if records.is_empty() {
            self.store.delete(&Path::parse(&key)?).await?;
            tracing::debug!(key = %key, "empty audit blob deleted");
            Ok(())
        } else {
            self.put_blob(&key, &records).await
        }
    }

    /// Every stored key under the layout prefix.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` if listing fails.
    pub async fn keys(&self) -> Result<Vec<String>, LakeError> {
        let prefix = self.prefix_path()?;
        let metas: Vec<_> = self.store.list(prefix.as_ref()).try_collect().await?;
        let mut keys: Vec<String> = metas.into_iter().map(|m| m.location.to_string()).collect();
        keys.sort();
        Ok(keys)
    }

    /// Delete every blob under the layout prefix.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` if listing or a delete fails.
    pub async fn clear(&self) -> Result<(), LakeError> {
        let keys = self.keys().await?;
        for key in &keys {
            self.store.delete(&Path::parse(key)?).await?;
        }
        tracing::debug!(count = keys.len(), "audit blobs cleared");
        Ok(())
    }

    /// Records of every blob under the prefix, blob by blob.
    ///
    /// # Errors
    ///
    /// Returns `LakeError` if listing, a fetch, or parsing fails.
    pub async fn scan(&self) -> Result<Vec<AuditRecord>, LakeError> {
        let mut all = Vec::new();
        for key in self.keys().await? {
            all.extend(self.read(&key, None).await?);
        }
        Ok(all)
    }

    fn prefix_path(&self) -> Result<Option<Path>, LakeError> {
        let root = self.layout.root();
        if root.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Path::parse(root)?))
        }
    }

    async fn put_blob(&self, key: &str, records: &[AuditRecord]) -> Result<(), LakeError> {
        let body = blob::encode(key, records)?;
        self.store
            .put(&Path::parse(key)?, PutPayload::from(body))
            .await?;
        tracing::debug!(key = %key, records = records.len(), "audit blob written");
        Ok(())
    }
}

/// Structural equality, ignoring the relational row id.
fn same_record(stored: &AuditRecord, wanted: &AuditRecord) -> bool {
    if wanted.id.is_none() {
        return stored == wanted;
    }
    let mut wanted = wanted.clone();
    wanted.id = None;
    *stored == wanted
}
