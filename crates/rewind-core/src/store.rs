//! The storage seam.
//!
//! `AuditStore` is implemented by the relational store (`rewind-db`) and the
//! object-storage store (`rewind-lake`). A process selects one implementation
//! at startup and shares it as `Arc<dyn AuditStore>`; callers never branch on
//! the backend.

use async_trait::async_trait;

use crate::context::AuditContext;
use crate::criteria::Criteria;
use crate::entities::{AuditRecord, EntityRef};
use crate::enums::StorageMechanism;
use crate::errors::StoreError;
use crate::update::RecordUpdate;

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a new record.
    ///
    /// Stamps `created_at` and provenance from `ctx`, assigns
    /// `version = max(existing versions of the subject) + 1`, and returns the
    /// record as stored.
    async fn create(
        &self,
        record: AuditRecord,
        ctx: &AuditContext,
    ) -> Result<AuditRecord, StoreError>;

    /// Apply a correction to a stored record. Never renumbers versions.
    async fn update(
        &self,
        record: &AuditRecord,
        update: &RecordUpdate,
    ) -> Result<AuditRecord, StoreError>;

    /// Remove one stored record.
    async fn delete(&self, record: &AuditRecord) -> Result<(), StoreError>;

    /// Remove every record. Test reset and bulk clear only.
    async fn destroy_all(&self) -> Result<(), StoreError>;

    /// Count records matching `criteria` across the whole store.
    async fn count(&self, criteria: &Criteria) -> Result<usize, StoreError>;

    /// Every record whose subject is `subject`, ascending by version.
    ///
    /// `filed_under` names the entity the subject's type declares it is
    /// audited under; records filed there for this subject are included.
    async fn own_audits(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
    ) -> Result<Vec<AuditRecord>, StoreError>;

    /// Records of any subject filed under `entity` as their associated entity.
    async fn associated_audits(&self, entity: &EntityRef)
    -> Result<Vec<AuditRecord>, StoreError>;

    /// Which backend this is.
    fn mechanism(&self) -> StorageMechanism;
}
