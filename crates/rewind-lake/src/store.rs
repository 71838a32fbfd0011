use async_trait::async_trait;
use rewind_core::{
    AuditContext, AuditRecord, AuditStore, Criteria, EntityRef, RecordUpdate, StorageMechanism,
    StoreError,
};

use crate::RewindLake;
use crate::keys::KeyBase;

#[async_trait]
impl AuditStore for RewindLake {
    async fn create(
        &self,
        record: AuditRecord,
        ctx: &AuditContext,
    ) -> Result<AuditRecord, StoreError> {
        Ok(self.write(record, ctx).await?)
    }

    async fn update(
        &self,
        record: &AuditRecord,
        update: &RecordUpdate,
    ) -> Result<AuditRecord, StoreError> {
        Ok(self.modify(record, update).await?)
    }

    async fn delete(&self, record: &AuditRecord) -> Result<(), StoreError> {
        Ok(self.remove(record).await?)
    }

    async fn destroy_all(&self) -> Result<(), StoreError> {
        Ok(self.clear().await?)
    }

    async fn count(&self, criteria: &Criteria) -> Result<usize, StoreError> {
        let records = self.scan().await?;
        Ok(records.iter().filter(|r| criteria.matches(r)).count())
    }

    async fn own_audits(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        let own_key = self.layout().key_for(KeyBase::Auditable, subject);
        let mut records = self.read(&own_key, Some(subject)).await?;

        if let Some(parent) = filed_under {
            let parent_key = self.layout().key_for(KeyBase::Associated, parent);
            records.extend(self.read(&parent_key, Some(subject)).await?);
        }

        records.sort_by_key(|r| r.version);
        Ok(records)
    }

    async fn associated_audits(
        &self,
        entity: &EntityRef,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        let key = self.layout().key_for(KeyBase::Associated, entity);
        Ok(self.read(&key, None).await?)
    }

    fn mechanism(&self) -> StorageMechanism {
        StorageMechanism::ObjectStore
    }
}
