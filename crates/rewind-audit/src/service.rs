//! Service layer orchestrating audit writes and reads.
//!
//! `AuditLog` wraps the selected store, the general settings and the live
//! subject repository. Every write follows this protocol:
//! 1. Strip ignored attributes from the change set
//! 2. Skip an update left with nothing to record
//! 3. Stamp provenance from the `AuditContext`
//! 4. Create the record in the store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rewind_config::{GeneralConfig, RewindConfig};
use rewind_core::{
    AuditAction, AuditContext, AuditRecord, AuditStore, AuditedChanges, ChangeSet, EntityRef,
    RecordUpdate,
};

use crate::error::AuditError;
use crate::query::AuditQuery;
use crate::revision::{Reconstructor, Revision};
use crate::selector::open_store;
use crate::subjects::{InMemorySubjects, SubjectRepository};

pub struct AuditLog {
    store: Arc<dyn AuditStore>,
    general: GeneralConfig,
    subjects: Arc<dyn SubjectRepository>,
}

impl AuditLog {
    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Store` if the store cannot be opened.
    pub async fn open(config: &RewindConfig) -> Result<Self, AuditError> {
        let store = open_store(&config.storage).await?;
        Ok(Self::new(store, config.general.clone()))
    }

    /// Wrap an existing store. Subjects are held in memory until
    /// [`Self::with_subjects`] supplies the application's repository.
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>, general: GeneralConfig) -> Self {
        Self {
            store,
            general,
            subjects: Arc::new(InMemorySubjects::new()),
        }
    }

    #[must_use]
    pub fn with_subjects(mut self, subjects: Arc<dyn SubjectRepository>) -> Self {
        self.subjects = subjects;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    #[must_use]
    pub const fn general(&self) -> &GeneralConfig {
        &self.general
    }

    #[must_use]
    pub fn subjects(&self) -> &Arc<dyn SubjectRepository> {
        &self.subjects
    }

    fn reconstructor(&self) -> Reconstructor {
        Reconstructor::new(Arc::clone(&self.store), Arc::clone(&self.subjects))
    }

    /// Record a mutation reported by the change-detection hook.
    ///
    /// Returns `None` when an update carried only ignored attributes.
    /// Encoded payloads are written verbatim.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Store` if the write fails.
    pub async fn record(
        &self,
        ctx: &AuditContext,
        mut record: AuditRecord,
    ) -> Result<Option<AuditRecord>, AuditError> {
        if let AuditedChanges::Set(changes) = &mut record.changes {
            changes.retain(|attr| !self.general.is_ignored(attr));
            if record.action == AuditAction::Update && changes.is_empty() {
                tracing::debug!(subject = %record.subject(), "update with no recordable changes skipped");
                return Ok(None);
            }
        }
        Ok(Some(self.store.create(record, ctx).await?))
    }

    /// Record a manual entry with no attribute changes.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Store` if the write fails.
    pub async fn record_manual(
        &self,
        ctx: &AuditContext,
        subject: &EntityRef,
        label: &str,
        comment: Option<String>,
    ) -> Result<AuditRecord, AuditError> {
        let mut record = AuditRecord::new(subject, AuditAction::parse(label), ChangeSet::new());
        record.comment = comment;
        Ok(self.store.create(record, ctx).await?)
    }

    /// Query over `subject`'s audits.
    #[must_use]
    pub fn audits(&self, subject: &EntityRef) -> AuditQuery {
        AuditQuery::new(Arc::clone(&self.store), subject.clone())
    }

    /// Correct a stored record in place.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Store` if the record cannot be found or written.
    pub async fn correct(
        &self,
        record: &AuditRecord,
        update: &RecordUpdate,
    ) -> Result<AuditRecord, AuditError> {
        tracing::warn!(
            subject = %record.subject(),
            version = record.version,
            moves = update.moves_location(record),
            "correcting stored audit record"
        );
        Ok(self.store.update(record, update).await?)
    }

    /// # Errors
    ///
    /// See [`Reconstructor::revision`].
    pub async fn revision(&self, record: &AuditRecord) -> Result<Revision, AuditError> {
        self.reconstructor().revision(record).await
    }

    /// # Errors
    ///
    /// See [`Reconstructor::revisions`].
    pub async fn revisions(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
        from_version: u32,
    ) -> Result<Vec<Revision>, AuditError> {
        self.reconstructor()
            .revisions(subject, filed_under, from_version)
            .await
    }

    /// # Errors
    ///
    /// See [`Reconstructor::revision_at`].
    pub async fn revision_at(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
        time: DateTime<Utc>,
    ) -> Result<Option<Revision>, AuditError> {
        self.reconstructor()
            .revision_at(subject, filed_under, time)
            .await
    }

    /// # Errors
    ///
    /// See [`Reconstructor::undo`].
    pub async fn undo(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.reconstructor().undo(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_log;
    use pretty_assertions::assert_eq;
    use rewind_core::Change;

    #[tokio::test]
    async fn ignored_attributes_are_stripped() {
        let log = memory_log().await;
        let company = EntityRef::new("Company", 1);
        let changes = ChangeSet::new()
            .with("name", Change::updated("W", "WW"))
            .with("updated_at", Change::updated("a", "b"));

        let stored = log
            .record(&AuditContext::new(), AuditRecord::new(&company, AuditAction::Update, changes))
            .await
            .unwrap()
            .unwrap();
        let set = stored.changes.decode().unwrap();
        assert_eq!(set.attributes().collect::<Vec<_>>(), vec!["name"]);
    }

    #[tokio::test]
    async fn update_of_only_ignored_attributes_is_skipped() {
        let log = memory_log().await;
        let company = EntityRef::new("Company", 1);
        let changes = ChangeSet::new().with("lock_version", Change::updated(1, 2));

        let stored = log
            .record(&AuditContext::new(), AuditRecord::new(&company, AuditAction::Update, changes))
            .await
            .unwrap();
        assert_eq!(stored, None);
        assert_eq!(log.audits(&company).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_create_is_still_recorded() {
        let log = memory_log().await;
        let company = EntityRef::new("Company", 1);
        let stored = log
            .record(
                &AuditContext::new(),
                AuditRecord::new(&company, AuditAction::Create, ChangeSet::new()),
            )
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn manual_entries_use_custom_action() {
        let log = memory_log().await;
        let company = EntityRef::new("Company", 1);
        let stored = log
            .record_manual(&AuditContext::new(), &company, "export", Some("csv".into()))
            .await
            .unwrap();
        assert_eq!(stored.action, AuditAction::Custom("export".into()));
        assert_eq!(stored.comment.as_deref(), Some("csv"));
        assert_eq!(stored.version, 1);
    }
}
