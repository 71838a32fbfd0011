//! Deferred audit queries.
//!
//! An `AuditQuery` names a subject and which of its record sets to read. It
//! holds no records: every terminal operation reads the backend afresh, so two
//! calls on the same query can observe writes made in between.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rewind_core::{AuditRecord, AuditStore, Criteria, EntityRef, StoreError};

/// Which record set a query reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuerySource {
    /// Records whose subject is the query subject.
    #[default]
    OwnSubject,
    /// Records of any subject filed under the query subject.
    Associated,
}

#[derive(Clone)]
pub struct AuditQuery {
    store: Arc<dyn AuditStore>,
    subject: EntityRef,
    filed_under: Option<EntityRef>,
    source: QuerySource,
}

impl AuditQuery {
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>, subject: EntityRef) -> Self {
        Self {
            store,
            subject,
            filed_under: None,
            source: QuerySource::OwnSubject,
        }
    }

    /// Declare that the subject's type files its audits under `parent`.
    #[must_use]
    pub fn filed_under(mut self, parent: EntityRef) -> Self {
        self.filed_under = Some(parent);
        self
    }

    #[must_use]
    pub const fn source(mut self, source: QuerySource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub const fn subject(&self) -> &EntityRef {
        &self.subject
    }

    async fn fetch(&self) -> Result<Vec<AuditRecord>, StoreError> {
        match self.source {
            QuerySource::OwnSubject => {
                self.store
                    .own_audits(&self.subject, self.filed_under.as_ref())
                    .await
            }
            QuerySource::Associated => self.store.associated_audits(&self.subject).await,
        }
    }

    /// Records in backend order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn all(&self) -> Result<Vec<AuditRecord>, StoreError> {
        self.fetch().await
    }

    /// Records by ascending version.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn ascending(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.fetch().await?;
        records.sort_by_key(|r| r.version);
        Ok(records)
    }

    /// Records by descending version.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn descending(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.fetch().await?;
        records.sort_by_key(|r| Reverse(r.version));
        Ok(records)
    }

    /// Whether any record matches `criteria`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn exists(&self, criteria: &Criteria) -> Result<bool, StoreError> {
        Ok(self.fetch().await?.iter().any(|r| criteria.matches(r)))
    }

    /// Lowest-version record matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn find_by(&self, criteria: &Criteria) -> Result<Option<AuditRecord>, StoreError> {
        Ok(self
            .ascending()
            .await?
            .into_iter()
            .find(|r| criteria.matches(r)))
    }

    /// Records matching `criteria`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn filter(&self, criteria: &Criteria) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.ascending().await?;
        records.retain(|r| criteria.matches(r));
        Ok(records)
    }

    /// Records created at or before `time`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn up_until(&self, time: DateTime<Utc>) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.ascending().await?;
        records.retain(|r| r.created_at_or_before(time));
        Ok(records)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.fetch().await?.len())
    }

    /// Highest-version record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn last(&self) -> Result<Option<AuditRecord>, StoreError> {
        Ok(self.fetch().await?.into_iter().max_by_key(|r| r.version))
    }

    /// Records with `version >= version`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn from_version(&self, version: u32) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.ascending().await?;
        records.retain(|r| r.version >= version);
        Ok(records)
    }

    /// Records with `version <= version`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    pub async fn to_version(&self, version: u32) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self.ascending().await?;
        records.retain(|r| r.version <= version);
        Ok(records)
    }

    /// The subject's own records plus every record filed under it, newest
    /// first (ties broken by higher version).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either backend read fails.
    pub async fn own_and_associated(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let mut records = self
            .store
            .own_audits(&self.subject, self.filed_under.as_ref())
            .await?;
        let associated = self.store.associated_audits(&self.subject).await?;
        for record in associated {
            if !records.contains(&record) {
                records.push(record);
            }
        }
        records.sort_by_key(|r| Reverse((r.created_at, r.version)));
        Ok(records)
    }
}
