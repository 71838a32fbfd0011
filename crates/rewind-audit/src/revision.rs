//! State reconstruction.
//!
//! A revision is built by folding a subject's audits, oldest first, into the
//! blank attribute map of its type. Each record contributes its effective
//! values: the new side of every change, or the old side for `destroy`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rewind_core::{AuditAction, AuditRecord, AuditStore, EntityRef};
use serde::Serialize;

use crate::error::AuditError;
use crate::subjects::{Attributes, SubjectRepository};

/// A subject's attributes as of one audit version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revision {
    pub subject: EntityRef,
    pub attributes: Attributes,
    /// Audit version the attributes correspond to. 0 for live state.
    pub version: u32,
    /// Whether the subject still exists.
    pub persisted: bool,
}

impl Revision {
    /// The subject's current state, not reconstructed from audits.
    #[must_use]
    pub const fn live(subject: EntityRef, attributes: Attributes) -> Self {
        Self {
            subject,
            attributes,
            version: 0,
            persisted: true,
        }
    }

    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&serde_json::Value> {
        self.attributes.get(attribute)
    }
}

/// Rebuilds and reverts subjects from their audit history.
#[derive(Clone)]
pub struct Reconstructor {
    store: Arc<dyn AuditStore>,
    subjects: Arc<dyn SubjectRepository>,
}

impl Reconstructor {
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { store, subjects }
    }

    /// Audits of `record`'s subject up to and including its version,
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Store` if the backend read fails.
    pub async fn ancestors(&self, record: &AuditRecord) -> Result<Vec<AuditRecord>, AuditError> {
        let mut records = self
            .store
            .own_audits(&record.subject(), record.associated().as_ref())
            .await?;
        records.retain(|r| r.version <= record.version);
        records.sort_by_key(|r| r.version);
        Ok(records)
    }

    /// The subject as it was right after `record` was written.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if reading audits or the live subject fails, or a
    /// change payload cannot be decoded.
    pub async fn revision(&self, record: &AuditRecord) -> Result<Revision, AuditError> {
        let ancestors = self.ancestors(record).await?;
        let subject = record.subject();
        let persisted = self.subjects.find(&subject).await?.is_some();

        let mut attributes = self.subjects.blank(&subject.entity_type);
        for ancestor in &ancestors {
            attributes.extend(ancestor.new_attributes()?);
        }
        Ok(Revision {
            subject,
            attributes,
            version: record.version,
            persisted,
        })
    }

    /// One revision per audit of `subject` from `from_version` on.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if reading fails or a change payload cannot be
    /// decoded.
    pub async fn revisions(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
        from_version: u32,
    ) -> Result<Vec<Revision>, AuditError> {
        let mut records = self.store.own_audits(subject, filed_under).await?;
        records.sort_by_key(|r| r.version);
        let persisted = self.subjects.find(subject).await?.is_some();

        let mut attributes = self.subjects.blank(&subject.entity_type);
        let mut revisions = Vec::new();
        for record in &records {
            attributes.extend(record.new_attributes()?);
            if record.version >= from_version {
                revisions.push(Revision {
                    subject: subject.clone(),
                    attributes: attributes.clone(),
                    version: record.version,
                    persisted,
                });
            }
        }
        Ok(revisions)
    }

    /// The subject as of `time`.
    ///
    /// Uses the latest audit created at or before `time`. Without one the
    /// live subject is returned unchanged, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if reading fails or a change payload cannot be
    /// decoded.
    pub async fn revision_at(
        &self,
        subject: &EntityRef,
        filed_under: Option<&EntityRef>,
        time: DateTime<Utc>,
    ) -> Result<Option<Revision>, AuditError> {
        let records = self.store.own_audits(subject, filed_under).await?;
        let latest = records
            .into_iter()
            .filter(|r| r.created_at_or_before(time))
            .max_by_key(|r| (r.created_at, r.version));

        if let Some(record) = latest {
            return self.revision(&record).await.map(Some);
        }

        tracing::debug!(subject = %subject, %time, "no audit before time, using live state");
        Ok(self
            .subjects
            .find(subject)
            .await?
            .map(|attributes| Revision::live(subject.clone(), attributes)))
    }

    /// Revert the mutation `record` describes on the live subject.
    ///
    /// - `create`: destroy the subject
    /// - `destroy`: re-create it from the values it held when destroyed
    /// - `update`: write the old values back
    ///
    /// # Errors
    ///
    /// Returns `AuditError::InvalidAction` for custom actions, and
    /// `AuditError::SubjectNotFound` when undoing an update of a subject that
    /// no longer exists.
    pub async fn undo(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let subject = record.subject();
        match &record.action {
            AuditAction::Create => {
                if !self.subjects.destroy(&subject).await? {
                    tracing::warn!(subject = %subject, "undo of create found no live subject");
                }
            }
            AuditAction::Destroy => {
                let mut attributes = self.subjects.blank(&subject.entity_type);
                attributes.extend(record.new_attributes()?);
                self.subjects.insert(&subject, attributes).await?;
            }
            AuditAction::Update => {
                self.subjects
                    .update(&subject, record.old_attributes()?)
                    .await?;
            }
            other @ AuditAction::Custom(_) => {
                return Err(AuditError::InvalidAction(other.clone()));
            }
        }
        tracing::debug!(subject = %subject, version = record.version, action = %record.action, "audit undone");
        Ok(())
    }
}
