//! Record correction builder.
//!
//! Audit records are append-only in normal operation. `RecordUpdate` describes
//! the rare correction applied through [`crate::store::AuditStore::update`].
//! `Some(None)` clears a nullable field; `None` leaves it untouched. Version and
//! `created_at` are never part of an update.

use crate::changes::AuditedChanges;
use crate::entities::{Actor, AuditRecord, EntityRef};
use crate::enums::AuditAction;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub associated: Option<Option<EntityRef>>,
    pub actor: Option<Option<Actor>>,
    pub action: Option<AuditAction>,
    pub changes: Option<AuditedChanges>,
    pub comment: Option<Option<String>>,
    pub correlation_id: Option<Option<String>>,
    pub origin_address: Option<Option<String>>,
}

impl RecordUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.associated.is_none()
            && self.actor.is_none()
            && self.action.is_none()
            && self.changes.is_none()
            && self.comment.is_none()
            && self.correlation_id.is_none()
            && self.origin_address.is_none()
    }

    /// Whether applying this update changes where `record` is filed.
    #[must_use]
    pub fn moves_location(&self, record: &AuditRecord) -> bool {
        self.associated
            .as_ref()
            .is_some_and(|next| *next != record.associated())
    }

    pub fn apply_to(&self, record: &mut AuditRecord) {
        if let Some(associated) = &self.associated {
            record.set_associated(associated.as_ref());
        }
        if let Some(actor) = &self.actor {
            record.actor.clone_from(actor);
        }
        if let Some(action) = &self.action {
            record.action = action.clone();
        }
        if let Some(changes) = &self.changes {
            record.changes = changes.clone();
        }
        if let Some(comment) = &self.comment {
            record.comment.clone_from(comment);
        }
        if let Some(correlation_id) = &self.correlation_id {
            record.correlation_id.clone_from(correlation_id);
        }
        if let Some(origin_address) = &self.origin_address {
            record.origin_address.clone_from(origin_address);
        }
    }
}

pub struct RecordUpdateBuilder(RecordUpdate);

impl RecordUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RecordUpdate::default())
    }

    #[must_use]
    pub fn associated(mut self, val: Option<EntityRef>) -> Self {
        self.0.associated = Some(val);
        self
    }

    #[must_use]
    pub fn actor(mut self, val: Option<Actor>) -> Self {
        self.0.actor = Some(val);
        self
    }

    #[must_use]
    pub fn action(mut self, val: AuditAction) -> Self {
        self.0.action = Some(val);
        self
    }

    #[must_use]
    pub fn changes(mut self, val: impl Into<AuditedChanges>) -> Self {
        self.0.changes = Some(val.into());
        self
    }

    #[must_use]
    pub fn comment(mut self, val: Option<String>) -> Self {
        self.0.comment = Some(val);
        self
    }

    #[must_use]
    pub fn correlation_id(mut self, val: Option<String>) -> Self {
        self.0.correlation_id = Some(val);
        self
    }

    #[must_use]
    pub fn origin_address(mut self, val: Option<String>) -> Self {
        self.0.origin_address = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> RecordUpdate {
        self.0
    }
}

impl Default for RecordUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeSet;

    fn record() -> AuditRecord {
        AuditRecord::new(&EntityRef::new("Company", 1), AuditAction::Update, ChangeSet::new())
    }

    #[test]
    fn comment_only_update_does_not_move() {
        let update = RecordUpdateBuilder::new()
            .comment(Some("typo fix".into()))
            .build();
        assert!(!update.moves_location(&record()));

        let mut r = record();
        update.apply_to(&mut r);
        assert_eq!(r.comment.as_deref(), Some("typo fix"));
    }

    #[test]
    fn setting_associated_moves() {
        let update = RecordUpdateBuilder::new()
            .associated(Some(EntityRef::new("Owner", 2)))
            .build();
        assert!(update.moves_location(&record()));
    }

    #[test]
    fn same_associated_is_not_a_move() {
        let owner = EntityRef::new("Owner", 2);
        let r = record().with_associated(&owner);
        let update = RecordUpdateBuilder::new().associated(Some(owner)).build();
        assert!(!update.moves_location(&r));
    }

    #[test]
    fn empty_update_is_empty() {
        assert!(RecordUpdate::default().is_empty());
        assert!(!RecordUpdateBuilder::new().action(AuditAction::Destroy).build().is_empty());
    }
}
