use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::changes::{AuditedChanges, ChangeSet};
use crate::context::AuditContext;
use crate::entities::{Actor, EntityRef};
use crate::enums::AuditAction;

/// One audit entry.
///
/// Immutable once written except through the explicit correction path
/// ([`crate::store::AuditStore::update`]). Equality is structural over every
/// field; the object store relies on it to find a record inside a blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditRecord {
    /// Relational row id. Never set by the object store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub subject_type: String,
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub associated_type: Option<String>,
    #[serde(default)]
    pub associated_id: Option<i64>,
    #[serde(default)]
    pub actor: Option<Actor>,
    pub action: AuditAction,
    #[serde(default)]
    pub changes: AuditedChanges,
    #[serde(default)]
    pub comment: Option<String>,
    /// Per-subject sequence number, 0 until written.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub origin_address: Option<String>,
    #[serde(default, with = "crate::timestamp::option")]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuditRecord {
    /// Unwritten record for `subject`.
    #[must_use]
    pub fn new(subject: &EntityRef, action: AuditAction, changes: ChangeSet) -> Self {
        Self {
            id: None,
            subject_type: subject.entity_type.clone(),
            subject_id: subject.id,
            associated_type: None,
            associated_id: None,
            actor: None,
            action,
            changes: AuditedChanges::Set(changes),
            comment: None,
            version: 0,
            correlation_id: None,
            origin_address: None,
            created_at: None,
        }
    }

    /// File this record under `entity` instead of its subject.
    #[must_use]
    pub fn with_associated(mut self, entity: &EntityRef) -> Self {
        self.set_associated(Some(entity));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn subject(&self) -> EntityRef {
        EntityRef {
            entity_type: self.subject_type.clone(),
            id: self.subject_id,
        }
    }

    /// The associated entity, present iff `associated_type` is set.
    #[must_use]
    pub fn associated(&self) -> Option<EntityRef> {
        self.associated_type.as_ref().map(|entity_type| EntityRef {
            entity_type: entity_type.clone(),
            id: self.associated_id,
        })
    }

    pub fn set_associated(&mut self, entity: Option<&EntityRef>) {
        self.associated_type = entity.map(|e| e.entity_type.clone());
        self.associated_id = entity.and_then(|e| e.id);
    }

    #[must_use]
    pub const fn is_associated(&self) -> bool {
        self.associated_type.is_some()
    }

    /// Whether this record audits `subject`.
    #[must_use]
    pub fn is_for(&self, subject: &EntityRef) -> bool {
        self.subject_type == subject.entity_type && self.subject_id == subject.id
    }

    /// Whether the record was written at or before `time`. Unwritten records
    /// never are.
    #[must_use]
    pub fn created_at_or_before(&self, time: DateTime<Utc>) -> bool {
        self.created_at.is_some_and(|at| at <= time)
    }

    /// Fill provenance fields that are still empty.
    ///
    /// `created_at` is set once; actor and origin come from `ctx` when present.
    /// The correlation id falls back to a fresh UUID so every record can be
    /// grouped.
    pub fn stamp(&mut self, ctx: &AuditContext) {
        if self.created_at.is_none() {
            self.created_at = Some(crate::timestamp::now());
        }
        if self.actor.is_none() {
            self.actor.clone_from(&ctx.actor);
        }
        if self.origin_address.is_none() {
            self.origin_address.clone_from(&ctx.origin_address);
        }
        if self.correlation_id.is_none() {
            self.correlation_id = Some(ctx.correlation_id_or_generate());
        }
    }

    /// Attribute values after this record's mutation.
    ///
    /// For `destroy` the only value present is the one held at destruction.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when an encoded change payload cannot be decoded.
    pub fn new_attributes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let changes = self.changes.decode()?;
        let destroy = self.action == AuditAction::Destroy;
        Ok(changes
            .iter()
            .map(|(attr, change)| {
                let value = if destroy {
                    change.old()
                } else {
                    change.new_value()
                };
                (attr.to_string(), value.cloned().unwrap_or(Value::Null))
            })
            .collect())
    }

    /// Attribute values before this record's mutation.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when an encoded change payload cannot be decoded.
    pub fn old_attributes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let changes = self.changes.decode()?;
        Ok(changes
            .iter()
            .map(|(attr, change)| {
                (
                    attr.to_string(),
                    change.old().cloned().unwrap_or(Value::Null),
                )
            })
            .collect())
    }
}
