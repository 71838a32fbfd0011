//! Live subject persistence.
//!
//! Reconstruction reads and writes the audited entities themselves through
//! `SubjectRepository`. Applications implement it over their own storage;
//! `InMemorySubjects` backs tests and the CLI.

use std::collections::HashMap;

use async_trait::async_trait;
use rewind_core::EntityRef;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::AuditError;

/// Attribute name to value.
pub type Attributes = Map<String, Value>;

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Current attributes of `subject`, `None` when it does not exist.
    async fn find(&self, subject: &EntityRef) -> Result<Option<Attributes>, AuditError>;

    /// Attribute defaults of a freshly constructed `entity_type`.
    fn blank(&self, entity_type: &str) -> Attributes;

    /// Create `subject` with `attributes`.
    async fn insert(&self, subject: &EntityRef, attributes: Attributes) -> Result<(), AuditError>;

    /// Overwrite the listed attributes of an existing subject.
    async fn update(&self, subject: &EntityRef, attributes: Attributes) -> Result<(), AuditError>;

    /// Remove `subject`. Returns whether it existed.
    async fn destroy(&self, subject: &EntityRef) -> Result<bool, AuditError>;
}

#[derive(Debug, Default)]
pub struct InMemorySubjects {
    rows: RwLock<HashMap<EntityRef, Attributes>>,
    blanks: HashMap<String, Attributes>,
}

impl InMemorySubjects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the defaults of `entity_type`.
    #[must_use]
    pub fn with_blank(mut self, entity_type: impl Into<String>, defaults: Attributes) -> Self {
        self.blanks.insert(entity_type.into(), defaults);
        self
    }

    /// Store `subject` directly, replacing any existing attributes.
    pub async fn seed(&self, subject: EntityRef, attributes: Attributes) {
        self.rows.write().await.insert(subject, attributes);
    }
}

#[async_trait]
impl SubjectRepository for InMemorySubjects {
    async fn find(&self, subject: &EntityRef) -> Result<Option<Attributes>, AuditError> {
        Ok(self.rows.read().await.get(subject).cloned())
    }

    fn blank(&self, entity_type: &str) -> Attributes {
        self.blanks.get(entity_type).cloned().unwrap_or_default()
    }

    async fn insert(&self, subject: &EntityRef, attributes: Attributes) -> Result<(), AuditError> {
        self.rows.write().await.insert(subject.clone(), attributes);
        Ok(())
    }

    async fn update(&self, subject: &EntityRef, attributes: Attributes) -> Result<(), AuditError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(subject)
            .ok_or_else(|| AuditError::SubjectNotFound(subject.clone()))?;
        row.extend(attributes);
        Ok(())
    }

    async fn destroy(&self, subject: &EntityRef) -> Result<bool, AuditError> {
        Ok(self.rows.write().await.remove(subject).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }

    #[tokio::test]
    async fn update_overlays_listed_attributes() {
        let subjects = InMemorySubjects::new();
        let company = EntityRef::new("Company", 1);
        subjects
            .seed(company.clone(), attrs(json!({"name": "W", "city": "Oslo"})))
            .await;

        subjects
            .update(&company, attrs(json!({"name": "WW"})))
            .await
            .unwrap();
        assert_eq!(
            subjects.find(&company).await.unwrap(),
            Some(attrs(json!({"name": "WW", "city": "Oslo"})))
        );
    }

    #[tokio::test]
    async fn update_of_missing_subject_fails() {
        let subjects = InMemorySubjects::new();
        let err = subjects
            .update(&EntityRef::new("Company", 9), Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::SubjectNotFound(_)));
    }

    #[tokio::test]
    async fn blank_defaults_per_type() {
        let subjects =
            InMemorySubjects::new().with_blank("Company", attrs(json!({"name": null, "active": true})));
        assert_eq!(subjects.blank("Company")["active"], json!(true));
        assert!(subjects.blank("Unknown").is_empty());

        let company = EntityRef::new("Company", 1);
        subjects.insert(&company, Attributes::new()).await.unwrap();
        assert!(subjects.destroy(&company).await.unwrap());
        assert!(!subjects.destroy(&company).await.unwrap());
    }
}
