//! Exact-match record criteria.
//!
//! A record matches iff every listed field's serialized value equals the
//! expected value. There are no operators and no partial matches; a field the
//! record does not serialize never matches.

use serde_json::Value;

use crate::entities::AuditRecord;
use crate::errors::StoreError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, Value)>,
}

impl Criteria {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let Ok(Value::Object(fields)) = serde_json::to_value(record) else {
            return false;
        };
        self.entries
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    /// Parse `field=value` pairs. Values are read as JSON, falling back to a
    /// plain string (`action=update`, `version=2`, `comment="x y"`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCriteria`] for a pair without `=`.
    pub fn parse_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, StoreError> {
        let mut criteria = Self::new();
        for pair in pairs {
            let (field, raw) = pair.split_once('=').ok_or_else(|| {
                StoreError::InvalidCriteria(format!("expected field=value, got '{pair}'"))
            })?;
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.into()));
            criteria = criteria.field(field.trim(), value);
        }
        Ok(criteria)
    }
}
