//! Scoped record queries.
//!
//! `AuditScope` collects optional filters and renders them into one SELECT
//! with numbered parameters.

use chrono::{DateTime, Utc};
use rewind_core::EntityRef;
use rewind_core::timestamp;

use crate::helpers::RECORD_COLUMNS;

/// Filter and ordering for a record query.
#[derive(Debug, Clone, Default)]
pub struct AuditScope {
    pub subject: Option<EntityRef>,
    pub associated: Option<EntityRef>,
    pub from_version: Option<u32>,
    pub to_version: Option<u32>,
    pub up_until: Option<DateTime<Utc>>,
    pub descending: bool,
    pub limit: Option<u32>,
}

impl AuditScope {
    /// Records of `subject`.
    #[must_use]
    pub fn subject(subject: &EntityRef) -> Self {
        Self {
            subject: Some(subject.clone()),
            ..Self::default()
        }
    }

    /// Records filed under `entity` as their associated entity.
    #[must_use]
    pub fn associated(entity: &EntityRef) -> Self {
        Self {
            associated: Some(entity.clone()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn from_version(mut self, version: u32) -> Self {
        self.from_version = Some(version);
        self
    }

    #[must_use]
    pub const fn to_version(mut self, version: u32) -> Self {
        self.to_version = Some(version);
        self
    }

    #[must_use]
    pub const fn up_until(mut self, time: DateTime<Utc>) -> Self {
        self.up_until = Some(time);
        self
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the SELECT statement and its parameters.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<libsql::Value>) {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref subject) = self.subject {
            params.push(libsql::Value::Text(subject.entity_type.clone()));
            conditions.push(format!("subject_type = ?{}", params.len()));
            params.push(opt_integer(subject.id));
            conditions.push(format!("subject_id IS ?{}", params.len()));
        }
        if let Some(ref associated) = self.associated {
            params.push(libsql::Value::Text(associated.entity_type.clone()));
            conditions.push(format!("associated_type = ?{}", params.len()));
            params.push(opt_integer(associated.id));
            conditions.push(format!("associated_id IS ?{}", params.len()));
        }
        if let Some(version) = self.from_version {
            params.push(libsql::Value::Integer(i64::from(version)));
            conditions.push(format!("version >= ?{}", params.len()));
        }
        if let Some(version) = self.to_version {
            params.push(libsql::Value::Integer(i64::from(version)));
            conditions.push(format!("version <= ?{}", params.len()));
        }
        if let Some(time) = self.up_until {
            params.push(libsql::Value::Text(timestamp::format(&time)));
            conditions.push(format!("created_at <= ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let direction = if self.descending { "DESC" } else { "ASC" };
        let limit = self
            .limit
            .map(|n| format!(" LIMIT {n}"))
            .unwrap_or_default();

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM audits{where_clause} ORDER BY version {direction}, id {direction}{limit}"
        );
        (sql, params)
    }
}

/// Bind an optional integer, NULL when absent.
pub(crate) fn opt_integer(value: Option<i64>) -> libsql::Value {
    value.map_or(libsql::Value::Null, libsql::Value::Integer)
}

/// Bind an optional string, NULL when absent.
pub(crate) fn opt_text(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |s| libsql::Value::Text(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn subject_scope_uses_null_safe_id() {
        let (sql, params) = AuditScope::subject(&EntityRef::new("Company", 1)).to_sql();
        assert!(sql.contains("WHERE subject_type = ?1 AND subject_id IS ?2"), "{sql}");
        assert!(sql.ends_with("ORDER BY version ASC, id ASC"), "{sql}");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn filters_number_parameters_in_order() {
        let time = timestamp::parse("2026-02-08 12:00:00").unwrap();
        let (sql, params) = AuditScope::associated(&EntityRef::new("Owner", 3))
            .from_version(2)
            .to_version(5)
            .up_until(time)
            .descending()
            .limit(10)
            .to_sql();

        assert!(sql.contains("associated_id IS ?2"), "{sql}");
        assert!(sql.contains("version >= ?3"), "{sql}");
        assert!(sql.contains("version <= ?4"), "{sql}");
        assert!(sql.contains("created_at <= ?5"), "{sql}");
        assert!(sql.ends_with("ORDER BY version DESC, id DESC LIMIT 10"), "{sql}");
        assert_eq!(params[4], libsql::Value::Text("2026-02-08 12:00:00".into()));
    }

    #[test]
    fn unsaved_subject_binds_null() {
        let (_, params) = AuditScope::subject(&EntityRef::unsaved("Draft")).to_sql();
        assert_eq!(params[1], libsql::Value::Null);
    }
}
