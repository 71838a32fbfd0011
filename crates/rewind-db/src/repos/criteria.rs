//! Criteria to SQL translation.
//!
//! Each criteria field maps to a whitelisted column. A JSON value whose type
//! the column can never hold makes the whole criteria unsatisfiable, which
//! matches the exact-equality semantics the object store applies in memory.

use rewind_core::{Actor, Criteria, StoreError};
use serde_json::Value;

use crate::helpers::actor_columns;

#[derive(Clone, Copy)]
enum Column {
    Text(&'static str),
    Integer(&'static str),
}

fn column_for(field: &str) -> Option<Column> {
    let column = match field {
        "id" => Column::Integer("id"),
        "subject_type" => Column::Text("subject_type"),
        "subject_id" => Column::Integer("subject_id"),
        "associated_type" => Column::Text("associated_type"),
        "associated_id" => Column::Integer("associated_id"),
        "action" => Column::Text("action"),
        "comment" => Column::Text("comment"),
        "version" => Column::Integer("version"),
        "correlation_id" => Column::Text("correlation_id"),
        "origin_address" => Column::Text("origin_address"),
        "created_at" => Column::Text("created_at"),
        _ => return None,
    };
    Some(column)
}

/// WHERE conditions and parameters for `criteria`.
///
/// `Ok(None)` means no stored row can match.
pub(crate) fn criteria_to_sql(
    criteria: &Criteria,
) -> Result<Option<(Vec<String>, Vec<libsql::Value>)>, StoreError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    for (field, expected) in criteria.entries() {
        if field == "actor" {
            if !push_actor(expected, &mut conditions, &mut params) {
                return Ok(None);
            }
            continue;
        }

        let column = column_for(field).ok_or_else(|| {
            StoreError::InvalidCriteria(format!("cannot filter audits on '{field}'"))
        })?;

        match (column, expected) {
            (Column::Text(name) | Column::Integer(name), Value::Null) => {
                conditions.push(format!("{name} IS NULL"));
            }
            (Column::Text(name), Value::String(s)) => {
                params.push(libsql::Value::Text(s.clone()));
                conditions.push(format!("{name} = ?{}", params.len()));
            }
            (Column::Integer(name), Value::Number(n)) => match n.as_i64() {
                Some(n) => {
                    params.push(libsql::Value::Integer(n));
                    conditions.push(format!("{name} = ?{}", params.len()));
                }
                None => return Ok(None),
            },
            _ => return Ok(None),
        }
    }

    Ok(Some((conditions, params)))
}

fn push_actor(
    expected: &Value,
    conditions: &mut Vec<String>,
    params: &mut Vec<libsql::Value>,
) -> bool {
    if expected.is_null() {
        conditions.push(
            "actor_type IS NULL AND actor_id IS NULL AND actor_label IS NULL".to_string(),
        );
        return true;
    }

    let Ok(actor) = serde_json::from_value::<Actor>(expected.clone()) else {
        return false;
    };
    // Only an exact serialized match counts, so extra keys never match.
    if serde_json::to_value(&actor).ok().as_ref() != Some(expected) {
        return false;
    }

    let (actor_type, actor_id, actor_label) = actor_columns(Some(&actor));
    for (name, value) in [
        ("actor_type", actor_type.map(libsql::Value::Text)),
        ("actor_id", actor_id.map(libsql::Value::Integer)),
        ("actor_label", actor_label.map(libsql::Value::Text)),
    ] {
        match value {
            Some(value) => {
                params.push(value);
                conditions.push(format!("{name} = ?{}", params.len()));
            }
            None => conditions.push(format!("{name} IS NULL")),
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn maps_fields_to_numbered_predicates() {
        let criteria = Criteria::new()
            .field("action", "update")
            .field("version", 2)
            .field("comment", Value::Null);
        let (conditions, params) = criteria_to_sql(&criteria).unwrap().unwrap();
        assert_eq!(
            conditions,
            vec!["action = ?1", "version = ?2", "comment IS NULL"]
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn entity_actor_matches_type_and_id() {
        let criteria = Criteria::new().field("actor", json!({"type": "User", "id": 5}));
        let (conditions, params) = criteria_to_sql(&criteria).unwrap().unwrap();
        assert_eq!(
            conditions,
            vec!["actor_type = ?1", "actor_id = ?2", "actor_label IS NULL"]
        );
        assert_eq!(params[1], libsql::Value::Integer(5));
    }

    #[test]
    fn label_actor_matches_label_column() {
        let criteria = Criteria::new().field("actor", "cron");
        let (conditions, _) = criteria_to_sql(&criteria).unwrap().unwrap();
        assert_eq!(
            conditions,
            vec!["actor_type IS NULL", "actor_id IS NULL", "actor_label = ?1"]
        );
    }

    #[test]
    fn type_mismatch_can_never_match() {
        let criteria = Criteria::new().field("version", "2");
        assert!(criteria_to_sql(&criteria).unwrap().is_none());
    }

    #[test]
    fn unknown_and_changes_fields_are_rejected() {
        for field in ["changes", "nonexistent"] {
            let err = criteria_to_sql(&Criteria::new().field(field, 1)).unwrap_err();
            assert!(matches!(err, StoreError::InvalidCriteria(_)), "{field}");
        }
    }
}
