//! Row-to-record parsing helpers.
//!
//! Converts `libsql::Row` (column-indexed) into `AuditRecord` and splits
//! record fields into their column representation.

use chrono::{DateTime, Utc};
use rewind_core::changes::AuditedChanges;
use rewind_core::entities::{Actor, AuditRecord, EntityRef};
use rewind_core::enums::AuditAction;
use rewind_core::timestamp;

use crate::error::DatabaseError;

/// Columns selected by every record query, in `row_to_record` order.
pub const RECORD_COLUMNS: &str = "id, subject_type, subject_id, associated_type, associated_id, \
     actor_type, actor_id, actor_label, action, changes, comment, version, \
     correlation_id, origin_address, created_at";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both the storage format (`"2026-02-09 14:30:00"`) and RFC 3339.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    timestamp::parse(s)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a nullable INTEGER column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_i64(row: &libsql::Row, idx: i32) -> Result<Option<i64>, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?)
}

/// Split an actor into `(actor_type, actor_id, actor_label)` columns.
#[must_use]
pub fn actor_columns(actor: Option<&Actor>) -> (Option<String>, Option<i64>, Option<String>) {
    match actor {
        Some(Actor::Entity(entity)) => (Some(entity.entity_type.clone()), entity.id, None),
        Some(Actor::Label(label)) => (None, None, Some(label.clone())),
        None => (None, None, None),
    }
}

fn actor_from_columns(
    actor_type: Option<String>,
    actor_id: Option<i64>,
    actor_label: Option<String>,
) -> Option<Actor> {
    match (actor_type, actor_label) {
        (Some(entity_type), _) => Some(Actor::Entity(EntityRef {
            entity_type,
            id: actor_id,
        })),
        (None, Some(label)) => Some(Actor::Label(label)),
        (None, None) => None,
    }
}

/// Encode the `changes` column. Encoded payloads stay a JSON string so they
/// read back verbatim.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the change set cannot be serialized.
pub fn encode_changes(changes: &AuditedChanges) -> Result<String, DatabaseError> {
    serde_json::to_string(changes)
        .map_err(|e| DatabaseError::Query(format!("Failed to encode changes: {e}")))
}

fn decode_changes(s: Option<&str>) -> Result<AuditedChanges, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::Query(format!("Invalid changes JSON in column: {e}"))),
        _ => Ok(AuditedChanges::default()),
    }
}

/// Parse a row selected with [`RECORD_COLUMNS`].
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or holds unparseable data.
pub fn row_to_record(row: &libsql::Row) -> Result<AuditRecord, DatabaseError> {
    let version = row.get::<i64>(11)?;
    Ok(AuditRecord {
        id: Some(row.get::<i64>(0)?),
        subject_type: row.get::<String>(1)?,
        subject_id: get_opt_i64(row, 2)?,
        associated_type: get_opt_string(row, 3)?,
        associated_id: get_opt_i64(row, 4)?,
        actor: actor_from_columns(
            get_opt_string(row, 5)?,
            get_opt_i64(row, 6)?,
            get_opt_string(row, 7)?,
        ),
        action: AuditAction::parse(&row.get::<String>(8)?),
        changes: decode_changes(get_opt_string(row, 9)?.as_deref())?,
        comment: get_opt_string(row, 10)?,
        version: u32::try_from(version)
            .map_err(|_| DatabaseError::Query(format!("Invalid version {version}")))?,
        correlation_id: get_opt_string(row, 12)?,
        origin_address: get_opt_string(row, 13)?,
        created_at: Some(parse_datetime(&row.get::<String>(14)?)?),
    })
}
