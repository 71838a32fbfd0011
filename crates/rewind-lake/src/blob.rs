//! Blob codec.
//!
//! A blob is the JSON objects of its records joined by `",\n"`, without the
//! surrounding brackets, so appending never needs to parse the tail. Readers
//! wrap the body in `[` `]` before parsing.

use rewind_core::AuditRecord;

use crate::error::LakeError;

/// Encode `records` as a blob body. Row ids are never written.
///
/// # Errors
///
/// Returns `LakeError::Blob` if a record fails to serialize.
pub fn encode(key: &str, records: &[AuditRecord]) -> Result<String, LakeError> {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let mut record = record.clone();
        record.id = None;
        let line = serde_json::to_string(&record).map_err(|source| LakeError::Blob {
            key: key.to_string(),
            source,
        })?;
        lines.push(line);
    }
    Ok(lines.join(",\n"))
}

/// Decode a blob body. An empty body holds no records.
///
/// # Errors
///
/// Returns `LakeError::Blob` if the body is not a record sequence, including
/// bodies that are not valid UTF-8.
pub fn decode(key: &str, body: &[u8]) -> Result<Vec<AuditRecord>, LakeError> {
    if body.trim_ascii().is_empty() {
        return Ok(Vec::new());
    }
    let mut wrapped = Vec::with_capacity(body.len() + 2);
    wrapped.push(b'[');
    wrapped.extend_from_slice(body);
    wrapped.push(b']');
    serde_json::from_slice(&wrapped).map_err(|source| LakeError::Blob {
        key: key.to_string(),
        source,
    })
}
