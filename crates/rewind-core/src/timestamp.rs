//! Record timestamps.
//!
//! `created_at` is written as `YYYY-MM-DD HH:MM:SS` in UTC with no zone
//! suffix, the format external blob readers ingest. Parsing also accepts
//! RFC 3339 so hand-written fixtures load.
//!
//! Timestamps are truncated to whole seconds when stamped; a record read back
//! from storage must compare equal to the one that was written.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Storage format for `created_at`.
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current time truncated to whole seconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Render a timestamp in storage format.
#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(FORMAT).to_string()
}

/// Parse either storage format or RFC 3339.
///
/// # Errors
///
/// Returns the `chrono` parse error when neither format matches.
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, FORMAT).map(|naive| naive.and_utc())
}

/// `serde(with = ...)` adapter for `Option<DateTime<Utc>>`.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => super::parse(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
