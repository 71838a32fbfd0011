//! Audit actions and storage mechanisms.
//!
//! `AuditAction` is open-ended: the three tracked mutations plus any custom
//! label used for manually created entries. It serializes as the bare label.

use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// What kind of mutation an audit record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Create,
    Update,
    Destroy,
    /// Label of a manually created entry (e.g. `"export"`, `"login"`).
    Custom(String),
}

impl AuditAction {
    /// Return the label used on the wire and in SQL storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::Custom(label) => label.as_str(),
        }
    }

    /// Parse a stored label. Unknown labels become [`AuditAction::Custom`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "create" => Self::Create,
            "update" => Self::Update,
            "destroy" => Self::Destroy,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Whether this is one of the three tracked mutations.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

impl JsonSchema for AuditAction {
    fn schema_name() -> Cow<'static, str> {
        "AuditAction".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "examples": ["create", "update", "destroy"]
        })
    }
}

// ---------------------------------------------------------------------------
// StorageMechanism
// ---------------------------------------------------------------------------

/// Which backend holds the audit log. Chosen once per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMechanism {
    /// Rows in a libSQL table.
    #[default]
    Relational,
    /// One blob per (subject, partition) key in an object store.
    #[serde(alias = "s3")]
    ObjectStore,
}

impl StorageMechanism {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::ObjectStore => "object_store",
        }
    }
}

impl fmt::Display for StorageMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("create", AuditAction::Create)]
    #[case("update", AuditAction::Update)]
    #[case("destroy", AuditAction::Destroy)]
    #[case("login", AuditAction::Custom("login".to_string()))]
    fn action_parse_roundtrip(#[case] label: &str, #[case] expected: AuditAction) {
        let action = AuditAction::parse(label);
        assert_eq!(action, expected);
        assert_eq!(action.as_str(), label);
    }

    #[test]
    fn action_serializes_as_bare_label() {
        let json = serde_json::to_string(&AuditAction::Destroy).unwrap();
        assert_eq!(json, "\"destroy\"");

        let custom: AuditAction = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(custom, AuditAction::Custom("archived".to_string()));
        assert!(!custom.is_tracked());
    }

    #[test]
    fn storage_mechanism_accepts_s3_alias() {
        let mechanism: StorageMechanism = serde_json::from_str("\"s3\"").unwrap();
        assert_eq!(mechanism, StorageMechanism::ObjectStore);
        assert_eq!(StorageMechanism::default(), StorageMechanism::Relational);
    }
}
