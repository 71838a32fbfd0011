//! Ordered change sets.
//!
//! A change set maps attribute names to `[old, new]` pairs and keeps the
//! order in which the change-detection hook reported them. On the wire each
//! pair is a two-element JSON array with `null` for an absent side:
//!
//! ```text
//! create   {"name": [null, "W"]}
//! update   {"name": ["W", "WW"]}
//! destroy  {"name": ["WW", null]}
//! ```

use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Map JSON `null` to an absent side so equality survives a storage roundtrip.
fn present(value: Value) -> Option<Value> {
    if value.is_null() { None } else { Some(value) }
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// One attribute's `[old, new]` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Change {
    old: Option<Value>,
    new: Option<Value>,
}

impl Change {
    #[must_use]
    pub fn new(old: Value, new: Value) -> Self {
        Self {
            old: present(old),
            new: present(new),
        }
    }

    /// Attribute set on create (old side absent).
    #[must_use]
    pub fn created(new: impl Into<Value>) -> Self {
        Self::new(Value::Null, new.into())
    }

    #[must_use]
    pub fn updated(old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Self::new(old.into(), new.into())
    }

    /// Attribute value at destruction (new side absent).
    #[must_use]
    pub fn destroyed(old: impl Into<Value>) -> Self {
        Self::new(old.into(), Value::Null)
    }

    #[must_use]
    pub const fn old(&self) -> Option<&Value> {
        self.old.as_ref()
    }

    #[must_use]
    pub const fn new_value(&self) -> Option<&Value> {
        self.new.as_ref()
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.old, &self.new).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (old, new) = <(Option<Value>, Option<Value>)>::deserialize(deserializer)?;
        Ok(Self {
            old: old.and_then(present),
            new: new.and_then(present),
        })
    }
}

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Insertion-ordered `attribute -> Change` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    entries: Vec<(String, Change)>,
}

impl ChangeSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace an attribute. A replaced attribute keeps its position.
    pub fn insert(&mut self, attribute: impl Into<String>, change: Change) {
        let attribute = attribute.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == attribute) {
            slot.1 = change;
        } else {
            self.entries.push((attribute, change));
        }
    }

    /// Builder-style [`ChangeSet::insert`].
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, change: Change) -> Self {
        self.insert(attribute, change);
        self
    }

    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Change> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, change)| change)
    }

    pub fn remove(&mut self, attribute: &str) -> Option<Change> {
        let idx = self.entries.iter().position(|(name, _)| name == attribute)?;
        Some(self.entries.remove(idx).1)
    }

    /// Keep only the attributes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(name, _)| keep(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Change)> {
        self.entries.iter().map(|(name, change)| (name.as_str(), change))
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Change)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, Change)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (attribute, change) in iter {
            set.insert(attribute, change);
        }
        set
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, change)| (name, change)))
    }
}

struct ChangeSetVisitor;

impl<'de> Visitor<'de> for ChangeSetVisitor {
    type Value = ChangeSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute name to [old, new]")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = ChangeSet::new();
        while let Some((attribute, change)) = access.next_entry::<String, Change>()? {
            set.insert(attribute, change);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for ChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ChangeSetVisitor)
    }
}

impl JsonSchema for ChangeSet {
    fn schema_name() -> Cow<'static, str> {
        "ChangeSet".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "object",
            "additionalProperties": {
                "type": "array",
                "minItems": 2,
                "maxItems": 2
            }
        })
    }
}

// ---------------------------------------------------------------------------
// AuditedChanges
// ---------------------------------------------------------------------------

/// The `changes` field of a record.
///
/// Payloads that arrive already encoded as a JSON string are kept verbatim
/// and only decoded when a caller needs the attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AuditedChanges {
    Set(ChangeSet),
    Encoded(String),
}

impl Default for AuditedChanges {
    fn default() -> Self {
        Self::Set(ChangeSet::new())
    }
}

impl From<ChangeSet> for AuditedChanges {
    fn from(set: ChangeSet) -> Self {
        Self::Set(set)
    }
}

impl AuditedChanges {
    /// Borrow the change set, decoding an encoded payload if needed.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when an encoded payload is not a change map.
    pub fn decode(&self) -> Result<Cow<'_, ChangeSet>, serde_json::Error> {
        match self {
            Self::Set(set) => Ok(Cow::Borrowed(set)),
            Self::Encoded(raw) => serde_json::from_str(raw).map(Cow::Owned),
        }
    }
}
