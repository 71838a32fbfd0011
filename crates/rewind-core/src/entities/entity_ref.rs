use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Polymorphic reference to an entity: type name plus optional integer id.
///
/// The id is absent for entities that were never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: Option<i64>,
}

impl EntityRef {
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: Some(id),
        }
    }

    /// Reference to an entity that has no id yet.
    #[must_use]
    pub fn unsaved(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}#{id}", self.entity_type),
            None => write!(f, "{}#?", self.entity_type),
        }
    }
}

/// Who performed the audited mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Actor {
    /// Free-form label such as a system job name.
    Label(String),
    /// Reference to an actor entity (usually a user).
    Entity(EntityRef),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Entity(entity) => entity.fmt(f),
        }
    }
}
