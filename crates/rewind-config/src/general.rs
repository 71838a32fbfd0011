//! General recorder settings.

use serde::{Deserialize, Serialize};

/// Attribute names never recorded: version and timestamp bookkeeping columns.
fn default_ignored_attributes() -> Vec<String> {
    ["lock_version", "created_at", "updated_at", "created_on", "updated_on"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default result limit.
const fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Attributes stripped from every change set before it is written.
    #[serde(default = "default_ignored_attributes")]
    pub ignored_attributes: Vec<String>,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            ignored_attributes: default_ignored_attributes(),
            default_limit: default_limit(),
        }
    }
}

impl GeneralConfig {
    #[must_use]
    pub fn is_ignored(&self, attribute: &str) -> bool {
        self.ignored_attributes.iter().any(|a| a == attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ignore_bookkeeping_columns() {
        let config = GeneralConfig::default();
        assert!(config.is_ignored("lock_version"));
        assert!(config.is_ignored("updated_at"));
        assert!(!config.is_ignored("name"));
        assert_eq!(config.default_limit, 50);
    }
}
