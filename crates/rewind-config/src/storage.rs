//! Storage selector and object-store options.

use rewind_core::StorageMechanism;
use serde::{Deserialize, Serialize};

use crate::database::DatabaseConfig;
use crate::error::ConfigError;

/// Default AWS region.
fn default_region() -> String {
    String::from("us-east-1")
}

/// Which backend holds the audit log, plus each backend's settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub mechanism: StorageMechanism,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub options: StorageOptions,
}

/// Object-store backend options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageOptions {
    /// Bucket holding the audit blobs.
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Custom endpoint for S3-compatible services. Empty means AWS.
    #[serde(default)]
    pub endpoint: String,

    /// Leading key segment, e.g. `"audits/production"`.
    #[serde(default)]
    pub key_prefix: String,

    /// Bucket subject ids into ranges of 10 000 per key directory.
    #[serde(default)]
    pub partition: bool,

    /// Type names that are never partitioned, even with `partition = true`.
    #[serde(default)]
    pub unpartitioned_types: Vec<String>,

    /// Serve backend calls from an in-memory map instead of the network.
    #[serde(default)]
    pub stub_responses: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key: String::new(),
            secret_key: String::new(),
            endpoint: String::new(),
            key_prefix: String::new(),
            partition: false,
            unpartitioned_types: Vec::new(),
            stub_responses: false,
        }
    }
}

impl StorageOptions {
    /// Check that bucket and both credential fields are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bucket.is_empty() {
            missing.push("bucket");
        }
        if self.access_key.is_empty() {
            missing.push("access_key");
        }
        if self.secret_key.is_empty() {
            missing.push("secret_key");
        }
        missing
    }

    /// Fail with [`ConfigError::NotConfigured`] unless [`Self::is_configured`].
    ///
    /// # Errors
    ///
    /// Lists every missing required field.
    pub fn require_configured(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::NotConfigured {
                section: "storage.options".into(),
                missing: missing.join(", "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> StorageOptions {
        StorageOptions {
            bucket: "audits".into(),
            access_key: "key".into(),
            secret_key: "secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn default_is_not_configured() {
        let options = StorageOptions::default();
        assert!(!options.is_configured());
        assert_eq!(options.region, "us-east-1");
        assert_eq!(
            options.missing_fields(),
            vec!["bucket", "access_key", "secret_key"]
        );
    }

    #[test]
    fn configured_when_bucket_and_credentials_set() {
        assert!(configured().is_configured());
        assert!(configured().require_configured().is_ok());
    }

    #[test]
    fn require_configured_names_missing_field() {
        let options = StorageOptions {
            secret_key: String::new(),
            ..configured()
        };
        let err = options.require_configured().unwrap_err().to_string();
        assert!(err.contains("secret_key"), "{err}");
        assert!(!err.contains("bucket"), "{err}");
    }

    #[test]
    fn default_mechanism_is_relational() {
        let config = StorageConfig::default();
        assert_eq!(config.mechanism, StorageMechanism::Relational);
    }
}
