//! # rewind-config
//!
//! Layered configuration loading for Rewind using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`REWIND_*` prefix, `__` as separator)
//! 2. Project-level `.rewind/config.toml`
//! 3. User-level `~/.config/rewind/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `REWIND_STORAGE__MECHANISM` -> `storage.mechanism`,
//! `REWIND_STORAGE__OPTIONS__BUCKET` -> `storage.options.bucket`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use rewind_config::RewindConfig;
//!
//! let config = RewindConfig::load_with_dotenv().expect("config");
//! println!("audit log backend: {}", config.storage.mechanism);
//! ```

mod database;
mod error;
mod general;
mod storage;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use storage::{StorageConfig, StorageOptions};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RewindConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl RewindConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Load with an explicit config file layered above the global one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::base_figment()
            .merge(Toml::file(path))
            .merge(Self::env_provider())
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Self::base_figment();

        // Project-local config
        let local_path = PathBuf::from(".rewind/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Environment variables (highest priority)
        figment.merge(Self::env_provider())
    }

    /// Defaults plus the user-global config file.
    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }
        figment
    }

    fn env_provider() -> Env {
        Env::prefixed("REWIND_").split("__")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rewind").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory. Silently does nothing if
    /// no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::StorageMechanism;

    #[test]
    fn default_config_loads() {
        let config = RewindConfig::default();
        assert_eq!(config.storage.mechanism, StorageMechanism::Relational);
        assert!(!config.storage.options.is_configured());
        assert!(!config.storage.database.is_remote());
    }

    #[test]
    fn figment_builds_without_files() {
        let config: RewindConfig = RewindConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.general.default_limit, 50);
        assert_eq!(config.storage.options.region, "us-east-1");
    }
}
