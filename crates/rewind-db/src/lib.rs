//! # rewind-db
//!
//! libSQL relational store for the Rewind audit log.
//!
//! One row per audit record in the `audits` table. Versions are assigned per
//! subject inside the insert statement and protected by a unique index, so a
//! racing writer surfaces as [`rewind_core::StoreError::VersionConflict`]
//! instead of a duplicate version.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) for both local files
//! and remote Turso databases.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod scope;

use std::path::Path;

use error::DatabaseError;
use libsql::Builder;
use rewind_config::DatabaseConfig;

pub use scope::AuditScope;

/// Relational audit store handle.
pub struct RewindDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RewindDb {
    /// Open a local database at the given path. `":memory:"` opens a
    /// throwaway in-process database.
    ///
    /// Creates the parent directory of a file path and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Query(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }

        let db = Builder::new_local(path).build().await?;
        Self::from_database(db).await
    }

    /// Open a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        Self::from_database(db).await
    }

    /// Open the database described by `config`, remote when both url and
    /// token are set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if opening fails.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.is_remote() {
            tracing::debug!(url = %config.url, "opening remote audit database");
            Self::open_remote(&config.url, &config.auth_token).await
        } else {
            tracing::debug!(path = %config.path, "opening local audit database");
            Self::open_local(&config.path).await
        }
    }

    async fn from_database(db: libsql::Database) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;
        let rewind_db = Self { db, conn };
        rewind_db.run_migrations().await?;
        Ok(rewind_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
