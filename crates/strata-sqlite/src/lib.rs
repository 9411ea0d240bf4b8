//! Strata SQLite - Applies generated migrations to SQLite databases.
//!
//! The schema version lives in `PRAGMA user_version`. An upgrade reads it,
//! runs the bootstrap plan or the migration chain, and stores the new version,
//! all inside one transaction.

use rusqlite::Connection;
use strata_core::migration::{GeneratedMigrations, MigrationError, MigrationStep, MigrationTarget};
use thiserror::Error;
use tracing::{debug, info};

/// SQLite upgrade errors.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Migration error.
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// `user_version` holds a value that is not a schema version.
    #[error("invalid user_version {0}")]
    InvalidUserVersion(i64),
}

/// Executes migration steps on a SQLite connection.
///
/// Accepts a [`rusqlite::Transaction`] through deref.
pub struct SqliteTarget<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTarget<'c> {
    /// Wrap a connection.
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl MigrationTarget for SqliteTarget<'_> {
    type Error = rusqlite::Error;

    fn execute(&mut self, step: &MigrationStep) -> Result<(), Self::Error> {
        let sql = step.to_sql();
        debug!(%sql, "Executing migration step");
        self.conn.execute_batch(&sql)
    }
}

/// Read the schema version stored in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> Result<u32, SqliteError> {
    let raw: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    u32::try_from(raw).map_err(|_| SqliteError::InvalidUserVersion(raw))
}

/// Upgrades SQLite databases to the newest generated schema version.
#[derive(Debug, Clone)]
pub struct SqliteUpgrader {
    migrations: GeneratedMigrations,
}

impl SqliteUpgrader {
    /// Create an upgrader for a generated schema history.
    pub fn new(migrations: GeneratedMigrations) -> Self {
        Self { migrations }
    }

    /// The generated migrations.
    pub fn migrations(&self) -> &GeneratedMigrations {
        &self.migrations
    }

    /// The version databases are upgraded to.
    pub fn current_version(&self) -> u32 {
        self.migrations.current_version
    }

    /// Upgrade `conn` to the current version.
    ///
    /// An empty database (version 0) is created from scratch. On any error the
    /// transaction rolls back and the database keeps its previous version.
    pub fn upgrade(&self, conn: &mut Connection) -> Result<u32, SqliteError> {
        let tx = conn.transaction()?;
        let old_version = schema_version(&tx)?;
        let current_version = self.current_version();

        if old_version == current_version {
            debug!(version = old_version, "Database already current");
            return Ok(old_version);
        }

        info!(
            namespace = %self.migrations.namespace,
            from_version = old_version,
            to_version = current_version,
            "Upgrading database"
        );

        let mut target = SqliteTarget::new(&tx);
        let version = self.migrations.upgrade(&mut target, old_version)?;
        tx.pragma_update(None, "user_version", i64::from(version))?;
        tx.commit()?;

        info!(version, "Database upgraded");
        Ok(version)
    }
}
