// Hostkeep - SQLite Database Management
//
// Opens the profile database and brings the schema up to date. One
// connection is held per invocation and closed when the `Database` drops.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::StoreError;

/// How long a writer waits on a lock held by another invocation.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrapper around the SQLite connection backing the profile store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create the database (and its parent directory) if needed, then open it.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Connection(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        Self::connect(path)
    }

    /// Open an existing database. Fails with `NotInitialized` when the file
    /// is missing so no command ever runs against an implicit empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        }
        Self::connect(path)
    }

    /// Open an in-memory database (for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.configure()?;
        db.run_migrations()?;
        Ok(db)
    }

    fn connect(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Connection(format!("{}: {}", path.display(), e))
        })?;

        let db = Self { conn };
        db.configure()?;
        db.run_migrations()?;

        tracing::debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn configure(&self) -> Result<(), StoreError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Run schema migrations to create or update tables.
    fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS accounts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id     TEXT NOT NULL UNIQUE,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id      INTEGER NOT NULL,
                name            TEXT NOT NULL,
                host            TEXT NOT NULL,
                username        TEXT NOT NULL,
                port            INTEGER NOT NULL,
                key_path        TEXT NOT NULL,
                auth_key        TEXT NOT NULL,
                token           TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                UNIQUE (account_id, name),
                FOREIGN KEY(account_id) REFERENCES accounts(id)
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                account         TEXT NOT NULL,
                profile         TEXT,
                action          TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                details         TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_account
                ON audit_log(account);
            ",
        )?;

        tracing::debug!("Database migrations completed successfully");
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
