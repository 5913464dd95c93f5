// Hostkeep - Profile Store Repository
//
// Implements the point reads and mutations on accounts and server profiles.
// Every statement is parameterized; no profile field is ever formatted into
// SQL text. Each mutation and its audit entry commit in one transaction.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::db::Database;
use super::models::{AuditEntry, NewProfile, Profile};
use super::StoreError;

const PROFILE_COLUMNS: &str = "p.id, a.external_id, p.name, p.host, p.username, p.port,
     p.key_path, p.auth_key, p.token, p.created_at, p.updated_at";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over profile storage operations.
pub trait ProfileStore {
    /// Provision an account. Returns the store-assigned internal id.
    fn create_account(&self, external_id: &str) -> Result<i64, StoreError>;

    /// Check whether an account with this external id exists.
    fn account_exists(&self, external_id: &str) -> Result<bool, StoreError>;

    /// Profile names owned by the account, in insertion order.
    fn list_names(&self, account: &str) -> Result<Vec<String>, StoreError>;

    /// Get a profile by (account, name), ignoring its token.
    fn find(&self, account: &str, name: &str) -> Result<Option<Profile>, StoreError>;

    /// Get a profile only if its stored token equals `token` exactly.
    fn find_with_token(
        &self,
        account: &str,
        name: &str,
        token: &str,
    ) -> Result<Option<Profile>, StoreError>;

    /// Register a new profile. The new row inherits the account's current token.
    fn insert(&self, profile: NewProfile) -> Result<i64, StoreError>;

    /// Replace a profile's auth key. Returns false if the profile does not exist.
    fn update_auth_key(&self, account: &str, name: &str, auth_key: &str)
        -> Result<bool, StoreError>;

    /// Replace the token on every profile of the account. Returns the number
    /// of profiles updated.
    fn set_account_token(&self, account: &str, token: &str) -> Result<usize, StoreError>;

    /// Delete a profile by (account, name). Returns true if it existed.
    fn delete(&self, account: &str, name: &str) -> Result<bool, StoreError>;

    /// Write an entry to the audit log.
    fn log_event(
        &self,
        account: &str,
        profile: Option<&str>,
        action: &str,
        details: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Retrieve the audit log for an account, oldest first.
    fn audit_entries(&self, account: &str) -> Result<Vec<AuditEntry>, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteProfileStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteProfileStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Parse a profile row selected with `PROFILE_COLUMNS`.
    fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
        let created_at = parse_timestamp(row, 9)?;
        let updated_at = parse_timestamp(row, 10)?;

        Ok(Profile::new(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            created_at,
            updated_at,
        ))
    }

    fn account_id(&self, external_id: &str) -> Result<Option<i64>, StoreError> {
        let id = self
            .db
            .conn()
            .query_row(
                "SELECT id FROM accounts WHERE external_id = ?1",
                params![external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

/// Read an RFC 3339 column. A malformed value fails the row.
fn parse_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Insert an audit row on `conn`, which may be an open transaction.
fn record_event(
    conn: &Connection,
    account: &str,
    profile: Option<&str>,
    action: &str,
    details: Option<&str>,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO audit_log (account, profile, action, timestamp, details)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![account, profile, action, Utc::now().to_rfc3339(), details],
    )?;

    tracing::debug!(
        account = %account,
        action = %action,
        "Audit log entry recorded"
    );

    Ok(())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
}

impl<'a> ProfileStore for SqliteProfileStore<'a> {
    fn create_account(&self, external_id: &str) -> Result<i64, StoreError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.db.conn().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO accounts (external_id, created_at) VALUES (?1, ?2)",
            params![external_id, now],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::DuplicateAccount(external_id.to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        let id = tx.last_insert_rowid();
        record_event(&tx, external_id, None, "account_created", None)?;
        tx.commit()?;
        tracing::info!(account = %external_id, "Account provisioned");

        Ok(id)
    }

    fn account_exists(&self, external_id: &str) -> Result<bool, StoreError> {
        Ok(self.account_id(external_id)?.is_some())
    }

    fn list_names(&self, account: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT p.name FROM profiles p
             JOIN accounts a ON a.id = p.account_id
             WHERE a.external_id = ?1
             ORDER BY p.id ASC",
        )?;

        let rows = stmt.query_map(params![account], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }

        Ok(names)
    }

    fn find(&self, account: &str, name: &str) -> Result<Option<Profile>, StoreError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p
             JOIN accounts a ON a.id = p.account_id
             WHERE a.external_id = ?1 AND p.name = ?2"
        );
        let profile = self
            .db
            .conn()
            .query_row(&sql, params![account, name], Self::row_to_profile)
            .optional()?;

        Ok(profile)
    }

    fn find_with_token(
        &self,
        account: &str,
        name: &str,
        token: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p
             JOIN accounts a ON a.id = p.account_id
             WHERE a.external_id = ?1 AND p.name = ?2 AND p.token = ?3"
        );
        let profile = self
            .db
            .conn()
            .query_row(&sql, params![account, name, token], Self::row_to_profile)
            .optional()?;

        Ok(profile)
    }

    fn insert(&self, profile: NewProfile) -> Result<i64, StoreError> {
        let account_id = self
            .account_id(&profile.account)?
            .ok_or_else(|| StoreError::AccountNotFound(profile.account.clone()))?;
        let now = Utc::now().to_rfc3339();
        let tx = self.db.conn().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO profiles
                (account_id, name, host, username, port, key_path, auth_key,
                 token, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                 (SELECT token FROM profiles
                  WHERE account_id = ?1 AND token IS NOT NULL
                  ORDER BY id LIMIT 1),
                 ?8, ?8)",
            params![
                account_id,
                profile.name,
                profile.host,
                profile.username,
                profile.port,
                profile.key_path,
                profile.auth_key,
                now,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::DuplicateProfile {
                    account: profile.account.clone(),
                    name: profile.name.clone(),
                }
            } else {
                StoreError::Database(e)
            }
        })?;

        let id = tx.last_insert_rowid();
        record_event(&tx, &profile.account, Some(&profile.name), "profile_added", None)?;
        tx.commit()?;

        tracing::info!(
            account = %profile.account,
            server = %profile.name,
            host = %profile.host,
            "Server profile stored"
        );

        Ok(id)
    }

    fn update_auth_key(
        &self,
        account: &str,
        name: &str,
        auth_key: &str,
    ) -> Result<bool, StoreError> {
        let tx = self.db.conn().unchecked_transaction()?;
        let affected = tx.execute(
            "UPDATE profiles SET auth_key = ?1, updated_at = ?2
             WHERE account_id = (SELECT id FROM accounts WHERE external_id = ?3)
               AND name = ?4",
            params![auth_key, Utc::now().to_rfc3339(), account, name],
        )?;

        if affected > 0 {
            record_event(&tx, account, Some(name), "authkey_updated", None)?;
            tx.commit()?;
            tracing::info!(account = %account, server = %name, "Auth key replaced");
        }

        Ok(affected > 0)
    }

    fn set_account_token(&self, account: &str, token: &str) -> Result<usize, StoreError> {
        let tx = self.db.conn().unchecked_transaction()?;
        let affected = tx.execute(
            "UPDATE profiles SET token = ?1, updated_at = ?2
             WHERE account_id = (SELECT id FROM accounts WHERE external_id = ?3)",
            params![token, Utc::now().to_rfc3339(), account],
        )?;

        if affected == 0 && !self.account_exists(account)? {
            return Err(StoreError::AccountNotFound(account.to_string()));
        }

        if affected > 0 {
            let details = format!("{} profile(s)", affected);
            record_event(&tx, account, None, "token_rotated", Some(&details))?;
            tx.commit()?;
        }

        Ok(affected)
    }

    fn delete(&self, account: &str, name: &str) -> Result<bool, StoreError> {
        let tx = self.db.conn().unchecked_transaction()?;
        let affected = tx.execute(
            "DELETE FROM profiles
             WHERE account_id = (SELECT id FROM accounts WHERE external_id = ?1)
               AND name = ?2",
            params![account, name],
        )?;

        if affected > 0 {
            record_event(&tx, account, Some(name), "profile_deleted", None)?;
            tx.commit()?;
            tracing::info!(account = %account, server = %name, "Server profile deleted");
        }

        Ok(affected > 0)
    }

    fn log_event(
        &self,
        account: &str,
        profile: Option<&str>,
        action: &str,
        details: Option<&str>,
    ) -> Result<(), StoreError> {
        record_event(self.db.conn(), account, profile, action, details)
    }

    fn audit_entries(&self, account: &str) -> Result<Vec<AuditEntry>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT account, profile, action, timestamp, details FROM audit_log
             WHERE account = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![account], |row| {
            Ok(AuditEntry {
                account: row.get(0)?,
                profile: row.get(1)?,
                action: row.get(2)?,
                timestamp: parse_timestamp(row, 3)?,
                details: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
