// Hostkeep - Store error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database not initialized at {0} (run `hostkeep init` first)")]
    NotInitialized(PathBuf),

    #[error("Failed to open database: {0}")]
    Connection(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Server '{name}' already exists for account {account}")]
    DuplicateProfile { account: String, name: String },
}

impl StoreError {
    /// True when the store could not be reached at all, as opposed to a
    /// failure of an individual statement.
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::NotInitialized(_) | StoreError::Connection(_))
    }
}
