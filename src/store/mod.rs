// Hostkeep - Store Module
//
// SQLite-backed storage for accounts and their server profiles. Every
// mutation is a single statement and is recorded in the audit log.

mod db;
mod error;
mod models;
mod repository;

pub use db::Database;
pub use error::StoreError;
pub use models::{AuditEntry, NewProfile, Profile, ProfileConfig};
pub use repository::{ProfileStore, SqliteProfileStore};
