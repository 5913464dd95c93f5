// Hostkeep - Profile data models
//
// SECURITY: `auth_key` and the stored token digest are private. They are
// never included in Debug output or log messages; the only serialized form
// that carries the auth key is `ProfileConfig`, which the disclosure gate
// hands out after a token match.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored server profile, as read from the database.
pub struct Profile {
    pub id: i64,
    pub account: String,
    pub name: String,
    pub host: String,
    pub username: String,
    pub port: u16,
    pub key_path: String,
    /// Secret passed to the remote checker. Never logged.
    auth_key: String,
    /// SHA-256 hex digest of the account token, if one was ever issued.
    token_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        account: String,
        name: String,
        host: String,
        username: String,
        port: u16,
        key_path: String,
        auth_key: String,
        token_digest: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account,
            name,
            host,
            username,
            port,
            key_path,
            auth_key,
            token_digest,
            created_at,
            updated_at,
        }
    }

    pub fn auth_key(&self) -> &str {
        &self.auth_key
    }

    pub fn token_digest(&self) -> Option<&str> {
        self.token_digest.as_deref()
    }

    /// The full connection config. Only the disclosure gate should call this.
    pub fn to_config(&self) -> ProfileConfig {
        ProfileConfig {
            name: self.name.clone(),
            username: self.username.clone(),
            host: self.host.clone(),
            port: self.port,
            ssh_key: self.key_path.clone(),
            auth_key: self.auth_key.clone(),
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("id", &self.id)
            .field("account", &self.account)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("port", &self.port)
            .field("key_path", &self.key_path)
            .field("auth_key", &"[REDACTED]")
            .field("token", &self.token_digest.as_ref().map(|_| "[REDACTED]"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}@{}:{})",
            self.name, self.username, self.host, self.port
        )
    }
}

/// The disclosed view of a profile: every connection field, auth key included.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProfileConfig {
    pub name: String,
    pub username: String,
    pub host: String,
    pub port: u16,
    pub ssh_key: String,
    pub auth_key: String,
}

impl fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssh_key", &self.ssh_key)
            .field("auth_key", &"[REDACTED]")
            .finish()
    }
}

/// Input struct for registering a new profile.
pub struct NewProfile {
    pub account: String,
    pub name: String,
    pub host: String,
    pub username: String,
    pub port: u16,
    pub key_path: String,
    pub auth_key: String,
}

/// One row of the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile::new(
            1,
            "acct-1".to_string(),
            "web1".to_string(),
            "example.com".to_string(),
            "deploy".to_string(),
            2222,
            "/keys/id".to_string(),
            "super-secret-auth".to_string(),
            Some("digest-value".to_string()),
            Utc::now(),
            Utc::now(),
        )
    }

    #[test]
    fn test_profile_debug_redacts_secrets() {
        let debug_output = format!("{:?}", sample_profile());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-auth"));
        assert!(!debug_output.contains("digest-value"));
    }

    #[test]
    fn test_profile_display_does_not_contain_secret() {
        let display_output = format!("{}", sample_profile());
        assert_eq!(display_output, "web1 (deploy@example.com:2222)");
    }

    #[test]
    fn test_config_carries_every_connection_field() {
        let config = sample_profile().to_config();
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["name"], "web1");
        assert_eq!(json["username"], "deploy");
        assert_eq!(json["host"], "example.com");
        assert_eq!(json["port"], 2222);
        assert_eq!(json["ssh_key"], "/keys/id");
        assert_eq!(json["auth_key"], "super-secret-auth");
        assert!(json.get("token").is_none(), "Token must never be disclosed");
    }

    #[test]
    fn test_config_debug_redacts_auth_key() {
        let debug_output = format!("{:?}", sample_profile().to_config());
        assert!(!debug_output.contains("super-secret-auth"));
    }
}
