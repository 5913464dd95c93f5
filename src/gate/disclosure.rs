// Hostkeep - Disclosure Gate
//
// Decides what a caller may see about a stored profile:
//   - account only           -> profile names, never credentials
//   - account + name + token -> NotFound / TokenInvalid / Disclosed(config)
//
// The existence check is kept apart from the token check so callers can tell
// "no such server" from "wrong token". Both still withhold every field.

use crate::store::{ProfileConfig, ProfileStore, StoreError};
use crate::token::{TokenAuthority, TokenCheck};

/// Result of a full-config request.
#[derive(Debug, PartialEq, Eq)]
pub enum Disclosure {
    Disclosed(ProfileConfig),
    TokenInvalid,
    NotFound,
}

pub struct DisclosureGate<'a, S: ProfileStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ProfileStore + ?Sized> DisclosureGate<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Names of the account's profiles. Needs no token.
    pub fn list_names(&self, account: &str) -> Result<Vec<String>, StoreError> {
        self.store.list_names(account)
    }

    /// Full connection config for (account, name), if `token` is valid.
    pub fn disclose(
        &self,
        account: &str,
        name: &str,
        token: &str,
    ) -> Result<Disclosure, StoreError> {
        match TokenAuthority::new(self.store).validate(account, name, token)? {
            TokenCheck::Match(profile) => {
                self.store
                    .log_event(account, Some(name), "config_disclosed", None)?;
                tracing::info!(account = %account, server = %name, "Server config disclosed");
                Ok(Disclosure::Disclosed(profile.to_config()))
            }
            TokenCheck::Mismatch => {
                self.store
                    .log_event(account, Some(name), "token_rejected", None)?;
                tracing::warn!(account = %account, server = %name, "Invalid token presented");
                Ok(Disclosure::TokenInvalid)
            }
            TokenCheck::NoSuchProfile => {
                tracing::debug!(account = %account, server = %name, "Server not found");
                Ok(Disclosure::NotFound)
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
