// Hostkeep - Token Authority
//
// Issues and validates the bearer tokens that gate full profile disclosure.
//
// Tokens are account scoped: one token is shared by every profile of an
// account. Rotation rewrites all of the account's rows in one statement and
// newly added profiles inherit the current value (see the store's insert).
// Only the SHA-256 digest is persisted; the raw token is shown once.

use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::store::{Profile, ProfileStore, StoreError};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Characters a token is drawn from (digits, lower and upper case letters).
pub const TOKEN_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Token length used by `update-token`.
pub const DEFAULT_TOKEN_LENGTH: usize = 64;

// ─── Generation ──────────────────────────────────────────────────────────────

/// Generate a token from the thread-local CSPRNG.
pub fn generate(length: usize) -> Zeroizing<String> {
    generate_with(&mut rand::rng(), length)
}

/// Generate a token from the given RNG. The `CryptoRng` bound keeps
/// predictable generators out of the only disclosure gate we have.
pub fn generate_with<R: CryptoRng>(rng: &mut R, length: usize) -> Zeroizing<String> {
    let mut token = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        let idx = rng.random_range(0..TOKEN_ALPHABET.len());
        token.push(char::from(TOKEN_ALPHABET[idx]));
    }
    token
}

/// SHA-256 hex digest of a token, the form persisted in the store.
pub fn digest(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Outcome of checking a presented token against a stored profile.
#[derive(Debug)]
pub enum TokenCheck {
    /// The profile exists and the token matches.
    Match(Profile),
    /// The profile exists but the token is wrong, empty, or was never issued.
    Mismatch,
    /// No profile with that (account, name).
    NoSuchProfile,
}

pub struct TokenAuthority<'a, S: ProfileStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ProfileStore + ?Sized> TokenAuthority<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Generate a fresh token and persist it for the account.
    ///
    /// Returns `None` when the account has no profiles: nothing was stored,
    /// so the token would be useless and is not handed out.
    pub fn issue(&self, account: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        let token = generate(DEFAULT_TOKEN_LENGTH);
        let updated = self.assign(account, &token)?;

        if updated == 0 {
            tracing::warn!(account = %account, "Token not issued: account has no servers");
            return Ok(None);
        }

        tracing::info!(account = %account, profiles = updated, "Account token rotated");
        Ok(Some(token))
    }

    /// Persist `token` for every profile of the account.
    pub fn assign(&self, account: &str, token: &str) -> Result<usize, StoreError> {
        self.store.set_account_token(account, &digest(token))
    }

    /// Check `presented` against the stored token of (account, name).
    ///
    /// An empty presented token never matches, whether or not a token was
    /// ever issued.
    pub fn validate(
        &self,
        account: &str,
        name: &str,
        presented: &str,
    ) -> Result<TokenCheck, StoreError> {
        if !presented.is_empty() {
            if let Some(profile) =
                self.store.find_with_token(account, name, &digest(presented))?
            {
                return Ok(TokenCheck::Match(profile));
            }
        }

        match self.store.find(account, name)? {
            Some(_) => Ok(TokenCheck::Mismatch),
            None => Ok(TokenCheck::NoSuchProfile),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
