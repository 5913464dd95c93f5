// Hostkeep - Token Module
//
// Bearer tokens that gate full profile disclosure: CSPRNG generation,
// account-wide rotation and tri-state validation.

mod authority;

pub use authority::{
    digest, generate, generate_with, TokenAuthority, TokenCheck, DEFAULT_TOKEN_LENGTH,
    TOKEN_ALPHABET,
};
