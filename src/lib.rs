// Hostkeep - Library root
//
// Re-exports the store, token, gate, probe, and CLI modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod probe;
pub mod store;
pub mod token;

pub use error::{HostkeepError, Result};
