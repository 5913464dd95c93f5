// Hostkeep - Top-level error types
//
// Aggregates errors from the store and probe modules into a single
// error enum for the command boundary.

use thiserror::Error;

/// Top-level error type for all Hostkeep operations.
#[derive(Debug, Error)]
pub enum HostkeepError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Probe error: {0}")]
    Probe(#[from] crate::probe::ProbeError),

    #[error("Invalid arguments: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, HostkeepError>;
