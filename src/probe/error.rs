// Hostkeep - Prober error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to start prober '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prober I/O error: {0}")]
    Io(#[from] std::io::Error),
}
