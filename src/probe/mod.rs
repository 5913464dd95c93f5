// Hostkeep - Reachability Probe Module
//
// Out-of-band connectivity check against a registered host, delegated to an
// external checker executable.

mod error;
mod prober;

pub use error::ProbeError;
pub use prober::{classify, ExternalProber, ProbeOutcome, ProbeTarget, TIMEOUT_DETAIL};
