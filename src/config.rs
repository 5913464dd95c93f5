// Hostkeep - Configuration
//
// Runtime settings resolved from global CLI flags, their environment
// variables, and platform defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::probe::ExternalProber;

/// Default checker executable, looked up on PATH.
pub const DEFAULT_PROBER: &str = "ssh-check";

/// Default time the checker may run before the host counts as unreachable.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Space-separated leading checker arguments, used when no `--prober-arg`
/// flag is given.
pub const PROBER_ARGS_ENV: &str = "HOSTKEEP_PROBER_ARGS";

/// Default directory for Hostkeep data files.
pub fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("hostkeep")
}

/// Default path of the profile database.
pub fn default_db_path() -> PathBuf {
    data_dir().join("hostkeep.db")
}

/// Split a `HOSTKEEP_PROBER_ARGS` value on whitespace.
pub fn split_prober_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Leading checker arguments from the environment, empty when unset.
pub fn prober_args_from_env() -> Vec<String> {
    std::env::var(PROBER_ARGS_ENV)
        .map(|raw| split_prober_args(&raw))
        .unwrap_or_default()
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub prober: ProberSettings,
}

/// How to run the external reachability checker.
#[derive(Debug, Clone)]
pub struct ProberSettings {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
    pub timeout: Duration,
}

impl Default for ProberSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROBER),
            leading_args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl ProberSettings {
    pub fn build(&self) -> ExternalProber {
        ExternalProber::new(
            self.program.clone(),
            self.leading_args.clone(),
            self.timeout,
        )
    }
}

impl Settings {
    /// Settings for the given database with default prober options.
    pub fn with_db(db_path: PathBuf) -> Self {
        Self {
            db_path,
            prober: ProberSettings::default(),
        }
    }
}
