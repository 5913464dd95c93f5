// Hostkeep - CLI Module
//
// Command-line interface using clap derive macros. Global flags (also read
// from HOSTKEEP_* environment variables) select the database and the
// reachability checker; subcommands map one-to-one onto store operations.

mod commands;
mod response;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{
    default_db_path, prober_args_from_env, ProberSettings, Settings, DEFAULT_PROBER,
    DEFAULT_PROBE_TIMEOUT_SECS,
};

pub use commands::{execute, run};
pub use response::{Body, Response};

/// Hostkeep: a registry of SSH server profiles with token-gated disclosure.
#[derive(Parser, Debug)]
#[command(name = "hostkeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the profile database.
    #[arg(long, global = true, env = "HOSTKEEP_DB")]
    pub db: Option<PathBuf>,

    /// Reachability checker executable.
    #[arg(long, global = true, env = "HOSTKEEP_PROBER", default_value = DEFAULT_PROBER)]
    pub prober: PathBuf,

    /// Extra argument placed before the checker's named parameters
    /// (repeatable). Falls back to the space-separated HOSTKEEP_PROBER_ARGS.
    #[arg(long = "prober-arg", global = true, allow_hyphen_values = true)]
    pub prober_args: Vec<String>,

    /// Seconds the checker may run before the host counts as unreachable.
    #[arg(long, global = true, env = "HOSTKEEP_PROBE_TIMEOUT", default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the global flags into runtime settings.
    pub fn settings(&self) -> Settings {
        Settings {
            db_path: self.db.clone().unwrap_or_else(default_db_path),
            prober: ProberSettings {
                program: self.prober.clone(),
                leading_args: if self.prober_args.is_empty() {
                    prober_args_from_env()
                } else {
                    self.prober_args.clone()
                },
                timeout: Duration::from_secs(self.probe_timeout),
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the profile database.
    Init,

    /// Provision an account so profiles can be registered for it.
    AccountAdd {
        /// External account identifier (e.g. a chat user id).
        account: String,
    },

    /// List the names of an account's servers (no token needed).
    List {
        /// External account identifier.
        account: String,
    },

    /// Show the full config of one server. Requires the account token.
    Get {
        /// External account identifier.
        account: String,

        /// Server profile name.
        server: String,

        /// Bearer token issued by `update-token`.
        #[arg(long, default_value = "")]
        token: String,
    },

    /// Register a new server profile.
    Add {
        /// External account identifier.
        #[arg(long)]
        account: String,

        /// Profile name, unique per account.
        #[arg(long)]
        name: String,

        /// Remote host name or address.
        #[arg(long)]
        host: String,

        /// SSH port.
        #[arg(long, default_value_t = 22, value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// SSH user name.
        #[arg(long, default_value = "root")]
        user: String,

        /// Path of the private key file (the key itself is never stored).
        #[arg(long)]
        ssh_key: String,

        /// Auth key handed to the reachability checker.
        #[arg(long)]
        auth_key: String,
    },

    /// Generate a new token for every server of an account.
    UpdateToken {
        /// External account identifier.
        #[arg(long)]
        account: String,
    },

    /// Replace the auth key of one server.
    UpdateAuthkey {
        /// External account identifier.
        #[arg(long)]
        account: String,

        /// Server profile name.
        #[arg(long)]
        server: String,

        /// New auth key.
        #[arg(long)]
        auth_key: String,
    },

    /// Delete a server profile.
    Delete {
        /// External account identifier.
        account: String,

        /// Server profile name.
        server: String,
    },

    /// Run the reachability checker against a server.
    Test {
        /// External account identifier.
        account: String,

        /// Server profile name.
        server: String,
    },

    /// View the audit log of an account.
    Audit {
        /// External account identifier.
        account: String,
    },
}
