// Hostkeep - Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (stdout is
// reserved for command payloads), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hostkeep::cli::{execute, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // RUST_LOG=hostkeep=debug for verbose output. No level ever logs
    // tokens or auth keys.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostkeep=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    let response = execute(cli).await;
    response.emit();
    std::process::exit(response.exit_code);
}
