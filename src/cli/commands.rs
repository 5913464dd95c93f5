// Hostkeep - CLI Command Handlers
//
// Each function handles one subcommand. A handler opens the store, performs
// a single logical operation through the gate, token authority, or store,
// and returns the response to print. The database handle lives for the
// duration of the handler and is closed when it returns.

use serde_json::json;

use crate::config::Settings;
use crate::error::HostkeepError;
use crate::gate::{Disclosure, DisclosureGate};
use crate::probe::{ProbeOutcome, ProbeTarget};
use crate::store::{Database, NewProfile, ProfileStore, SqliteProfileStore};
use crate::token::TokenAuthority;

use super::{Cli, Commands, Response};

const NO_SERVERS: &str = "No servers found for this account";
const SERVER_NOT_FOUND: &str = "ssh Server not found";
const TOKEN_INVALID: &str = "TOKEN INVALID please try again";

/// Execute the parsed CLI invocation.
pub async fn execute(cli: Cli) -> Response {
    let settings = cli.settings();
    run(&settings, cli.command).await
}

/// Run one command against the given settings. Failures are rendered into
/// the response rather than returned.
pub async fn run(settings: &Settings, command: Commands) -> Response {
    match dispatch(settings, command).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("{}", e);
            Response::from_error(&e)
        }
    }
}

async fn dispatch(settings: &Settings, command: Commands) -> Result<Response, HostkeepError> {
    match command {
        Commands::Init => cmd_init(settings),
        Commands::AccountAdd { account } => cmd_account_add(settings, account),
        Commands::List { account } => cmd_list(settings, account),
        Commands::Get {
            account,
            server,
            token,
        } => cmd_get(settings, account, server, token),
        Commands::Add {
            account,
            name,
            host,
            port,
            user,
            ssh_key,
            auth_key,
        } => cmd_add(
            settings,
            NewProfile {
                account,
                name,
                host,
                username: user,
                port,
                key_path: ssh_key,
                auth_key,
            },
        ),
        Commands::UpdateToken { account } => cmd_update_token(settings, account),
        Commands::UpdateAuthkey {
            account,
            server,
            auth_key,
        } => cmd_update_authkey(settings, account, server, auth_key),
        Commands::Delete { account, server } => cmd_delete(settings, account, server),
        Commands::Test { account, server } => cmd_test(settings, account, server).await,
        Commands::Audit { account } => cmd_audit(settings, account),
    }
}

// ─── Init / Accounts ─────────────────────────────────────────────────────────

fn cmd_init(settings: &Settings) -> Result<Response, HostkeepError> {
    let _db = Database::create(&settings.db_path)?;

    tracing::info!(path = %settings.db_path.display(), "Database initialized");
    Ok(Response::ok(json!({
        "status": "initialized",
        "database": settings.db_path.display().to_string(),
    })))
}

fn cmd_account_add(settings: &Settings, account: String) -> Result<Response, HostkeepError> {
    require("account", &account)?;

    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);
    store.create_account(&account)?;

    Ok(Response::ok(json!({ "status": "created", "account": account })))
}

// ─── List / Get ──────────────────────────────────────────────────────────────

fn cmd_list(settings: &Settings, account: String) -> Result<Response, HostkeepError> {
    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    let names = DisclosureGate::new(&store).list_names(&account)?;
    if names.is_empty() {
        return Ok(Response::error(NO_SERVERS));
    }

    Ok(Response::ok(json!(names)))
}

fn cmd_get(
    settings: &Settings,
    account: String,
    server: String,
    token: String,
) -> Result<Response, HostkeepError> {
    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    let response = match DisclosureGate::new(&store).disclose(&account, &server, &token)? {
        Disclosure::Disclosed(config) => Response::ok(json!(config)),
        Disclosure::TokenInvalid => Response::error(TOKEN_INVALID),
        Disclosure::NotFound => Response::error(SERVER_NOT_FOUND),
    };

    Ok(response)
}

// ─── Add / Update / Delete ───────────────────────────────────────────────────

fn cmd_add(settings: &Settings, profile: NewProfile) -> Result<Response, HostkeepError> {
    require("account", &profile.account)?;
    require("name", &profile.name)?;
    require("host", &profile.host)?;
    require("user", &profile.username)?;
    require("ssh-key", &profile.key_path)?;
    require("auth-key", &profile.auth_key)?;

    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    let name = profile.name.clone();
    store.insert(profile)?;

    Ok(Response::ok(json!({ "status": "created", "name": name })))
}

fn cmd_update_token(settings: &Settings, account: String) -> Result<Response, HostkeepError> {
    require("account", &account)?;

    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    match TokenAuthority::new(&store).issue(&account)? {
        Some(token) => Ok(Response::ok(json!({ "token": token.as_str() }))),
        None => Ok(Response::error(NO_SERVERS)),
    }
}

fn cmd_update_authkey(
    settings: &Settings,
    account: String,
    server: String,
    auth_key: String,
) -> Result<Response, HostkeepError> {
    require("account", &account)?;
    require("server", &server)?;
    require("auth-key", &auth_key)?;

    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    if store.update_auth_key(&account, &server, &auth_key)? {
        Ok(Response::text("auth set"))
    } else {
        Ok(Response::error(SERVER_NOT_FOUND))
    }
}

fn cmd_delete(
    settings: &Settings,
    account: String,
    server: String,
) -> Result<Response, HostkeepError> {
    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    if store.delete(&account, &server)? {
        Ok(Response::ok(json!({ "status": "deleted", "name": server })))
    } else {
        Ok(Response::error(SERVER_NOT_FOUND))
    }
}

// ─── Test ────────────────────────────────────────────────────────────────────

async fn cmd_test(
    settings: &Settings,
    account: String,
    server: String,
) -> Result<Response, HostkeepError> {
    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    let target = match store.find(&account, &server)? {
        Some(profile) => ProbeTarget::from(&profile),
        None => return Ok(Response::error("Server not found")),
    };

    let outcome = settings.prober.build().probe(&target).await?;

    match outcome {
        ProbeOutcome::Reachable => {
            store.log_event(&account, Some(&server), "probe_reachable", None)?;
            tracing::info!(account = %account, server = %server, "Server reachable");
            Ok(Response::ok(json!({ "status": "success" })))
        }
        ProbeOutcome::Unreachable { details } => {
            store.log_event(&account, Some(&server), "probe_unreachable", None)?;
            tracing::warn!(account = %account, server = %server, "Server unreachable");
            Ok(Response::error_with_details("Connection failed", &details))
        }
    }
}

// ─── Audit ───────────────────────────────────────────────────────────────────

fn cmd_audit(settings: &Settings, account: String) -> Result<Response, HostkeepError> {
    let db = open_db(settings)?;
    let store = SqliteProfileStore::new(&db);

    let entries = store.audit_entries(&account)?;
    Ok(Response::ok(json!(entries)))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open the database. A missing or unreadable file aborts the command
/// before any operation runs.
fn open_db(settings: &Settings) -> Result<Database, HostkeepError> {
    Ok(Database::open(&settings.db_path)?)
}

fn require(option: &str, value: &str) -> Result<(), HostkeepError> {
    if value.trim().is_empty() {
        return Err(HostkeepError::Validation(format!(
            "Missing required option --{}",
            option
        )));
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
