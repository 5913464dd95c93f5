// Hostkeep - Command responses
//
// Every command ends in exactly one `Response`: a JSON payload or plain text
// for stdout, or a diagnostic for stderr, plus the process exit code.
// Errors are rendered here so no raw driver failure escapes unformatted.

use clap::CommandFactory;
use serde_json::{json, Value};

use crate::error::HostkeepError;
use crate::store::StoreError;

use super::Cli;

/// Where and how the response is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Pretty-printed JSON on stdout.
    Json(Value),
    /// Plain text on stdout.
    Text(String),
    /// Diagnostic or usage text on stderr.
    Diagnostic(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Body,
    pub exit_code: i32,
}

impl Response {
    pub fn ok(value: Value) -> Self {
        Self {
            body: Body::Json(value),
            exit_code: 0,
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self {
            body: Body::Text(message.into()),
            exit_code: 0,
        }
    }

    /// `{"error": message}` with a failing exit code.
    pub fn error(message: &str) -> Self {
        Self {
            body: Body::Json(json!({ "error": message })),
            exit_code: 1,
        }
    }

    /// `{"error": message, "details": details}` with a failing exit code.
    pub fn error_with_details(message: &str, details: &str) -> Self {
        Self {
            body: Body::Json(json!({ "error": message, "details": details })),
            exit_code: 1,
        }
    }

    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self {
            body: Body::Diagnostic(message.into()),
            exit_code: 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// The JSON payload, if this response carries one.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Render an operation failure.
    pub fn from_error(err: &HostkeepError) -> Self {
        match err {
            HostkeepError::Store(e) if e.is_connection() => {
                Self::diagnostic(format!("DB connection failed: {}", e))
            }
            HostkeepError::Store(StoreError::AccountNotFound(_)) => Self::error("Account not found"),
            HostkeepError::Store(StoreError::DuplicateAccount(_)) => {
                Self::error("Account already exists")
            }
            HostkeepError::Store(StoreError::DuplicateProfile { .. }) => {
                Self::error("Server already exists")
            }
            HostkeepError::Store(e) => Self::error_with_details("Database error", &e.to_string()),
            HostkeepError::Probe(e) => Self::error_with_details("Probe failed", &e.to_string()),
            HostkeepError::Validation(msg) => {
                let usage = Cli::command().render_usage();
                Self::diagnostic(format!("{}\n\n{}", msg, usage))
            }
        }
    }

    /// Write the response to stdout or stderr.
    pub fn emit(&self) {
        match &self.body {
            Body::Json(value) => {
                let rendered =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                println!("{}", rendered);
            }
            Body::Text(text) => println!("{}", text),
            Body::Diagnostic(text) => eprintln!("{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_payload_shape() {
        let resp = Response::error("ssh Server not found");
        assert_eq!(resp.exit_code, 1);
        assert_eq!(resp.json().unwrap(), &json!({ "error": "ssh Server not found" }));
    }

    #[test]
    fn test_connection_failure_goes_to_stderr() {
        let err = HostkeepError::Store(StoreError::NotInitialized(PathBuf::from("/x.db")));
        let resp = Response::from_error(&err);

        assert_eq!(resp.exit_code, 1);
        match resp.body {
            Body::Diagnostic(text) => assert!(text.starts_with("DB connection failed")),
            other => panic!("Expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_includes_usage() {
        let resp = Response::from_error(&HostkeepError::Validation("missing --host".into()));
        match resp.body {
            Body::Diagnostic(text) => {
                assert!(text.contains("missing --host"));
                assert!(text.contains("Usage"));
            }
            other => panic!("Expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_profile_is_structured() {
        let err = HostkeepError::Store(StoreError::DuplicateProfile {
            account: "a".into(),
            name: "n".into(),
        });
        let resp = Response::from_error(&err);
        assert_eq!(resp.json().unwrap()["error"], "Server already exists");
        assert!(!resp.is_success());
    }
}
