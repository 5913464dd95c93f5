// Hostkeep - Reachability Prober
//
// Runs the external connectivity checker against a stored profile and
// classifies what it prints. The six profile fields are handed over as
// separate argv entries (`--name <v> --host <v> ...`); no shell ever sees
// them, so hostile host names or auth keys cannot inject commands.
//
// The checker runs under a timeout. The child is spawned with
// `kill_on_drop`, so it is killed on every path that abandons it.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::store::Profile;

use super::ProbeError;

/// Marker the checker prints on success.
const SUCCESS_MARKER: &str = "OK";

/// Details reported when the checker outlives its timeout.
pub const TIMEOUT_DETAIL: &str = "TIMEOUT";

/// The fields of a profile the checker needs.
#[derive(Clone)]
pub struct ProbeTarget {
    pub name: String,
    pub host: String,
    pub username: String,
    pub port: u16,
    pub auth_key: String,
    pub key_path: String,
}

impl ProbeTarget {
    /// Named parameters in the order the checker expects them.
    pub fn args(&self) -> Vec<String> {
        vec![
            "--name".to_string(),
            self.name.clone(),
            "--host".to_string(),
            self.host.clone(),
            "--user".to_string(),
            self.username.clone(),
            "--port".to_string(),
            self.port.to_string(),
            "--auth".to_string(),
            self.auth_key.clone(),
            "--key".to_string(),
            self.key_path.clone(),
        ]
    }
}

impl From<&Profile> for ProbeTarget {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            host: profile.host.clone(),
            username: profile.username.clone(),
            port: profile.port,
            auth_key: profile.auth_key().to_string(),
            key_path: profile.key_path.clone(),
        }
    }
}

impl fmt::Debug for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTarget")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("port", &self.port)
            .field("auth_key", &"[REDACTED]")
            .field("key_path", &self.key_path)
            .finish()
    }
}

/// Classified result of one checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable { details: String },
}

/// Classify the combined stdout+stderr of the checker. Unreachable outcomes
/// carry the output unmodified.
pub fn classify(output: &str) -> ProbeOutcome {
    if output.contains(SUCCESS_MARKER) {
        ProbeOutcome::Reachable
    } else {
        ProbeOutcome::Unreachable {
            details: output.to_string(),
        }
    }
}

/// Invokes the external checker executable.
#[derive(Debug, Clone)]
pub struct ExternalProber {
    program: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl ExternalProber {
    /// `leading_args` go before the named parameters, e.g. the checker
    /// path when `program` is `sudo`.
    pub fn new(program: PathBuf, leading_args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            leading_args,
            timeout,
        }
    }

    /// Build the checker invocation for `target`.
    pub fn command(&self, target: &ProbeTarget) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(target.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run the checker and classify its output.
    pub async fn probe(&self, target: &ProbeTarget) -> Result<ProbeOutcome, ProbeError> {
        let child = self.command(target).spawn().map_err(|e| ProbeError::Spawn {
            program: self.program.display().to_string(),
            source: e,
        })?;

        tracing::debug!(server = %target.name, host = %target.host, "Prober started");

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                let outcome = classify(&combined);
                tracing::debug!(
                    server = %target.name,
                    status = ?output.status.code(),
                    reachable = (outcome == ProbeOutcome::Reachable),
                    "Prober finished"
                );
                Ok(outcome)
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => {
                // Dropping the wait future dropped the child, which kills it.
                tracing::warn!(
                    server = %target.name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Prober timed out"
                );
                Ok(ProbeOutcome::Unreachable {
                    details: TIMEOUT_DETAIL.to_string(),
                })
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn target() -> ProbeTarget {
        ProbeTarget {
            name: "web1".to_string(),
            host: "example.com".to_string(),
            username: "root".to_string(),
            port: 22,
            auth_key: "secretA".to_string(),
            key_path: "/keys/id".to_string(),
        }
    }

    /// Run `script` through /bin/sh so the test never execs a freshly
    /// written file.
    fn sh_prober(dir: &Path, script: &str, timeout: Duration) -> ExternalProber {
        let path = dir.join("check.sh");
        std::fs::write(&path, script).unwrap();
        ExternalProber::new(
            PathBuf::from("/bin/sh"),
            vec![path.display().to_string()],
            timeout,
        )
    }

    #[test]
    fn test_classify_ok_anywhere_is_reachable() {
        assert_eq!(classify("connection OK"), ProbeOutcome::Reachable);
        assert_eq!(classify("warn: slow\nOK\n"), ProbeOutcome::Reachable);
    }

    #[test]
    fn test_classify_without_marker_is_unreachable() {
        assert_eq!(
            classify("refused"),
            ProbeOutcome::Unreachable {
                details: "refused".to_string()
            }
        );
        assert_eq!(
            classify("ok, lowercase\n"),
            ProbeOutcome::Unreachable {
                details: "ok, lowercase\n".to_string()
            }
        );
    }

    #[test]
    fn test_args_are_discrete_named_parameters() {
        assert_eq!(
            target().args(),
            vec![
                "--name", "web1", "--host", "example.com", "--user", "root", "--port", "22",
                "--auth", "secretA", "--key", "/keys/id"
            ]
        );
    }

    #[test]
    fn test_command_keeps_hostile_values_as_single_arguments() {
        let mut hostile = target();
        hostile.host = "example.com; rm -rf /".to_string();
        hostile.auth_key = "$(touch /tmp/pwned)".to_string();

        let prober = ExternalProber::new(
            PathBuf::from("/usr/local/bin/ssh-check"),
            vec![],
            Duration::from_secs(1),
        );
        let cmd = prober.command(&hostile);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "/usr/local/bin/ssh-check");
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args.len(), 12);
        assert_eq!(args[3], "example.com; rm -rf /");
        assert_eq!(args[9], "$(touch /tmp/pwned)");
    }

    #[test]
    fn test_leading_args_come_first() {
        let prober = ExternalProber::new(
            PathBuf::from("sudo"),
            vec!["/opt/checks/ssh_check.sh".to_string()],
            Duration::from_secs(1),
        );
        let cmd = prober.command(&target());
        let first: Vec<_> = cmd.as_std().get_args().take(2).collect();
        assert_eq!(first, vec!["/opt/checks/ssh_check.sh", "--name"]);
    }

    #[test]
    fn test_target_debug_redacts_auth_key() {
        assert!(!format!("{:?}", target()).contains("secretA"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let prober = sh_prober(dir.path(), "echo 'connection OK'\n", Duration::from_secs(10));

        assert_eq!(prober.probe(&target()).await.unwrap(), ProbeOutcome::Reachable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_unreachable_carries_output() {
        let dir = tempfile::tempdir().unwrap();
        let prober = sh_prober(dir.path(), "printf refused\nexit 3\n", Duration::from_secs(10));

        assert_eq!(
            prober.probe(&target()).await.unwrap(),
            ProbeOutcome::Unreachable {
                details: "refused".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_reads_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let prober = sh_prober(dir.path(), "echo OK >&2\n", Duration::from_secs(10));

        assert_eq!(prober.probe(&target()).await.unwrap(), ProbeOutcome::Reachable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_passes_arguments_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let args_file = dir.path().join("args.txt");
        let marker = dir.path().join("pwned");
        let script = format!(
            "printf '%s\\n' \"$@\" > '{}'\necho OK\n",
            args_file.display()
        );
        let prober = sh_prober(dir.path(), &script, Duration::from_secs(10));

        let mut hostile = target();
        hostile.auth_key = format!("x; touch {}", marker.display());
        hostile.host = format!("$(touch {})", marker.display());

        assert_eq!(prober.probe(&hostile).await.unwrap(), ProbeOutcome::Reachable);

        let recorded = std::fs::read_to_string(&args_file).unwrap();
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(lines, hostile.args().iter().map(String::as_str).collect::<Vec<_>>());
        assert!(!marker.exists(), "Field values must never reach a shell");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_timeout_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let prober = sh_prober(dir.path(), "exec sleep 30\n", Duration::from_millis(200));

        let started = std::time::Instant::now();
        let outcome = prober.probe(&target()).await.unwrap();

        assert_eq!(
            outcome,
            ProbeOutcome::Unreachable {
                details: TIMEOUT_DETAIL.to_string()
            }
        );
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let prober = ExternalProber::new(
            PathBuf::from("/nonexistent/hostkeep-checker"),
            vec![],
            Duration::from_secs(1),
        );

        assert!(matches!(
            prober.probe(&target()).await,
            Err(ProbeError::Spawn { .. })
        ));
    }
}
