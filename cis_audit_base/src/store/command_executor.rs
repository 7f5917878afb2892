//! Command execution with security controls for registry collection
//!
//! Only whitelisted programs run. Children get an empty environment apart from a
//! restricted PATH, no stdin, and are killed once their timeout expires.

use std::collections::HashSet;
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    default_timeout: Duration,
    allowed_commands: HashSet<String>,
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl SystemCommandExecutor {
    /// Executor with an empty whitelist; nothing runs until a program is allowed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            allowed_commands: HashSet::new(),
        }
    }

    /// Executor allowed to run `reg.exe` only
    pub fn for_registry_queries(timeout: Duration) -> Self {
        Self::with_timeout(timeout).allow("reg")
    }

    pub fn allow(mut self, program: impl Into<String>) -> Self {
        self.allowed_commands.insert(program.into());
        self
    }

    pub fn is_allowed(&self, program: &str) -> bool {
        self.allowed_commands.contains(program)
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `program` and capture its output; `timeout` overrides the default
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            return Err(CommandError::SecurityViolation {
                reason: format!("Command '{}' not in whitelist", program),
            });
        }

        let limit = timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();
        let mut child = spawn_restricted(program, args)
            .map_err(|e| CommandError::from_io(program, e))?;

        // A child blocked on a full pipe never exits, so both pipes drain while waiting
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let exit = match child.wait_timeout(limit) {
            Ok(Some(exit)) => exit,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::from_io(program, e));
            }
        };

        Ok(CommandOutput {
            stdout: collect(program, stdout)?,
            stderr: collect(program, stderr)?,
            exit_code: exit.code().unwrap_or(-1),
            duration: started.elapsed(),
        })
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

fn collect(program: &str, reader: JoinHandle<Vec<u8>>) -> Result<String, CommandError> {
    let bytes = reader.join().map_err(|_| CommandError::ExecutionFailed {
        program: program.to_string(),
        reason: "output reader panicked".to_string(),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn spawn_restricted(program: &str, args: &[&str]) -> io::Result<Child> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env_clear()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    apply_restricted_environment(&mut cmd);
    cmd.spawn()
}

#[cfg(windows)]
fn apply_restricted_environment(cmd: &mut Command) {
    let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".to_string());
    cmd.env("PATH", format!(r"{}\System32", system_root))
        .env("SystemRoot", system_root);
}

#[cfg(not(windows))]
fn apply_restricted_environment(cmd: &mut Command) {
    cmd.env("PATH", "/usr/bin:/bin:/usr/sbin:/sbin");
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command '{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },
}

impl CommandError {
    fn from_io(program: &str, error: io::Error) -> Self {
        let program = program.to_string();
        match error.kind() {
            io::ErrorKind::NotFound => CommandError::ProgramNotFound { program },
            io::ErrorKind::PermissionDenied => CommandError::PermissionDenied { program },
            _ => CommandError::ExecutionFailed {
                program,
                reason: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_allows_nothing() {
        let executor = SystemCommandExecutor::default();
        assert!(!executor.is_allowed("reg"));
        assert_eq!(executor.default_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_registry_whitelist() {
        let executor = SystemCommandExecutor::for_registry_queries(Duration::from_secs(3));
        assert!(executor.is_allowed("reg"));
        assert!(!executor.is_allowed("powershell"));
        assert_eq!(executor.default_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_security_violation() {
        let executor = SystemCommandExecutor::for_registry_queries(Duration::from_secs(1));
        assert_matches!(
            executor.execute("cmd", &["/c", "del", "*"], None),
            Err(CommandError::SecurityViolation { .. })
        );
    }

    #[test]
    fn test_missing_program() {
        let executor = SystemCommandExecutor::with_timeout(Duration::from_secs(1))
            .allow("cis-audit-no-such-program");
        assert_matches!(
            executor.execute("cis-audit-no-such-program", &[], None),
            Err(CommandError::ProgramNotFound { .. })
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_output_larger_than_pipe_buffer() {
        let executor = SystemCommandExecutor::with_timeout(Duration::from_secs(10)).allow("head");

        let output = executor
            .execute("head", &["-c", "200000", "/dev/zero"], None)
            .unwrap();
        assert!(output.succeeded());
        assert_eq!(output.stdout.len(), 200_000);
        assert!(output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let executor =
            SystemCommandExecutor::with_timeout(Duration::from_millis(200)).allow("sleep");

        let started = Instant::now();
        assert_matches!(
            executor.execute("sleep", &["5"], None),
            Err(CommandError::Timeout { timeout_ms: 200, .. })
        );
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_io_error_mapping() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_matches!(
            CommandError::from_io("reg", denied),
            CommandError::PermissionDenied { .. }
        );

        let other = io::Error::new(io::ErrorKind::Other, "broken pipe");
        assert_matches!(
            CommandError::from_io("reg", other),
            CommandError::ExecutionFailed { ref reason, .. } if reason == "broken pipe"
        );
    }
}
