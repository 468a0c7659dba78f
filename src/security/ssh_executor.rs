//! Typed SSH remote execution with injection prevention
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: only pre-approved remote programs run
//! - **Injection prevention**: arguments go through `tokio::process::Command`
//!   as a vector, never interpolated into a shell string
//! - **Non-interactive**: `BatchMode=yes`, so a missing key fails fast
//!   instead of hanging on a password prompt
//! - **Timeout control**: connect timeout on the SSH side plus an overall
//!   command timeout

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Remote programs allowed to run over SSH
const ALLOWED_REMOTE_PROGRAMS: &[&str] = &["mkdir", "test"];

/// Exit status OpenSSH uses for connection and authentication failure
const SSH_CONNECTION_FAILURE: i32 = 255;

/// Errors that can occur during remote execution
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Program is not in the allowed whitelist
    #[error("Remote program '{0}' is not in the allowed whitelist")]
    ProgramNotAllowed(String),

    /// The local ssh client could not be started
    #[error("Failed to spawn ssh: {0}")]
    SpawnFailed(String),

    /// SSH could not reach or authenticate against the host
    #[error("Connection to {host} failed: {detail}")]
    ConnectionFailed { host: String, detail: String },

    /// The remote command ran and exited non-zero
    #[error("Remote command exited with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    /// The command exceeded the overall timeout
    #[error("Remote command timeout after {0:?}")]
    Timeout(Duration),
}

/// Port for the deploy host, so the orchestrator tests without a network
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Ensure `path` exists as a directory on the remote host
    async fn ensure_dir(&self, path: &Path) -> Result<(), RemoteError>;
}

/// Deploy host reached over OpenSSH
#[derive(Debug, Clone)]
pub struct SshRemoteHost {
    host: String,
    user: String,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl SshRemoteHost {
    /// Create a remote host handle
    ///
    /// # Arguments
    ///
    /// * `user` - SSH user on the deploy host
    /// * `host` - Deploy host name or address
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
        }
    }

    /// Set the overall command timeout
    pub fn set_command_timeout(&mut self, command_timeout: Duration) {
        self.command_timeout = command_timeout;
    }

    /// SSH destination as `user@host`
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Run a whitelisted program on the remote host
    ///
    /// Arguments are passed as a vector and never interpolated into a shell
    /// string, so values containing spaces or metacharacters cannot change
    /// the command being run locally.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<(), RemoteError> {
        if !ALLOWED_REMOTE_PROGRAMS.contains(&program) {
            return Err(RemoteError::ProgramNotAllowed(program.to_string()));
        }

        let mut command = Command::new("ssh");
        command
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.connect_timeout.as_secs()
            ))
            .arg(self.destination())
            .arg("--")
            .arg(program)
            .args(args);

        let output = timeout(self.command_timeout, command.output())
            .await
            .map_err(|_| RemoteError::Timeout(self.command_timeout))?
            .map_err(|e| RemoteError::SpawnFailed(e.to_string()))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(SSH_CONNECTION_FAILURE) => Err(RemoteError::ConnectionFailed {
                host: self.host.clone(),
                detail: stderr,
            }),
            Some(status) => Err(RemoteError::CommandFailed { status, stderr }),
            None => Err(RemoteError::CommandFailed {
                status: -1,
                stderr,
            }),
        }
    }

}

#[async_trait]
impl RemoteHost for SshRemoteHost {
    async fn ensure_dir(&self, path: &Path) -> Result<(), RemoteError> {
        let dir = path.to_string_lossy();
        self.run("mkdir", &["-p", dir.as_ref()]).await
    }
}
