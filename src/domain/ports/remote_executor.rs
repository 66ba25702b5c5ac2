//! Remote Executor port
//!
//! Opens a session to a host and runs commands or tree copies through it.
//! A session belongs to exactly one logical operation and is released when
//! dropped, on success and error paths alike.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::domain::value_objects::Host;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Host unreachable or authentication refused
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("command `{command}` exited with {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("command timed out after {}s: {command}", after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a tolerant command run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Opens sessions to fleet hosts
pub trait RemoteExecutor: Send + Sync {
    fn connect(&self, host: &Host) -> RemoteResult<Box<dyn Session>>;
}

/// One open channel to a host
///
/// Only `run_tolerant` and `copy_tree` are required; the typed helpers
/// are expressed as shell commands through `run` and may be overridden
/// by implementations that have a cheaper path.
pub trait Session: Send {
    fn host(&self) -> &Host;

    /// Run a command and return its output whatever the exit code
    fn run_tolerant(&self, command: &str) -> RemoteResult<CommandOutput>;

    /// Copy a local file or directory tree to `remote`
    fn copy_tree(&self, local: &Path, remote: &Path) -> RemoteResult<()>;

    /// Run a command, failing on non-zero exit
    fn run(&self, command: &str) -> RemoteResult<String> {
        let output = self.run_tolerant(command)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(RemoteError::CommandFailed {
                command: command.to_string(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    fn exists(&self, remote: &Path) -> RemoteResult<bool> {
        let output = self.run_tolerant(&format!("test -e {}", shell_quote_path(remote)))?;
        Ok(output.success())
    }

    fn create_dir_all(&self, remote: &Path) -> RemoteResult<()> {
        self.run(&format!("mkdir -p {}", shell_quote_path(remote)))
            .map(|_| ())
    }

    /// Create an empty file, leaving an existing one untouched
    fn touch(&self, remote: &Path) -> RemoteResult<()> {
        self.run(&format!("touch {}", shell_quote_path(remote)))
            .map(|_| ())
    }

    /// `rm -rf`; a missing path is not an error
    fn remove_all(&self, remote: &Path) -> RemoteResult<()> {
        self.run(&format!("rm -rf {}", shell_quote_path(remote)))
            .map(|_| ())
    }

    /// Copy a tree within the host
    fn copy_remote(&self, from: &Path, to: &Path) -> RemoteResult<()> {
        self.run(&format!(
            "cp -a {} {}",
            shell_quote_path(from),
            shell_quote_path(to)
        ))
        .map(|_| ())
    }

    /// TCP ports currently in LISTEN state on the host
    fn listening_ports(&self) -> RemoteResult<BTreeSet<u16>> {
        let stdout = self.run("ss -Htln")?;
        Ok(parse_listening_ports(&stdout))
    }
}

/// Quote a string for a POSIX shell
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

pub fn shell_quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

/// Parse `ss -Htln` output into the set of local listening ports
///
/// Each line is `State Recv-Q Send-Q Local:Port Peer:Port`; the local
/// address may be IPv6 (`[::]:7000`) or carry an interface (`*%lo:53`).
pub fn parse_listening_ports(output: &str) -> BTreeSet<u16> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(3))
        .filter_map(|local| local.rsplit_once(':'))
        .filter_map(|(_, port)| port.parse().ok())
        .collect()
}
