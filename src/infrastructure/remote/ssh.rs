//! SSH Remote Executor
//!
//! Each session opens an SSH ControlMaster connection whose socket lives
//! in a private temp directory. Commands and transfers multiplex over it,
//! and dropping the session closes it with `ssh -O exit`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::process::{run_bounded, wait_for};
use super::transfer::{detect_strategy, SshTarget, TransferStrategy};
use crate::domain::ports::{CommandOutput, RemoteError, RemoteExecutor, RemoteResult, Session};
use crate::domain::value_objects::Host;

/// Connection and timeout knobs for SSH
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout: Duration,
    /// Per-command deadline; `None` waits forever
    pub command_timeout: Option<Duration>,
    pub transfer_timeout: Option<Duration>,
    /// Extra raw `ssh` arguments
    pub extra_args: Vec<String>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            user: None,
            port: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Some(Duration::from_secs(600)),
            transfer_timeout: Some(Duration::from_secs(600)),
            extra_args: Vec::new(),
        }
    }
}

pub struct SshExecutor {
    options: SshOptions,
    transfer: Option<Arc<dyn TransferStrategy>>,
}

impl SshExecutor {
    /// Executor using the best transfer tool found on this machine
    pub fn new(options: SshOptions) -> Self {
        Self {
            options,
            transfer: detect_strategy().map(Arc::from),
        }
    }

    pub fn with_transfer(options: SshOptions, transfer: Box<dyn TransferStrategy>) -> Self {
        Self {
            options,
            transfer: Some(Arc::from(transfer)),
        }
    }

    pub fn transfer_name(&self) -> Option<&'static str> {
        self.transfer.as_ref().map(|t| t.name())
    }

    fn destination(&self, host: &Host) -> String {
        match &self.options.user {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        }
    }

    fn base_args(&self, control_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            format!("ControlPath={}", control_path.display()),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout.as_secs().max(1)),
        ];
        // -o form: scp reads -p as "preserve times"
        if let Some(port) = self.options.port {
            args.push("-o".to_string());
            args.push(format!("Port={}", port));
        }
        args.extend(self.options.extra_args.iter().cloned());
        args
    }
}

impl RemoteExecutor for SshExecutor {
    fn connect(&self, host: &Host) -> RemoteResult<Box<dyn Session>> {
        let socket_dir = tempfile::Builder::new().prefix("kvdeploy-ssh").tempdir()?;
        let control_path = socket_dir.path().join("cm");
        let destination = self.destination(host);
        let args = self.base_args(&control_path);

        // -f backgrounds ssh once authenticated. The master keeps any
        // inherited pipe open, so its stderr goes to a file instead.
        let log_path = socket_dir.path().join("master.log");
        let log = File::create(&log_path)?;
        let mut child = Command::new("ssh")
            .args(&args)
            .arg("-o")
            .arg("ControlMaster=yes")
            .arg("-f")
            .arg("-N")
            .arg(&destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(log)
            .spawn()?;

        let deadline = self.options.connect_timeout + Duration::from_secs(5);
        match wait_for(&mut child, Some(deadline))? {
            Some(status) if status.success() => {}
            Some(_) => {
                let reason = fs::read_to_string(&log_path).unwrap_or_default();
                return Err(RemoteError::Connection(format!("{}: {}", host, reason.trim())));
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RemoteError::Connection(format!(
                    "{}: handshake timed out after {}s",
                    host,
                    deadline.as_secs()
                )));
            }
        }

        Ok(Box::new(SshSession {
            host: host.clone(),
            destination,
            args,
            command_timeout: self.options.command_timeout,
            transfer_timeout: self.options.transfer_timeout,
            transfer: self.transfer.clone(),
            socket_dir,
        }))
    }
}

/// One multiplexed SSH connection
pub struct SshSession {
    host: Host,
    destination: String,
    args: Vec<String>,
    command_timeout: Option<Duration>,
    transfer_timeout: Option<Duration>,
    transfer: Option<Arc<dyn TransferStrategy>>,
    socket_dir: TempDir,
}

impl SshSession {
    pub fn control_path(&self) -> PathBuf {
        self.socket_dir.path().join("cm")
    }

    fn target(&self) -> SshTarget {
        SshTarget {
            destination: self.destination.clone(),
            ssh_args: self.args.clone(),
            timeout: self.transfer_timeout,
        }
    }
}

impl Session for SshSession {
    fn host(&self) -> &Host {
        &self.host
    }

    fn run_tolerant(&self, command: &str) -> RemoteResult<CommandOutput> {
        let mut cmd = Command::new("ssh");
        cmd.args(&self.args).arg(&self.destination).arg("--").arg(command);
        run_bounded(&mut cmd, command, self.command_timeout)
    }

    fn copy_tree(&self, local: &Path, remote: &Path) -> RemoteResult<()> {
        let transfer = self.transfer.as_ref().ok_or_else(|| {
            RemoteError::Transfer("neither rsync nor scp is available".to_string())
        })?;
        let dir = if local.is_dir() {
            Some(remote)
        } else {
            remote.parent()
        };
        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            self.create_dir_all(dir)?;
        }
        transfer.transfer(&self.target(), local, remote)
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let _ = Command::new("ssh")
            .args(&self.args)
            .arg("-O")
            .arg("exit")
            .arg(&self.destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}
