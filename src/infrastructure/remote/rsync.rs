//! Rsync Transfer Strategy
//!
//! Preferred: only changed files cross the wire on repeated syncs.

use std::path::Path;
use std::process::{Command, Stdio};

use super::process::run_bounded;
use super::transfer::{SshTarget, TransferStrategy};
use crate::domain::ports::{RemoteError, RemoteResult};

pub struct RsyncTransfer;

impl RsyncTransfer {
    /// Check if rsync is installed and available
    pub fn check_available() -> bool {
        Command::new("rsync")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn build(target: &SshTarget, local: &Path, remote: &Path) -> Command {
        let mut cmd = Command::new("rsync");
        cmd.arg("-az").arg("-e").arg(target.ssh_command());
        if local.is_dir() {
            // trailing slash = copy contents
            cmd.arg(format!("{}/", local.display()));
            cmd.arg(format!("{}/", target.remote_spec(remote)));
        } else {
            cmd.arg(local);
            cmd.arg(target.remote_spec(remote));
        }
        cmd
    }
}

impl TransferStrategy for RsyncTransfer {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn is_available(&self) -> bool {
        Self::check_available()
    }

    fn transfer(&self, target: &SshTarget, local: &Path, remote: &Path) -> RemoteResult<()> {
        let mut cmd = Self::build(target, local, remote);
        let output = run_bounded(&mut cmd, "rsync", target.timeout)?;
        if !output.success() {
            return Err(RemoteError::Transfer(format!(
                "rsync exited with {}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}
