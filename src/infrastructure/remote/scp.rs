//! SCP Transfer Strategy
//!
//! Fallback when rsync is not installed. scp cannot copy "the contents
//! of" a directory, so each top-level entry is passed separately.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::process::run_bounded;
use super::transfer::{SshTarget, TransferStrategy};
use crate::domain::ports::{RemoteError, RemoteResult};

pub struct ScpTransfer;

impl ScpTransfer {
    /// Check if scp is installed and available
    pub fn check_available() -> bool {
        // scp without args returns non-zero, but if we can spawn it, it's available
        Command::new("scp")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn sources(local: &Path) -> RemoteResult<Vec<PathBuf>> {
        if !local.is_dir() {
            return Ok(vec![local.to_path_buf()]);
        }
        let mut entries: Vec<PathBuf> = std::fs::read_dir(local)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        Ok(entries)
    }
}

impl TransferStrategy for ScpTransfer {
    fn name(&self) -> &'static str {
        "scp"
    }

    fn is_available(&self) -> bool {
        Self::check_available()
    }

    fn transfer(&self, target: &SshTarget, local: &Path, remote: &Path) -> RemoteResult<()> {
        let sources = Self::sources(local)?;
        if sources.is_empty() {
            return Ok(());
        }

        let mut cmd = Command::new("scp");
        cmd.arg("-r") // recursive
            .arg("-p") // preserve timestamps
            .args(&target.ssh_args)
            .args(&sources)
            .arg(target.remote_spec(remote));

        let output = run_bounded(&mut cmd, "scp", target.timeout)?;
        if !output.success() {
            return Err(RemoteError::Transfer(format!(
                "scp exited with {}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}
