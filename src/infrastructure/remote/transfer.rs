//! Remote Transfer Strategy
//!
//! Copies a local file or directory tree to a path on a host, reusing the
//! session's SSH control connection.

use std::path::Path;
use std::time::Duration;

use crate::domain::ports::RemoteResult;

/// How to reach the remote side of a transfer
#[derive(Debug, Clone)]
pub struct SshTarget {
    /// `host` or `user@host`
    pub destination: String,
    /// `-o ...` style options shared with the control connection
    pub ssh_args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl SshTarget {
    /// `ssh` plus options, as one string for `rsync -e`
    pub fn ssh_command(&self) -> String {
        let mut parts = vec!["ssh".to_string()];
        parts.extend(self.ssh_args.iter().map(|a| crate::domain::ports::shell_quote(a)));
        parts.join(" ")
    }

    pub fn remote_spec(&self, remote: &Path) -> String {
        format!("{}:{}", self.destination, remote.display())
    }
}

/// Strategy for copying trees to a remote host
pub trait TransferStrategy: Send + Sync {
    /// Name of this transfer method (for logging)
    fn name(&self) -> &'static str;

    /// Check if this transfer method is available on the system
    fn is_available(&self) -> bool;

    /// Copy `local` to `remote`. For a directory, its contents land inside
    /// `remote`, which already exists; for a file, `remote` is the file path.
    fn transfer(&self, target: &SshTarget, local: &Path, remote: &Path) -> RemoteResult<()>;
}

/// Detect and return the best available transfer strategy
pub fn detect_strategy() -> Option<Box<dyn TransferStrategy>> {
    // Try rsync first (preferred)
    let rsync = super::rsync::RsyncTransfer;
    if rsync.is_available() {
        return Some(Box::new(rsync));
    }

    let scp = super::scp::ScpTransfer;
    if scp.is_available() {
        return Some(Box::new(scp));
    }

    None
}
