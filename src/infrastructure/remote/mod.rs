//! Remote execution over SSH
//!
//! `SshExecutor` opens one multiplexed connection per session and copies
//! trees with the best available transfer tool (rsync preferred, scp
//! fallback).

mod process;
mod rsync;
mod scp;
mod ssh;
mod transfer;

pub use process::run_bounded;
pub use rsync::RsyncTransfer;
pub use scp::ScpTransfer;
pub use ssh::{SshExecutor, SshOptions, SshSession};
pub use transfer::{detect_strategy, SshTarget, TransferStrategy};
