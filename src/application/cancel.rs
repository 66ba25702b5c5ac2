//! Cooperative cancellation
//!
//! Workflows poll the token at phase boundaries only, so a host is never
//! abandoned mid-install with a sentinel that misstates its progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::value_objects::Phase;
use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if an interrupt arrived before `phase`
    pub fn check(&self, phase: Phase) -> DeployResult<()> {
        if self.is_cancelled() {
            Err(DeployError::Cancelled { phase })
        } else {
            Ok(())
        }
    }
}
