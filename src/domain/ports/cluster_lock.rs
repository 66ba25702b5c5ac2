//! Cluster Lock port
//!
//! At most one workflow may run against a cluster id at a time. The lock
//! is held for as long as the returned guard lives.

use std::path::Path;

use crate::domain::entities::LockRecord;
use crate::error::DeployResult;

/// Proof of holding the cluster lock; releases it on drop
pub struct ClusterLockGuard {
    record: LockRecord,
    _handle: Box<dyn Send>,
}

impl ClusterLockGuard {
    pub fn new(record: LockRecord, handle: Box<dyn Send>) -> Self {
        Self {
            record,
            _handle: handle,
        }
    }

    pub fn record(&self) -> &LockRecord {
        &self.record
    }
}

impl std::fmt::Debug for ClusterLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterLockGuard")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

pub trait ClusterLocker: Send + Sync {
    /// Take the lock at `path`, failing with `ClusterLocked` if another
    /// workflow holds it
    fn acquire(&self, path: &Path, record: LockRecord) -> DeployResult<ClusterLockGuard>;
}
