//! Advisory lock record
//!
//! Identifies the workflow holding the per-cluster deploy lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ClusterId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub cluster_id: ClusterId,
    pub owner: String,
    pub pid: u32,
    pub hostname: String,
    pub acquired_at: DateTime<Utc>,
}

impl LockRecord {
    pub fn new(cluster_id: ClusterId, owner: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            cluster_id,
            owner: owner.into(),
            pid: std::process::id(),
            hostname: hostname.into(),
            acquired_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for LockRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} (pid {}) since {}",
            self.owner,
            self.hostname,
            self.pid,
            self.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
