//! Zero-Downtime Outcome

use std::path::PathBuf;

use crate::domain::entities::PortAssignment;
use crate::domain::value_objects::{ClusterId, Host, NodeAddr};

#[derive(Debug, Clone)]
pub struct ZeroDowntimeOutcome {
    pub cluster_id: ClusterId,
    /// Failover rounds it took for every target to confirm
    pub rounds: u32,
    /// Former replicas now holding the master role
    pub promoted: Vec<NodeAddr>,
    /// Port lists as persisted after the swap
    pub ports: PortAssignment,
    pub conf_backup: PathBuf,
    pub data_backups: Vec<(Host, PathBuf)>,
}
