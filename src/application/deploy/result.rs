//! Deploy Outcome
//!
//! What a successful standard deploy did.

use std::path::PathBuf;

use crate::domain::entities::{PortAssignment, PortConflict};
use crate::domain::value_objects::{ClusterId, DeployState, Host};

#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub cluster_id: ClusterId,
    /// Local state before the run
    pub previous_state: DeployState,
    pub hosts: Vec<Host>,
    pub ports: PortAssignment,
    /// Conflicts the operator accepted during negotiation
    pub accepted_conflicts: Vec<PortConflict>,
    /// Hosts whose interrupted install was wiped
    pub discarded: Vec<Host>,
    pub conf_backup: Option<PathBuf>,
    pub data_backups: Vec<(Host, PathBuf)>,
}

impl DeployOutcome {
    pub fn is_redeploy(&self) -> bool {
        self.previous_state.is_deployed()
    }
}
