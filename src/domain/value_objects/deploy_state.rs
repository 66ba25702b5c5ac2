//! Per (cluster, host) install state

use serde::{Deserialize, Serialize};

/// Install progress of one cluster on one host
///
/// - `Absent`: nothing installed
/// - `Pending`: sentinel marker present, an install was interrupted or is in flight
/// - `Deployed`: install committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    Absent,
    Pending,
    Deployed,
}

impl DeployState {
    pub fn is_deployed(&self) -> bool {
        matches!(self, DeployState::Deployed)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DeployState::Pending)
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployState::Absent => write!(f, "absent"),
            DeployState::Pending => write!(f, "pending"),
            DeployState::Deployed => write!(f, "deployed"),
        }
    }
}
