//! Cluster identifier value object
//!
//! All paths, state files and properties are namespaced by the cluster id.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};

/// Opaque positive integer identifying one managed cluster instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ClusterId(u32);

impl ClusterId {
    /// Create a cluster id, rejecting zero
    pub fn new(id: u32) -> DeployResult<Self> {
        if id == 0 {
            return Err(DeployError::Validation(
                "cluster id must be a positive integer".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Directory name of this cluster under the base directory
    pub fn dir_name(&self) -> String {
        format!("cluster_{}", self.0)
    }
}

impl TryFrom<u32> for ClusterId {
    type Error = DeployError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ClusterId::new(value)
    }
}

impl From<ClusterId> for u32 {
    fn from(id: ClusterId) -> Self {
        id.0
    }
}

impl FromStr for ClusterId {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s
            .trim()
            .parse()
            .map_err(|_| DeployError::Validation(format!("invalid cluster id '{}'", s)))?;
        ClusterId::new(id)
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
