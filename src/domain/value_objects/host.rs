//! Host and node address value objects

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// A reachable network endpoint (hostname or IP)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Host {
    fn from(s: &str) -> Self {
        Host::new(s)
    }
}

/// A single node process: host plus listening port
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeAddr {
    pub host: Host,
    pub port: u16,
}

impl NodeAddr {
    pub fn new(host: Host, port: u16) -> Self {
        Self { host, port }
    }

    /// Every (host, port) combination, hosts outermost
    pub fn product(hosts: &[Host], ports: impl IntoIterator<Item = u16> + Clone) -> Vec<NodeAddr> {
        hosts
            .iter()
            .flat_map(|h| {
                ports
                    .clone()
                    .into_iter()
                    .map(move |p| NodeAddr::new(h.clone(), p))
            })
            .collect()
    }
}

impl std::fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for NodeAddr {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| DeployError::Validation(format!("invalid node address '{}'", s)))?;
        let port = port
            .parse()
            .map_err(|_| DeployError::Validation(format!("invalid port in '{}'", s)))?;
        Ok(NodeAddr::new(Host::new(host), port))
    }
}
