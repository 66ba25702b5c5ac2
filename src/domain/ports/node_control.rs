//! Node Control port
//!
//! The small surface the orchestrator needs from cluster nodes. The
//! replication protocol behind it is opaque.

use std::time::Duration;

use thiserror::Error;

use crate::domain::ports::remote_executor::RemoteError;
use crate::domain::value_objects::{Host, NodeAddr, PortSet};

pub type NodeResult<T> = Result<T, NodeError>;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("nodes not up after {}s: {}", after.as_secs(), pending.join(", "))]
    NotUp {
        after: Duration,
        pending: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Master,
    Slave,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Master => f.write_str("master"),
            NodeRole::Slave => f.write_str("slave"),
        }
    }
}

/// Control surface over cluster node processes
///
/// Per-node calls take a [`NodeAddr`]; process lifecycle calls act on
/// every listed port of one host.
pub trait NodeControl: Send + Sync {
    fn is_alive(&self, node: &NodeAddr) -> NodeResult<bool>;

    fn role(&self, node: &NodeAddr) -> NodeResult<NodeRole>;

    /// Connected replicas currently following `master`
    fn alive_slaves(&self, master: &NodeAddr) -> NodeResult<Vec<NodeAddr>>;

    fn config_get(&self, node: &NodeAddr, key: &str) -> NodeResult<String>;

    fn config_set(&self, node: &NodeAddr, key: &str, value: &str) -> NodeResult<()>;

    /// Issue a failover request and return the raw reply
    fn failover(&self, node: &NodeAddr) -> NodeResult<String>;

    fn stop(&self, host: &Host, ports: &PortSet) -> NodeResult<()>;

    /// Regenerate per-port node configuration from the properties
    fn configure(&self, host: &Host, ports: &PortSet) -> NodeResult<()>;

    fn start(&self, host: &Host, ports: &PortSet) -> NodeResult<()>;

    /// Drop persisted cluster membership so nodes start clean
    fn reset(&self, host: &Host, ports: &PortSet) -> NodeResult<()>;

    /// Block until every node answers, or fail with the stragglers
    fn wait_until_up(&self, nodes: &[NodeAddr], timeout: Duration) -> NodeResult<()>;
}
