//! Error types for kvdeploy
//!
//! Uses `thiserror` for library errors. Every fatal variant carries enough
//! context (host, phase, cause) to resume manually from the deploy/backup state.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::PortConflict;
use crate::domain::ports::{FsError, NodeError, RemoteError};
use crate::domain::value_objects::{ClusterId, Host, NodeAddr, Phase};

/// Result type alias for kvdeploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deploy workflows
#[derive(Error, Debug)]
pub enum DeployError {
    /// One or more hosts unreachable or refused authentication
    #[error("cannot reach {} during {phase}: {message}", join_hosts(hosts))]
    Connectivity {
        phase: Phase,
        hosts: Vec<Host>,
        message: String,
    },

    /// Bad input or unmet precondition; nothing was mutated
    #[error("validation failed: {0}")]
    Validation(String),

    /// Remote installer exited non-zero; the host is left `Pending`
    #[error("installer failed on {host}: {message}")]
    Install { host: Host, message: String },

    /// Candidate ports already in use somewhere in the fleet
    #[error("port conflict on {}", join_conflicts(conflicts))]
    PortConflict { conflicts: Vec<PortConflict> },

    /// Cluster data already present on hosts being added
    #[error("cluster {cluster_id} already exists on {}", join_hosts(hosts))]
    ClusterCollision {
        cluster_id: ClusterId,
        hosts: Vec<Host>,
    },

    /// Failover retry budget exhausted
    #[error("failover did not complete after {rounds} rounds; still pending: {}", join_nodes(pending))]
    Failover { rounds: u32, pending: Vec<NodeAddr> },

    /// Properties file failed to parse or round-trip
    #[error("corrupt properties{}: {message}", describe_location(path, *line))]
    StateCorruption {
        path: Option<PathBuf>,
        line: Option<usize>,
        message: String,
    },

    /// `set` on a key that has no line in the document
    #[error("key '{0}' not found in properties")]
    KeyNotFound(String),

    /// A bounded remote call did not finish in time
    #[error("command on {host} timed out after {}s during {phase}: {command}", timeout.as_secs())]
    RemoteTimeout {
        phase: Phase,
        host: Host,
        command: String,
        timeout: Duration,
    },

    /// Remote command or transfer failed
    #[error("remote operation on {host} failed during {phase}: {source}")]
    Remote {
        phase: Phase,
        host: Host,
        #[source]
        source: RemoteError,
    },

    /// Node control surface failed
    #[error("node {node} failed during {phase}: {source}")]
    Node {
        phase: Phase,
        node: String,
        #[source]
        source: NodeError,
    },

    /// Backup archive does not exist
    #[error("backup not found: {path}")]
    BackupNotFound { path: PathBuf },

    /// Archives are immutable; refusing to write into an existing one
    #[error("backup already exists: {path}")]
    BackupExists { path: PathBuf },

    /// Restored file does not match its archived copy
    #[error("restore verification failed for {path}")]
    RestoreMismatch { path: PathBuf },

    /// Another workflow holds the advisory lock for this cluster
    #[error("cluster {cluster_id} is locked by {holder}")]
    ClusterLocked { cluster_id: ClusterId, holder: String },

    /// Operator interrupt honored at a phase boundary
    #[error("cancelled before {phase}")]
    Cancelled { phase: Phase },

    /// Live topology no longer matches the persisted port assignment
    #[error("topology drift after {phase}: {message}")]
    TopologyDrift { phase: Phase, message: String },

    /// Invalid tool configuration
    #[error("config error in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Local file system failure
    #[error("{0}")]
    Fs(#[from] FsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Attach phase and host context to a remote failure.
    pub fn remote(phase: Phase, host: &Host, source: RemoteError) -> Self {
        match source {
            RemoteError::Timeout { command, after } => DeployError::RemoteTimeout {
                phase,
                host: host.clone(),
                command,
                timeout: after,
            },
            RemoteError::Connection(message) => DeployError::Connectivity {
                phase,
                hosts: vec![host.clone()],
                message,
            },
            source => DeployError::Remote {
                phase,
                host: host.clone(),
                source,
            },
        }
    }

    /// Attach phase and node context to a node control failure.
    pub fn node(phase: Phase, node: impl ToString, source: NodeError) -> Self {
        DeployError::Node {
            phase,
            node: node.to_string(),
            source,
        }
    }

    pub fn corrupt(path: Option<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        DeployError::StateCorruption {
            path,
            line,
            message: message.into(),
        }
    }
}

fn join_hosts(hosts: &[Host]) -> String {
    hosts
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_nodes(nodes: &[NodeAddr]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_conflicts(conflicts: &[PortConflict]) -> String {
    conflicts
        .iter()
        .map(|c| format!("{}:{}", c.host, c.port))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_location(path: &Option<PathBuf>, line: Option<usize>) -> String {
    match (path, line) {
        (Some(p), Some(l)) => format!(" in {}:{}", p.display(), l),
        (Some(p), None) => format!(" in {}", p.display()),
        (None, Some(l)) => format!(" at line {}", l),
        (None, None) => String::new(),
    }
}
