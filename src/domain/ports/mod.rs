//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod cluster_lock;
pub mod deploy_events;
pub mod file_system;
pub mod host_resolver;
pub mod node_control;
pub mod port_resolver;
pub mod remote_executor;

pub use cluster_lock::{ClusterLockGuard, ClusterLocker};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use file_system::{FileSystem, FsError, FsResult};
pub use host_resolver::{HostResolver, StaticHostResolver};
pub use node_control::{NodeControl, NodeError, NodeResult, NodeRole};
pub use port_resolver::{AcceptConflicts, PortResolution, PortResolver, RejectConflicts};
pub use remote_executor::{
    parse_listening_ports, shell_quote, shell_quote_path, CommandOutput, RemoteError,
    RemoteExecutor, RemoteResult, Session,
};
