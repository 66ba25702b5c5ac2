//! Domain Entities
//!
//! - `PropertiesDocument` - The cluster's line-oriented property file
//! - `PortAssignment` - Master/slave port sets with the replica invariant
//! - `ClusterContext` - Resolved topology threaded through workflows
//! - `BackupArchive` - Immutable conf/data snapshots
//! - `FailoverAttempt` - One target's result in one failover round
//! - `LockRecord` - Holder of the per-cluster advisory lock
//! - `Topology` - Operator inputs for a new cluster

mod backup;
mod cluster_context;
mod failover;
mod lock_record;
mod port_assignment;
pub mod properties;
mod topology;

pub use backup::{BackupArchive, BackupKind, BackupTag};
pub use cluster_context::{ClusterContext, ClusterPaths, PROPERTIES_FILE, SENTINEL_FILE};
pub use failover::{
    classify_response, FailoverAttempt, FailoverOutcome, PromotionCheck, NOT_A_SLAVE_RESPONSE,
};
pub use lock_record::LockRecord;
pub use port_assignment::{PortAssignment, PortConflict};
pub use properties::{keys, PropertiesDocument, PropertyEntry};
pub use topology::Topology;
