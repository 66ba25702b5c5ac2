//! kvdeploy - deploy and zero-downtime redeploy for key-value cluster fleets
//!
//! Installs a node package across a fleet of hosts over SSH, keeps the
//! cluster's properties file in sync, takes conf/data backups and upgrades
//! a running cluster by restarting replicas first and failing over to them.
//!
//! The orchestration lives in [`application`] and talks to hosts and nodes
//! only through the ports in [`domain::ports`]; [`infrastructure`] provides
//! the SSH, node-CLI and file-system implementations.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    DeployOptions, DeployUseCase, Services, SnapshotUseCase, ZeroDowntimeOptions,
    ZeroDowntimeUseCase,
};
pub use config::Config;
pub use error::{DeployError, DeployResult};
