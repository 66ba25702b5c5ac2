//! Application Layer
//!
//! Use cases that orchestrate cluster workflows.
//! This layer:
//! - Depends on Domain layer (entities, ports)
//! - Does NOT talk to hosts or nodes directly (that is Infrastructure)
//! - Sequences phases, barriers and events
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Standard deploy and full redeploy
//! - `ZeroDowntimeUseCase` - Replica-first upgrade with failover
//! - `SnapshotUseCase` - Standalone backup, restore, listing and state
//!
//! ## Building blocks
//!
//! - `PhaseRunner` - Bounded per-host fan-out with a barrier per phase
//! - `DeployStateTracker`, `BackupManager`, `PortNegotiator`

pub mod backup_manager;
pub mod cancel;
pub mod deploy;
mod install;
pub mod phase_runner;
pub mod port_negotiator;
pub mod services;
pub mod settings;
pub mod snapshot;
pub mod state_tracker;
pub mod zero_downtime;

pub use backup_manager::BackupManager;
pub use cancel::CancelToken;
pub use deploy::{DeployOptions, DeployOutcome, DeployUseCase, PropertiesSource};
pub use phase_runner::PhaseRunner;
pub use port_negotiator::{NegotiatedPorts, PortNegotiator};
pub use services::Services;
pub use settings::{DeploySettings, FailoverSettings};
pub use snapshot::{
    BackupOptions, BackupOutcome, RestoreOptions, RestoreOutcome, SnapshotUseCase, StateReport,
};
pub use state_tracker::DeployStateTracker;
pub use zero_downtime::{ZeroDowntimeOptions, ZeroDowntimeOutcome, ZeroDowntimeUseCase};
